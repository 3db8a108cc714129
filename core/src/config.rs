//! Binds the host-supplied property bag to a typed `ConnectionDescriptor`.
//!
//! # Design
//! The bag is deserialized once into a private raw shape that accepts every
//! supported key, then normalized. Credentials may arrive flat (`user` /
//! `password`) or nested (`credentials` holding a JSON object); both collapse
//! into a single `Option<Credentials>` here so nothing downstream sees two
//! representations. Empty `url` or `method` values are accepted; a bad target
//! only fails when a request is attempted.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::BindingError;

/// Method used by invoke when the bag does not name one.
pub const DEFAULT_INVOKE_METHOD: &str = "POST";

/// Timeout applied to read calls.
pub const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout applied to invoke calls.
pub const INVOKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Untyped configuration handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub properties: HashMap<String, String>,
}

impl Metadata {
    pub fn new(properties: HashMap<String, String>) -> Self {
        Self { properties }
    }

    /// Parse a JSON object into a property bag.
    ///
    /// String values are kept verbatim. `null` means the property is absent.
    /// Any other value (a nested `credentials` object, a number) is stored as
    /// its JSON text so the binder can interpret it.
    pub fn from_json(raw: &str) -> Result<Self, BindingError> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)
            .map_err(|e| BindingError::Configuration(format!("properties: {e}")))?;
        let properties = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();
        Ok(Self { properties })
    }

    /// Set a single property, builder style.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }
}

/// A username/password pair. Only constructed when both halves are non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    /// Returns `None` unless both `user` and `password` are non-empty.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Option<Self> {
        let user = user.into();
        let password = password.into();
        if user.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self { user, password })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Per-operation timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub read: Duration,
    pub invoke: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: READ_TIMEOUT,
            invoke: INVOKE_TIMEOUT,
        }
    }
}

/// The fixed target of every call a binding makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub url: String,
    pub method: String,
    pub credentials: Option<Credentials>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawProperties {
    url: String,
    method: String,
    user: String,
    password: String,
    credentials: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawCredentials {
    user: String,
    password: String,
}

impl ConnectionDescriptor {
    /// Bind a property bag to a descriptor.
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, BindingError> {
        let value = serde_json::to_value(&metadata.properties)
            .map_err(|e| BindingError::Configuration(e.to_string()))?;
        let raw: RawProperties =
            serde_json::from_value(value).map_err(|e| BindingError::Configuration(e.to_string()))?;

        let (user, password) = match raw.credentials.as_deref().map(str::trim) {
            Some(nested) if !nested.is_empty() => {
                let nested: RawCredentials = serde_json::from_str(nested)
                    .map_err(|e| BindingError::Configuration(format!("credentials: {e}")))?;
                (nested.user, nested.password)
            }
            _ => (raw.user, raw.password),
        };

        let partial = user.is_empty() != password.is_empty();
        let credentials = Credentials::new(user, password);
        if partial {
            tracing::warn!("only one of user/password is set, requests will be unauthenticated");
        }

        let method = if raw.method.is_empty() {
            DEFAULT_INVOKE_METHOD.to_string()
        } else {
            raw.method
        };

        Ok(Self {
            url: raw.url,
            method,
            credentials,
        })
    }
}
