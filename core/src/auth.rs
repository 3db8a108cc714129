//! Basic authentication header handling.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};

use crate::config::Credentials;

/// `Basic <base64(user:password)>`.
pub fn basic_auth_value(user: &str, password: &str) -> String {
    let encoded = BASE64.encode(format!("{user}:{password}"));
    format!("Basic {encoded}")
}

/// Set `Authorization` when both user and password are non-empty.
///
/// Anything less leaves the headers untouched and the request goes out
/// unauthenticated.
pub fn attach_credentials(headers: &mut HeaderMap, credentials: Option<&Credentials>) {
    let Some(creds) = credentials else {
        return;
    };
    if creds.user().is_empty() || creds.password().is_empty() {
        return;
    }
    // Base64 output is always a valid header value; the user name is not
    // validated beyond that.
    if let Ok(value) = HeaderValue::from_str(&basic_auth_value(creds.user(), creds.password())) {
        headers.insert(AUTHORIZATION, value);
    }
}
