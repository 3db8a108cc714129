//! Request construction and response mapping for the two binding operations.
//!
//! # Design
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` from the descriptor and a `parse_*` function that maps the
//! `HttpResponse` onto the binding contract. Nothing here touches the
//! network; `HttpBinding` sends the built request through its `Transport`.

use std::collections::HashMap;
use std::time::Duration;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method, Uri};

use crate::auth::attach_credentials;
use crate::binding::{InvokeResponse, ReadResponse};
use crate::config::ConnectionDescriptor;
use crate::error::BindingError;
use crate::http::{HttpRequest, HttpResponse};

/// Content type sent with every invoke payload.
pub const INVOKE_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Metadata key carrying the response status line.
pub const STATUS_METADATA_KEY: &str = "status";

impl ConnectionDescriptor {
    /// GET against the configured URL. The configured method is ignored.
    pub fn build_read(&self, timeout: Duration) -> Result<HttpRequest, BindingError> {
        validate_url(&self.url)?;
        let mut headers = HeaderMap::new();
        attach_credentials(&mut headers, self.credentials.as_ref());
        Ok(HttpRequest {
            method: Method::GET,
            url: self.url.clone(),
            headers,
            body: None,
            timeout,
        })
    }

    /// Configured method against the configured URL, carrying `payload`.
    pub fn build_invoke(&self, payload: Vec<u8>, timeout: Duration) -> Result<HttpRequest, BindingError> {
        let method = Method::from_bytes(self.method.as_bytes())
            .map_err(|_| BindingError::InvalidRequest(format!("invalid method {:?}", self.method)))?;
        validate_url(&self.url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(INVOKE_CONTENT_TYPE));
        attach_credentials(&mut headers, self.credentials.as_ref());
        Ok(HttpRequest {
            method,
            url: self.url.clone(),
            headers,
            body: Some(payload),
            timeout,
        })
    }
}

/// The whole body goes to the handler regardless of status.
pub fn parse_read(response: HttpResponse) -> ReadResponse {
    ReadResponse {
        metadata: status_metadata(&response),
        data: response.body,
    }
}

/// Non-2xx statuses are reported, not raised. An empty body maps to `None`.
pub fn parse_invoke(response: HttpResponse) -> InvokeResponse {
    let metadata = status_metadata(&response);
    let data = if response.body.is_empty() {
        None
    } else {
        Some(response.body)
    };
    InvokeResponse { data, metadata }
}

fn status_metadata(response: &HttpResponse) -> HashMap<String, String> {
    HashMap::from([(STATUS_METADATA_KEY.to_string(), response.status_line())])
}

/// A usable target needs at least a scheme and a host.
fn validate_url(url: &str) -> Result<(), BindingError> {
    if url.is_empty() {
        return Err(BindingError::InvalidRequest("url is empty".to_string()));
    }
    let uri: Uri = url
        .parse()
        .map_err(|e| BindingError::InvalidRequest(format!("invalid url {url:?}: {e}")))?;
    if uri.scheme().is_none() || uri.host().is_none() {
        return Err(BindingError::InvalidRequest(format!(
            "url {url:?} must be absolute"
        )));
    }
    Ok(())
}
