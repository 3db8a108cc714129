//! HTTP request and response values exchanged with a `Transport`.
//!
//! # Design
//! Requests are fully described as data before any I/O happens, so request
//! construction can be asserted on directly in tests and the transport stays
//! a thin executor. Method, headers and status reuse the `http` crate types.

use std::time::Duration;

use http::{HeaderMap, Method, StatusCode};

/// An outbound request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Status line in `"<code> <reason>"` form, e.g. `"404 Not Found"`.
    /// Codes without a canonical reason render as the bare code.
    ///
    /// The reason is the canonical one for the code, not the phrase the
    /// server sent: `http::Response` does not keep it, so a reply of
    /// `200 Everything Fine` is reported as `"200 OK"`.
    pub fn status_line(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {reason}", self.status.as_u16()),
            None => self.status.as_u16().to_string(),
        }
    }
}
