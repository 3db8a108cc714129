//! Executes `HttpRequest` values against the network.
//!
//! `UreqTransport` wraps a single pooled `ureq::Agent` created once per
//! binding. The agent is safe to share between threads, so concurrent reads
//! and invokes reuse its connections. Each request carries its own timeout,
//! applied through per-request configuration on the shared agent.

use std::io::Read as _;

use crate::error::BindingError;
use crate::http::{HttpRequest, HttpResponse};

/// Something that can perform one blocking HTTP round trip.
pub trait Transport: Send + Sync {
    /// Send `request` and read the whole response body.
    ///
    /// HTTP error statuses are returned as responses, not errors.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BindingError>;
}

/// A [`Transport`] backed by [`ureq`] (blocking).
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            // Status codes are reported to the caller, never raised.
            .http_status_as_error(false)
            // Invoke sends the configured method verbatim, extension methods included.
            .allow_non_standard_methods(true)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BindingError> {
        let mut builder = ::http::Request::builder()
            .method(request.method)
            .uri(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let result = match request.body {
            Some(body) => {
                let req = builder
                    .body(body)
                    .map_err(|e| BindingError::InvalidRequest(e.to_string()))?;
                let req = self
                    .agent
                    .configure_request(req)
                    .timeout_global(Some(request.timeout))
                    .build();
                self.agent.run(req)
            }
            None => {
                let req = builder
                    .body(())
                    .map_err(|e| BindingError::InvalidRequest(e.to_string()))?;
                let req = self
                    .agent
                    .configure_request(req)
                    .timeout_global(Some(request.timeout))
                    .build();
                self.agent.run(req)
            }
        };

        let response = result.map_err(|e| {
            tracing::warn!(url = %request.url, error = %e, "http request failed");
            BindingError::Transport(e)
        })?;
        read_response(response)
    }
}

/// Drain a ureq response into an [`HttpResponse`]. The body reader is
/// dropped, and the connection released, on every return path.
fn read_response(response: ::http::Response<ureq::Body>) -> Result<HttpResponse, BindingError> {
    let (parts, body) = response.into_parts();

    let mut body_bytes = Vec::new();
    body.into_reader()
        .read_to_end(&mut body_bytes)
        .map_err(BindingError::from_body_read)?;

    Ok(HttpResponse {
        status: parts.status,
        headers: parts.headers,
        body: body_bytes,
    })
}
