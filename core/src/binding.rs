//! The binding contract exposed to a host runtime and its HTTP implementation.
//!
//! # Design
//! A binding starts uninitialized and becomes ready once `init` has bound
//! the property bag. The descriptor lives in a `OnceLock`, so it is written
//! exactly once and then shared read-only between concurrent calls. There is
//! no way back to uninitialized.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::config::{ConnectionDescriptor, Metadata, Timeouts};
use crate::error::{BindingError, HandlerError};
use crate::request::{parse_invoke, parse_read};
use crate::transport::{Transport, UreqTransport};

/// Kinds of invoke operation a host may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Get,
    Delete,
    List,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Get => "get",
            OperationKind::Delete => "delete",
            OperationKind::List => "list",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivered to the read handler once per read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResponse {
    pub data: Vec<u8>,
    pub metadata: HashMap<String, String>,
}

/// Payload of a single invoke call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    pub data: Vec<u8>,
    pub operation: OperationKind,
}

impl InvokeRequest {
    /// A `create` invoke carrying `data`.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            operation: OperationKind::Create,
        }
    }
}

/// Result of an invoke call. `metadata["status"]` holds the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeResponse {
    pub data: Option<Vec<u8>>,
    pub metadata: HashMap<String, String>,
}

/// A binding the host polls for data.
pub trait InputBinding: Send + Sync {
    fn init(&self, metadata: &Metadata) -> Result<(), BindingError>;

    /// Fetch once and hand the result to `handler` exactly once.
    fn read(
        &self,
        handler: &mut dyn FnMut(ReadResponse) -> Result<(), HandlerError>,
    ) -> Result<(), BindingError>;
}

/// A binding the host calls with a payload.
pub trait OutputBinding: Send + Sync {
    fn init(&self, metadata: &Metadata) -> Result<(), BindingError>;

    fn invoke(&self, request: InvokeRequest) -> Result<InvokeResponse, BindingError>;

    fn operations(&self) -> Vec<OperationKind>;
}

/// Calls a fixed HTTP endpoint: GET for read, the configured method for invoke.
pub struct HttpBinding<T: Transport = UreqTransport> {
    descriptor: OnceLock<ConnectionDescriptor>,
    timeouts: Timeouts,
    transport: T,
}

impl HttpBinding<UreqTransport> {
    pub fn new() -> Self {
        Self::with_transport(UreqTransport::new())
    }
}

impl Default for HttpBinding<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> HttpBinding<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            descriptor: OnceLock::new(),
            timeouts: Timeouts::default(),
            transport,
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// The bound descriptor, or `None` before `init`.
    pub fn descriptor(&self) -> Option<&ConnectionDescriptor> {
        self.descriptor.get()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn ready(&self) -> Result<&ConnectionDescriptor, BindingError> {
        self.descriptor.get().ok_or(BindingError::NotInitialized)
    }

    fn bind(&self, metadata: &Metadata) -> Result<(), BindingError> {
        let descriptor = ConnectionDescriptor::from_metadata(metadata)?;
        tracing::debug!(
            url = %descriptor.url,
            method = %descriptor.method,
            authenticated = descriptor.credentials.is_some(),
            "http binding initialized"
        );
        self.descriptor
            .set(descriptor)
            .map_err(|_| BindingError::AlreadyInitialized)
    }
}

impl<T: Transport> InputBinding for HttpBinding<T> {
    fn init(&self, metadata: &Metadata) -> Result<(), BindingError> {
        self.bind(metadata)
    }

    fn read(
        &self,
        handler: &mut dyn FnMut(ReadResponse) -> Result<(), HandlerError>,
    ) -> Result<(), BindingError> {
        let request = self.ready()?.build_read(self.timeouts.read)?;
        tracing::debug!(url = %request.url, "http binding read");

        let response = self.transport.execute(request)?;
        tracing::debug!(status = %response.status, bytes = response.body.len(), "http binding read complete");

        handler(parse_read(response)).map_err(BindingError::Handler)
    }
}

impl<T: Transport> OutputBinding for HttpBinding<T> {
    fn init(&self, metadata: &Metadata) -> Result<(), BindingError> {
        self.bind(metadata)
    }

    fn invoke(&self, request: InvokeRequest) -> Result<InvokeResponse, BindingError> {
        if !self.operations().contains(&request.operation) {
            return Err(BindingError::UnsupportedOperation(request.operation));
        }
        let http_request = self.ready()?.build_invoke(request.data, self.timeouts.invoke)?;
        tracing::debug!(method = %http_request.method, url = %http_request.url, "http binding invoke");

        let response = self.transport.execute(http_request)?;
        tracing::debug!(status = %response.status, "http binding invoke complete");

        Ok(parse_invoke(response))
    }

    fn operations(&self) -> Vec<OperationKind> {
        vec![OperationKind::Create]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use http::header::{AUTHORIZATION, CONTENT_TYPE};
    use http::{HeaderMap, Method, StatusCode};

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::request::STATUS_METADATA_KEY;

    /// Records every request and answers with a canned response.
    #[derive(Clone)]
    struct RecordingTransport {
        sent: Arc<Mutex<Vec<HttpRequest>>>,
        status: StatusCode,
        body: Vec<u8>,
    }

    impl RecordingTransport {
        fn replying(status: u16, body: &[u8]) -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                status: StatusCode::from_u16(status).unwrap(),
                body: body.to_vec(),
            }
        }

        fn sent(&self) -> Vec<HttpRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BindingError> {
            self.sent.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: HeaderMap::new(),
                body: self.body.clone(),
            })
        }
    }

    fn ready_binding(transport: RecordingTransport, metadata: Metadata) -> HttpBinding<RecordingTransport> {
        let binding = HttpBinding::with_transport(transport);
        InputBinding::init(&binding, &metadata).unwrap();
        binding
    }

    #[test]
    fn invoke_sends_configured_method_auth_and_body() {
        let transport = RecordingTransport::replying(200, b"");
        let binding = ready_binding(
            transport.clone(),
            Metadata::default()
                .with("url", "http://x/api")
                .with("method", "POST")
                .with("user", "a")
                .with("password", "b"),
        );

        let resp = binding.invoke(InvokeRequest::new(r#"{"k":1}"#)).unwrap();
        assert_eq!(resp.metadata[STATUS_METADATA_KEY], "200 OK");
        assert!(resp.data.is_none());

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::POST);
        assert_eq!(sent[0].url, "http://x/api");
        assert_eq!(sent[0].headers[AUTHORIZATION], "Basic YTpi");
        assert_eq!(sent[0].headers[CONTENT_TYPE], "application/json; charset=utf-8");
        assert_eq!(sent[0].body.as_deref(), Some(br#"{"k":1}"#.as_slice()));
        assert_eq!(sent[0].timeout, Duration::from_secs(5));
    }

    #[test]
    fn read_is_get_without_auth_and_calls_handler_once() {
        let transport = RecordingTransport::replying(200, b"feed body");
        let binding = ready_binding(
            transport.clone(),
            Metadata::default()
                .with("url", "http://x/feed")
                .with("method", "PUT"),
        );

        let mut received = Vec::new();
        binding
            .read(&mut |resp| {
                received.push(resp.data);
                Ok(())
            })
            .unwrap();
        assert_eq!(received, vec![b"feed body".to_vec()]);

        let sent = transport.sent();
        assert_eq!(sent[0].method, Method::GET);
        assert_eq!(sent[0].url, "http://x/feed");
        assert!(sent[0].headers.get(AUTHORIZATION).is_none());
        assert_eq!(sent[0].timeout, Duration::from_secs(60));
    }

    #[test]
    fn read_propagates_handler_failure() {
        let binding = ready_binding(
            RecordingTransport::replying(200, b"x"),
            Metadata::default().with("url", "http://x/feed"),
        );
        let err = binding
            .read(&mut |_| Err("downstream rejected".into()))
            .unwrap_err();
        assert!(matches!(err, BindingError::Handler(_)));
        assert!(err.to_string().contains("downstream rejected"));
    }

    #[test]
    fn invoke_non_2xx_is_not_an_error() {
        let binding = ready_binding(
            RecordingTransport::replying(404, b"missing"),
            Metadata::default().with("url", "http://x/api"),
        );
        let resp = binding.invoke(InvokeRequest::new("{}")).unwrap();
        assert_eq!(resp.metadata[STATUS_METADATA_KEY], "404 Not Found");
        assert_eq!(resp.data.as_deref(), Some(b"missing".as_slice()));
    }

    #[test]
    fn partial_credentials_send_no_authorization() {
        let transport = RecordingTransport::replying(200, b"");
        let binding = ready_binding(
            transport.clone(),
            Metadata::default()
                .with("url", "http://x/api")
                .with("user", "only-user"),
        );
        binding.invoke(InvokeRequest::new("{}")).unwrap();
        assert!(transport.sent()[0].headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn calls_before_init_fail() {
        let binding = HttpBinding::with_transport(RecordingTransport::replying(200, b""));
        let err = binding.invoke(InvokeRequest::new("{}")).unwrap_err();
        assert!(matches!(err, BindingError::NotInitialized));
        let err = binding.read(&mut |_| Ok(())).unwrap_err();
        assert!(matches!(err, BindingError::NotInitialized));
        assert!(binding.transport().sent().is_empty());
    }

    #[test]
    fn second_init_is_rejected_and_descriptor_kept() {
        let binding = ready_binding(
            RecordingTransport::replying(200, b""),
            Metadata::default().with("url", "http://first"),
        );
        let err = OutputBinding::init(&binding, &Metadata::default().with("url", "http://second"))
            .unwrap_err();
        assert!(matches!(err, BindingError::AlreadyInitialized));
        assert_eq!(binding.descriptor().unwrap().url, "http://first");
    }

    #[test]
    fn unsupported_operation_is_rejected_before_io() {
        let transport = RecordingTransport::replying(200, b"");
        let binding = ready_binding(transport.clone(), Metadata::default().with("url", "http://x"));
        let request = InvokeRequest {
            data: Vec::new(),
            operation: OperationKind::Delete,
        };
        let err = binding.invoke(request).unwrap_err();
        assert!(matches!(err, BindingError::UnsupportedOperation(OperationKind::Delete)));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn advertises_create_only() {
        let binding = HttpBinding::with_transport(RecordingTransport::replying(200, b""));
        assert_eq!(binding.operations(), vec![OperationKind::Create]);
        assert_eq!(
            serde_json::to_string(&binding.operations()).unwrap(),
            r#"["create"]"#
        );
    }

    #[test]
    fn custom_timeouts_flow_into_requests() {
        let transport = RecordingTransport::replying(200, b"");
        let binding = HttpBinding::with_transport(transport.clone()).with_timeouts(Timeouts {
            read: Duration::from_millis(250),
            invoke: Duration::from_millis(100),
        });
        OutputBinding::init(&binding, &Metadata::default().with("url", "http://x")).unwrap();
        binding.invoke(InvokeRequest::new("{}")).unwrap();
        binding.read(&mut |_| Ok(())).unwrap();
        let sent = transport.sent();
        assert_eq!(sent[0].timeout, Duration::from_millis(100));
        assert_eq!(sent[1].timeout, Duration::from_millis(250));
    }

    #[test]
    fn binding_is_shareable_across_threads() {
        fn assert_send_sync<B: Send + Sync>() {}
        assert_send_sync::<HttpBinding>();
    }
}
