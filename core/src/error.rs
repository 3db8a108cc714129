//! Error types for the HTTP binding.
//!
//! # Design
//! A non-2xx status from the remote endpoint is never an error here; it is
//! reported as `status` metadata on an otherwise successful call. Errors are
//! reserved for configuration problems, lifecycle misuse, requests that
//! cannot be built, transport failures and body read failures.

use std::io;

use crate::binding::OperationKind;

/// Boxed error returned by a read handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by `HttpBinding` operations.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// The property bag could not be interpreted as connection properties.
    #[error("invalid binding configuration: {0}")]
    Configuration(String),

    /// `init` was called on a binding that already holds a descriptor.
    #[error("binding is already initialized")]
    AlreadyInitialized,

    /// `read` or `invoke` was called before `init`.
    #[error("binding is not initialized")]
    NotInitialized,

    /// The configured method or URL cannot be used to build a request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The invoke operation is not one the binding advertises.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(OperationKind),

    /// Connection refused, DNS failure, TLS failure or timeout.
    #[error("transport error: {0}")]
    Transport(#[source] ureq::Error),

    /// The response body could not be fully read after headers arrived.
    #[error("failed to read response body: {0}")]
    Io(#[source] io::Error),

    /// The read handler rejected the delivered response.
    #[error("read handler failed: {0}")]
    Handler(#[source] HandlerError),
}

impl BindingError {
    /// True when the call failed because its timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        match self {
            BindingError::Transport(ureq::Error::Timeout(_)) => true,
            BindingError::Transport(ureq::Error::Io(e)) => e.kind() == io::ErrorKind::TimedOut,
            _ => false,
        }
    }

    /// Classify a failed body read. Timeouts while streaming the body are
    /// still transport failures.
    pub(crate) fn from_body_read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::TimedOut {
            BindingError::Transport(ureq::Error::Io(err))
        } else {
            BindingError::Io(err)
        }
    }
}
