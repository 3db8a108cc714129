//! HTTP binding: lets a host invoke a fixed HTTP endpoint as a one-shot
//! output ("invoke") or poll it as an input ("read").
//!
//! # Overview
//! The host hands over an untyped property bag once. `config` binds it to a
//! `ConnectionDescriptor` (URL, invoke method, optional basic-auth
//! credentials). Every later call builds an `HttpRequest` from that
//! descriptor, sends it through a `Transport`, and maps the `HttpResponse`
//! onto the binding contract.
//!
//! # Design
//! - `HttpBinding` holds the descriptor in a `OnceLock`: set once, then
//!   shared read-only by concurrent calls.
//! - Read always issues GET with a 60 s timeout; invoke uses the configured
//!   method, a JSON content type and a 5 s timeout.
//! - HTTP error statuses are reported as `status` metadata, never raised.
//! - Request building and response mapping are pure (`request`); only
//!   `transport` performs I/O, through one pooled `ureq::Agent`.

pub mod auth;
pub mod binding;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;

pub use binding::{
    HttpBinding, InputBinding, InvokeRequest, InvokeResponse, OperationKind, OutputBinding,
    ReadResponse,
};
pub use config::{ConnectionDescriptor, Credentials, Metadata, Timeouts};
pub use error::{BindingError, HandlerError};
pub use crate::http::{HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
