//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! A single `FfiBindingResult` envelope carries every outcome: an error code
//! and message on failure, or the status line and owned response bytes on
//! success. Conversion helpers live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::{c_char, c_void};

use http_binding::{BindingError, HttpBinding};

/// Opaque handle to an `HttpBinding`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiHttpBinding {
    pub(crate) inner: HttpBinding,
}

/// Callback receiving the body of a read. `data` is valid only for the
/// duration of the call. Return 0 to accept, anything else to fail the read.
pub type FfiReadHandler = extern "C" fn(
    user_data: *mut c_void,
    data: *const u8,
    len: usize,
    status: *const c_char,
) -> i32;

/// Error codes returned in `FfiBindingResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Configuration = 1,
    AlreadyInitialized = 2,
    NotInitialized = 3,
    InvalidRequest = 4,
    UnsupportedOperation = 5,
    Transport = 6,
    Io = 7,
    Handler = 8,
    Panic = 9,
    NullArg = 10,
}

/// Result envelope for init, read and invoke.
///
/// On success `error_code` is `Ok` and `error_message` is null. `status` and
/// `status_code` describe the HTTP response when there was one; `data` points
/// to `data_len` owned bytes (null when empty).
/// On failure `error_code` describes the category and `error_message` is a
/// human-readable C string.
#[repr(C)]
pub struct FfiBindingResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub status_code: u16,
    pub status: *mut c_char,
    pub data: *mut u8,
    pub data_len: usize,
}

/// Numeric code at the start of a `"<code> <reason>"` status line.
pub(crate) fn status_code_of(status_line: &str) -> u16 {
    status_line
        .split(' ')
        .next()
        .and_then(|code| code.parse().ok())
        .unwrap_or(0)
}

fn c_string(s: &str) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

impl FfiBindingResult {
    fn empty(error_code: FfiErrorCode) -> Self {
        FfiBindingResult {
            error_code,
            error_message: std::ptr::null_mut(),
            status_code: 0,
            status: std::ptr::null_mut(),
            data: std::ptr::null_mut(),
            data_len: 0,
        }
    }

    /// Build a success result with no response attached (e.g. init).
    pub(crate) fn ok_empty() -> *mut Self {
        Box::into_raw(Box::new(Self::empty(FfiErrorCode::Ok)))
    }

    /// Build a success result carrying a status line and optional body.
    pub(crate) fn ok_response(status_line: Option<&str>, data: Option<Vec<u8>>) -> *mut Self {
        let mut result = Self::empty(FfiErrorCode::Ok);
        if let Some(line) = status_line {
            result.status_code = status_code_of(line);
            result.status = c_string(line);
        }
        if let Some(bytes) = data.filter(|b| !b.is_empty()) {
            result.data_len = bytes.len();
            result.data = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
        }
        Box::into_raw(Box::new(result))
    }

    /// Build an error result from a `BindingError`.
    pub(crate) fn from_error(err: BindingError) -> *mut Self {
        let error_code = match &err {
            BindingError::Configuration(_) => FfiErrorCode::Configuration,
            BindingError::AlreadyInitialized => FfiErrorCode::AlreadyInitialized,
            BindingError::NotInitialized => FfiErrorCode::NotInitialized,
            BindingError::InvalidRequest(_) => FfiErrorCode::InvalidRequest,
            BindingError::UnsupportedOperation(_) => FfiErrorCode::UnsupportedOperation,
            BindingError::Transport(_) => FfiErrorCode::Transport,
            BindingError::Io(_) => FfiErrorCode::Io,
            BindingError::Handler(_) => FfiErrorCode::Handler,
        };
        let mut result = Self::empty(error_code);
        result.error_message = c_string(&err.to_string());
        Box::into_raw(Box::new(result))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        let mut result = Self::empty(FfiErrorCode::NullArg);
        result.error_message = c_string(&format!("null argument: {name}"));
        Box::into_raw(Box::new(result))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        let mut result = Self::empty(FfiErrorCode::Panic);
        result.error_message = c_string(msg);
        Box::into_raw(Box::new(result))
    }
}
