//! C-ABI wrapper around `http-binding`.
//!
//! # Overview
//! Exposes the binding contract (init, read, invoke, operations) through
//! `extern "C"` functions so a host runtime written in any language with a
//! C FFI can load the binding as a plugin.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - The property bag crosses the boundary as a JSON object string.
//! - A single `FfiBindingResult` envelope conveys success payloads and
//!   errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `http_binding_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};

use http_binding::{
    BindingError, HttpBinding, InputBinding, InvokeRequest, Metadata, OutputBinding,
};

use types::*;

// ---------------------------------------------------------------------------
// Binding lifecycle
// ---------------------------------------------------------------------------

/// Create a new, uninitialized binding.
///
/// Returns null if an internal panic occurs.
/// The caller must free the returned pointer with `http_binding_free`.
#[unsafe(no_mangle)]
pub extern "C" fn http_binding_new() -> *mut FfiHttpBinding {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiHttpBinding {
            inner: HttpBinding::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a binding created by `http_binding_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_binding_free(binding: *mut FfiHttpBinding) {
    if !binding.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(binding) });
        }));
    }
}

/// Bind the property bag, given as a JSON object, to `binding`.
///
/// Nested values such as a `credentials` object are accepted. Fails with
/// `AlreadyInitialized` on a second call.
#[unsafe(no_mangle)]
pub extern "C" fn http_binding_init(
    binding: *const FfiHttpBinding,
    properties_json: *const c_char,
) -> *mut FfiBindingResult {
    catch_unwind(AssertUnwindSafe(|| {
        if binding.is_null() {
            return FfiBindingResult::null_arg("binding");
        }
        if properties_json.is_null() {
            return FfiBindingResult::null_arg("properties_json");
        }
        let binding = unsafe { &*binding };
        let raw = match unsafe { CStr::from_ptr(properties_json) }.to_str() {
            Ok(raw) => raw,
            Err(e) => {
                return FfiBindingResult::from_error(BindingError::Configuration(format!(
                    "properties are not valid UTF-8: {e}"
                )))
            }
        };
        let result = Metadata::from_json(raw)
            .and_then(|metadata| OutputBinding::init(&binding.inner, &metadata));
        match result {
            Ok(()) => FfiBindingResult::ok_empty(),
            Err(e) => FfiBindingResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiBindingResult::panic("panic in http_binding_init"))
}

/// Supported invoke operations as a JSON array string, e.g. `["create"]`.
///
/// Returns null if `binding` is null. Free with `http_binding_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn http_binding_operations(binding: *const FfiHttpBinding) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if binding.is_null() {
            return std::ptr::null_mut();
        }
        let binding = unsafe { &*binding };
        match serde_json::to_string(&binding.inner.operations()) {
            Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Fetch the configured URL with GET and pass the body to `handler` once.
///
/// `user_data` is handed back to `handler` untouched. A non-zero return from
/// `handler` fails the read with `Handler`. On success the result carries the
/// status line but no data; the data went to the handler.
#[unsafe(no_mangle)]
pub extern "C" fn http_binding_read(
    binding: *const FfiHttpBinding,
    handler: Option<FfiReadHandler>,
    user_data: *mut c_void,
) -> *mut FfiBindingResult {
    catch_unwind(AssertUnwindSafe(|| {
        if binding.is_null() {
            return FfiBindingResult::null_arg("binding");
        }
        let Some(handler) = handler else {
            return FfiBindingResult::null_arg("handler");
        };
        let binding = unsafe { &*binding };

        let mut status_line = None;
        let result = binding.inner.read(&mut |resp| {
            let status = resp.metadata.get("status").cloned().unwrap_or_default();
            let c_status = CString::new(status.as_str()).unwrap_or_default();
            let code = handler(user_data, resp.data.as_ptr(), resp.data.len(), c_status.as_ptr());
            status_line = Some(status);
            if code == 0 {
                Ok(())
            } else {
                Err(format!("handler returned {code}").into())
            }
        });
        match result {
            Ok(()) => FfiBindingResult::ok_response(status_line.as_deref(), None),
            Err(e) => FfiBindingResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiBindingResult::panic("panic in http_binding_read"))
}

/// Send `len` bytes at `data` with the configured method.
///
/// `data` may be null only when `len` is 0. Non-2xx responses are successes;
/// inspect `status_code`.
#[unsafe(no_mangle)]
pub extern "C" fn http_binding_invoke(
    binding: *const FfiHttpBinding,
    data: *const u8,
    len: usize,
) -> *mut FfiBindingResult {
    catch_unwind(AssertUnwindSafe(|| {
        if binding.is_null() {
            return FfiBindingResult::null_arg("binding");
        }
        if data.is_null() && len > 0 {
            return FfiBindingResult::null_arg("data");
        }
        let binding = unsafe { &*binding };
        let payload = if len == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(data, len) }.to_vec()
        };
        match binding.inner.invoke(InvokeRequest::new(payload)) {
            Ok(resp) => FfiBindingResult::ok_response(
                resp.metadata.get("status").map(String::as_str),
                resp.data,
            ),
            Err(e) => FfiBindingResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiBindingResult::panic("panic in http_binding_invoke"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiBindingResult` returned by any binding function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_binding_free_result(result: *mut FfiBindingResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.status.is_null() {
            drop(unsafe { CString::from_raw(result.status) });
        }
        if !result.data.is_null() {
            drop(unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(result.data, result.data_len))
            });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_binding_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
