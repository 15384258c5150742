//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! The C side sees an opaque client handle and one result envelope. Response
//! bodies are raw bytes, not C strings, because generation responses can
//! carry arbitrary data; the envelope hands over a pointer plus length.
//! Conversion helpers live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use sdapi_core::ApiError;

/// Opaque handle to a `Client`. C callers receive a pointer to this and pass
/// it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: sdapi_core::Client,
}

/// Error codes returned in `FfiResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    RequestConstruction = 1,
    Transport = 2,
    BodyRead = 3,
    Upstream = 4,
    MalformedCredentials = 5,
    Serialization = 6,
    Deserialization = 7,
    NullArg = 8,
    Panic = 9,
}

/// Result envelope for `sdapi_get` / `sdapi_post`.
///
/// On success `error_code` is `Ok`, `error_message` is null and
/// `data`/`data_len` hold the response body (`data` is null when the body is
/// empty). On failure `data` is null and `error_message` is a C string; for
/// `Upstream` errors it is the response body and `http_status` is set.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data: *mut u8,
    pub data_len: usize,
}

/// Convert to an owned C string. Interior NULs would truncate the string on
/// the C side, so they are replaced.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "\u{fffd}") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

impl FfiResult {
    fn boxed(result: FfiResult) -> *mut Self {
        Box::into_raw(Box::new(result))
    }

    /// Build a success result owning `body`.
    pub(crate) fn ok(body: Vec<u8>) -> *mut Self {
        let data_len = body.len();
        let data = if body.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(body.into_boxed_slice()) as *mut u8
        };
        Self::boxed(FfiResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 200,
            data,
            data_len,
        })
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (error_code, http_status) = match &err {
            ApiError::RequestConstruction(_) => (FfiErrorCode::RequestConstruction, 0),
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
            ApiError::BodyRead(_) => (FfiErrorCode::BodyRead, 0),
            ApiError::Upstream { status, .. } => (FfiErrorCode::Upstream, *status),
            ApiError::MalformedCredentials => (FfiErrorCode::MalformedCredentials, 0),
            ApiError::Serialization(_) => (FfiErrorCode::Serialization, 0),
            ApiError::Deserialization(_) => (FfiErrorCode::Deserialization, 0),
        };
        Self::failure(error_code, http_status, err.to_string())
    }

    /// Build an error result for a null or non-UTF-8 argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, 0, format!("null or invalid argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, 0, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Self::boxed(FfiResult {
            error_code,
            error_message: into_c_string(msg),
            http_status,
            data: std::ptr::null_mut(),
            data_len: 0,
        })
    }
}
