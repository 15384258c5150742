//! C-ABI wrapper around `sdapi-core`.
//!
//! # Overview
//! Exposes the blocking client through `extern "C"` functions so any
//! language with a C FFI can issue authenticated GET/POST calls against the
//! generation API and get back raw response bytes or a categorized error.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `sdapi_get` / `sdapi_post` mirror `Client::get` / `Client::post` 1:1 and
//!   return a single `FfiResult` envelope.
//! - The C caller owns all returned pointers and must release them with the
//!   matching `sdapi_free_*` / `sdapi_client_free` function.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use sdapi_core::{build_prompt, Client, Config};

use types::*;

/// Borrow a C string as `&str`. `None` for null or non-UTF-8 input.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url`.
///
/// A null `base_url` selects the default (`http://127.0.0.1:7860`). Returns
/// null if `base_url` is not valid UTF-8 or if an internal panic occurs.
/// The caller must free the returned pointer with `sdapi_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn sdapi_client_new(base_url: *const c_char) -> *mut FfiClient {
    catch_unwind(AssertUnwindSafe(|| {
        let config = if base_url.is_null() {
            Config::default()
        } else {
            match unsafe { str_arg(base_url) } {
                Some(url) => Config::new(url),
                None => return std::ptr::null_mut(),
            }
        };
        Box::into_raw(Box::new(FfiClient {
            inner: Client::new(config),
        }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `sdapi_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn sdapi_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Set the username/password pair. Returns false on a null or non-UTF-8
/// argument.
#[unsafe(no_mangle)]
pub extern "C" fn sdapi_client_set_credentials(
    client: *const FfiClient,
    username: *const c_char,
    password: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        match unsafe { (str_arg(username), str_arg(password)) } {
            (Some(user), Some(pass)) => {
                client.inner.set_credentials(user, pass);
                true
            }
            _ => false,
        }
    }))
    .unwrap_or(false)
}

/// Set the combined `"username, password"` string. Returns false on a null
/// or non-UTF-8 argument.
#[unsafe(no_mangle)]
pub extern "C" fn sdapi_client_set_auth(client: *const FfiClient, auth: *const c_char) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        match unsafe { str_arg(auth) } {
            Some(auth) => {
                client.inner.set_auth(auth);
                true
            }
            None => false,
        }
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// GET `base_url + path`. Blocks until the body is read.
///
/// Never returns null. Free the result with `sdapi_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn sdapi_get(client: *const FfiClient, path: *const c_char) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        let Some(path) = (unsafe { str_arg(path) }) else {
            return FfiResult::null_arg("path");
        };
        let client = unsafe { &*client };
        match client.inner.get(path) {
            Ok(body) => FfiResult::ok(body),
            Err(e) => FfiResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiResult::panic("panic in sdapi_get"))
}

/// POST `len` bytes at `data` as `application/json` to `base_url + path`.
///
/// `data` may be null only when `len` is 0. Never returns null. Free the
/// result with `sdapi_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn sdapi_post(
    client: *const FfiClient,
    path: *const c_char,
    data: *const u8,
    len: usize,
) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        let Some(path) = (unsafe { str_arg(path) }) else {
            return FfiResult::null_arg("path");
        };
        let payload: &[u8] = if len == 0 {
            &[]
        } else if data.is_null() {
            return FfiResult::null_arg("data");
        } else {
            unsafe { std::slice::from_raw_parts(data, len) }
        };
        let client = unsafe { &*client };
        match client.inner.post(path, payload) {
            Ok(body) => FfiResult::ok(body),
            Err(e) => FfiResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiResult::panic("panic in sdapi_post"))
}

// ---------------------------------------------------------------------------
// Prompt helper
// ---------------------------------------------------------------------------

/// Join `len` C strings with `", "`.
///
/// Returns null if `parts` is null while `len > 0`, or if any part is null or
/// not UTF-8. Free the result with `sdapi_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn sdapi_build_prompt(parts: *const *const c_char, len: usize) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if len == 0 {
            return into_c_string(String::new());
        }
        if parts.is_null() {
            return std::ptr::null_mut();
        }
        let ptrs = unsafe { std::slice::from_raw_parts(parts, len) };
        let mut strs = Vec::with_capacity(len);
        for &ptr in ptrs {
            match unsafe { str_arg(ptr) } {
                Some(s) => strs.push(s),
                None => return std::ptr::null_mut(),
            }
        }
        into_c_string(build_prompt(&strs))
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a string returned by `sdapi_build_prompt`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn sdapi_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { CString::from_raw(s) });
        }));
    }
}

/// Free an `FfiResult` returned by `sdapi_get` / `sdapi_post`. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn sdapi_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.data.is_null() && result.data_len > 0 {
            let slice = std::ptr::slice_from_raw_parts_mut(result.data, result.data_len);
            drop(unsafe { Box::from_raw(slice) });
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: &FfiResult) -> String {
        unsafe { CStr::from_ptr(result.error_message) }
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn null_client_is_reported() {
        let path = CString::new("/x").unwrap();
        let result = sdapi_get(std::ptr::null(), path.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert!(message(r).contains("client"));
        assert!(r.data.is_null());
        sdapi_free_result(result);
    }

    #[test]
    fn null_path_is_reported() {
        let client = sdapi_client_new(std::ptr::null());
        assert!(!client.is_null());
        let result = sdapi_get(client, std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        sdapi_free_result(result);
        sdapi_client_free(client);
    }

    #[test]
    fn post_with_null_data_and_nonzero_len_is_reported() {
        let client = sdapi_client_new(std::ptr::null());
        let path = CString::new("/x").unwrap();
        let result = sdapi_post(client, path.as_ptr(), std::ptr::null(), 4);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert!(message(r).contains("data"));
        sdapi_free_result(result);
        sdapi_client_free(client);
    }

    #[test]
    fn malformed_combined_credentials_fail_before_sending() {
        let client = sdapi_client_new(std::ptr::null());
        let auth = CString::new("no-separator").unwrap();
        assert!(sdapi_client_set_auth(client, auth.as_ptr()));
        let path = CString::new("/sdapi/v1/options").unwrap();
        let result = sdapi_get(client, path.as_ptr());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::MalformedCredentials);
        sdapi_free_result(result);
        sdapi_client_free(client);
    }

    #[test]
    fn bad_base_url_is_request_construction() {
        let base = CString::new("not a url").unwrap();
        let client = sdapi_client_new(base.as_ptr());
        let path = CString::new("/x").unwrap();
        let result = sdapi_get(client, path.as_ptr());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::RequestConstruction);
        sdapi_free_result(result);
        sdapi_client_free(client);
    }

    #[test]
    fn set_credentials_rejects_nulls() {
        let client = sdapi_client_new(std::ptr::null());
        let user = CString::new("user").unwrap();
        assert!(!sdapi_client_set_credentials(client, user.as_ptr(), std::ptr::null()));
        assert!(!sdapi_client_set_credentials(std::ptr::null(), user.as_ptr(), user.as_ptr()));
        sdapi_client_free(client);
    }

    #[test]
    fn build_prompt_joins_parts() {
        let parts: Vec<CString> = ["a", "b", "c"].iter().map(|s| CString::new(*s).unwrap()).collect();
        let ptrs: Vec<*const c_char> = parts.iter().map(|s| s.as_ptr()).collect();
        let out = sdapi_build_prompt(ptrs.as_ptr(), ptrs.len());
        assert_eq!(unsafe { CStr::from_ptr(out) }.to_str().unwrap(), "a, b, c");
        sdapi_free_string(out);
    }

    #[test]
    fn build_prompt_rejects_null_part() {
        let a = CString::new("a").unwrap();
        let ptrs = [a.as_ptr(), std::ptr::null()];
        assert!(sdapi_build_prompt(ptrs.as_ptr(), 2).is_null());
    }

    #[test]
    fn into_c_string_replaces_interior_nul() {
        let ptr = into_c_string("a\0b".to_string());
        assert_eq!(unsafe { CStr::from_ptr(ptr) }.to_str().unwrap(), "a\u{fffd}b");
        sdapi_free_string(ptr);
    }

    #[test]
    fn free_functions_accept_null() {
        sdapi_free_result(std::ptr::null_mut());
        sdapi_free_string(std::ptr::null_mut());
        sdapi_client_free(std::ptr::null_mut());
    }
}
