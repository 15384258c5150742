//! Drive the C ABI end to end against the live mock server.

use std::ffi::{CStr, CString};

use mock_server::{DEFAULT_PASSWORD, DEFAULT_USER};
use sdapi_ffi::types::{FfiErrorCode, FfiResult};
use sdapi_ffi::*;

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn data(result: &FfiResult) -> Vec<u8> {
    if result.data.is_null() {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(result.data, result.data_len) }.to_vec()
}

fn message(result: &FfiResult) -> String {
    unsafe { CStr::from_ptr(result.error_message) }
        .to_string_lossy()
        .into_owned()
}

#[test]
fn get_and_post_through_c_abi() {
    let base = CString::new(start_server()).unwrap();
    let client = sdapi_client_new(base.as_ptr());
    assert!(!client.is_null());

    // Unauthenticated call to the protected route.
    let protected = CString::new("/protected").unwrap();
    let result = sdapi_get(client, protected.as_ptr());
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Upstream);
    assert_eq!(r.http_status, 401);
    assert_eq!(message(r), "unauthorized");
    sdapi_free_result(result);

    // Same call with credentials.
    let user = CString::new(DEFAULT_USER).unwrap();
    let pass = CString::new(DEFAULT_PASSWORD).unwrap();
    assert!(sdapi_client_set_credentials(client, user.as_ptr(), pass.as_ptr()));
    let result = sdapi_get(client, protected.as_ptr());
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    assert!(r.error_message.is_null());
    assert_eq!(data(r), b"ok");
    sdapi_free_result(result);

    // POST body arrives untouched.
    let echo = CString::new("/echo/sdapi/v1/txt2img").unwrap();
    let payload = br#"{"prompt":"a, b, c"}"#;
    let result = sdapi_post(client, echo.as_ptr(), payload.as_ptr(), payload.len());
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    let seen: mock_server::Echo = serde_json::from_slice(&data(r)).unwrap();
    assert_eq!(seen.body.as_bytes(), &payload[..]);
    assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    sdapi_free_result(result);

    // 404 keeps the body as the message.
    let missing = CString::new("/nope").unwrap();
    let result = sdapi_get(client, missing.as_ptr());
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Upstream);
    assert_eq!(r.http_status, 404);
    assert_eq!(message(r), "not found");
    sdapi_free_result(result);

    sdapi_client_free(client);
}

#[test]
fn unreachable_server_is_transport_error() {
    let base = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        CString::new(format!("http://{}", listener.local_addr().unwrap())).unwrap()
    };
    let client = sdapi_client_new(base.as_ptr());
    let path = CString::new("/sdapi/v1/options").unwrap();
    let result = sdapi_get(client, path.as_ptr());
    assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Transport);
    sdapi_free_result(result);
    sdapi_client_free(client);
}
