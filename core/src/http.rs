//! Plain-data HTTP request types and the request builder.
//!
//! # Design
//! A request is described as data (`HttpRequest`) before it ever reaches the
//! network. The client builds one per call, the credential resolver adds its
//! header, and only then does a `Transport` execute it. Keeping this step pure
//! makes URL and header behavior testable without a server.
//!
//! The URL is `base_url + path` verbatim. No slash is added or removed, so
//! callers are expected to pass paths with a leading `/`. Nothing is
//! percent-encoded either: a path containing a space or another character
//! that is not valid in a URI is a `RequestConstruction` error, and callers
//! encode such paths themselves (`/a%20b`).

use ureq::http::Uri;

use crate::error::ApiError;

/// Media type attached to every POST body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Created per call by `build_get` / `build_post` and discarded once the
/// transport has executed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value));
    }
}

pub fn build_get(base_url: &str, path: &str) -> Result<HttpRequest, ApiError> {
    Ok(HttpRequest {
        method: HttpMethod::Get,
        url: join_url(base_url, path)?,
        headers: Vec::new(),
        body: None,
    })
}

/// Build a POST carrying `data` unmodified as a JSON-typed body.
pub fn build_post(base_url: &str, path: &str, data: &[u8]) -> Result<HttpRequest, ApiError> {
    Ok(HttpRequest {
        method: HttpMethod::Post,
        url: join_url(base_url, path)?,
        headers: vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())],
        body: Some(data.to_vec()),
    })
}

/// Concatenate and check that the result is an absolute URI the transport
/// can dial.
fn join_url(base_url: &str, path: &str) -> Result<String, ApiError> {
    let url = format!("{base_url}{path}");
    let uri: Uri = url
        .parse()
        .map_err(|e| ApiError::RequestConstruction(format!("invalid url {url:?}: {e}")))?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(ApiError::RequestConstruction(format!(
            "invalid url {url:?}: scheme and host are required"
        )));
    }
    Ok(url)
}
