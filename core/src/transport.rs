//! Executing an `HttpRequest` against the network.
//!
//! # Design
//! `Transport` is the seam between the pure request pipeline and real I/O.
//! The default implementation drives a `ureq::Agent`; `UreqTransport::shared`
//! hands every client a clone of one process-wide agent so connections are
//! pooled across clients. Tests swap in in-memory transports.
//!
//! There is no per-call timeout beyond ureq's own defaults. Callers that need
//! a deadline wrap the call.

use std::fmt;
use std::io::{Cursor, Read};
use std::sync::OnceLock;

use ureq::Agent;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};

/// Status line and unread body of a response.
///
/// The body is owned so that whoever consumes the response also closes it
/// when the reader is dropped.
pub struct RawResponse {
    pub status: u16,
    pub body: Box<dyn Read + Send>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            body: Box::new(body),
        }
    }

    /// Response whose body is already in memory.
    pub fn from_bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, Cursor::new(body.into()))
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Sends one request and returns the response without reading its body.
///
/// Implementations must be safe to share between threads with many requests
/// in flight. Network failures are reported as `ApiError::Transport`; a
/// non-200 status is not a transport failure.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse, ApiError>;
}

static SHARED_AGENT: OnceLock<Agent> = OnceLock::new();

/// `Transport` backed by a blocking ureq agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Transport with its own agent and connection pool.
    pub fn new() -> Self {
        Self { agent: new_agent() }
    }

    /// Transport sharing the process-wide agent.
    pub fn shared() -> Self {
        Self {
            agent: SHARED_AGENT.get_or_init(new_agent).clone(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::shared()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

/// Status codes come back as data; the response validator decides what
/// counts as success.
fn new_agent() -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse, ApiError> {
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(request.body.as_deref().unwrap_or_default())
            }
        };
        let response = result.map_err(|e| ApiError::Transport(Box::new(e)))?;

        let status = response.status().as_u16();
        Ok(RawResponse::new(status, response.into_body().into_reader()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_get;

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let req = build_get(&format!("http://127.0.0.1:{port}"), "/sdapi/v1/options").unwrap();
        let err = UreqTransport::new().send(&req).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    }

    #[test]
    fn raw_response_from_bytes_reads_back() {
        let mut resp = RawResponse::from_bytes(200, "hello");
        let mut out = String::new();
        resp.body.read_to_string(&mut out).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(out, "hello");
    }
}
