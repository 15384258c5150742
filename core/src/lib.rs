//! Blocking client core for a Stable-Diffusion-WebUI style generation API.
//!
//! # Overview
//! Turns a logical GET or POST into an authenticated HTTP request, executes
//! it, and normalizes the outcome to `Result<Vec<u8>, ApiError>`. Building
//! endpoint payloads is left to callers; they pass a path and serialized
//! bytes and get raw response bytes back.
//!
//! # Design
//! - `http` builds plain-data `HttpRequest` values; `auth` adds the Basic
//!   header; `transport` does the I/O; `response` drains and checks the body.
//! - `Client` strings the stages together and holds config and credentials.
//! - Only status 200 is success. Anything else is `ApiError::Upstream` with
//!   the body text as its message.
//! - No retries and no timeouts beyond the HTTP stack's defaults.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod prompt;
pub mod response;
pub mod transport;

pub use auth::Credentials;
pub use client::Client;
pub use config::{Config, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest};
pub use prompt::build_prompt;
pub use transport::{RawResponse, Transport, UreqTransport};
