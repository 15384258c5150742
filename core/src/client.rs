//! Blocking client for the generation-service API.
//!
//! # Design
//! `Client` owns the base URL, the credential state and a `Transport`. Every
//! call runs the same pipeline: build an `HttpRequest`, let the credentials
//! add their header, send it, then drain and check the response. Nothing is
//! retried; every failure is returned to the caller as an `ApiError`.
//!
//! Credentials sit behind an `RwLock` so they can be changed while other
//! threads have calls in flight. Each call snapshots them when it builds its
//! request.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::Credentials;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{build_get, build_post, HttpRequest};
use crate::response::validate;
use crate::transport::{Transport, UreqTransport};

/// Synchronous client for the generation-service API.
///
/// Cheap to share: wrap it in an `Arc` and call `get` / `post` from as many
/// threads as needed.
pub struct Client {
    config: Config,
    credentials: RwLock<Credentials>,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Client using the process-wide shared ureq agent.
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, Arc::new(UreqTransport::shared()))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: config.with_defaults(),
            credentials: RwLock::new(Credentials::default()),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Set the username and password pair.
    ///
    /// A combined string set through `set_auth` is left in place and keeps
    /// taking precedence.
    pub fn set_credentials(&self, username: &str, password: &str) {
        let mut creds = self.credentials.write().unwrap_or_else(PoisonError::into_inner);
        creds.username = username.to_string();
        creds.password = password.to_string();
    }

    /// Set the combined `"username, password"` string. Pass `""` to clear it.
    pub fn set_auth(&self, auth: &str) {
        let mut creds = self.credentials.write().unwrap_or_else(PoisonError::into_inner);
        creds.auth = auth.to_string();
    }

    /// Copy of the current credential state.
    pub fn credentials(&self) -> Credentials {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// GET `base_url + path` and return the raw body of a 200 response.
    pub fn get(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let request = build_get(&self.config.base_url, path)?;
        self.execute(request)
    }

    /// POST `data` as `application/json` to `base_url + path` and return the
    /// raw body of a 200 response. `data` is sent unmodified.
    pub fn post(&self, path: &str, data: &[u8]) -> Result<Vec<u8>, ApiError> {
        let request = build_post(&self.config.base_url, path, data)?;
        self.execute(request)
    }

    /// `get`, then decode the body as JSON.
    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.get(path)?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Encode `input` as JSON, `post` it, then decode the body as JSON.
    pub fn post_json<B, T>(&self, path: &str, input: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let data = serde_json::to_vec(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let body = self.post(path, &data)?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    fn execute(&self, mut request: HttpRequest) -> Result<Vec<u8>, ApiError> {
        self.credentials().apply(&mut request)?;

        debug!(
            method = request.method.as_str(),
            url = %request.url,
            authenticated = request.header("authorization").is_some(),
            "sending request"
        );

        let response = self.transport.send(&request).inspect_err(|e| {
            warn!(method = request.method.as_str(), url = %request.url, error = %e, "transport failure");
        })?;

        let status = response.status;
        match validate(response) {
            Ok(body) => {
                debug!(status, len = body.len(), "received response");
                Ok(body)
            }
            Err(ApiError::Upstream { status, body }) => {
                warn!(status, url = %request.url, body_len = body.len(), "request failed");
                Err(ApiError::Upstream { status, body })
            }
            Err(e) => {
                warn!(status, url = %request.url, error = %e, "request failed");
                Err(e)
            }
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("credentials", &self.credentials())
            .finish_non_exhaustive()
    }
}
