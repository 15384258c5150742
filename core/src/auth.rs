//! Credential state and HTTP Basic authentication.
//!
//! Two ways to configure credentials exist: a combined `"user, password"`
//! string and a separate username/password pair. A non-empty combined string
//! always wins, even when the pair is also set.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ApiError;
use crate::http::HttpRequest;

/// Separator between user and password in the combined form.
pub const COMBINED_SEPARATOR: &str = ", ";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Combined `"user, password"` string.
    pub auth: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn from_pair(username: &str, password: &str) -> Self {
        Self {
            auth: String::new(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn from_combined(auth: &str) -> Self {
        Self {
            auth: auth.to_string(),
            ..Self::default()
        }
    }

    /// Pick the (user, password) pair to send, or `None` for an anonymous
    /// request.
    ///
    /// The combined string must split on `", "` into exactly two parts.
    pub fn resolve(&self) -> Result<Option<(&str, &str)>, ApiError> {
        if !self.auth.is_empty() {
            let mut parts = self.auth.splitn(3, COMBINED_SEPARATOR);
            return match (parts.next(), parts.next(), parts.next()) {
                (Some(user), Some(password), None) => Ok(Some((user, password))),
                _ => Err(ApiError::MalformedCredentials),
            };
        }
        if !self.username.is_empty() && !self.password.is_empty() {
            return Ok(Some((self.username.as_str(), self.password.as_str())));
        }
        Ok(None)
    }

    /// Attach an `Authorization` header to `request` if credentials are
    /// present. Touches headers only.
    pub fn apply(&self, request: &mut HttpRequest) -> Result<(), ApiError> {
        if let Some((user, password)) = self.resolve()? {
            request.set_header("authorization", basic_auth_value(user, password));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("auth", &(!self.auth.is_empty()).then_some("<redacted>"))
            .field("username", &self.username)
            .field("password", &(!self.password.is_empty()).then_some("<redacted>"))
            .finish()
    }
}

pub fn basic_auth_value(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}
