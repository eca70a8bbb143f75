// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client configuration.
//!
//! Supports both programmatic and file-based (TOML) configuration:
//!
//! ```toml
//! url = "http://localhost:8086"
//! timeout_ms = 5000
//!
//! [auth]
//! type = "basic"
//! username = "admin"
//! password = "secret"
//! ```
//!
//! A config is validated once, when the [`crate::Client`] is built, and is
//! immutable afterwards.

use crate::error::{Error, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the basic-auth username.
pub const ENV_USER: &str = "INFLUX_USER";
/// Environment variable holding the basic-auth password.
pub const ENV_PASSWORD: &str = "INFLUX_PWD";
/// Environment variable holding an API token.
pub const ENV_TOKEN: &str = "INFLUX_TOKEN";

/// Credentials attached to every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Auth {
    #[default]
    None,
    /// HTTP basic authentication.
    Basic { username: String, password: String },
    /// `Authorization: Token <token>` header.
    Token { token: String },
}

/// Connection settings for a [`crate::Client`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8086").
    pub url: String,

    /// Per-request timeout in milliseconds. None = no client-side bound.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept invalid TLS certificates (test setups only).
    #[serde(default)]
    pub insecure_skip_verify: bool,

    /// Credentials.
    #[serde(default)]
    pub auth: Auth,
}

fn default_user_agent() -> String {
    format!("tsdb-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8086")
    }
}

impl ClientConfig {
    /// Configuration for `url` with no credentials and no timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: None,
            user_agent: default_user_agent(),
            insecure_skip_verify: false,
            auth: Auth::None,
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Auth::Basic {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.auth = Auth::Token {
            token: token.into(),
        };
        self
    }

    /// Set the per-request timeout, rounded up to whole milliseconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }

    /// Fill credentials from `INFLUX_USER` / `INFLUX_PWD`, or `INFLUX_TOKEN`.
    ///
    /// Unset or empty variables leave the current credentials untouched.
    pub fn with_env_credentials(self) -> Self {
        self.with_credentials_from(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::with_env_credentials`] with a custom lookup.
    pub fn with_credentials_from<F>(self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(username) = non_empty(ENV_USER) {
            let password = lookup(ENV_PASSWORD).unwrap_or_default();
            return self.basic_auth(username, password);
        }
        if let Some(token) = non_empty(ENV_TOKEN) {
            return self.token(token);
        }
        self
    }

    /// Per-request timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Validate the configuration, returning the parsed base URL.
    pub fn validate(&self) -> Result<Url> {
        let url = Url::parse(&self.url)
            .map_err(|e| Error::InvalidConfig(format!("invalid URL '{}': {}", self.url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::InvalidConfig(format!(
                "unsupported URL scheme '{}' (expected http or https)",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(Error::InvalidConfig(format!(
                "URL '{}' has no host",
                self.url
            )));
        }
        if url.query().is_some() {
            return Err(Error::InvalidConfig(format!(
                "URL '{}' must not carry query parameters",
                self.url
            )));
        }
        if self.timeout_ms == Some(0) {
            return Err(Error::InvalidConfig("timeout must be non-zero".into()));
        }

        match &self.auth {
            Auth::Basic { username, .. } if username.is_empty() => {
                return Err(Error::InvalidConfig(
                    "basic auth requires a username".into(),
                ));
            }
            Auth::Token { token } if token.is_empty() => {
                return Err(Error::InvalidConfig("token auth requires a token".into()));
            }
            _ => {}
        }

        Ok(url)
    }
}
