// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Blocking HTTP transport.
//!
//! Connects configuration, line protocol encoding and response decoding
//! into a single entry point. Each call is one blocking round trip; there
//! is no background thread, queue or retry.

use crate::batch::BatchPoints;
use crate::config::{Auth, ClientConfig};
use crate::error::{Error, Result};
use crate::line_protocol::encode_batch;
use crate::query::{quote_ident, Query};
use crate::response::{decode_response, error_message, Response};
use reqwest::blocking::{RequestBuilder, Response as HttpResponse};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use std::time::{Duration, Instant};

/// Header carrying the server version on every reply.
pub const VERSION_HEADER: &str = "X-Influxdb-Version";

/// Result of a successful [`Client::ping`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingInfo {
    /// Round-trip time of the ping request.
    pub rtt: Duration,
    /// Server version, when the server reports one.
    pub version: Option<String>,
}

/// Write/query client.
///
/// Holds only immutable configuration and a pooled HTTP client, so a single
/// instance can be shared between threads and used concurrently.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    base: Url,
    http: reqwest::blocking::Client,
}

impl Client {
    /// Validate `config` and build the client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base = config.validate()?;

        let http = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("cannot build HTTP client: {}", e)))?;

        tracing::debug!(
            "client for {} (timeout: {:?})",
            base,
            config.request_timeout()
        );

        Ok(Self { config, base, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Write every point of `batch`.
    ///
    /// An empty batch is a no-op. The batch is only borrowed and is left
    /// untouched whatever the outcome.
    pub fn write(&self, batch: &BatchPoints) -> Result<()> {
        if batch.is_empty() {
            tracing::debug!("skipping write of empty batch to '{}'", batch.database());
            return Ok(());
        }

        let body = encode_batch(batch)?;

        let mut url = self.endpoint("write")?;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("db", batch.database());
            params.append_pair("precision", batch.precision().as_str());
            if let Some(rp) = batch.retention_policy() {
                params.append_pair("rp", rp);
            }
            if let Some(consistency) = batch.write_consistency() {
                params.append_pair("consistency", consistency.as_str());
            }
        }

        let started = Instant::now();
        let bytes = body.len();
        let resp = self
            .authorize(self.http.post(url))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()?;

        if !resp.status().is_success() {
            return Err(server_error(resp));
        }

        tracing::debug!(
            "wrote {} points ({} bytes) to '{}' in {:?}",
            batch.len(),
            bytes,
            batch.database(),
            started.elapsed()
        );
        Ok(())
    }

    /// Run `query`.
    ///
    /// Transport and HTTP-level failures are returned as errors. When the
    /// server executed the request but the query itself failed, the call
    /// succeeds and the failure is reported by [`Response::error`].
    pub fn query(&self, query: &Query) -> Result<Response> {
        let mut url = self.endpoint("query")?;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("q", &query.command);
            params.append_pair("db", &query.database);
            if let Some(precision) = query.precision {
                params.append_pair("epoch", precision.as_str());
            }
            if let Some(rp) = &query.retention_policy {
                params.append_pair("rp", rp);
            }
            if !query.parameters.is_empty() {
                let encoded = serde_json::to_string(&query.parameters)
                    .map_err(|e| Error::Encoding(format!("query parameters: {}", e)))?;
                params.append_pair("params", &encoded);
            }
        }

        let request = if query.is_read_only() {
            self.http.get(url)
        } else {
            self.http.post(url)
        };

        let started = Instant::now();
        let resp = self.authorize(request).send()?;
        if !resp.status().is_success() {
            return Err(server_error(resp));
        }

        let body = resp.bytes()?;
        let response = decode_response(&body)?;

        match response.error() {
            Some(err) => tracing::debug!("query failed on server: {}", err),
            None => tracing::debug!(
                "query returned {} result(s) in {:?}",
                response.results.len(),
                started.elapsed()
            ),
        }
        Ok(response)
    }

    /// Create `name`, turning a query-level failure into [`Error::Query`].
    pub fn create_database(&self, name: &str) -> Result<Response> {
        if name.is_empty() {
            return Err(Error::InvalidConfig("database name is empty".into()));
        }
        let command = format!("CREATE DATABASE {}", quote_ident(name));
        self.query(&Query::new(command, ""))?.into_result()
    }

    /// Check that the server is up, returning its round-trip time and version.
    ///
    /// `timeout` overrides the configured timeout for this call only.
    pub fn ping(&self, timeout: Option<Duration>) -> Result<PingInfo> {
        let url = self.endpoint("ping")?;
        let mut request = self.authorize(self.http.get(url));
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let started = Instant::now();
        let resp = request.send()?;
        let rtt = started.elapsed();
        if !resp.status().is_success() {
            return Err(server_error(resp));
        }

        let version = resp
            .headers()
            .get(VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(PingInfo { rtt, version })
    }

    /// `{base}/{segment}`, keeping any path prefix of the base URL.
    fn endpoint(&self, segment: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidConfig(format!("URL '{}' cannot be a base", self.base)))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth {
            Auth::None => request,
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::Token { token } => request.header(AUTHORIZATION, format!("Token {}", token)),
        }
    }
}

/// Build a [`Error::Server`] from a non-2xx reply.
///
/// The message is the `error` field of a JSON body, else the trimmed body,
/// else the status reason phrase.
fn server_error(resp: HttpResponse) -> Error {
    let status = resp.status();
    let body = match resp.bytes() {
        Ok(body) => body,
        Err(e) => return Error::from(e),
    };

    let message = error_message(&body)
        .unwrap_or_else(|| String::from_utf8_lossy(&body).trim().to_string());
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("unknown status").to_string()
    } else {
        message
    };

    tracing::warn!("server rejected request with {}: {}", status, message);
    Error::Server {
        status: status.as_u16(),
        message,
    }
}
