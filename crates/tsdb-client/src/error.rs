// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client error taxonomy.
//!
//! Every error is scoped to the call that produced it; the client never
//! retries or swallows one. Query-level failures reported by a server that
//! executed the request are carried inside [`crate::Response`] instead and
//! only become [`Error::Query`] through the explicit opt-in helpers.

use std::fmt;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Sub-kind of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The configured timeout expired before the round trip completed.
    Timeout,
    /// The server could not be reached.
    Connect,
    /// Any other failure while sending the request or reading the reply.
    Request,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Timeout => write!(f, "timeout"),
            TransportKind::Connect => write!(f, "connect"),
            TransportKind::Request => write!(f, "request"),
        }
    }
}

/// Errors returned by the client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid point: {0}")]
    InvalidPoint(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("transport error ({kind}): {source}")]
    Transport {
        kind: TransportKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// True when the call failed because the configured timeout expired.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Transport {
                kind: TransportKind::Timeout,
                ..
            }
        )
    }

    /// HTTP status of a server rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportKind::Timeout
        } else if e.is_connect() {
            TransportKind::Connect
        } else {
            TransportKind::Request
        };
        Error::Transport { kind, source: e }
    }
}
