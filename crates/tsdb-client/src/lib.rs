// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Time-series write/query client
//!
//! Writes batches of points to an HTTP time-series database in Line Protocol
//! and runs ad-hoc queries against it.
//!
//! This crate provides:
//! - A typed point model validated at construction
//! - Line Protocol encoding (and parsing)
//! - A blocking HTTP client with basic or token auth and a per-call timeout
//! - Query response decoding that keeps query-level errors as data
//! - TOML-based client configuration
//!
//! # Overview
//!
//! ```text
//! Point --> BatchPoints --> Client::write --> encode_batch --> POST /write
//! Query --> Client::query --> GET|POST /query --> decode_response --> Response
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tsdb_client::{BatchConfig, BatchPoints, Client, ClientConfig, Point, Precision, Query};
//!
//! let client = Client::new(ClientConfig::new("http://localhost:8086").with_env_credentials())?;
//!
//! let mut batch = BatchPoints::new(BatchConfig::new("BumbleBeeTuna", Precision::Seconds))?;
//! batch.add_point(
//!     Point::builder("cpu_usage")
//!         .tag("cpu", "cpu-total")
//!         .field("idle", 10.1)
//!         .field("system", 53.3)
//!         .timestamp(chrono::Utc::now())
//!         .build()?,
//! );
//! client.write(&batch)?;
//!
//! let response = client.query(&Query::new("SELECT count(idle) FROM cpu_usage", "BumbleBeeTuna"))?;
//! if let Some(err) = response.error() {
//!     eprintln!("query failed: {}", err);
//! }
//! # Ok::<(), tsdb_client::Error>(())
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod line_protocol;
pub mod point;
pub mod query;
pub mod response;

pub use batch::{BatchConfig, BatchPoints, Consistency};
pub use client::{Client, PingInfo};
pub use config::{Auth, ClientConfig};
pub use error::{Error, Result, TransportKind};
pub use line_protocol::{encode_batch, encode_point, parse_line, LineProtocolWriter, ParsedLine};
pub use point::{FieldValue, Fields, Point, PointBuilder, Precision, Tags};
pub use query::Query;
pub use response::{decode_response, Message, QueryResult, Response, Series};
