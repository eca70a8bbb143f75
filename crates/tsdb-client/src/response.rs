// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Query response decoding.
//!
//! The server answers every query with a JSON envelope:
//! ```text
//! {"results":[{"statement_id":0,"series":[{"name":..,"columns":[..],"values":[[..]]}]}]}
//! ```
//! A result (or the envelope itself) may carry an `error` string when the
//! server executed the request but the query failed. Those errors are data:
//! decoding still succeeds and callers check [`Response::error`].

use crate::error::{Error, Result};
use crate::point::{FieldValue, Precision};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Decoded query response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// One entry per statement in the command.
    #[serde(default)]
    pub results: Vec<QueryResult>,
    /// Envelope-level error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub statement_id: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<Series>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A named table of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}

/// Informational message attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: String,
    pub text: String,
}

impl Response {
    /// The query-level error, if any.
    ///
    /// The envelope error takes precedence over the first per-statement
    /// error. Rows remain accessible either way.
    pub fn error(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or_else(|| self.results.iter().find_map(|r| r.error.as_deref()))
    }

    /// Turn a query-level error into [`Error::Query`].
    pub fn into_result(self) -> Result<Self> {
        match self.error() {
            Some(msg) => Err(Error::Query(msg.to_string())),
            None => Ok(self),
        }
    }

    /// Every series of every statement, in order.
    pub fn series(&self) -> impl Iterator<Item = &Series> {
        self.results.iter().flat_map(|r| r.series.iter())
    }
}

impl Series {
    /// Position of `column`, if present.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Raw cell at (`row`, `column`).
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.values.get(row)?.get(idx)
    }

    /// Cell converted to a [`FieldValue`]. Null and composite cells give `None`.
    pub fn field_value(&self, row: usize, column: &str) -> Option<FieldValue> {
        self.value(row, column).and_then(json_to_field_value)
    }

    /// The `time` cell of `row`.
    ///
    /// Handles both RFC3339 strings and integer epochs; `epoch` is the
    /// precision the query asked for (nanoseconds if unset).
    pub fn time(&self, row: usize, epoch: Option<Precision>) -> Option<DateTime<Utc>> {
        match self.value(row, "time")? {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            Value::Number(n) => epoch.unwrap_or_default().to_datetime(n.as_i64()?),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Decode a query response body.
///
/// Fails with [`Error::Decoding`] when the body is not JSON or is not a
/// response envelope.
pub fn decode_response(body: &[u8]) -> Result<Response> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::Decoding(format!("invalid JSON body: {}", e)))?;

    let is_envelope = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("results") || obj.contains_key("error"));
    if !is_envelope {
        return Err(Error::Decoding(
            "body is not a response envelope (no 'results' or 'error')".into(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| Error::Decoding(format!("unexpected response shape: {}", e)))
}

/// Pull the `error` string out of a JSON error body, if it has one.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

/// Convert a JSON cell to a FieldValue with type inference.
fn json_to_field_value(val: &Value) -> Option<FieldValue> {
    match val {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(FieldValue::Integer(i))
            } else {
                n.as_f64().map(FieldValue::Float)
            }
        }
        Value::String(s) => Some(FieldValue::String(s.clone())),
        Value::Bool(b) => Some(FieldValue::Boolean(*b)),
        Value::Null => None,
        // Arrays and objects are not valid field values
        _ => None,
    }
}
