// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Query requests.

use crate::point::Precision;
use serde_json::{Map, Value};

/// Statements the server accepts over GET.
const READ_ONLY_KEYWORDS: &[&str] = &["SELECT", "SHOW", "EXPLAIN"];

/// An ad-hoc command sent to the `/query` endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Command text, possibly several `;`-separated statements.
    pub command: String,
    /// Target database. Empty for server-level commands.
    pub database: String,
    /// Return integer epochs in this precision instead of RFC3339 strings.
    pub precision: Option<Precision>,
    pub retention_policy: Option<String>,
    /// Bound parameters referenced as `$name` in the command.
    pub parameters: Map<String, Value>,
}

impl Query {
    pub fn new(command: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            database: database.into(),
            ..Default::default()
        }
    }

    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn retention_policy(mut self, rp: impl Into<String>) -> Self {
        self.retention_policy = Some(rp.into());
        self
    }

    /// Bind `$name` to `value`.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// True when every statement only reads data.
    ///
    /// `SELECT ... INTO` writes its results and is not read-only. Statements
    /// are split on `;` without regard to quoting, so a `;` inside a string
    /// literal only ever makes this more conservative.
    pub fn is_read_only(&self) -> bool {
        let mut statements = self
            .command
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .peekable();
        if statements.peek().is_none() {
            return false;
        }
        statements.all(|stmt| {
            let keyword = stmt.split_whitespace().next().unwrap_or_default();
            READ_ONLY_KEYWORDS
                .iter()
                .any(|k| k.eq_ignore_ascii_case(keyword))
                && !has_keyword(stmt, "INTO")
        })
    }
}

/// True when `keyword` appears as a bare word outside `'...'` and `"..."`.
fn has_keyword(stmt: &str, keyword: &str) -> bool {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut word = String::new();

    for c in stmt.chars().chain(std::iter::once(' ')) {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '_' {
            word.push(c);
            continue;
        }
        if word.eq_ignore_ascii_case(keyword) {
            return true;
        }
        word.clear();
        if c == '\'' || c == '"' {
            quote = Some(c);
        }
    }
    false
}

/// Quote an identifier for use in a command (`"name"`).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}
