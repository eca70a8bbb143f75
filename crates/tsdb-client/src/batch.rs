// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batches of points destined for a single write call.
//!
//! A batch carries the target database and the precision shared by every
//! point in it. It is owned by the caller; [`crate::Client::write`] only
//! borrows it, so a batch can be retried or reused after any outcome.

use crate::error::{Error, Result};
use crate::point::{Point, Precision};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Write acknowledgement level requested from clustered servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consistency {
    Any,
    One,
    Quorum,
    All,
}

impl Consistency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Consistency::Any => "any",
            Consistency::One => "one",
            Consistency::Quorum => "quorum",
            Consistency::All => "all",
        }
    }
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Consistency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "any" => Ok(Consistency::Any),
            "one" => Ok(Consistency::One),
            "quorum" => Ok(Consistency::Quorum),
            "all" => Ok(Consistency::All),
            other => Err(Error::InvalidConfig(format!(
                "unknown write consistency '{}'",
                other
            ))),
        }
    }
}

/// Settings shared by every point of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Target database. Empty means the server's default database.
    #[serde(default)]
    pub database: String,
    /// Precision used to encode point timestamps.
    #[serde(default)]
    pub precision: Precision,
    /// Retention policy to write into.
    #[serde(default)]
    pub retention_policy: Option<String>,
    /// Requested write consistency.
    #[serde(default)]
    pub write_consistency: Option<Consistency>,
}

impl BatchConfig {
    /// Shorthand for a database and precision.
    pub fn new(database: impl Into<String>, precision: Precision) -> Self {
        Self {
            database: database.into(),
            precision,
            ..Default::default()
        }
    }

    /// Build from loosely-typed strings, rejecting unknown precisions.
    pub fn from_strs(database: &str, precision: &str) -> Result<Self> {
        Ok(Self::new(database, precision.parse()?))
    }

    pub fn retention_policy(mut self, rp: impl Into<String>) -> Self {
        self.retention_policy = Some(rp.into());
        self
    }

    pub fn write_consistency(mut self, consistency: Consistency) -> Self {
        self.write_consistency = Some(consistency);
        self
    }
}

/// An ordered group of points plus the settings for writing them.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPoints {
    config: BatchConfig,
    points: Vec<Point>,
}

impl BatchPoints {
    /// Create an empty batch.
    pub fn new(config: BatchConfig) -> Result<Self> {
        if let Some(rp) = &config.retention_policy {
            if rp.is_empty() {
                return Err(Error::InvalidConfig(
                    "retention policy must not be empty when set".into(),
                ));
            }
        }
        Ok(Self {
            config,
            points: Vec::new(),
        })
    }

    /// Append a point. No deduplication is performed.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Append several points, keeping their order.
    pub fn add_points(&mut self, points: impl IntoIterator<Item = Point>) {
        self.points.extend(points);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn database(&self) -> &str {
        &self.config.database
    }

    pub fn precision(&self) -> Precision {
        self.config.precision
    }

    pub fn retention_policy(&self) -> Option<&str> {
        self.config.retention_policy.as_deref()
    }

    pub fn write_consistency(&self) -> Option<Consistency> {
        self.config.write_consistency
    }

    /// Drop all points, keeping the settings.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
