// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Points, field values and timestamp precision.
//!
//! A [`Point`] is one timestamped measurement:
//! ```text
//! measurement + tags (string -> string) + fields (string -> FieldValue) + time
//! ```
//! Tags and fields are kept in ordered maps so every encoding of the same
//! point is byte-identical.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tag set of a point, sorted by key.
pub type Tags = BTreeMap<String, String>;

/// Field set of a point, sorted by key.
pub type Fields = BTreeMap<String, FieldValue>;

/// A value that can be stored in a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit floating point.
    Float(f64),
    /// 64-bit signed integer.
    Integer(i64),
    /// UTF-8 string.
    String(String),
    /// Boolean value.
    Boolean(bool),
}

impl FieldValue {
    /// Name of the variant, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Float(_) => "float",
            FieldValue::Integer(_) => "integer",
            FieldValue::String(_) => "string",
            FieldValue::Boolean(_) => "boolean",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::String(v) => write!(f, "{}", v),
            FieldValue::Boolean(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(f64::from(v))
    }
}

macro_rules! integer_field_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    FieldValue::Integer(i64::from(v))
                }
            }
        )*
    };
}

integer_field_from!(i8, i16, i32, i64, u8, u16, u32);

impl TryFrom<u64> for FieldValue {
    type Error = Error;

    fn try_from(v: u64) -> Result<Self> {
        i64::try_from(v)
            .map(FieldValue::Integer)
            .map_err(|_| Error::InvalidPoint(format!("integer field {} exceeds i64::MAX", v)))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

/// Time unit used to encode and interpret timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Precision {
    #[default]
    #[serde(rename = "ns")]
    Nanoseconds,
    #[serde(rename = "us", alias = "u")]
    Microseconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "m")]
    Minutes,
    #[serde(rename = "h")]
    Hours,
}

impl Precision {
    /// Wire representation (`precision` / `epoch` parameter).
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Nanoseconds => "ns",
            Precision::Microseconds => "us",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
            Precision::Minutes => "m",
            Precision::Hours => "h",
        }
    }

    /// Number of nanoseconds in one unit.
    pub fn nanos_per_unit(&self) -> i64 {
        match self {
            Precision::Nanoseconds => 1,
            Precision::Microseconds => 1_000,
            Precision::Milliseconds => 1_000_000,
            Precision::Seconds => 1_000_000_000,
            Precision::Minutes => 60 * 1_000_000_000,
            Precision::Hours => 3_600 * 1_000_000_000,
        }
    }

    /// Express `time` as an integer count of this unit since the Unix epoch.
    ///
    /// Sub-unit remainders are truncated towards negative infinity. Returns
    /// `None` when the value does not fit in an `i64`.
    pub fn timestamp(&self, time: &DateTime<Utc>) -> Option<i64> {
        let unit = i128::from(self.nanos_per_unit());
        let nanos = i128::from(time.timestamp()) * 1_000_000_000
            + i128::from(time.timestamp_subsec_nanos());
        i64::try_from(nanos.div_euclid(unit)).ok()
    }

    /// Inverse of [`Precision::timestamp`].
    pub fn to_datetime(&self, value: i64) -> Option<DateTime<Utc>> {
        let nanos = i128::from(value) * i128::from(self.nanos_per_unit());
        let secs = i64::try_from(nanos.div_euclid(1_000_000_000)).ok()?;
        let subsec = u32::try_from(nanos.rem_euclid(1_000_000_000)).ok()?;
        DateTime::<Utc>::from_timestamp(secs, subsec)
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "n" | "ns" => Ok(Precision::Nanoseconds),
            "u" | "us" | "µs" => Ok(Precision::Microseconds),
            "ms" => Ok(Precision::Milliseconds),
            "s" => Ok(Precision::Seconds),
            "m" => Ok(Precision::Minutes),
            "h" => Ok(Precision::Hours),
            other => Err(Error::InvalidConfig(format!(
                "unknown precision '{}' (expected ns, us, ms, s, m or h)",
                other
            ))),
        }
    }
}

/// A single timestamped measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    tags: Tags,
    fields: Fields,
    time: Option<DateTime<Utc>>,
}

impl Point {
    /// Create a point.
    ///
    /// Fails with [`Error::InvalidPoint`] when `measurement` is empty or
    /// `fields` is empty. A `None` timestamp is left unset on the wire and
    /// the server assigns its receipt time.
    pub fn new(
        measurement: impl Into<String>,
        tags: Tags,
        fields: Fields,
        time: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let measurement = measurement.into();
        if measurement.is_empty() {
            return Err(Error::InvalidPoint("measurement name is empty".into()));
        }
        if fields.is_empty() {
            return Err(Error::InvalidPoint(format!(
                "point '{}' has no fields",
                measurement
            )));
        }
        Ok(Self {
            measurement,
            tags,
            fields,
            time,
        })
    }

    /// Create a point stamped with the current time.
    pub fn now(measurement: impl Into<String>, tags: Tags, fields: Fields) -> Result<Self> {
        Self::new(measurement, tags, fields, Some(Utc::now()))
    }

    /// Start building a point for `measurement`.
    pub fn builder(measurement: impl Into<String>) -> PointBuilder {
        PointBuilder {
            measurement: measurement.into(),
            tags: Tags::new(),
            fields: Fields::new(),
            time: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    /// Timestamp in nanoseconds since the Unix epoch, if set and in range.
    pub fn unix_nano(&self) -> Option<i64> {
        self.precision_timestamp(Precision::Nanoseconds)
    }

    /// Timestamp expressed in `precision`, if set and in range.
    pub fn precision_timestamp(&self, precision: Precision) -> Option<i64> {
        self.time.as_ref().and_then(|t| precision.timestamp(t))
    }
}

/// Incremental constructor for [`Point`].
#[derive(Debug, Clone)]
pub struct PointBuilder {
    measurement: String,
    tags: Tags,
    fields: Fields,
    time: Option<DateTime<Utc>>,
}

impl PointBuilder {
    /// Add or replace a tag.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add or replace a field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn timestamp(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Validate and produce the point.
    pub fn build(self) -> Result<Point> {
        Point::new(self.measurement, self.tags, self.fields, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn one_field() -> Fields {
        let mut fields = Fields::new();
        fields.insert("value".to_string(), FieldValue::Float(1.0));
        fields
    }

    #[test]
    fn test_point_requires_name() {
        let err = Point::new("", Tags::new(), one_field(), None).unwrap_err();
        assert!(matches!(err, Error::InvalidPoint(_)));
    }

    #[test]
    fn test_point_requires_fields() {
        let err = Point::new("cpu", Tags::new(), Fields::new(), None).unwrap_err();
        match err {
            Error::InvalidPoint(msg) => assert!(msg.contains("cpu")),
            other => panic!("expected InvalidPoint, got: {}", other),
        }
    }

    #[test]
    fn test_point_valid_iff_name_and_fields() {
        let names = ["", "cpu"];
        let field_sets = [Fields::new(), one_field()];
        for name in names {
            for fields in &field_sets {
                let ok = Point::new(name, Tags::new(), fields.clone(), None).is_ok();
                assert_eq!(ok, !name.is_empty() && !fields.is_empty());
            }
        }
    }

    #[test]
    fn test_point_now_captures_time() {
        let before = Utc::now();
        let point = Point::now("cpu", Tags::new(), one_field()).expect("point");
        let t = point.time().expect("timestamp set");
        assert!(t >= before);
        assert!(t <= Utc::now());
    }

    #[test]
    fn test_builder_collects_tags_and_fields() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let point = Point::builder("cpu_usage")
            .tag("host", "h1")
            .tag("cpu", "cpu-total")
            .field("idle", 10.1)
            .field("count", 3)
            .field("label", "busy")
            .field("ok", true)
            .timestamp(ts)
            .build()
            .expect("build");

        assert_eq!(point.name(), "cpu_usage");
        let keys: Vec<_> = point.tags().keys().cloned().collect();
        assert_eq!(keys, vec!["cpu", "host"]);
        assert_eq!(point.fields()["idle"], FieldValue::Float(10.1));
        assert_eq!(point.fields()["count"], FieldValue::Integer(3));
        assert_eq!(point.fields()["label"], FieldValue::String("busy".into()));
        assert_eq!(point.fields()["ok"], FieldValue::Boolean(true));
        assert_eq!(point.time(), Some(ts));
    }

    #[test]
    fn test_builder_without_fields_fails() {
        assert!(Point::builder("cpu").tag("a", "b").build().is_err());
    }

    #[test]
    fn test_u64_field_out_of_range() {
        assert!(FieldValue::try_from(u64::MAX).is_err());
        assert_eq!(
            FieldValue::try_from(7u64).expect("fits"),
            FieldValue::Integer(7)
        );
    }

    #[test]
    fn test_precision_parse() {
        assert_eq!("ns".parse::<Precision>().unwrap(), Precision::Nanoseconds);
        assert_eq!("u".parse::<Precision>().unwrap(), Precision::Microseconds);
        assert_eq!("us".parse::<Precision>().unwrap(), Precision::Microseconds);
        assert_eq!("ms".parse::<Precision>().unwrap(), Precision::Milliseconds);
        assert_eq!("s".parse::<Precision>().unwrap(), Precision::Seconds);
        assert_eq!("h".parse::<Precision>().unwrap(), Precision::Hours);
        assert!("weeks".parse::<Precision>().is_err());
    }

    #[test]
    fn test_precision_timestamp_truncates() {
        let ts = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        assert_eq!(
            Precision::Nanoseconds.timestamp(&ts),
            Some(1_700_000_000_123_456_789)
        );
        assert_eq!(
            Precision::Microseconds.timestamp(&ts),
            Some(1_700_000_000_123_456)
        );
        assert_eq!(
            Precision::Milliseconds.timestamp(&ts),
            Some(1_700_000_000_123)
        );
        assert_eq!(Precision::Seconds.timestamp(&ts), Some(1_700_000_000));
    }

    #[test]
    fn test_precision_negative_timestamp() {
        let ts = Utc.timestamp_opt(-1, 500_000_000).unwrap();
        assert_eq!(Precision::Seconds.timestamp(&ts), Some(-1));
        assert_eq!(Precision::Milliseconds.timestamp(&ts), Some(-500));
    }

    #[test]
    fn test_precision_to_datetime() {
        let ts = Precision::Milliseconds
            .to_datetime(1_700_000_000_123)
            .expect("in range");
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_nanosecond_overflow_is_none() {
        let far = Utc.with_ymd_and_hms(2500, 1, 1, 0, 0, 0).unwrap();
        let point = Point::new("m", Tags::new(), one_field(), Some(far)).unwrap();
        assert_eq!(point.unix_nano(), None);
        assert!(point.precision_timestamp(Precision::Seconds).is_some());
    }
}
