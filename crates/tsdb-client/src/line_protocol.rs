// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Line Protocol encoder and parser.
//!
//! Line Protocol format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp
//! ```
//!
//! Tags and fields are written sorted by key. The timestamp is expressed in
//! the batch precision and omitted when the point has none.
//!
//! See: <https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/>

use crate::batch::BatchPoints;
use crate::error::{Error, Result};
use crate::point::{FieldValue, Fields, Point, Precision, Tags};

const MEASUREMENT_SPECIALS: &[char] = &[',', ' '];
const KEY_SPECIALS: &[char] = &[',', '=', ' '];
const STRING_SPECIALS: &[char] = &['"', '\\'];

/// Format a field value for Line Protocol.
///
/// - Float: shortest round-trip decimal (e.g., `3.14`), must be finite
/// - Integer: suffixed with `i` (e.g., `42i`)
/// - String: double-quoted, `\` and `"` escaped (e.g., `"hello"`)
/// - Boolean: `true` or `false`
pub fn encode_field_value(value: &FieldValue) -> Result<String> {
    match value {
        FieldValue::Float(v) if !v.is_finite() => Err(Error::Encoding(format!(
            "{} field value {} is not representable",
            value.type_name(),
            v
        ))),
        FieldValue::Float(v) => Ok(format!("{}", v)),
        FieldValue::Integer(v) => Ok(format!("{}i", v)),
        FieldValue::String(v) => {
            let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
            Ok(format!("\"{}\"", escaped))
        }
        FieldValue::Boolean(v) => Ok(if *v { "true" } else { "false" }.to_string()),
    }
}

/// Encode a single point as one line (no trailing newline).
pub fn encode_point(point: &Point, precision: Precision) -> Result<String> {
    check_identifier("measurement", point.name())?;
    if point.name().starts_with('#') {
        return Err(Error::Encoding(format!(
            "measurement {:?} starts with '#' and would be read as a comment",
            point.name()
        )));
    }
    let mut line = escape(point.name(), MEASUREMENT_SPECIALS);

    for (key, value) in point.tags() {
        // The server rejects empty tag values; dropping the tag is equivalent.
        if value.is_empty() {
            continue;
        }
        check_identifier("tag key", key)?;
        check_identifier("tag value", value)?;
        line.push(',');
        line.push_str(&escape(key, KEY_SPECIALS));
        line.push('=');
        line.push_str(&escape(value, KEY_SPECIALS));
    }

    line.push(' ');

    for (i, (key, value)) in point.fields().iter().enumerate() {
        check_identifier("field key", key)?;
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape(key, KEY_SPECIALS));
        line.push('=');
        line.push_str(&encode_field_value(value)?);
    }

    if let Some(time) = point.time() {
        let ts = precision.timestamp(&time).ok_or_else(|| {
            Error::Encoding(format!(
                "timestamp {} of '{}' overflows precision {}",
                time,
                point.name(),
                precision
            ))
        })?;
        line.push(' ');
        line.push_str(&ts.to_string());
    }

    Ok(line)
}

/// Encode every point of a batch, one line each, joined by `\n`.
pub fn encode_batch(batch: &BatchPoints) -> Result<String> {
    let mut writer = LineProtocolWriter::new(batch.precision());
    for point in batch.points() {
        writer.write_point(point)?;
    }
    tracing::trace!(
        "encoded {} lines for '{}' at precision {}",
        writer.len(),
        batch.database(),
        batch.precision()
    );
    Ok(writer.finish())
}

/// Accumulates encoded points into a single request body.
pub struct LineProtocolWriter {
    precision: Precision,
    body: String,
    lines: usize,
}

impl LineProtocolWriter {
    /// Create a new empty writer.
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            body: String::new(),
            lines: 0,
        }
    }

    /// Encode and append one point. On error the body is left unchanged.
    pub fn write_point(&mut self, point: &Point) -> Result<()> {
        let line = encode_point(point, self.precision)?;
        if self.lines > 0 {
            self.body.push('\n');
        }
        self.body.push_str(&line);
        self.lines += 1;
        Ok(())
    }

    /// Get the current number of encoded lines.
    pub fn len(&self) -> usize {
        self.lines
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    /// Consume the writer, returning the body.
    pub fn finish(self) -> String {
        self.body
    }
}

/// One line decoded back into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub measurement: String,
    pub tags: Tags,
    pub fields: Fields,
    /// Raw timestamp in the precision the line was written with.
    pub timestamp: Option<i64>,
}

impl ParsedLine {
    /// Rebuild a [`Point`], interpreting the timestamp in `precision`.
    pub fn into_point(self, precision: Precision) -> Result<Point> {
        let time = match self.timestamp {
            Some(ts) => Some(precision.to_datetime(ts).ok_or_else(|| {
                Error::Decoding(format!("timestamp {} out of range", ts))
            })?),
            None => None,
        };
        Point::new(self.measurement, self.tags, self.fields, time)
    }
}

/// Parse a single Line Protocol line.
pub fn parse_line(line: &str) -> Result<ParsedLine> {
    let line = line.trim_end_matches(['\r', '\n']);
    let head = split_unescaped(line, b' ', false)[0];
    let rest = line
        .get(head.len() + 1..)
        .ok_or_else(|| Error::Decoding(format!("missing field set: {:?}", line)))?;
    let sections = split_unescaped(rest, b' ', true);
    if sections.len() > 2 {
        return Err(Error::Decoding(format!(
            "unexpected trailing data after timestamp: {:?}",
            line
        )));
    }

    let mut head = split_unescaped(head, b',', false).into_iter();
    let measurement = head
        .next()
        .filter(|m| !m.is_empty())
        .map(|m| unescape(m, MEASUREMENT_SPECIALS))
        .ok_or_else(|| Error::Decoding(format!("missing measurement: {:?}", line)))?;

    let mut tags = Tags::new();
    for pair in head {
        let (key, value) = split_pair(pair)?;
        tags.insert(unescape(key, KEY_SPECIALS), unescape(value, KEY_SPECIALS));
    }

    let mut fields = Fields::new();
    for pair in split_unescaped(sections[0], b',', true) {
        let (key, raw) = split_pair(pair)?;
        fields.insert(unescape(key, KEY_SPECIALS), parse_field_value(raw)?);
    }

    let timestamp = match sections.get(1) {
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|e| Error::Decoding(format!("bad timestamp {:?}: {}", raw, e)))?,
        ),
        None => None,
    };

    Ok(ParsedLine {
        measurement,
        tags,
        fields,
        timestamp,
    })
}

fn parse_field_value(raw: &str) -> Result<FieldValue> {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Ok(FieldValue::String(unescape(
            &raw[1..raw.len() - 1],
            STRING_SPECIALS,
        )));
    }
    match raw {
        "t" | "T" | "true" | "True" | "TRUE" => return Ok(FieldValue::Boolean(true)),
        "f" | "F" | "false" | "False" | "FALSE" => return Ok(FieldValue::Boolean(false)),
        _ => {}
    }
    if let Some(int) = raw.strip_suffix('i') {
        return int
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|e| Error::Decoding(format!("bad integer field {:?}: {}", raw, e)));
    }
    raw.parse::<f64>()
        .map(FieldValue::Float)
        .map_err(|e| Error::Decoding(format!("bad field value {:?}: {}", raw, e)))
}

/// Keys and tag values cannot carry line breaks, and a trailing backslash
/// would escape the separator that follows it.
fn check_identifier(what: &str, s: &str) -> Result<()> {
    if s.is_empty() {
        return Err(Error::Encoding(format!("{} is empty", what)));
    }
    if s.contains(['\n', '\r']) {
        return Err(Error::Encoding(format!(
            "{} {:?} contains a line break",
            what, s
        )));
    }
    if s.ends_with('\\') {
        return Err(Error::Encoding(format!(
            "{} {:?} ends with a backslash",
            what, s
        )));
    }
    Ok(())
}

fn escape(s: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn unescape(s: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if specials.contains(&next) {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Split on `sep` where it is neither backslash-escaped nor, when
/// `quoted` is set, inside a double-quoted field value.
///
/// Outside quotes a backslash only escapes `,`, `=` and space; inside quotes
/// it only escapes `"` and `\\`. A quote opens a string only directly after
/// an unescaped `=`.
fn split_unescaped(s: &str, sep: u8, quoted: bool) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut after_eq = false;
    let mut i = 0;
    while i < bytes.len() {
        let was_after_eq = std::mem::take(&mut after_eq);
        if in_quotes {
            match bytes[i] {
                b'\\' if matches!(bytes.get(i + 1), Some(b'"' | b'\\')) => i += 1,
                b'"' => in_quotes = false,
                _ => {}
            }
        } else {
            match bytes[i] {
                b'\\' if matches!(bytes.get(i + 1), Some(b',' | b'=' | b' ')) => i += 1,
                b'"' if quoted && was_after_eq => in_quotes = true,
                b if b == sep => {
                    parts.push(&s[start..i]);
                    start = i + 1;
                }
                b'=' => after_eq = true,
                _ => {}
            }
        }
        i += 1;
    }
    parts.push(&s[start..]);
    parts
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    let parts = split_unescaped(pair, b'=', false);
    match parts.split_first() {
        Some((key, _)) if !key.is_empty() && parts.len() >= 2 => {
            Ok((key, &pair[key.len() + 1..]))
        }
        _ => Err(Error::Decoding(format!("expected key=value, got {:?}", pair))),
    }
}
