// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encode -> parse round trips over seeded random points.

use chrono::{TimeZone, Utc};
use tsdb_client::{encode_point, parse_line, Error, FieldValue, Fields, Point, Precision, Tags};

const ALPHABET: &[char] = &[
    'a', 'b', 'z', 'Q', '0', '9', '_', '-', '.', ' ', ',', '=', '"', '\\', 'é', '#',
];

fn ident(rng: &mut fastrand::Rng) -> String {
    let len = rng.usize(1..8);
    let mut s: String = (0..len)
        .map(|_| ALPHABET[rng.usize(..ALPHABET.len())])
        .collect();
    // A trailing backslash cannot be encoded.
    if s.ends_with('\\') {
        s.push('x');
    }
    s
}

fn field_value(rng: &mut fastrand::Rng) -> FieldValue {
    match rng.u8(..4) {
        0 => FieldValue::Float((rng.f64() - 0.5) * 1e6),
        1 => FieldValue::Integer(rng.i64(..)),
        2 => {
            let mut s = ident(rng);
            if rng.bool() {
                s.push('\n');
            }
            FieldValue::String(s)
        }
        _ => FieldValue::Boolean(rng.bool()),
    }
}

fn random_point(rng: &mut fastrand::Rng) -> Point {
    let mut tags = Tags::new();
    for _ in 0..rng.usize(0..4) {
        tags.insert(ident(rng), ident(rng));
    }
    let mut fields = Fields::new();
    for _ in 0..rng.usize(1..5) {
        fields.insert(ident(rng), field_value(rng));
    }
    let secs = rng.i64(0..4_000_000_000);
    let time = Utc.timestamp_opt(secs, 0).unwrap();
    Point::new(ident(rng), tags, fields, Some(time)).expect("valid point")
}

#[test]
fn test_random_points_round_trip() {
    let mut rng = fastrand::Rng::with_seed(42);
    for precision in [Precision::Seconds, Precision::Milliseconds, Precision::Nanoseconds] {
        for _ in 0..500 {
            let point = random_point(&mut rng);
            if point.name().starts_with('#') {
                assert!(matches!(
                    encode_point(&point, precision),
                    Err(Error::Encoding(_))
                ));
                continue;
            }
            let line = encode_point(&point, precision).expect("encode");
            let parsed = parse_line(&line)
                .unwrap_or_else(|e| panic!("parse {:?}: {}", line, e));
            let back = parsed.into_point(precision).expect("rebuild");
            assert_eq!(back, point, "line: {:?}", line);
        }
    }
}

#[test]
fn test_tag_order_independent_of_insertion() {
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..100 {
        let mut pairs: Vec<(String, String)> =
            (0..5).map(|_| (ident(&mut rng), ident(&mut rng))).collect();
        pairs.sort();
        pairs.dedup_by(|a, b| a.0 == b.0);

        let mut forward = Point::builder("m").field("v", 1);
        for (k, v) in &pairs {
            forward = forward.tag(k.clone(), v.clone());
        }
        let mut reverse = Point::builder("m").field("v", 1);
        for (k, v) in pairs.iter().rev() {
            reverse = reverse.tag(k.clone(), v.clone());
        }

        let a = encode_point(&forward.build().unwrap(), Precision::Seconds).unwrap();
        let b = encode_point(&reverse.build().unwrap(), Precision::Seconds).unwrap();
        assert_eq!(a, b);
    }
}
