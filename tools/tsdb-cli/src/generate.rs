// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Synthetic cpu_usage data for load and smoke testing.

use chrono::{DateTime, Duration, Utc};
use tsdb_client::{encode_point, parse_line, BatchConfig, BatchPoints, Error, Point, Result};

const REGIONS: [&str; 4] = ["us-west1", "us-west2", "us-west3", "us-east1"];

/// Build a batch of `count` cpu_usage points ending now.
pub fn cpu_usage_batch(
    rng: &mut fastrand::Rng,
    config: BatchConfig,
    count: usize,
) -> Result<BatchPoints> {
    cpu_usage_batch_at(rng, config, count, Utc::now())
}

/// Points are spaced one millisecond apart, the last one at `end`.
pub fn cpu_usage_batch_at(
    rng: &mut fastrand::Rng,
    config: BatchConfig,
    count: usize,
    end: DateTime<Utc>,
) -> Result<BatchPoints> {
    let mut batch = BatchPoints::new(config)?;
    for i in 0..count {
        let idle = rng.f64() * 100.0;
        let offset = Duration::milliseconds((count - 1 - i) as i64);
        let point = Point::builder("cpu_usage")
            .tag("cpu", "cpu-total")
            .tag("host", format!("host{}", rng.u32(..1000)))
            .tag("region", REGIONS[rng.usize(..REGIONS.len())])
            .field("idle", idle)
            .field("busy", 100.0 - idle)
            .timestamp(end - offset)
            .build()?;
        batch.add_point(point);
    }
    tracing::debug!("generated {} points", batch.len());
    Ok(batch)
}

/// Encode each point, parse the line back and compare.
pub fn verify_round_trip(batch: &BatchPoints) -> Result<()> {
    let precision = batch.precision();
    for (i, point) in batch.points().iter().enumerate() {
        let line = encode_point(point, precision)?;
        let parsed = parse_line(&line)?.into_point(precision)?;
        // Sub-precision time is truncated on the wire.
        let expected = match point.precision_timestamp(precision) {
            Some(ts) => Point::new(
                point.name(),
                point.tags().clone(),
                point.fields().clone(),
                precision.to_datetime(ts),
            )?,
            None => point.clone(),
        };
        if parsed != expected {
            return Err(Error::Encoding(format!(
                "point {} does not survive encoding: {:?}",
                i, line
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tsdb_client::{encode_batch, FieldValue, Precision};

    fn end() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_generate_is_deterministic_per_seed() {
        let config = BatchConfig::new("systemstats", Precision::Microseconds);
        let a = cpu_usage_batch_at(&mut fastrand::Rng::with_seed(42), config.clone(), 50, end())
            .unwrap();
        let b = cpu_usage_batch_at(&mut fastrand::Rng::with_seed(42), config, 50, end()).unwrap();
        assert_eq!(encode_batch(&a).unwrap(), encode_batch(&b).unwrap());
    }

    #[test]
    fn test_generate_shape() {
        let config = BatchConfig::new("systemstats", Precision::Microseconds);
        let batch =
            cpu_usage_batch_at(&mut fastrand::Rng::with_seed(1), config, 1000, end()).unwrap();
        assert_eq!(batch.len(), 1000);

        let last = batch.points().last().unwrap();
        assert_eq!(last.time(), Some(end()));

        for point in batch.points() {
            assert_eq!(point.name(), "cpu_usage");
            assert!(REGIONS.contains(&point.tags()["region"].as_str()));
            assert!(point.tags()["host"].starts_with("host"));
            match (&point.fields()["idle"], &point.fields()["busy"]) {
                (FieldValue::Float(idle), FieldValue::Float(busy)) => {
                    assert!((0.0..100.0).contains(idle));
                    assert!((idle + busy - 100.0).abs() < 1e-9);
                }
                other => panic!("unexpected fields: {:?}", other),
            }
        }
    }

    #[test]
    fn test_generated_batch_round_trips() {
        for precision in [Precision::Seconds, Precision::Microseconds, Precision::Nanoseconds] {
            let config = BatchConfig::new("systemstats", precision);
            let batch = cpu_usage_batch(&mut fastrand::Rng::with_seed(9), config, 200).unwrap();
            verify_round_trip(&batch).unwrap();
        }
    }

    #[test]
    fn test_generate_zero_points() {
        let config = BatchConfig::new("systemstats", Precision::Seconds);
        let batch = cpu_usage_batch_at(&mut fastrand::Rng::with_seed(3), config, 0, end()).unwrap();
        assert!(batch.is_empty());
    }
}
