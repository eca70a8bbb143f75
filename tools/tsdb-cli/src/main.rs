// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! tsdb-cli - write points to and query a line-protocol time-series database.
//!
//! # Usage
//!
//! ```bash
//! # Is the server up?
//! tsdb-cli ping
//!
//! # Write one point
//! tsdb-cli write --db BumbleBeeTuna --precision s cpu_usage \
//!     --tag cpu=cpu-total --field idle=10.1 --field system=53.3 --field user=46.6
//!
//! # Write 1000 generated points
//! tsdb-cli generate --db systemstats --precision us --count 1000 --seed 42
//!
//! # Inspect the payload without a server
//! tsdb-cli generate --count 3 --dry-run --check
//!
//! # Query
//! tsdb-cli query --db square_holes --epoch ns "SELECT count(value) FROM shapes"
//!
//! # Create a database
//! tsdb-cli create-database telegraf
//!
//! # Using a configuration file
//! tsdb-cli --config tsdb.toml ping
//! ```
//!
//! Credentials are read from `INFLUX_USER` / `INFLUX_PWD` (or `INFLUX_TOKEN`)
//! unless the configuration file sets them.

mod generate;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tsdb_client::{
    Auth, BatchConfig, BatchPoints, Client, ClientConfig, FieldValue, Point, Precision, Query,
    Response,
};

/// Line-protocol time-series client
#[derive(Parser, Debug)]
#[command(name = "tsdb-cli")]
#[command(about = "Write points to and query a line-protocol time-series database")]
#[command(version)]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server URL (ignored when --config is given)
    #[arg(long, env = "TSDB_URL", default_value = "http://localhost:8086", global = true)]
    url: String,

    /// Request timeout in milliseconds (0 = none)
    #[arg(long, default_value = "0", global = true)]
    timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the server is reachable
    Ping,

    /// Write a single point
    Write {
        /// Target database
        #[arg(long)]
        db: String,

        /// Timestamp precision (ns, us, ms, s, m, h)
        #[arg(long, default_value = "ns")]
        precision: Precision,

        /// Measurement name
        measurement: String,

        /// Tag as key=value (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Field as key=value (repeatable). 42i is an integer, true/false a
        /// boolean, a number a float, anything else a string.
        #[arg(short, long = "field", required = true)]
        fields: Vec<String>,

        /// Leave the timestamp unset so the server assigns one
        #[arg(long)]
        no_timestamp: bool,
    },

    /// Write a batch of generated cpu_usage points
    Generate {
        /// Target database
        #[arg(long, default_value = "systemstats")]
        db: String,

        /// Timestamp precision (ns, us, ms, s, m, h)
        #[arg(long, default_value = "us")]
        precision: Precision,

        /// Number of points
        #[arg(long, default_value = "1000")]
        count: usize,

        /// Seed for the data generator
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Print the encoded batch instead of sending it
        #[arg(long)]
        dry_run: bool,

        /// Parse every encoded line back and compare it with its point
        #[arg(long)]
        check: bool,
    },

    /// Run a query
    Query {
        /// Command text
        command: String,

        /// Target database
        #[arg(long, default_value = "")]
        db: String,

        /// Return integer timestamps in this precision
        #[arg(long)]
        epoch: Option<Precision>,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Create a database
    CreateDatabase {
        /// Database name
        name: String,
    },

    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "tsdb.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match &args.command {
        Commands::GenConfig { output } => return cmd_gen_config(output),
        Commands::Validate { file } => return cmd_validate(file),
        _ => {}
    }

    let client = Client::new(build_config(&args)?).context("invalid client configuration")?;

    match args.command {
        Commands::Ping => cmd_ping(&client),
        Commands::Write {
            db,
            precision,
            measurement,
            tags,
            fields,
            no_timestamp,
        } => cmd_write(&client, &db, precision, &measurement, &tags, &fields, no_timestamp),
        Commands::Generate {
            db,
            precision,
            count,
            seed,
            dry_run,
            check,
        } => cmd_generate(&client, &db, precision, count, seed, dry_run, check),
        Commands::Query {
            command,
            db,
            epoch,
            json,
        } => cmd_query(&client, &command, &db, epoch, json),
        Commands::CreateDatabase { name } => cmd_create_database(&client, &name),
        Commands::GenConfig { .. } | Commands::Validate { .. } => Ok(()),
    }
}

fn build_config(args: &Args) -> Result<ClientConfig> {
    // Load from file if specified
    if let Some(ref path) = args.config {
        let config = ClientConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
        if config.auth == Auth::None {
            return Ok(config.with_env_credentials());
        }
        return Ok(config);
    }

    let mut config = ClientConfig::new(args.url.clone()).with_env_credentials();
    if args.timeout_ms > 0 {
        config = config.timeout(Duration::from_millis(args.timeout_ms));
    }
    Ok(config)
}

fn cmd_ping(client: &Client) -> Result<()> {
    let info = client.ping(None)?;
    println!(
        "{} is up ({:.1} ms, version {})",
        client.config().url,
        info.rtt.as_secs_f64() * 1000.0,
        info.version.as_deref().unwrap_or("unknown")
    );
    Ok(())
}

fn cmd_write(
    client: &Client,
    db: &str,
    precision: Precision,
    measurement: &str,
    tags: &[String],
    fields: &[String],
    no_timestamp: bool,
) -> Result<()> {
    let mut builder = Point::builder(measurement);
    for tag in tags {
        let (key, value) = split_key_value(tag)?;
        builder = builder.tag(key, value);
    }
    for field in fields {
        let (key, value) = split_key_value(field)?;
        builder = builder.field(key, parse_field_arg(value));
    }
    if !no_timestamp {
        builder = builder.timestamp(chrono::Utc::now());
    }

    let mut batch = BatchPoints::new(BatchConfig::new(db, precision))?;
    batch.add_point(builder.build()?);
    client.write(&batch)?;

    tracing::info!("wrote 1 point to '{}'", db);
    Ok(())
}

fn cmd_generate(
    client: &Client,
    db: &str,
    precision: Precision,
    count: usize,
    seed: u64,
    dry_run: bool,
    check: bool,
) -> Result<()> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let batch = generate::cpu_usage_batch(&mut rng, BatchConfig::new(db, precision), count)?;

    if check {
        generate::verify_round_trip(&batch)?;
        tracing::info!("{} lines parse back to their points", batch.len());
    }

    if dry_run {
        println!("{}", tsdb_client::encode_batch(&batch)?);
        return Ok(());
    }

    client.write(&batch)?;
    tracing::info!("wrote {} points to '{}'", batch.len(), db);
    Ok(())
}

fn cmd_query(
    client: &Client,
    command: &str,
    db: &str,
    epoch: Option<Precision>,
    json: bool,
) -> Result<()> {
    let mut query = Query::new(command, db);
    query.precision = epoch;

    let response = client.query(&query)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }

    if let Some(err) = response.error() {
        bail!("query failed: {}", err);
    }
    Ok(())
}

fn cmd_create_database(client: &Client, name: &str) -> Result<()> {
    client.create_database(name)?;
    println!("Created database '{}'", name);
    Ok(())
}

fn cmd_gen_config(output: &Path) -> Result<()> {
    let config = ClientConfig::new("http://localhost:8086")
        .basic_auth("admin", "change-me")
        .timeout(Duration::from_secs(5));

    // Add comments
    let content = format!(
        r#"# tsdb-cli configuration
# Generated by tsdb-cli gen-config

{}"#,
        config.to_toml_string()?
    );

    std::fs::write(output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(path: &Path) -> Result<()> {
    match ClientConfig::from_file(path) {
        Ok(config) => {
            println!("Configuration valid!");
            println!();
            println!("URL:     {}", config.url);
            println!(
                "Timeout: {}",
                config
                    .request_timeout()
                    .map(|t| format!("{:?}", t))
                    .unwrap_or_else(|| "none".into())
            );
            println!(
                "Auth:    {}",
                match config.auth {
                    Auth::None => "none",
                    Auth::Basic { .. } => "basic",
                    Auth::Token { .. } => "token",
                }
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_response(response: &Response) {
    for result in &response.results {
        for message in &result.messages {
            println!("[{}] {}", message.level, message.text);
        }
        for series in &result.series {
            print!("name: {}", series.name);
            for (k, v) in &series.tags {
                print!(" {}={}", k, v);
            }
            println!();
            println!("{}", series.columns.join("\t"));
            for row in &series.values {
                let cells: Vec<String> = row
                    .iter()
                    .map(|cell| match cell {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                println!("{}", cells.join("\t"));
            }
            println!();
        }
        if let Some(err) = &result.error {
            eprintln!("statement {}: {}", result.statement_id, err);
        }
    }
}

fn split_key_value(arg: &str) -> Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => bail!("expected key=value, got '{}'", arg),
    }
}

/// Infer a field type from its command-line spelling.
fn parse_field_arg(value: &str) -> FieldValue {
    if let Some(int) = value.strip_suffix('i') {
        if let Ok(i) = int.parse::<i64>() {
            return FieldValue::Integer(i);
        }
    }
    match value {
        "true" => return FieldValue::Boolean(true),
        "false" => return FieldValue::Boolean(false),
        _ => {}
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() => FieldValue::Float(f),
        _ => FieldValue::String(value.to_string()),
    }
}
