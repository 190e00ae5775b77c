//! Relay command
//!
//! Usage: logbridge relay [--count <N>] [--level <LEVEL>] [--fail-every <K>]
//!        [--format text|json] [--max-level <FILTER>] [--no-location]

use anyhow::Context;
use clap::{Args, ValueEnum};
use logbridge_core::{FacadeConfig, FacadeSink, HandlerResult, LogAdapter, LogLevel, LogRecord};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct RelayArgs {
    /// Number of records to emit
    #[arg(short, long, default_value_t = 5)]
    pub count: u64,

    /// Level of the emitted records
    #[arg(short, long, default_value = "info")]
    pub level: log::Level,

    /// Make the handler fail on every K-th record
    #[arg(long)]
    pub fail_every: Option<u64>,

    /// Output format for relayed records
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Facade-wide maximum level while relaying
    #[arg(long, default_value = "trace")]
    pub max_level: log::LevelFilter,

    /// Do not prefix messages with file and line
    #[arg(long)]
    pub no_location: bool,
}

/// Execute relay command
pub fn execute(args: RelayArgs) -> anyhow::Result<()> {
    let config = FacadeConfig::default()
        .with_max_level(args.max_level)
        .with_location(!args.no_location);
    let adapter = LogAdapter::new(FacadeSink::new(config));

    let seen = Arc::new(AtomicU64::new(0));
    let failed = Arc::new(AtomicU64::new(0));
    let handler = {
        let seen = Arc::clone(&seen);
        let failed = Arc::clone(&failed);
        let fail_every = args.fail_every.filter(|k| *k > 0);
        let format = args.format;
        move |level: LogLevel, tag: Option<&str>, message: &str| -> HandlerResult {
            let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
            if fail_every.is_some_and(|k| n % k == 0) {
                failed.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("record {} rejected by --fail-every", n);
            }
            print_record(format, level, tag, message)
        }
    };

    adapter
        .enable(handler)
        .context("failed to enable log relay")?;

    for i in 1..=args.count {
        log::log!(args.level, "record {} of {}", i, args.count);
    }

    let expected = if args.level <= args.max_level {
        args.count
    } else {
        0
    };
    let deadline = Instant::now() + DRAIN_TIMEOUT;
    while seen.load(Ordering::SeqCst) < expected && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }

    adapter.disable();

    let seen = seen.load(Ordering::SeqCst);
    let failed = failed.load(Ordering::SeqCst);
    println!(
        "relayed {} record(s): {} delivered, {} failed; adapter {}",
        seen,
        seen - failed,
        failed,
        adapter.phase()
    );
    if seen < expected {
        anyhow::bail!("timed out waiting for {} record(s), saw {}", expected, seen);
    }
    Ok(())
}

fn print_record(
    format: OutputFormat,
    level: LogLevel,
    tag: Option<&str>,
    message: &str,
) -> HandlerResult {
    let mut out = std::io::stdout().lock();
    match format {
        OutputFormat::Text => {
            writeln!(out, "[{}] {}: {}", level, tag.unwrap_or("-"), message)?;
        }
        OutputFormat::Json => {
            let record = LogRecord::new(level, tag.map(str::to_string), message);
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        }
    }
    Ok(())
}
