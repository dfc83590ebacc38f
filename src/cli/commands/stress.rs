//! Stress driver: fire concurrent lookups at a cached simulated directory.
//!
//! Request `i` asks for uid `1 + i % id_range`; with `id_range` larger than
//! the directory, the surplus ids are rejected as invalid keys. The report's
//! pressure is backing-store hits per request, so a perfectly coalescing
//! cache over `size` distinct ids scores `size / requests`.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

use crate::adapters::cache::CachedUserRepository;
use crate::adapters::directory::SimulatedUserDirectory;
use crate::cli::output::{create_progress_bar, output, CommandOutput, ProgressBarExt, TableFormatter};
use crate::domain::models::{CacheStats, Capacity, Config, FailurePolicy};
use crate::domain::ports::UserRepository;

#[derive(Args, Debug)]
pub struct StressArgs {
    /// Number of requests to issue
    #[arg(short = 'n', long, default_value = "2000")]
    pub requests: u64,

    /// Ids are drawn from 1..=id_range (defaults to the directory size)
    #[arg(long)]
    pub id_range: Option<u64>,

    /// Delay between spawning consecutive requests, in microseconds
    #[arg(long, default_value = "0")]
    pub spacing_us: u64,

    /// Override the configured cache capacity (integer or "unbounded")
    #[arg(long)]
    pub capacity: Option<Capacity>,

    /// Override the configured simulated latency
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Cache producer failures instead of retrying them
    #[arg(long)]
    pub memoize_failures: bool,
}

#[derive(Debug, Serialize)]
pub struct StressReport {
    pub requests: u64,
    pub succeeded: u64,
    pub invalid: u64,
    pub db_hits: u64,
    pub pressure: f64,
    pub elapsed_ms: u128,
    pub micros_per_op: u128,
    pub capacity: String,
    pub stats: CacheStats,
}

impl CommandOutput for StressReport {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let summary = formatter.format_summary(&[
            ("requests", self.requests.to_string()),
            ("succeeded", self.succeeded.to_string()),
            ("invalid", self.invalid.to_string()),
            ("hits on db", self.db_hits.to_string()),
            ("pressure", format!("{:.4}", self.pressure)),
            ("capacity", self.capacity.clone()),
            (
                "elapsed",
                format!("{} ms ({} µs/op)", self.elapsed_ms, self.micros_per_op),
            ),
        ]);
        format!("{summary}\n{}", formatter.format_stats(&self.stats))
    }
}

pub async fn execute(args: StressArgs, config: Config, json_mode: bool) -> Result<()> {
    let report = run(&args, config, json_mode).await?;
    output(&report, json_mode);
    Ok(())
}

/// Run the stress scenario and collect its report.
#[allow(clippy::cast_precision_loss)]
pub async fn run(args: &StressArgs, mut config: Config, quiet: bool) -> Result<StressReport> {
    if let Some(capacity) = args.capacity {
        config.cache.capacity = capacity;
    }
    if let Some(latency_ms) = args.latency_ms {
        config.directory.latency_ms = latency_ms;
    }
    if args.memoize_failures {
        config.cache.failure_policy = FailurePolicy::Memoize;
    }

    let directory = Arc::new(SimulatedUserDirectory::from_config(&config.directory));
    let repo = Arc::new(CachedUserRepository::new(Arc::clone(&directory), &config.cache));
    let id_range = args.id_range.unwrap_or(config.directory.size).max(1);
    let spacing = Duration::from_micros(args.spacing_us);

    tracing::info!(
        requests = args.requests,
        id_range,
        capacity = %config.cache.capacity,
        latency_ms = config.directory.latency_ms,
        "starting stress run"
    );

    let progress = create_progress_bar(args.requests, quiet);
    let started = Instant::now();
    let mut tasks = JoinSet::new();

    for i in 0..args.requests {
        let repo = Arc::clone(&repo);
        let uid = 1 + i % id_range;
        tasks.spawn(async move { repo.get_user(uid).await });
        if !spacing.is_zero() {
            tokio::time::sleep(spacing).await;
        }
    }

    let (mut succeeded, mut invalid) = (0_u64, 0_u64);
    while let Some(joined) = tasks.join_next().await {
        match joined.context("request task panicked")? {
            Ok(_) => succeeded += 1,
            Err(err) if err.is_invalid_key() => invalid += 1,
            Err(err) => tracing::warn!(error = %err, "request failed"),
        }
        progress.inc(1);
    }

    let elapsed = started.elapsed();
    let db_hits = directory.db_hits();
    if invalid > 0 {
        progress.finish_warning(format!("{invalid} requests rejected"));
    } else {
        progress.finish_success("all requests served");
    }

    let pressure = if args.requests == 0 {
        0.0
    } else {
        db_hits as f64 / args.requests as f64
    };

    tracing::info!(db_hits, pressure, elapsed_ms = elapsed.as_millis(), "stress run complete");

    Ok(StressReport {
        requests: args.requests,
        succeeded,
        invalid,
        db_hits,
        pressure,
        elapsed_ms: elapsed.as_millis(),
        micros_per_op: elapsed.as_micros() / u128::from(args.requests.max(1)),
        capacity: config.cache.capacity.to_string(),
        stats: repo.stats(),
    })
}
