//! Replays a sequence of lookups against a small cache and shows, step by
//! step, whether each was a hit or a miss and which keys stayed resident.
//!
//! The producer returns `key * 10` after yielding once to the runtime.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::errors::CacheError;
use crate::domain::models::{CacheStats, Capacity};
use crate::services::CoalescingCache;

#[derive(Args, Debug)]
pub struct ScenarioArgs {
    /// Cache capacity (integer or "unbounded")
    #[arg(short, long, default_value = "2")]
    pub capacity: Capacity,

    /// Keys to look up, in order
    #[arg(value_delimiter = ',', default_values_t = [1, 2, 1, 3, 2])]
    pub keys: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioStep {
    pub step: usize,
    pub key: u64,
    pub outcome: String,
    pub value: Option<u64>,
    pub invocations: u64,
    pub resident: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub capacity: String,
    pub steps: Vec<ScenarioStep>,
    pub stats: CacheStats,
}

impl CommandOutput for ScenarioReport {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let rows: Vec<Vec<String>> = self
            .steps
            .iter()
            .map(|step| {
                vec![
                    step.step.to_string(),
                    format!("get({})", step.key),
                    step.outcome.clone(),
                    step.value.map_or_else(|| "-".to_string(), |v| v.to_string()),
                    step.invocations.to_string(),
                    format!("{:?}", step.resident),
                ]
            })
            .collect();

        format!(
            "Capacity: {}\n{}\n{}",
            self.capacity,
            formatter.format_steps(
                &["#", "Call", "Outcome", "Value", "Invocations", "Resident"],
                &rows,
                2,
            ),
            formatter.format_stats(&self.stats)
        )
    }
}

pub async fn execute(args: ScenarioArgs, json_mode: bool) -> Result<()> {
    let report = run(&args).await;
    output(&report, json_mode);
    Ok(())
}

pub async fn run(args: &ScenarioArgs) -> ScenarioReport {
    let cache: CoalescingCache<u64, u64> = CoalescingCache::new(args.capacity);
    let invocations = Arc::new(AtomicU64::new(0));
    let seen: BTreeSet<u64> = args.keys.iter().copied().collect();
    let mut steps = Vec::with_capacity(args.keys.len());

    for (i, &key) in args.keys.iter().enumerate() {
        let before = cache.stats();
        let counter = Arc::clone(&invocations);
        let result = cache
            .get_or_compute(key, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                key.checked_mul(10)
                    .ok_or_else(|| CacheError::producer(format!("{key} * 10 overflows")))
            })
            .await;
        let after = cache.stats();

        let outcome = match (&result, after.hits > before.hits) {
            (Err(_), _) => "failed",
            (Ok(_), true) => "hit",
            (Ok(_), false) => "miss",
        };

        steps.push(ScenarioStep {
            step: i + 1,
            key,
            outcome: outcome.to_string(),
            value: result.ok(),
            invocations: invocations.load(Ordering::SeqCst),
            resident: seen.iter().copied().filter(|k| cache.contains(k)).collect(),
        });
    }

    ScenarioReport {
        capacity: args.capacity.to_string(),
        steps,
        stats: cache.stats(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_scenario_evicts_key_two() {
        let args = ScenarioArgs {
            capacity: Capacity::bounded(2).unwrap(),
            keys: vec![1, 2, 1, 3, 2],
        };

        let report = run(&args).await;
        let outcomes: Vec<&str> = report.steps.iter().map(|s| s.outcome.as_str()).collect();
        let values: Vec<Option<u64>> = report.steps.iter().map(|s| s.value).collect();

        assert_eq!(outcomes, vec!["miss", "miss", "hit", "miss", "miss"]);
        assert_eq!(values, vec![Some(10), Some(20), Some(10), Some(30), Some(20)]);
        assert_eq!(report.steps[3].resident, vec![1, 3]);
        assert_eq!(report.steps[4].invocations, 4);
    }
}
