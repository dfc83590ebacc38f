//! Command-line interface
//!
//! Drivers that exercise the coalescing cache against the simulated
//! directory and print the results for humans or as JSON.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::infrastructure::config::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(name = "coalesce-cache")]
#[command(about = "Async memoizing cache with request coalescing", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (missing files are ignored)
    #[arg(short, long, global = true, env = "COALESCE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fire concurrent lookups at a cached simulated directory
    Stress(commands::stress::StressArgs),
    /// Replay a key sequence against a small cache, step by step
    Scenario(commands::scenario::ScenarioArgs),
}

/// Print an error in the selected output mode and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
