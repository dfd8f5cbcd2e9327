//! CLI interface for trade-risk
//!
//! Provides subcommands for:
//! - `calc`: Risk report for one trade
//! - `compare`: What-if comparison of several scenarios
//! - `config`: Show effective configuration

mod calc;
mod compare;

pub use calc::CalcArgs;
pub use compare::CompareArgs;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;

#[derive(Parser, Debug)]
#[command(name = "trade-risk")]
#[command(about = "Position sizing and risk/reward calculator")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute a risk report for one trade
    Calc(CalcArgs),
    /// Compare scenarios against a base trade
    Compare(CompareArgs),
    /// Show configuration
    Config,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Read and deserialize a JSON request file
async fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}
