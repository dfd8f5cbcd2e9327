//! Configuration types for trade-risk

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Risk engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Fee as a fraction of position value (0.001 = 0.1%)
    #[serde(default = "default_fee_rate")]
    pub fee_rate: Decimal,

    /// Largest accepted riskPercent
    #[serde(default = "default_max_risk_percent")]
    pub max_risk_percent: Decimal,

    /// Win rate in percent assumed by scenario comparison
    #[serde(default = "default_win_rate")]
    pub default_win_rate: Decimal,
}

fn default_fee_rate() -> Decimal {
    Decimal::new(1, 3) // 0.001 = 0.1%
}
fn default_max_risk_percent() -> Decimal {
    Decimal::new(100, 0)
}
fn default_win_rate() -> Decimal {
    Decimal::new(50, 0)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_rate: Decimal::new(1, 3),
            max_risk_percent: Decimal::new(100, 0),
            default_win_rate: Decimal::new(50, 0),
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fee_rate < Decimal::ZERO {
            anyhow::bail!("engine.fee_rate must not be negative, got {}", self.fee_rate);
        }
        if self.max_risk_percent <= Decimal::ZERO {
            anyhow::bail!(
                "engine.max_risk_percent must be positive, got {}",
                self.max_risk_percent
            );
        }
        if self.default_win_rate < Decimal::ZERO || self.default_win_rate > Decimal::ONE_HUNDRED {
            anyhow::bail!(
                "engine.default_win_rate must be between 0 and 100, got {}",
                self.default_win_rate
            );
        }
        Ok(())
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this port when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.engine.validate()?;
        Ok(config)
    }
}
