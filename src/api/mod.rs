//! Request boundary over the risk engine
//!
//! Parses loosely typed input records, runs the engine, stamps each response
//! with a request id and timestamp, and optionally journals the result.

mod service;

pub use service::{CalculatorService, ServiceError};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::risk::{
    ComparisonSummary, RoundedComparison, RoundedReport, RoundedScenario, ScenarioInput,
    TradeInput,
};

/// Batch comparison request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub base_params: TradeInput,
    #[serde(default)]
    pub scenarios: Vec<ScenarioInput>,
    /// Percentage in [0, 100]; the engine default applies when absent
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub win_rate: Option<Decimal>,
}

/// Response to a single calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub report: RoundedReport,
    /// Journal id when the report was saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<Uuid>,
}

/// Response to a scenario comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub win_rate: Decimal,
    pub scenarios: Vec<RoundedScenario>,
    pub comparison: ComparisonSummary,
}

impl CompareResponse {
    fn new(request_id: Uuid, result: RoundedComparison) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            win_rate: result.win_rate,
            scenarios: result.scenarios,
            comparison: result.comparison,
        }
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        RoundedComparison {
            win_rate: self.win_rate,
            scenarios: self.scenarios.clone(),
            comparison: self.comparison,
        }
        .format_table()
    }
}
