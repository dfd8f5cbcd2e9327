//! Risk management module
//!
//! Risk-based position sizing, reward/ratio figures, take-profit ladders and
//! scenario comparison. No I/O; every operation is a pure function of its
//! inputs and the engine configuration.

mod engine;
mod params;
mod report;
mod scenario;
mod types;

pub use engine::RiskEngine;
pub use params::{TradeInput, TradeParameters};
pub use report::{
    RiskReport, RoundedLevel, RoundedReport, TakeProfitLevel, LADDER_PERCENTS, MONEY_DP, SIZE_DP,
};
pub use scenario::{
    ComparisonSummary, RoundedComparison, RoundedScenario, ScenarioComparison, ScenarioInput,
    ScenarioOutcome, ScenarioResult, ScenarioStatus,
};
pub use types::{Direction, ErrorBody, RiskError, Violation};
