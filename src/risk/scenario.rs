//! What-if comparison of several parameter sets against a common base
//!
//! Each scenario is a partial override merged onto the base record. Scenarios
//! are evaluated independently: one failing never affects the others.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::engine::RiskEngine;
use super::params::TradeInput;
use super::report::{round_money, RiskReport, RoundedReport};
use super::types::{ErrorBody, RiskError, Violation};

/// One scenario: optional label plus the fields it overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub overrides: TradeInput,
}

impl ScenarioInput {
    pub fn new(overrides: TradeInput) -> Self {
        Self {
            name: None,
            overrides,
        }
    }

    pub fn named(name: impl Into<String>, overrides: TradeInput) -> Self {
        Self {
            name: Some(name.into()),
            overrides,
        }
    }
}

/// Result of evaluating a single scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioOutcome {
    Computed {
        report: RiskReport,
        /// Reward weighted by the win rate minus risk weighted by the loss rate
        expected_return: Decimal,
    },
    Failed(RiskError),
}

/// A scenario outcome tagged with its position in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioResult {
    pub index: usize,
    pub name: Option<String>,
    pub outcome: ScenarioOutcome,
}

impl ScenarioResult {
    pub fn report(&self) -> Option<&RiskReport> {
        match &self.outcome {
            ScenarioOutcome::Computed { report, .. } => Some(report),
            ScenarioOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RiskError> {
        match &self.outcome {
            ScenarioOutcome::Computed { .. } => None,
            ScenarioOutcome::Failed(err) => Some(err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.report().is_some()
    }
}

/// Indices of the standout scenarios, `None` when no scenario succeeded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub best_risk_reward: Option<usize>,
    pub lowest_risk: Option<usize>,
    pub highest_reward: Option<usize>,
}

/// All scenario results in input order plus the summary picks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioComparison {
    pub win_rate: Decimal,
    pub scenarios: Vec<ScenarioResult>,
    pub comparison: ComparisonSummary,
}

impl ScenarioComparison {
    fn from_results(win_rate: Decimal, scenarios: Vec<ScenarioResult>) -> Self {
        let comparison = ComparisonSummary {
            best_risk_reward: first_extreme(&scenarios, |r| r.risk_reward_ratio, Extreme::Highest),
            lowest_risk: first_extreme(&scenarios, |r| r.risk_amount, Extreme::Lowest),
            highest_reward: first_extreme(&scenarios, |r| r.reward_amount, Extreme::Highest),
        };
        Self {
            win_rate,
            scenarios,
            comparison,
        }
    }

    /// Serialization form with reports rounded
    pub fn rounded(&self) -> RoundedComparison {
        RoundedComparison {
            win_rate: self.win_rate,
            scenarios: self
                .scenarios
                .iter()
                .map(|result| match &result.outcome {
                    ScenarioOutcome::Computed {
                        report,
                        expected_return,
                    } => RoundedScenario {
                        index: result.index,
                        name: result.name.clone(),
                        status: ScenarioStatus::Ok,
                        report: Some(report.rounded()),
                        expected_return: Some(round_money(*expected_return)),
                        error: None,
                    },
                    ScenarioOutcome::Failed(err) => RoundedScenario {
                        index: result.index,
                        name: result.name.clone(),
                        status: ScenarioStatus::Error,
                        report: None,
                        expected_return: None,
                        error: Some(ErrorBody::from(err)),
                    },
                })
                .collect(),
            comparison: self.comparison,
        }
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        self.rounded().format_table()
    }
}

impl RoundedComparison {
    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let mut out = format!(
            "\n{:<5} {:<16} {:>12} {:>14} {:>12} {:>8} {:>12}\n",
            "#", "NAME", "RISK", "SIZE", "REWARD", "R:R", "EXP.RETURN"
        );
        out.push_str(&"─".repeat(85));
        out.push('\n');
        for result in &self.scenarios {
            let name = result.name.as_deref().unwrap_or("-");
            match (&result.report, &result.error) {
                (Some(r), _) => {
                    out.push_str(&format!(
                        "{:<5} {:<16} {:>12.2} {:>14} {:>12.2} {:>8.2} {:>12.2}\n",
                        result.index,
                        name,
                        r.risk_amount,
                        r.position_size.normalize(),
                        r.reward_amount,
                        r.risk_reward_ratio,
                        result.expected_return.unwrap_or_default(),
                    ));
                }
                (None, error) => {
                    let message = error.as_ref().map_or("unknown", |e| e.message.as_str());
                    out.push_str(&format!(
                        "{:<5} {:<16} error: {}\n",
                        result.index, name, message
                    ));
                }
            }
        }
        out.push_str(&"─".repeat(85));
        out.push('\n');

        let pick = |index: Option<usize>| index.map_or("-".to_string(), |i| i.to_string());
        out.push_str(&format!(
            "Win rate: {}%  Best R:R: {}  Lowest risk: {}  Highest reward: {}\n",
            self.win_rate.normalize(),
            pick(self.comparison.best_risk_reward),
            pick(self.comparison.lowest_risk),
            pick(self.comparison.highest_reward),
        ));
        out
    }
}

/// Whether a scenario produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Ok,
    Error,
}

/// Wire form of one scenario result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundedScenario {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: ScenarioStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RoundedReport>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub expected_return: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Wire form of a whole comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundedComparison {
    #[serde(with = "rust_decimal::serde::float")]
    pub win_rate: Decimal,
    pub scenarios: Vec<RoundedScenario>,
    pub comparison: ComparisonSummary,
}

impl RiskEngine {
    /// Evaluate every scenario against `base`, sequentially
    ///
    /// `win_rate` is a percentage in [0, 100]; the engine default applies when
    /// `None`. Only an out-of-range win rate fails the call as a whole.
    pub fn compare_scenarios(
        &self,
        base: &TradeInput,
        scenarios: &[ScenarioInput],
        win_rate: Option<Decimal>,
    ) -> Result<ScenarioComparison, RiskError> {
        let win_rate = self.resolve_win_rate(win_rate)?;
        let results = scenarios
            .iter()
            .enumerate()
            .map(|(index, scenario)| self.run_scenario(index, base, scenario, win_rate))
            .collect();
        Ok(ScenarioComparison::from_results(win_rate, results))
    }

    /// Same as [`RiskEngine::compare_scenarios`], one blocking task per scenario
    pub async fn compare_scenarios_parallel(
        &self,
        base: &TradeInput,
        scenarios: &[ScenarioInput],
        win_rate: Option<Decimal>,
    ) -> Result<ScenarioComparison, RiskError> {
        let win_rate = self.resolve_win_rate(win_rate)?;

        let handles: Vec<_> = scenarios
            .iter()
            .enumerate()
            .map(|(index, scenario)| {
                let engine = self.clone();
                let base = base.clone();
                let scenario = scenario.clone();
                tokio::task::spawn_blocking(move || {
                    engine.run_scenario(index, &base, &scenario, win_rate)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for ((index, scenario), handle) in scenarios.iter().enumerate().zip(handles) {
            match handle.await {
                Ok(result) => results.push(result),
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                // Cancelled by runtime shutdown; finish the work inline
                Err(_) => results.push(self.run_scenario(index, base, scenario, win_rate)),
            }
        }
        Ok(ScenarioComparison::from_results(win_rate, results))
    }

    fn resolve_win_rate(&self, win_rate: Option<Decimal>) -> Result<Decimal, RiskError> {
        let win_rate = win_rate.unwrap_or(self.default_win_rate);
        if win_rate < Decimal::ZERO || win_rate > dec!(100) {
            return Err(Violation::WinRateOutOfRange(win_rate).into());
        }
        Ok(win_rate)
    }

    fn run_scenario(
        &self,
        index: usize,
        base: &TradeInput,
        scenario: &ScenarioInput,
        win_rate: Decimal,
    ) -> ScenarioResult {
        let merged = base
            .merged_with(&scenario.overrides)
            .with_inferred_direction();

        let outcome = merged
            .to_parameters()
            .and_then(|params| self.compute_risk_report(&params))
            .and_then(|report| {
                let expected_return = expected_return(&report, win_rate)?;
                Ok(ScenarioOutcome::Computed {
                    report,
                    expected_return,
                })
            })
            .unwrap_or_else(ScenarioOutcome::Failed);

        if let ScenarioOutcome::Failed(err) = &outcome {
            tracing::debug!(index, error = %err, "Scenario rejected");
        }

        ScenarioResult {
            index,
            name: scenario.name.clone(),
            outcome,
        }
    }
}

/// `reward * w/100 - risk * (100 - w)/100`
fn expected_return(report: &RiskReport, win_rate: Decimal) -> Result<Decimal, RiskError> {
    let overflow = || RiskError::from(Violation::Overflow("expectedReturn"));
    let win = report
        .reward_amount
        .checked_mul(win_rate)
        .ok_or_else(overflow)?
        / dec!(100);
    let loss = report
        .risk_amount
        .checked_mul(dec!(100) - win_rate)
        .ok_or_else(overflow)?
        / dec!(100);
    win.checked_sub(loss).ok_or_else(overflow)
}

#[derive(Clone, Copy)]
enum Extreme {
    Highest,
    Lowest,
}

/// Index of the first successful scenario with the extreme `key`
fn first_extreme(
    results: &[ScenarioResult],
    key: impl Fn(&RiskReport) -> Decimal,
    extreme: Extreme,
) -> Option<usize> {
    let mut best: Option<(usize, Decimal)> = None;
    for result in results {
        let Some(report) = result.report() else {
            continue;
        };
        let value = key(report);
        let better = match best {
            None => true,
            Some((_, current)) => match extreme {
                Extreme::Highest => value > current,
                Extreme::Lowest => value < current,
            },
        };
        if better {
            best = Some((result.index, value));
        }
    }
    best.map(|(index, _)| index)
}
