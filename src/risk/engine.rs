//! Position sizing and risk/reward calculation
//!
//! Sizing is risk-based: the amount at stake is a fixed percentage of the
//! account, and the position is as large as that amount allows given the
//! distance to the stop. Everything here is pure and deterministic.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::params::TradeParameters;
use super::report::{RiskReport, TakeProfitLevel, LADDER_PERCENTS};
use super::types::{RiskError, Violation};
use crate::config::EngineConfig;

/// Computes [`RiskReport`]s from [`TradeParameters`]
#[derive(Debug, Clone)]
pub struct RiskEngine {
    /// Fee as a fraction of position value (e.g., 0.001 = 0.1%)
    fee_rate: Decimal,
    /// Upper bound for `riskPercent`
    max_risk_percent: Decimal,
    /// Win rate in percent assumed by scenario comparison when none is given
    pub(super) default_win_rate: Decimal,
}

impl RiskEngine {
    /// Create a new engine with the default win rate
    pub fn new(fee_rate: Decimal, max_risk_percent: Decimal) -> anyhow::Result<Self> {
        Self::from_config(&EngineConfig {
            fee_rate,
            max_risk_percent,
            ..EngineConfig::default()
        })
    }

    /// Create from EngineConfig, rejecting settings it fails to validate
    pub fn from_config(config: &EngineConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            fee_rate: config.fee_rate,
            max_risk_percent: config.max_risk_percent,
            default_win_rate: config.default_win_rate,
        })
    }

    /// Validate `params` and compute the full risk report
    ///
    /// A stop equal to the entry (or no stop at all) is not an error: the
    /// position size, value, fee and reward are all zero.
    pub fn compute_risk_report(&self, params: &TradeParameters) -> Result<RiskReport, RiskError> {
        params.validate(self.max_risk_percent)?;

        let direction = params.direction;
        let entry = params.entry_price;

        let risk_amount = checked(
            params.account_size.checked_mul(params.risk_percent),
            "riskAmount",
        )? / dec!(100);

        let stop_distance = params
            .stop_loss
            .map(|stop| (entry - stop).abs())
            .unwrap_or(Decimal::ZERO);

        let (position_size, position_value, fee_estimate) = if stop_distance.is_zero() {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        } else {
            let size = checked(risk_amount.checked_div(stop_distance), "positionSize")?;
            let value = checked(size.checked_mul(entry), "positionValue")?;
            let fee = checked(value.checked_mul(self.fee_rate), "feeEstimate")?;
            (size, value, fee)
        };

        let target_distance = params
            .target_price
            .map(|target| (target - entry).abs())
            .unwrap_or(Decimal::ZERO);
        let reward_amount = checked(
            position_size.checked_mul(target_distance),
            "rewardAmount",
        )?;
        let risk_reward_ratio = ratio(reward_amount, risk_amount, "riskRewardRatio")?;

        let current_price = params.mark_price();
        let current_pnl = if current_price == entry {
            Decimal::ZERO
        } else {
            checked(
                direction.pnl(entry, current_price, position_size),
                "currentPnL",
            )?
        };
        let current_pnl_percent = checked(
            ratio(current_pnl, risk_amount, "currentPnLPercent")?.checked_mul(dec!(100)),
            "currentPnLPercent",
        )?;

        let mut take_profit_ladder = Vec::with_capacity(LADDER_PERCENTS.len());
        if params.target_price.is_some() {
            for percent in LADDER_PERCENTS {
                let step = checked(
                    target_distance.checked_mul(Decimal::from(percent)),
                    "takeProfitLadder",
                )? / dec!(100);
                let price = checked(direction.offset(entry, step), "takeProfitLadder")?;
                let profit = checked(
                    direction.pnl(entry, price, position_size),
                    "takeProfitLadder",
                )?;
                take_profit_ladder.push(TakeProfitLevel {
                    percent,
                    price,
                    profit,
                });
            }
        }

        Ok(RiskReport {
            direction,
            entry_price: entry,
            risk_amount,
            stop_distance,
            position_size,
            position_value,
            target_distance,
            reward_amount,
            risk_reward_ratio,
            fee_estimate,
            current_price,
            current_pnl,
            current_pnl_percent,
            take_profit_ladder,
        })
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self {
            fee_rate: dec!(0.001),        // 0.1% per side
            max_risk_percent: dec!(100),  // whole account
            default_win_rate: dec!(50),   // coin flip
        }
    }
}

fn checked(value: Option<Decimal>, quantity: &'static str) -> Result<Decimal, RiskError> {
    value.ok_or(RiskError::InvalidParameters(Violation::Overflow(quantity)))
}

/// `numerator / denominator`, defined as zero for a zero denominator
fn ratio(
    numerator: Decimal,
    denominator: Decimal,
    quantity: &'static str,
) -> Result<Decimal, RiskError> {
    if denominator.is_zero() {
        return Ok(Decimal::ZERO);
    }
    checked(numerator.checked_div(denominator), quantity)
}
