//! Risk report and its rounded wire form

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::types::Direction;

/// Decimal places for monetary amounts and ratios
pub const MONEY_DP: u32 = 2;
/// Decimal places for position size and price-like fields
pub const SIZE_DP: u32 = 8;

/// Fractions of the target distance used for partial exits
pub const LADDER_PERCENTS: [u32; 4] = [25, 50, 75, 100];

/// One partial-exit level on the way to target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakeProfitLevel {
    /// Percent of the distance to target, 25..=100
    pub percent: u32,
    pub price: Decimal,
    /// P&L of the full position if closed at `price`
    pub profit: Decimal,
}

/// Full-precision sizing and risk/reward figures for one trade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskReport {
    pub direction: Direction,
    pub entry_price: Decimal,
    pub risk_amount: Decimal,
    pub stop_distance: Decimal,
    pub position_size: Decimal,
    pub position_value: Decimal,
    pub target_distance: Decimal,
    pub reward_amount: Decimal,
    pub risk_reward_ratio: Decimal,
    pub fee_estimate: Decimal,
    pub current_price: Decimal,
    pub current_pnl: Decimal,
    pub current_pnl_percent: Decimal,
    pub take_profit_ladder: Vec<TakeProfitLevel>,
}

impl RiskReport {
    /// Round every field to its documented precision for serialization
    pub fn rounded(&self) -> RoundedReport {
        RoundedReport {
            direction: self.direction,
            entry_price: round_size(self.entry_price),
            risk_amount: round_money(self.risk_amount),
            stop_distance: round_size(self.stop_distance),
            position_size: round_size(self.position_size),
            position_value: round_money(self.position_value),
            target_distance: round_size(self.target_distance),
            reward_amount: round_money(self.reward_amount),
            risk_reward_ratio: round_money(self.risk_reward_ratio),
            fee_estimate: round_money(self.fee_estimate),
            current_price: round_size(self.current_price),
            current_pnl: round_money(self.current_pnl),
            current_pnl_percent: round_money(self.current_pnl_percent),
            take_profit_ladder: self
                .take_profit_ladder
                .iter()
                .map(|level| RoundedLevel {
                    percent: level.percent,
                    price: round_size(level.price),
                    profit: round_money(level.profit),
                })
                .collect(),
        }
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        self.rounded().format_table()
    }
}

impl RoundedReport {
    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let r = self;
        let mut out = format!(
            r#"
══════════════════════════════════════════════════════
               RISK REPORT ({})
══════════════════════════════════════════════════════

SIZING
───────────────────────────────────────────────────────
Entry Price:      {}
Risk Amount:      {:.2}
Stop Distance:    {}
Position Size:    {}
Position Value:   {:.2}
Fee Estimate:     {:.2}

REWARD
───────────────────────────────────────────────────────
Target Distance:  {}
Reward Amount:    {:.2}
Risk/Reward:      {:.2}

MARK
───────────────────────────────────────────────────────
Current Price:    {}
Current P&L:      {:+.2} ({:+.2}% of risk)
"#,
            r.direction,
            r.entry_price.normalize(),
            r.risk_amount,
            r.stop_distance.normalize(),
            r.position_size.normalize(),
            r.position_value,
            r.fee_estimate,
            r.target_distance.normalize(),
            r.reward_amount,
            r.risk_reward_ratio,
            r.current_price.normalize(),
            r.current_pnl,
            r.current_pnl_percent,
        );

        if !r.take_profit_ladder.is_empty() {
            out.push_str("\nTAKE PROFIT LADDER\n");
            out.push_str("───────────────────────────────────────────────────────\n");
            for level in &r.take_profit_ladder {
                out.push_str(&format!(
                    "TP {:>3}%:          {} -> {:+.2}\n",
                    level.percent,
                    level.price.normalize(),
                    level.profit
                ));
            }
        }
        out.push_str("══════════════════════════════════════════════════════\n");
        out
    }
}

/// Take-profit level with wire precision applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundedLevel {
    pub percent: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub profit: Decimal,
}

/// Risk report as serialized: monetary fields at 2 dp, sizes and prices at 8 dp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundedReport {
    pub direction: Direction,
    #[serde(with = "rust_decimal::serde::float")]
    pub entry_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub risk_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub stop_distance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub position_size: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub position_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub target_distance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub risk_reward_ratio: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee_estimate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_price: Decimal,
    #[serde(rename = "currentPnL", with = "rust_decimal::serde::float")]
    pub current_pnl: Decimal,
    #[serde(rename = "currentPnLPercent", with = "rust_decimal::serde::float")]
    pub current_pnl_percent: Decimal,
    pub take_profit_ladder: Vec<RoundedLevel>,
}

pub(crate) fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn round_size(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(SIZE_DP, RoundingStrategy::MidpointAwayFromZero)
}
