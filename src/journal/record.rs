//! Trade records

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JournalError;
use crate::risk::{Direction, RiskReport, RoundedReport, TradeParameters, MONEY_DP};

/// Lifecycle state of a journaled trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// A computed risk report stored as a trade in the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub exchange: Option<String>,
    pub symbol: Option<String>,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub stop_loss: Option<Decimal>,
    pub target_price: Option<Decimal>,
    pub account_size: Decimal,
    pub risk_percent: Decimal,
    pub report: RoundedReport,
    pub status: TradeStatus,
    pub exit_price: Option<Decimal>,
    pub realized_pnl: Option<Decimal>,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

impl TradeRecord {
    /// Create an open trade from the parameters and the report computed from them
    pub fn new(params: &TradeParameters, report: &RiskReport) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            exchange: None,
            symbol: None,
            direction: params.direction,
            entry_price: params.entry_price,
            stop_loss: params.stop_loss,
            target_price: params.target_price,
            account_size: params.account_size,
            risk_percent: params.risk_percent,
            report: report.rounded(),
            status: TradeStatus::Open,
            exit_price: None,
            realized_pnl: None,
            closed_at: None,
            notes: String::new(),
        }
    }

    /// Attach exchange and symbol
    pub fn with_instrument(mut self, exchange: Option<String>, symbol: Option<String>) -> Self {
        self.exchange = exchange;
        self.symbol = symbol;
        self
    }

    /// Attach free-form notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    /// Close the trade at `exit_price`
    ///
    /// Realized P&L is the direction-signed move times the journaled position
    /// size, less the fee estimate.
    pub fn close(&mut self, exit_price: Decimal, at: DateTime<Utc>) -> Result<(), JournalError> {
        if !self.is_open() {
            return Err(JournalError::AlreadyClosed(self.id));
        }
        if exit_price <= Decimal::ZERO {
            return Err(JournalError::InvalidExitPrice(exit_price));
        }

        let net = self
            .direction
            .pnl(self.entry_price, exit_price, self.report.position_size)
            .and_then(|gross| gross.checked_sub(self.report.fee_estimate))
            .ok_or(JournalError::InvalidExitPrice(exit_price))?;

        self.status = TradeStatus::Closed;
        self.exit_price = Some(exit_price);
        self.realized_pnl =
            Some(net.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero));
        self.closed_at = Some(at);
        self.updated_at = at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskEngine;
    use rust_decimal_macros::dec;

    fn record(direction: Direction, stop: Decimal, target: Decimal) -> TradeRecord {
        let params = TradeParameters::new(direction, dec!(100), dec!(1000), dec!(1))
            .with_stop_loss(stop)
            .with_target_price(target);
        let report = RiskEngine::default().compute_risk_report(&params).unwrap();
        TradeRecord::new(&params, &report)
    }

    #[test]
    fn test_new_record_is_open() {
        let record = record(Direction::Long, dec!(95), dec!(120));
        assert!(record.is_open());
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(record.report.position_size, dec!(2));
        assert!(record.realized_pnl.is_none());
    }

    #[test]
    fn test_with_instrument_and_notes() {
        let record = record(Direction::Long, dec!(95), dec!(120))
            .with_instrument(Some("binance".into()), Some("BTC/USDT".into()))
            .with_notes("breakout");
        assert_eq!(record.exchange.as_deref(), Some("binance"));
        assert_eq!(record.symbol.as_deref(), Some("BTC/USDT"));
        assert_eq!(record.notes, "breakout");
    }

    #[test]
    fn test_close_long_profit_net_of_fees() {
        let mut record = record(Direction::Long, dec!(95), dec!(120));
        let at = Utc::now();
        record.close(dec!(110), at).unwrap();

        // (110 - 100) * 2 - 0.2 fee
        assert_eq!(record.status, TradeStatus::Closed);
        assert_eq!(record.realized_pnl, Some(dec!(19.8)));
        assert_eq!(record.exit_price, Some(dec!(110)));
        assert_eq!(record.closed_at, Some(at));
    }

    #[test]
    fn test_close_short_loss() {
        let mut record = record(Direction::Short, dec!(105), dec!(80));
        record.close(dec!(105), Utc::now()).unwrap();

        // (100 - 105) * 2 - 0.2 fee
        assert_eq!(record.realized_pnl, Some(dec!(-10.2)));
    }

    #[test]
    fn test_close_twice_fails() {
        let mut record = record(Direction::Long, dec!(95), dec!(120));
        record.close(dec!(110), Utc::now()).unwrap();
        assert!(matches!(
            record.close(dec!(111), Utc::now()),
            Err(JournalError::AlreadyClosed(id)) if id == record.id
        ));
    }

    #[test]
    fn test_close_rejects_non_positive_exit() {
        let mut record = record(Direction::Long, dec!(95), dec!(120));
        assert!(matches!(
            record.close(dec!(0), Utc::now()),
            Err(JournalError::InvalidExitPrice(_))
        ));
        assert!(record.is_open());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(record(Direction::Long, dec!(95), dec!(120))).unwrap();
        assert_eq!(json["status"], "OPEN");
        assert_eq!(json["direction"], "LONG");
        assert!(json.get("entryPrice").is_some());
        assert_eq!(json["report"]["riskAmount"], 10.0);
    }
}
