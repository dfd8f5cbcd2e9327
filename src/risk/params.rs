//! Trade parameters and the loosely-typed input record they are parsed from

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use super::types::{Direction, RiskError, Violation};

/// Validated-shape inputs to the risk engine
///
/// Semantic checks (positivity, stop/target placement) happen in
/// [`TradeParameters::validate`], which the engine runs before computing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeParameters {
    pub direction: Direction,
    pub entry_price: Decimal,
    pub stop_loss: Option<Decimal>,
    pub target_price: Option<Decimal>,
    pub account_size: Decimal,
    /// Percent of the account at risk, e.g. 2 for 2%
    pub risk_percent: Decimal,
    /// Mark price for unrealized P&L; the entry price when absent
    pub current_price: Option<Decimal>,
}

impl TradeParameters {
    /// Create parameters with no stop, target or mark price
    pub fn new(
        direction: Direction,
        entry_price: Decimal,
        account_size: Decimal,
        risk_percent: Decimal,
    ) -> Self {
        Self {
            direction,
            entry_price,
            stop_loss: None,
            target_price: None,
            account_size,
            risk_percent,
            current_price: None,
        }
    }

    /// Set the stop-loss price
    pub fn with_stop_loss(mut self, stop_loss: Decimal) -> Self {
        self.stop_loss = Some(stop_loss);
        self
    }

    /// Set the target price
    pub fn with_target_price(mut self, target_price: Decimal) -> Self {
        self.target_price = Some(target_price);
        self
    }

    /// Set the current mark price
    pub fn with_current_price(mut self, current_price: Decimal) -> Self {
        self.current_price = Some(current_price);
        self
    }

    /// Mark price used for unrealized P&L
    pub fn mark_price(&self) -> Decimal {
        self.current_price.unwrap_or(self.entry_price)
    }

    /// Check every invariant, returning the first one violated
    pub fn validate(&self, max_risk_percent: Decimal) -> Result<(), Violation> {
        let numeric = [
            ("entryPrice", Some(self.entry_price)),
            ("stopLoss", self.stop_loss),
            ("targetPrice", self.target_price),
            ("accountSize", Some(self.account_size)),
            ("riskPercent", Some(self.risk_percent)),
            ("currentPrice", self.current_price),
        ];
        for (field, value) in numeric {
            if let Some(value) = value {
                if value <= Decimal::ZERO {
                    return Err(Violation::NonPositive { field, value });
                }
            }
        }

        if self.risk_percent > max_risk_percent {
            return Err(Violation::RiskPercentAboveMax {
                value: self.risk_percent,
                max: max_risk_percent,
            });
        }

        let entry = self.entry_price;
        if let Some(stop) = self.stop_loss {
            // Equal to entry is the degenerate zero-size case, not a violation
            let wrong_side = match self.direction {
                Direction::Long => stop > entry,
                Direction::Short => stop < entry,
            };
            if wrong_side {
                return Err(Violation::StopOnWrongSide {
                    direction: self.direction,
                    stop,
                    entry,
                });
            }
        }

        if let Some(target) = self.target_price {
            let wrong_side = match self.direction {
                Direction::Long => target <= entry,
                Direction::Short => target >= entry,
            };
            if wrong_side {
                return Err(Violation::TargetOnWrongSide {
                    direction: self.direction,
                    target,
                    entry,
                });
            }
        }

        Ok(())
    }
}

/// Calculator input as received from a caller
///
/// Every field is optional so that partial records can be merged (scenario
/// overrides) and so that absent mandatory fields are reported by name.
/// Numeric fields accept JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_size: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_percent: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Value>,
}

impl TradeInput {
    /// Parse into typed parameters
    ///
    /// Absent mandatory fields and unparseable numbers yield
    /// [`RiskError::MissingField`]; an unknown direction yields
    /// [`RiskError::InvalidParameters`].
    pub fn to_parameters(&self) -> Result<TradeParameters, RiskError> {
        let direction = self
            .direction
            .as_ref()
            .ok_or_else(|| RiskError::missing("direction"))?;

        let entry_price = required("entryPrice", &self.entry_price)?;
        let account_size = required("accountSize", &self.account_size)?;
        let risk_percent = required("riskPercent", &self.risk_percent)?;
        let stop_loss = optional("stopLoss", &self.stop_loss)?;
        let target_price = optional("targetPrice", &self.target_price)?;
        let current_price = optional("currentPrice", &self.current_price)?;

        let direction = match direction {
            Value::String(text) => text.parse::<Direction>()?,
            other => return Err(Violation::UnknownDirection(other.to_string()).into()),
        };

        Ok(TradeParameters {
            direction,
            entry_price,
            stop_loss,
            target_price,
            account_size,
            risk_percent,
            current_price,
        })
    }

    /// Overlay `overrides` onto this record, field by field
    pub fn merged_with(&self, overrides: &TradeInput) -> TradeInput {
        fn pick<T: Clone>(over: &Option<T>, base: &Option<T>) -> Option<T> {
            over.clone().or_else(|| base.clone())
        }

        TradeInput {
            exchange: pick(&overrides.exchange, &self.exchange),
            symbol: pick(&overrides.symbol, &self.symbol),
            direction: pick(&overrides.direction, &self.direction),
            entry_price: pick(&overrides.entry_price, &self.entry_price),
            stop_loss: pick(&overrides.stop_loss, &self.stop_loss),
            target_price: pick(&overrides.target_price, &self.target_price),
            account_size: pick(&overrides.account_size, &self.account_size),
            risk_percent: pick(&overrides.risk_percent, &self.risk_percent),
            current_price: pick(&overrides.current_price, &self.current_price),
        }
    }

    /// Fill a missing direction from where the stop sits relative to entry
    ///
    /// Leaves the record untouched when a direction is already set or the
    /// stop and entry don't determine one.
    pub fn with_inferred_direction(mut self) -> TradeInput {
        if self.direction.is_some() {
            return self;
        }
        let entry = optional("entryPrice", &self.entry_price).ok().flatten();
        let stop = optional("stopLoss", &self.stop_loss).ok().flatten();
        if let (Some(entry), Some(stop)) = (entry, stop) {
            let inferred = if stop < entry {
                Some(Direction::Long)
            } else if stop > entry {
                Some(Direction::Short)
            } else {
                None
            };
            self.direction = inferred.map(|d| Value::String(d.as_str().to_string()));
        }
        self
    }
}

impl From<&TradeParameters> for TradeInput {
    fn from(params: &TradeParameters) -> Self {
        let number = |value: Decimal| Value::String(value.to_string());
        TradeInput {
            exchange: None,
            symbol: None,
            direction: Some(Value::String(params.direction.as_str().to_string())),
            entry_price: Some(number(params.entry_price)),
            stop_loss: params.stop_loss.map(number),
            target_price: params.target_price.map(number),
            account_size: Some(number(params.account_size)),
            risk_percent: Some(number(params.risk_percent)),
            current_price: params.current_price.map(number),
        }
    }
}

fn required(field: &'static str, value: &Option<Value>) -> Result<Decimal, RiskError> {
    match value {
        Some(value) => parse_decimal(field, value),
        None => Err(RiskError::missing(field)),
    }
}

fn optional(field: &'static str, value: &Option<Value>) -> Result<Option<Decimal>, RiskError> {
    value.as_ref().map(|v| parse_decimal(field, v)).transpose()
}

fn parse_decimal(field: &'static str, value: &Value) -> Result<Decimal, RiskError> {
    match value {
        // A JSON number is always numeric; failing to fit a Decimal is a range problem
        Value::Number(number) => parse_numeric_text(&number.to_string())
            .ok_or_else(|| Violation::OutOfRange(field).into()),
        Value::String(text) => {
            let text = text.trim();
            parse_numeric_text(text).ok_or_else(|| {
                // Numeric text that overflows or underflows a Decimal is classified
                // the same as a JSON number would be
                if text.parse::<f64>().is_ok_and(f64::is_finite) {
                    RiskError::from(Violation::OutOfRange(field))
                } else {
                    RiskError::missing(field)
                }
            })
        }
        _ => Err(RiskError::missing(field)),
    }
}

fn parse_numeric_text(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}
