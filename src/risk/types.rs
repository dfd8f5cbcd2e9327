//! Risk engine types and errors

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Profit when price rises
    Long,
    /// Profit when price falls
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }

    /// Signed P&L of moving from `entry` to `exit` with `size` units.
    ///
    /// Returns `None` on decimal overflow.
    pub fn pnl(&self, entry: Decimal, exit: Decimal, size: Decimal) -> Option<Decimal> {
        let favourable_move = match self {
            Direction::Long => exit.checked_sub(entry)?,
            Direction::Short => entry.checked_sub(exit)?,
        };
        favourable_move.checked_mul(size)
    }

    /// Price `distance` away from `base` in the profitable direction
    pub fn offset(&self, base: Decimal, distance: Decimal) -> Option<Decimal> {
        match self {
            Direction::Long => base.checked_add(distance),
            Direction::Short => base.checked_sub(distance),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(Direction::Long),
            "short" => Ok(Direction::Short),
            _ => Err(Violation::UnknownDirection(s.to_string())),
        }
    }
}

/// A semantic invariant broken by otherwise well-formed input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: Decimal },

    #[error("riskPercent {value} exceeds maximum of {max}")]
    RiskPercentAboveMax { value: Decimal, max: Decimal },

    #[error("direction must be LONG or SHORT, got {0:?}")]
    UnknownDirection(String),

    #[error("stopLoss {stop} is on the wrong side of entryPrice {entry} for a {direction} trade")]
    StopOnWrongSide {
        direction: Direction,
        stop: Decimal,
        entry: Decimal,
    },

    #[error(
        "targetPrice {target} is on the wrong side of entryPrice {entry} for a {direction} trade"
    )]
    TargetOnWrongSide {
        direction: Direction,
        target: Decimal,
        entry: Decimal,
    },

    #[error("win rate must be between 0 and 100, got {0}")]
    WinRateOutOfRange(Decimal),

    #[error("{0} is outside the representable numeric range")]
    OutOfRange(&'static str),

    #[error("{0} overflowed while computing the report")]
    Overflow(&'static str),
}

/// Risk engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskError {
    /// A mandatory field was absent or not a number
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },
    /// Inputs were present but broke an invariant
    #[error("Invalid trade parameters: {0}")]
    InvalidParameters(#[from] Violation),
}

impl RiskError {
    pub fn missing(field: &'static str) -> Self {
        RiskError::MissingField { field }
    }

    /// Stable machine-readable kind for serialized error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            RiskError::MissingField { .. } => "MISSING_FIELD",
            RiskError::InvalidParameters(_) => "INVALID_PARAMETERS",
        }
    }
}

/// Serializable error payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&RiskError> for ErrorBody {
    fn from(err: &RiskError) -> Self {
        let field = match err {
            RiskError::MissingField { field } => Some(field.to_string()),
            RiskError::InvalidParameters(_) => None,
        };
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            field,
        }
    }
}
