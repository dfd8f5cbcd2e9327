//! trade-risk: position sizing and risk/reward engine for a trading journal
//!
//! This library provides the core components for:
//! - Risk-based position sizing with fee estimates
//! - Reward, risk/reward ratio and take-profit ladders
//! - Mark-to-market P&L
//! - What-if scenario comparison
//! - A calculator service with an optional trade journal
//! - Logging and metrics

pub mod api;
pub mod cli;
pub mod config;
pub mod journal;
pub mod risk;
pub mod telemetry;
