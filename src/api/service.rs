//! Calculator service

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::{CalculationResponse, CompareRequest, CompareResponse};
use crate::journal::{JournalError, TradeRecord, TradeRepository};
use crate::risk::{ErrorBody, RiskEngine, RiskError, TradeInput};
use crate::telemetry::{increment, record_latency, CounterMetric, LatencyMetric};

/// Errors surfaced by the calculator service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Risk(#[from] RiskError),
    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),
}

impl ServiceError {
    /// Serializable payload for the error
    pub fn body(&self) -> ErrorBody {
        match self {
            ServiceError::Risk(err) => ErrorBody::from(err),
            ServiceError::Journal(err) => ErrorBody {
                kind: "JOURNAL_ERROR".to_string(),
                message: err.to_string(),
                field: None,
            },
        }
    }
}

/// Entry point for single calculations and scenario comparisons
#[derive(Clone)]
pub struct CalculatorService {
    engine: RiskEngine,
    journal: Option<Arc<dyn TradeRepository>>,
}

impl CalculatorService {
    pub fn new(engine: RiskEngine) -> Self {
        Self {
            engine,
            journal: None,
        }
    }

    /// Attach a journal for saved calculations
    pub fn with_journal(mut self, journal: Arc<dyn TradeRepository>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Compute a risk report for one input record
    ///
    /// When `save` is set and a journal is attached the report is stored as
    /// an open trade and its id returned in the response.
    pub async fn calculate(
        &self,
        input: &TradeInput,
        save: bool,
    ) -> Result<CalculationResponse, ServiceError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let computed = input.to_parameters().and_then(|params| {
            self.engine
                .compute_risk_report(&params)
                .map(|report| (params, report))
        });
        let (params, report) = match computed {
            Ok(computed) => computed,
            Err(err) => {
                increment(CounterMetric::ValidationFailures, 1);
                tracing::warn!(%request_id, kind = err.kind(), error = %err, "Calculation rejected");
                return Err(err.into());
            }
        };
        increment(CounterMetric::Calculations, 1);

        let trade_id = match (&self.journal, save) {
            (Some(journal), true) => {
                let record = TradeRecord::new(&params, &report)
                    .with_instrument(input.exchange.clone(), input.symbol.clone());
                let record = journal.insert(record).await?;
                increment(CounterMetric::TradesRecorded, 1);
                tracing::info!(%request_id, trade_id = %record.id, "Trade journaled");
                Some(record.id)
            }
            (None, true) => {
                tracing::warn!(%request_id, "Save requested but no journal is attached");
                None
            }
            (_, false) => None,
        };

        let elapsed = started.elapsed();
        record_latency(LatencyMetric::Calculation, elapsed);
        tracing::debug!(
            %request_id,
            direction = %params.direction,
            risk_amount = %report.risk_amount,
            position_size = %report.position_size,
            elapsed_us = elapsed.as_micros() as u64,
            "Risk report computed"
        );

        Ok(CalculationResponse {
            request_id,
            timestamp: Utc::now(),
            exchange: input.exchange.clone(),
            symbol: input.symbol.clone(),
            report: report.rounded(),
            trade_id,
        })
    }

    /// Evaluate each scenario of `request` against its base parameters
    ///
    /// Scenario failures are reported in place; only an out-of-range win
    /// rate fails the request.
    pub async fn compare(
        &self,
        request: &CompareRequest,
        parallel: bool,
    ) -> Result<CompareResponse, ServiceError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let result = if parallel {
            self.engine
                .compare_scenarios_parallel(
                    &request.base_params,
                    &request.scenarios,
                    request.win_rate,
                )
                .await
        } else {
            self.engine.compare_scenarios(
                &request.base_params,
                &request.scenarios,
                request.win_rate,
            )
        };
        let comparison = match result {
            Ok(comparison) => comparison,
            Err(err) => {
                increment(CounterMetric::ValidationFailures, 1);
                tracing::warn!(%request_id, kind = err.kind(), error = %err, "Comparison rejected");
                return Err(err.into());
            }
        };

        let failed = comparison.scenarios.iter().filter(|s| !s.is_ok()).count();
        increment(CounterMetric::Scenarios, comparison.scenarios.len() as u64);
        let elapsed = started.elapsed();
        record_latency(LatencyMetric::Comparison, elapsed);
        tracing::info!(
            %request_id,
            scenarios = comparison.scenarios.len(),
            failed,
            parallel,
            win_rate = %comparison.win_rate,
            "Scenarios compared"
        );

        Ok(CompareResponse::new(request_id, comparison.rounded()))
    }
}
