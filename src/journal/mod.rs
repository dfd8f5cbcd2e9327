//! Trade journal
//!
//! Persistence seam for computed risk reports. The journal assigns identity
//! and timestamps; the risk engine never does.

mod memory;
mod record;

pub use memory::InMemoryTradeRepository;
pub use record::{TradeRecord, TradeStatus};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default number of records per page
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Largest page a caller may request
pub const MAX_PAGE_SIZE: usize = 100;

/// Journal errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalError {
    #[error("Trade not found: {0}")]
    NotFound(Uuid),
    #[error("Trade already exists: {0}")]
    Duplicate(Uuid),
    #[error("Trade already closed: {0}")]
    AlreadyClosed(Uuid),
    #[error("Invalid exit price: {0}")]
    InvalidExitPrice(Decimal),
}

/// Query over journaled trades
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeFilter {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub status: Option<TradeStatus>,
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for TradeFilter {
    fn default() -> Self {
        Self {
            symbol: None,
            status: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TradeFilter {
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_status(mut self, status: TradeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// Whether `record` passes the symbol and status criteria
    pub fn matches(&self, record: &TradeRecord) -> bool {
        let symbol_ok = match &self.symbol {
            Some(symbol) => record
                .symbol
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(symbol)),
            None => true,
        };
        let status_ok = self.status.map_or(true, |status| record.status == status);
        symbol_ok && status_ok
    }

    /// Page number and size clamped to usable values
    pub fn normalized_page(&self) -> (usize, usize) {
        (self.page.max(1), self.page_size.clamp(1, MAX_PAGE_SIZE))
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    /// Matching records across all pages
    pub total: usize,
}

/// Storage for trade records
#[async_trait]
pub trait TradeRepository: Send + Sync {
    /// Store a new record
    async fn insert(&self, record: TradeRecord) -> Result<TradeRecord, JournalError>;
    /// Fetch a record by id
    async fn get(&self, id: Uuid) -> Result<TradeRecord, JournalError>;
    /// Matching records, newest first
    async fn list(&self, filter: &TradeFilter) -> Result<Page<TradeRecord>, JournalError>;
    /// Close an open trade at `exit_price`
    async fn close(&self, id: Uuid, exit_price: Decimal) -> Result<TradeRecord, JournalError>;
    /// Remove a record
    async fn delete(&self, id: Uuid) -> Result<(), JournalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_default() {
        let filter = TradeFilter::default();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, DEFAULT_PAGE_SIZE);
        assert!(filter.symbol.is_none());
    }

    #[test]
    fn test_filter_deserialize_defaults() {
        let filter: TradeFilter = serde_json::from_str(r#"{"status":"OPEN"}"#).unwrap();
        assert_eq!(filter.status, Some(TradeStatus::Open));
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_normalized_page_clamps() {
        assert_eq!(TradeFilter::default().with_page(0, 0).normalized_page(), (1, 1));
        assert_eq!(
            TradeFilter::default().with_page(3, 1000).normalized_page(),
            (3, MAX_PAGE_SIZE)
        );
    }

    #[test]
    fn test_journal_error_display() {
        let id = Uuid::new_v4();
        assert_eq!(
            JournalError::NotFound(id).to_string(),
            format!("Trade not found: {}", id)
        );
    }
}
