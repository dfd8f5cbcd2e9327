//! In-memory trade repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{JournalError, Page, TradeFilter, TradeRecord, TradeRepository};

/// Trade repository backed by a shared map
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTradeRepository {
    trades: Arc<RwLock<HashMap<Uuid, TradeRecord>>>,
}

impl InMemoryTradeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored trades
    pub async fn len(&self) -> usize {
        self.trades.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.trades.read().await.is_empty()
    }
}

#[async_trait]
impl TradeRepository for InMemoryTradeRepository {
    async fn insert(&self, record: TradeRecord) -> Result<TradeRecord, JournalError> {
        let mut trades = self.trades.write().await;
        if trades.contains_key(&record.id) {
            return Err(JournalError::Duplicate(record.id));
        }
        trades.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<TradeRecord, JournalError> {
        self.trades
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(JournalError::NotFound(id))
    }

    async fn list(&self, filter: &TradeFilter) -> Result<Page<TradeRecord>, JournalError> {
        let (page, page_size) = filter.normalized_page();

        let mut matching: Vec<TradeRecord> = self
            .trades
            .read()
            .await
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        // Newest first; id breaks ties so paging is stable
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = matching.len();
        let items = matching
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();

        Ok(Page {
            items,
            page,
            page_size,
            total,
        })
    }

    async fn close(&self, id: Uuid, exit_price: Decimal) -> Result<TradeRecord, JournalError> {
        let mut trades = self.trades.write().await;
        let record = trades.get_mut(&id).ok_or(JournalError::NotFound(id))?;
        record.close(exit_price, Utc::now())?;
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), JournalError> {
        self.trades
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(JournalError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::TradeStatus;
    use crate::risk::{Direction, RiskEngine, TradeParameters};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn make_record(symbol: &str, minutes_ago: i64) -> TradeRecord {
        let params = TradeParameters::new(Direction::Long, dec!(100), dec!(1000), dec!(1))
            .with_stop_loss(dec!(95))
            .with_target_price(dec!(120));
        let report = RiskEngine::default().compute_risk_report(&params).unwrap();
        let mut record = TradeRecord::new(&params, &report)
            .with_instrument(Some("binance".into()), Some(symbol.into()));
        record.created_at -= Duration::minutes(minutes_ago);
        record.updated_at = record.created_at;
        record
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryTradeRepository::new();
        let record = make_record("BTC/USDT", 0);
        let id = record.id;

        repo.insert(record.clone()).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap(), record);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_insert_duplicate_fails() {
        let repo = InMemoryTradeRepository::new();
        let record = make_record("BTC/USDT", 0);

        repo.insert(record.clone()).await.unwrap();
        assert_eq!(
            repo.insert(record.clone()).await,
            Err(JournalError::Duplicate(record.id))
        );
    }

    #[tokio::test]
    async fn test_get_missing() {
        let repo = InMemoryTradeRepository::new();
        let id = Uuid::new_v4();
        assert_eq!(repo.get(id).await, Err(JournalError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_list_newest_first_with_paging() {
        let repo = InMemoryTradeRepository::new();
        for minutes_ago in [30, 10, 20] {
            repo.insert(make_record("BTC/USDT", minutes_ago)).await.unwrap();
        }

        let page = repo
            .list(&TradeFilter::default().with_page(1, 2))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert!(page.items[0].created_at > page.items[1].created_at);

        let second = repo
            .list(&TradeFilter::default().with_page(2, 2))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(second.items[0].created_at < page.items[1].created_at);

        let beyond = repo
            .list(&TradeFilter::default().with_page(5, 2))
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 3);
    }

    #[tokio::test]
    async fn test_list_filters_symbol_and_status() {
        let repo = InMemoryTradeRepository::new();
        let btc = repo.insert(make_record("BTC/USDT", 2)).await.unwrap();
        repo.insert(make_record("ETH/USDT", 1)).await.unwrap();
        repo.insert(make_record("BTC/USDT", 0)).await.unwrap();
        repo.close(btc.id, dec!(110)).await.unwrap();

        let page = repo
            .list(&TradeFilter::default().with_symbol("btc/usdt"))
            .await
            .unwrap();
        assert_eq!(page.total, 2);

        let closed = repo
            .list(&TradeFilter::default().with_status(TradeStatus::Closed))
            .await
            .unwrap();
        assert_eq!(closed.total, 1);
        assert_eq!(closed.items[0].id, btc.id);

        let open_btc = repo
            .list(
                &TradeFilter::default()
                    .with_symbol("BTC/USDT")
                    .with_status(TradeStatus::Open),
            )
            .await
            .unwrap();
        assert_eq!(open_btc.total, 1);
    }

    #[tokio::test]
    async fn test_close_updates_record() {
        let repo = InMemoryTradeRepository::new();
        let record = repo.insert(make_record("BTC/USDT", 0)).await.unwrap();

        let closed = repo.close(record.id, dec!(110)).await.unwrap();
        assert_eq!(closed.status, TradeStatus::Closed);
        assert_eq!(closed.realized_pnl, Some(dec!(19.8)));
        assert_eq!(repo.get(record.id).await.unwrap(), closed);

        assert_eq!(
            repo.close(record.id, dec!(111)).await,
            Err(JournalError::AlreadyClosed(record.id))
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryTradeRepository::new();
        let record = repo.insert(make_record("BTC/USDT", 0)).await.unwrap();

        repo.delete(record.id).await.unwrap();
        assert!(repo.is_empty().await);
        assert_eq!(
            repo.delete(record.id).await,
            Err(JournalError::NotFound(record.id))
        );
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = InMemoryTradeRepository::new();
        let other = repo.clone();
        let record = repo.insert(make_record("BTC/USDT", 0)).await.unwrap();
        assert!(other.get(record.id).await.is_ok());
    }
}
