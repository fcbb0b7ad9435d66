use async_trait::async_trait;
use serde::Serialize;
use time::OffsetDateTime;
use watch_types::{OfferId, PriceLevel, StockLevel};

/// Seller API of one marketplace account.
///
/// Besides the three remote operations an implementation owns its payload
/// shapes and the batch sizes its endpoints accept.
#[async_trait]
pub trait Marketplace: Send + Sync {
    type Stock: Serialize + Send + Sync;
    type Price: Serialize + Send + Sync;

    const STOCK_BATCH_SIZE: usize;
    const PRICE_BATCH_SIZE: usize;

    fn name(&self) -> &str;

    fn stock_entry(&self, level: &StockLevel, updated_at: OffsetDateTime) -> Self::Stock;

    fn price_entry(&self, level: &PriceLevel) -> Self::Price;

    /// Every offer id of the catalog, following pagination to the end.
    async fn list_offer_ids(&self) -> Result<Vec<OfferId>, anyhow::Error>;

    async fn update_stocks(
        &self,
        batch: &[Self::Stock],
    ) -> Result<serde_json::Value, anyhow::Error>;

    async fn update_prices(
        &self,
        batch: &[Self::Price],
    ) -> Result<serde_json::Value, anyhow::Error>;
}
