use crate::batch;
use crate::marketplace::Marketplace;
use crate::reconcile::reconcile;
use anyhow::Context;
use derive_more::Display;
use std::future::Future;
use time::OffsetDateTime;
use watch_types::inventory::InventoryRecord;

#[derive(Clone, Debug, PartialEq, Eq, Display)]
#[display(
    "{marketplace}: {catalog_size} offers in catalog, {stocks} stocks ({nonzero_stocks} in stock) \
     in {stock_batches} batches, {prices} prices in {price_batches} batches"
)]
pub struct SyncReport {
    pub marketplace: String,
    pub catalog_size: usize,
    pub stocks: usize,
    pub nonzero_stocks: usize,
    pub prices: usize,
    pub stock_batches: usize,
    pub price_batches: usize,
}

/// Uploads `items` batch by batch, stopping at the first failed request.
async fn upload<'a, T, F, Fut>(
    name: &str,
    kind: &str,
    items: &'a [T],
    size: usize,
    mut send: F,
) -> Result<usize, anyhow::Error>
where
    F: FnMut(&'a [T]) -> Fut,
    Fut: Future<Output = Result<serde_json::Value, anyhow::Error>>,
{
    let total = batch::chunk(items, size).len();
    for (i, batch) in batch::chunk(items, size).enumerate() {
        send(batch)
            .await
            .with_context(|| format!("{name}: {kind} batch {}/{total} failed", i + 1))?;
        log::info!(
            "{name}: uploaded {kind} batch {}/{total} ({} entries)",
            i + 1,
            batch.len()
        );
    }
    Ok(total)
}

/// Brings one marketplace account in line with the inventory snapshot.
pub async fn sync_account<M: Marketplace>(
    marketplace: &M,
    inventory: &[InventoryRecord],
) -> Result<SyncReport, anyhow::Error> {
    let name = marketplace.name();
    let catalog = marketplace
        .list_offer_ids()
        .await
        .with_context(|| format!("Unable to list {name} catalog"))?;
    log::info!("{name}: {} offers in catalog", catalog.len());

    let reconciliation = reconcile(inventory, &catalog)?;
    let updated_at = OffsetDateTime::now_utc();
    let stocks = reconciliation
        .stocks
        .iter()
        .map(|s| marketplace.stock_entry(s, updated_at))
        .collect::<Vec<_>>();
    let stock_batches = upload(name, "stocks", &stocks, M::STOCK_BATCH_SIZE, |batch| {
        marketplace.update_stocks(batch)
    })
    .await?;

    let prices = reconciliation
        .prices()
        .with_context(|| format!("{name}: stocks updated, prices not sent"))?
        .iter()
        .map(|p| marketplace.price_entry(p))
        .collect::<Vec<_>>();
    let price_batches = upload(name, "prices", &prices, M::PRICE_BATCH_SIZE, |batch| {
        marketplace.update_prices(batch)
    })
    .await?;

    Ok(SyncReport {
        marketplace: name.to_string(),
        catalog_size: catalog.len(),
        stocks: stocks.len(),
        nonzero_stocks: reconciliation.nonzero_stocks().count(),
        prices: prices.len(),
        stock_batches,
        price_batches,
    })
}
