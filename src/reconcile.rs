use anyhow::Context;
use itertools::Itertools;
use std::collections::HashSet;
use watch_types::inventory::InventoryRecord;
use watch_types::price::parse_price;
use watch_types::{OfferId, PriceLevel, StockLevel};

/// Matched offer with the price text as it appears in the spreadsheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchedPrice {
    pub offer_id: OfferId,
    pub raw: String,
}

/// Stock and price upserts for one marketplace catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// One entry per distinct catalog offer: matched offers in spreadsheet
    /// order, then the zero-filled remainder in catalog order.
    pub stocks: Vec<StockLevel>,
    /// Matched offers only. Parsed separately so a bad price never holds back stocks.
    pub matched: Vec<MatchedPrice>,
}

impl Reconciliation {
    pub fn nonzero_stocks(&self) -> impl Iterator<Item = &StockLevel> {
        self.stocks.iter().filter(|s| s.count != 0)
    }

    pub fn prices(&self) -> Result<Vec<PriceLevel>, anyhow::Error> {
        self.matched
            .iter()
            .map(|m| {
                let price = parse_price(&m.raw)
                    .with_context(|| format!("Inventory record {:?}", m.offer_id.as_str()))?;
                Ok(PriceLevel {
                    offer_id: m.offer_id.clone(),
                    price,
                })
            })
            .collect()
    }
}

pub fn reconcile(
    records: &[InventoryRecord],
    catalog: &[OfferId],
) -> Result<Reconciliation, anyhow::Error> {
    let mut remaining = catalog.iter().map(|id| id.as_str()).collect::<HashSet<_>>();
    let mut matched = HashSet::new();
    let mut res = Reconciliation::default();

    for record in records {
        let code = record.code.as_str();
        if !remaining.remove(code) {
            if matched.contains(code) {
                log::warn!("Duplicate inventory code {code:?}, keeping the first row");
            }
            continue;
        }
        matched.insert(code);
        let offer_id = OfferId::from(code);
        let count = record
            .stock_count()
            .with_context(|| format!("Inventory record {code:?}"))?;
        res.stocks.push(StockLevel {
            offer_id: offer_id.clone(),
            count,
        });
        res.matched.push(MatchedPrice {
            offer_id,
            raw: record.price.clone(),
        });
    }

    res.stocks.extend(
        catalog
            .iter()
            .filter(|id| !matched.contains(id.as_str()))
            .unique()
            .map(|offer_id| StockLevel {
                offer_id: offer_id.clone(),
                count: 0,
            }),
    );
    Ok(res)
}
