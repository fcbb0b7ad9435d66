use crate::batch;
use crate::config::Campaign;
use crate::http::{send_json, with_json_body};
use crate::marketplace::Marketplace;
use crate::paging::{collect_pages, Page};
use async_trait::async_trait;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};
use watch_types::{OfferId, PriceLevel, StockLevel};

const LIST_LIMIT: usize = 200;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarketSku {
    pub sku: String,
    pub warehouse_id: u64,
    pub items: Vec<MarketStockItem>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarketStockItem {
    pub count: u32,
    #[serde(rename = "type")]
    pub kind: StockKind,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockKind {
    /// Sellable stock.
    Fit,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MarketOffer {
    pub id: String,
    pub price: MarketPrice,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarketPrice {
    pub value: u64,
    pub currency_id: &'static str,
}

#[derive(Deserialize, Debug)]
struct OfferMappingResponse {
    result: OfferMappingResult,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OfferMappingResult {
    #[serde(default)]
    offer_mapping_entries: Vec<OfferMappingEntry>,
    #[serde(default)]
    paging: Paging,
}

#[derive(Deserialize, Debug)]
struct OfferMappingEntry {
    offer: MappedOffer,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct MappedOffer {
    shop_sku: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Paging {
    next_page_token: Option<String>,
}

#[derive(Serialize)]
struct StocksRequest<'a> {
    skus: &'a [MarketSku],
}

#[derive(Serialize)]
struct PricesRequest<'a> {
    offers: &'a [MarketOffer],
}

/// Stock timestamps are sent in UTC with whole seconds.
pub fn stock_timestamp(t: OffsetDateTime) -> OffsetDateTime {
    let t = t.to_offset(UtcOffset::UTC);
    t - time::Duration::nanoseconds(i64::from(t.nanosecond()))
}

/// Yandex Market seller API scoped to one campaign.
pub struct MarketClient {
    client: ClientWithMiddleware,
    base_url: String,
    token: String,
    campaign: Campaign,
    name: String,
}

impl MarketClient {
    pub fn new(
        client: ClientWithMiddleware,
        base_url: String,
        token: String,
        campaign: Campaign,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            name: format!("Yandex Market {}", campaign.name),
            campaign,
        }
    }

    fn campaign_url(&self, path: &str) -> String {
        format!("{}/campaigns/{}/{path}", self.base_url, self.campaign.id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    async fn offer_mapping_page(
        &self,
        page_token: Option<String>,
    ) -> Result<Page<OfferId>, anyhow::Error> {
        let mut query = vec![("limit", LIST_LIMIT.to_string())];
        if let Some(token) = page_token {
            query.push(("page_token", token));
        }
        let request = self
            .authorized(self.client.get(self.campaign_url("offer-mapping-entries")))
            .query(&query);
        let resp: OfferMappingResponse = send_json(&self.name, request).await?;
        Ok(Page {
            items: resp
                .result
                .offer_mapping_entries
                .into_iter()
                .map(|e| OfferId(e.offer.shop_sku))
                .collect(),
            next: resp.result.paging.next_page_token,
            total: None,
        })
    }
}

#[async_trait]
impl Marketplace for MarketClient {
    type Stock = MarketSku;
    type Price = MarketOffer;

    const STOCK_BATCH_SIZE: usize = batch::MARKET_STOCKS;
    const PRICE_BATCH_SIZE: usize = batch::MARKET_PRICES;

    fn name(&self) -> &str {
        &self.name
    }

    fn stock_entry(&self, level: &StockLevel, updated_at: OffsetDateTime) -> MarketSku {
        MarketSku {
            sku: level.offer_id.to_string(),
            warehouse_id: self.campaign.warehouse_id,
            items: vec![MarketStockItem {
                count: level.count,
                kind: StockKind::Fit,
                updated_at: stock_timestamp(updated_at),
            }],
        }
    }

    fn price_entry(&self, level: &PriceLevel) -> MarketOffer {
        MarketOffer {
            id: level.offer_id.to_string(),
            price: MarketPrice {
                value: level.price,
                currency_id: "RUR",
            },
        }
    }

    async fn list_offer_ids(&self) -> Result<Vec<OfferId>, anyhow::Error> {
        collect_pages(&self.name, |token| self.offer_mapping_page(token)).await
    }

    async fn update_stocks(&self, batch: &[MarketSku]) -> Result<serde_json::Value, anyhow::Error> {
        let body = StocksRequest { skus: batch };
        let request = self.authorized(self.client.put(self.campaign_url("offers/stocks")));
        send_json(&self.name, with_json_body(request, &body)?).await
    }

    async fn update_prices(
        &self,
        batch: &[MarketOffer],
    ) -> Result<serde_json::Value, anyhow::Error> {
        let body = PricesRequest { offers: batch };
        let request = self.authorized(self.client.post(self.campaign_url("offer-prices/updates")));
        send_json(&self.name, with_json_body(request, &body)?).await
    }
}
