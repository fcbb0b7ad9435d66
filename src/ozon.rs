use crate::batch;
use crate::http::{send_json, with_json_body};
use crate::marketplace::Marketplace;
use crate::paging::{collect_pages, Page};
use async_trait::async_trait;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use watch_types::{OfferId, PriceLevel, StockLevel};

const NAME: &str = "Ozon";
const LIST_LIMIT: usize = 1000;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct OzonStock {
    pub offer_id: String,
    pub stock: u32,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct OzonPrice {
    pub auto_action_enabled: &'static str,
    pub currency_code: &'static str,
    pub offer_id: String,
    pub old_price: String,
    pub price: String,
}

#[derive(Serialize)]
struct ProductListRequest<'a> {
    filter: ProductFilter,
    last_id: &'a str,
    limit: usize,
}

#[derive(Serialize)]
struct ProductFilter {
    visibility: &'static str,
}

#[derive(Deserialize, Debug)]
struct ProductListResponse {
    result: ProductListResult,
}

#[derive(Deserialize, Debug)]
struct ProductListResult {
    #[serde(default)]
    items: Vec<ProductItem>,
    total: usize,
    #[serde(default)]
    last_id: String,
}

#[derive(Deserialize, Debug)]
struct ProductItem {
    offer_id: String,
}

#[derive(Serialize)]
struct StocksRequest<'a> {
    stocks: &'a [OzonStock],
}

#[derive(Serialize)]
struct PricesRequest<'a> {
    prices: &'a [OzonPrice],
}

pub struct OzonClient {
    client: ClientWithMiddleware,
    base_url: String,
    client_id: String,
    seller_token: String,
}

impl OzonClient {
    pub fn new(
        client: ClientWithMiddleware,
        base_url: String,
        client_id: String,
        seller_token: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            seller_token,
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{path}", self.base_url))
            .header("Client-Id", &self.client_id)
            .header("Api-Key", &self.seller_token)
    }

    async fn product_list_page(&self, last_id: &str) -> Result<Page<OfferId>, anyhow::Error> {
        let body = ProductListRequest {
            filter: ProductFilter { visibility: "ALL" },
            last_id,
            limit: LIST_LIMIT,
        };
        let resp: ProductListResponse =
            send_json(NAME, with_json_body(self.post("/v2/product/list"), &body)?).await?;
        Ok(Page {
            items: resp
                .result
                .items
                .into_iter()
                .map(|i| OfferId(i.offer_id))
                .collect(),
            next: Some(resp.result.last_id),
            total: Some(resp.result.total),
        })
    }
}

#[async_trait]
impl Marketplace for OzonClient {
    type Stock = OzonStock;
    type Price = OzonPrice;

    const STOCK_BATCH_SIZE: usize = batch::OZON_STOCKS;
    const PRICE_BATCH_SIZE: usize = batch::OZON_PRICES;

    fn name(&self) -> &str {
        NAME
    }

    fn stock_entry(&self, level: &StockLevel, _: OffsetDateTime) -> OzonStock {
        OzonStock {
            offer_id: level.offer_id.to_string(),
            stock: level.count,
        }
    }

    fn price_entry(&self, level: &PriceLevel) -> OzonPrice {
        OzonPrice {
            auto_action_enabled: "UNKNOWN",
            currency_code: "RUB",
            offer_id: level.offer_id.to_string(),
            old_price: "0".to_string(),
            price: level.price.to_string(),
        }
    }

    async fn list_offer_ids(&self) -> Result<Vec<OfferId>, anyhow::Error> {
        collect_pages(NAME, |cursor| async move {
            self.product_list_page(cursor.as_deref().unwrap_or_default())
                .await
        })
        .await
    }

    async fn update_stocks(&self, batch: &[OzonStock]) -> Result<serde_json::Value, anyhow::Error> {
        let body = StocksRequest { stocks: batch };
        send_json(
            NAME,
            with_json_body(self.post("/v1/product/import/stocks"), &body)?,
        )
        .await
    }

    async fn update_prices(&self, batch: &[OzonPrice]) -> Result<serde_json::Value, anyhow::Error> {
        let body = PricesRequest { prices: batch };
        send_json(
            NAME,
            with_json_body(self.post("/v1/product/import/prices"), &body)?,
        )
        .await
    }
}
