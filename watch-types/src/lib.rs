use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

pub mod inventory;
pub mod price;

/// Seller-side article identifier as known to a marketplace catalog.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Deref, From)]
#[serde(transparent)]
pub struct OfferId(pub String);

impl From<&str> for OfferId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Borrow<str> for OfferId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StockLevel {
    pub offer_id: OfferId,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceLevel {
    pub offer_id: OfferId,
    pub price: u64,
}

pub fn parse_duration(duration: &str) -> Result<std::time::Duration, anyhow::Error> {
    let duration = duration
        .trim()
        .to_lowercase()
        .replace(".", "")
        .replace("час", "h")
        .replace("ч", "h")
        .replace("сек", "s")
        .replace("с", "s")
        .replace("мин", "m")
        .replace("м", "m");
    if duration.is_empty() {
        return Err(anyhow::anyhow!("Empty duration"));
    }
    duration_str::parse(&duration)
        .map_err(|err| anyhow::anyhow!("Unable to parse duration {duration:?}: {err}"))
}
