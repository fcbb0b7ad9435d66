#![deny(clippy::unwrap_used)]

use std::env;

pub mod batch;
pub mod config;
pub mod error;
pub mod http;
pub mod inventory;
pub mod market;
pub mod marketplace;
pub mod ozon;
pub mod paging;
pub mod reconcile;
pub mod sync;

pub use marketplace::Marketplace;

pub fn init_logger() {
    if let Err(env::VarError::NotPresent) = env::var("RUST_LOG") {
        env::set_var("RUST_LOG", "INFO");
    }
    pretty_env_logger::formatted_timed_builder()
        .parse_default_env()
        .init();
}

pub fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 220;
    let trimmed = body.trim();
    if trimmed.len() <= LIMIT {
        return trimmed.to_string();
    }
    let end = trimmed
        .char_indices()
        .map(|(idx, _)| idx)
        .take_while(|idx| *idx <= LIMIT)
        .last()
        .unwrap_or(0);
    if end == 0 {
        return trimmed.to_string();
    }
    format!("{}…", &trimmed[..end])
}
