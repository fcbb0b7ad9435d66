use std::process::ExitCode;
use watch_sync::config::{load_env_file, ExitPolicy, MarketConfig};
use watch_sync::http::build_client;
use watch_sync::inventory::fetch_inventory;
use watch_sync::market::MarketClient;
use watch_sync::sync::sync_account;

async fn run() -> Result<(), anyhow::Error> {
    let config = MarketConfig::from_env()?;
    let client = build_client(&config.common.http)?;
    let inventory = fetch_inventory(&client, &config.common.inventory_url).await?;
    // Campaigns run one after another; a failed one stops the rest.
    for campaign in config.campaigns {
        let market = MarketClient::new(
            client.clone(),
            config.api_url.clone(),
            config.token.clone(),
            campaign,
        );
        let report = sync_account(&market, &inventory).await?;
        log::info!("{report}");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    watch_sync::init_logger();
    let loaded = load_env_file();
    let policy = ExitPolicy::from_env();
    let result = match loaded {
        Ok(()) => run().await,
        Err(err) => Err(err),
    };
    policy.finish(result)
}
