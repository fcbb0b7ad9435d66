use std::process::ExitCode;
use watch_sync::config::{load_env_file, ExitPolicy, OzonConfig};
use watch_sync::http::build_client;
use watch_sync::inventory::fetch_inventory;
use watch_sync::ozon::OzonClient;
use watch_sync::sync::sync_account;

async fn run() -> Result<(), anyhow::Error> {
    let config = OzonConfig::from_env()?;
    let client = build_client(&config.common.http)?;
    let inventory = fetch_inventory(&client, &config.common.inventory_url).await?;
    let ozon = OzonClient::new(
        client,
        config.api_url,
        config.client_id,
        config.seller_token,
    );
    let report = sync_account(&ozon, &inventory).await?;
    log::info!("{report}");
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
