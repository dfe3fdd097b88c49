mod amount;
mod chain;
mod client;
mod config;
mod constant;
mod dashboard;
mod error;
mod orchestrator;
mod purchase;
mod sale;
mod token;
mod view;
mod wallet;

use anyhow::Result;

use std::sync::Arc;

use crate::chain::chain_name;
use crate::config::Config;
use crate::dashboard::DashboardBuilder;
use crate::orchestrator::PurchaseOrchestrator;
use crate::token::utils::get_metadata;
use crate::wallet::Wallet;

#[tokio::main]
async fn main() -> Result<()> {
    setup_env_and_tracing();

    let config = Config::get();
    let wallet = Wallet::get();
    let chain = Arc::new(client::get_chain(wallet)?);

    let session = wallet.session(chain.as_ref()).await;
    if session.chain_id != Some(config.chain_id) {
        tracing::warn!(
            "RPC is on {}, the sale is deployed on {}",
            session.network_name(),
            chain_name(config.chain_id)
        );
    }

    let addresses = config.sale_addresses();
    for token in [addresses.sale_token, addresses.quote_token] {
        match get_metadata(chain.as_ref(), token).await {
            Ok(metadata) => tracing::info!("{}", metadata),
            Err(e) => tracing::warn!("Failed to read token {}: {}", token, e),
        }
    }

    let orchestrator = Arc::new(PurchaseOrchestrator::new(
        chain,
        addresses,
        config.chain_id,
        config.write_timeout(),
    ));

    let dashboard = DashboardBuilder::new(orchestrator)
        .with_address(wallet.address())
        .with_expected_chain_id(config.chain_id)
        .with_explorer_url(config.explorer_url.clone())
        .with_refresh_interval(config.refresh_interval())
        .with_json_output(config.json_output)
        .build();
    dashboard.run_loop().await?;

    Ok(())
}

pub fn setup_env_and_tracing() {
    dotenv::dotenv().ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
