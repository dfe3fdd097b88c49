use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::transports::http::{reqwest, Http};
use anyhow::Result;

use std::time::Duration;

use crate::chain::evm::EvmChain;
use crate::config::Config;
use crate::constant::CONFIRMATION_POLL_INTERVAL_MS;
use crate::wallet::Wallet;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC client for `RPC_URL`. Every request is bounded, so a stalled node surfaces as an error.
pub fn get_rpc_client() -> Result<RpcClient> {
    let url: reqwest::Url = Config::get().rpc_url.parse()?;
    let http_client = reqwest::Client::builder().timeout(CLIENT_TIMEOUT).build()?;
    let transport = Http::with_client(http_client, url);
    let is_local = transport.guess_local();
    Ok(RpcClient::new(transport, is_local))
}

/// Provider over the RPC client. Transactions are signed by the wallet when one is configured.
pub fn get_provider(wallet: &Wallet) -> Result<DynProvider> {
    let client = get_rpc_client()?;
    let provider = match wallet.signer() {
        Some(signer) => ProviderBuilder::new()
            .wallet(signer.clone())
            .connect_client(client)
            .erased(),
        None => ProviderBuilder::new().connect_client(client).erased(),
    };

    tracing::info!("Connected to {}", Config::get().rpc_url);
    Ok(provider)
}

pub fn get_chain(wallet: &Wallet) -> Result<EvmChain> {
    let provider = get_provider(wallet)?;
    Ok(EvmChain::new(
        provider,
        Duration::from_millis(CONFIRMATION_POLL_INTERVAL_MS),
    ))
}
