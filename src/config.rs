use alloy::primitives::Address;

use std::sync::OnceLock;
use std::time::Duration;

use crate::constant::*;
use crate::sale::SaleAddresses;

#[derive(Debug, Clone)]
pub struct Config {
    // Network configuration
    pub rpc_url: String,
    pub chain_id: u64,
    pub explorer_url: String,

    // Wallet configuration
    pub private_key: Option<String>,

    // Sale deployment
    pub sale_token_address: Address,
    pub quote_token_address: Address,
    pub sale_address: Address,

    // Timing
    pub write_timeout_secs: u64,
    pub refresh_interval_secs: u64,

    // Output
    pub json_output: bool,
}

fn address_var(name: &str, default: &str) -> Address {
    std::env::var(name)
        .unwrap_or_else(|_| default.into())
        .trim()
        .parse()
        .unwrap_or_else(|_| panic!("{name} must be a valid address"))
}

impl Config {
    pub fn get() -> &'static Config {
        static INSTANCE: OnceLock<Config> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let rpc_url =
                std::env::var("RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8545".into());
            let chain_id = std::env::var("CHAIN_ID")
                .unwrap_or_else(|_| SEPOLIA_CHAIN_ID.to_string())
                .parse()
                .expect("CHAIN_ID must be a valid u64");
            let explorer_url = std::env::var("EXPLORER_URL")
                .unwrap_or_else(|_| DEFAULT_EXPLORER_URL.into())
                .trim_end_matches('/')
                .to_string();

            let private_key = std::env::var("PRIVATE_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty());

            let sale_token_address = address_var("SALE_TOKEN_ADDRESS", DEFAULT_SALE_TOKEN);
            let quote_token_address = address_var("QUOTE_TOKEN_ADDRESS", DEFAULT_QUOTE_TOKEN);
            let sale_address = address_var("SALE_ADDRESS", DEFAULT_SALE);

            let write_timeout_secs = std::env::var("WRITE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "180".into())
                .parse()
                .expect("WRITE_TIMEOUT_SECS must be a valid u64");
            let refresh_interval_secs = std::env::var("REFRESH_INTERVAL_SECS")
                .unwrap_or_else(|_| "15".into())
                .parse()
                .expect("REFRESH_INTERVAL_SECS must be a valid u64");

            let json_output = {
                let json = std::env::var("OUTPUT_JSON").unwrap_or_else(|_| "false".into());
                json == "1" || json == "true" || json == "True"
            };

            Config {
                rpc_url,
                chain_id,
                explorer_url,
                private_key,
                sale_token_address,
                quote_token_address,
                sale_address,
                write_timeout_secs,
                refresh_interval_secs,
                json_output,
            }
        })
    }

    pub fn sale_addresses(&self) -> SaleAddresses {
        SaleAddresses {
            sale_token: self.sale_token_address,
            quote_token: self.quote_token_address,
            sale: self.sale_address,
        }
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Never zero: `tokio::time::interval` panics on a zero period.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}
