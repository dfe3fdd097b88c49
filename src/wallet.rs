use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use num_bigint::BigUint;

use std::sync::OnceLock;

use crate::amount::Amount;
use crate::chain::{chain_name, ChainReader};
use crate::config::Config;
use crate::constant::*;
use crate::sale::reconcile::Reading;

/// The local signer, if one is configured. Without `PRIVATE_KEY` the dashboard runs read-only and
/// every purchase attempt stops at `NotConnected`.
pub struct Wallet {
    signer: Option<PrivateKeySigner>,
}

impl Wallet {
    fn new() -> Self {
        let signer = Config::get().private_key.as_deref().map(|key| {
            key.trim()
                .parse::<PrivateKeySigner>()
                .expect("PRIVATE_KEY must be a valid hex private key")
        });

        match &signer {
            Some(signer) => tracing::info!("Wallet loaded: {}", signer.address()),
            None => tracing::info!("No PRIVATE_KEY set, running read-only"),
        }

        Self { signer }
    }

    pub fn get() -> &'static Self {
        static INSTANCE: OnceLock<Wallet> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    pub fn address(&self) -> Option<Address> {
        self.signer.as_ref().map(|signer| signer.address())
    }

    pub(crate) fn signer(&self) -> Option<&PrivateKeySigner> {
        self.signer.as_ref()
    }

    pub async fn session<R: ChainReader + ?Sized>(&self, reader: &R) -> WalletSession {
        WalletSession::read(reader, self.address()).await
    }
}

/// Connected address and network, handed to the orchestrator explicitly on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalletSession {
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
}

impl WalletSession {
    /// The network is re-read on every call, so a switched RPC endpoint shows up on the next
    /// refresh.
    pub async fn read<R: ChainReader + ?Sized>(reader: &R, address: Option<Address>) -> Self {
        let chain_id = reader
            .chain_id()
            .await
            .inspect_err(|e| tracing::error!("Failed to read chain id: {}", e))
            .ok();

        Self { address, chain_id }
    }

    pub fn network_name(&self) -> String {
        match self.chain_id {
            Some(id) => chain_name(id),
            None => "Chain ID ?".to_string(),
        }
    }

    pub async fn native_balance<R: ChainReader + ?Sized>(&self, reader: &R) -> Reading<Amount> {
        match self.address {
            Some(address) => Reading::from(reader.native_balance(address).await)
                .map(|wei: BigUint| Amount::new(wei, NATIVE_DECIMALS)),
            None => Reading::Unavailable,
        }
    }
}
