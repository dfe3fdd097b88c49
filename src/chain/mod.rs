pub mod contracts;
pub mod evm;
#[cfg(test)]
pub mod mock;

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use num_bigint::BigUint;

use crate::error::{Error, Result};

/// Point-in-time, side-effect-free reads. Every call may fail independently; callers decide
/// whether a failure is fatal or just a placeholder.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;
    async fn native_balance(&self, owner: Address) -> Result<BigUint>;

    async fn token_name(&self, token: Address) -> Result<String>;
    async fn token_symbol(&self, token: Address) -> Result<String>;
    async fn token_decimals(&self, token: Address) -> Result<u8>;
    async fn balance_of(&self, token: Address, owner: Address) -> Result<BigUint>;
    async fn allowance(&self, token: Address, owner: Address, spender: Address)
        -> Result<BigUint>;

    async fn price_b_per_a(&self, sale: Address) -> Result<BigUint>;
    async fn available_token_a(&self, sale: Address) -> Result<BigUint>;
    async fn is_open(&self, sale: Address) -> Result<bool>;
    async fn per_wallet_cap_a(&self, sale: Address) -> Result<BigUint>;
    async fn remaining_for_wallet(&self, sale: Address, wallet: Address) -> Result<BigUint>;
}

/// Irreversible writes. Nothing here retries: a returned `TxRef` means the network accepted the
/// transaction, an error means it did not.
#[async_trait]
pub trait ChainWriter: Send + Sync {
    async fn approve(&self, token: Address, spender: Address, amount: &BigUint) -> Result<TxRef>;
    async fn buy_with_exact_b(&self, sale: Address, amount_b: &BigUint) -> Result<TxRef>;
    async fn wait_for_confirmation(&self, tx: &TxRef) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxRef(pub TxHash);

impl TxRef {
    pub fn explorer_url(&self, explorer_base: &str) -> String {
        format!("{}/tx/{}", explorer_base.trim_end_matches('/'), self.0)
    }
}

impl std::fmt::Display for TxRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn to_biguint(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

pub fn to_u256(value: &BigUint) -> Result<U256> {
    U256::try_from_be_slice(&value.to_bytes_be())
        .ok_or(Error::ArithmeticDegenerate("amount does not fit in uint256"))
}

pub fn chain_name(chain_id: u64) -> String {
    match chain_id {
        1 => "Ethereum".to_string(),
        11155111 => "Sepolia".to_string(),
        id => format!("Chain ID {id}"),
    }
}
