use alloy::contract::Error as ContractError;
use alloy::network::ReceiptResponse;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider};
use alloy::transports::TransportError;
use async_trait::async_trait;
use num_bigint::BigUint;

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use super::contracts::{IIdoSale, IERC20};
use super::{to_biguint, to_u256, ChainReader, ChainWriter, TxRef};
use crate::error::{Error, Result};

/// `ChainReader` and `ChainWriter` over a JSON-RPC provider. Writes are signed by whatever wallet
/// the provider was built with.
pub struct EvmChain {
    provider: DynProvider,
    confirmation_poll: Duration,
}

impl EvmChain {
    pub fn new(provider: DynProvider, confirmation_poll: Duration) -> Self {
        Self {
            provider,
            confirmation_poll,
        }
    }

    fn token(&self, token: Address) -> IERC20::IERC20Instance<DynProvider> {
        IERC20::new(token, self.provider.clone())
    }

    fn sale(&self, sale: Address) -> IIdoSale::IIdoSaleInstance<DynProvider> {
        IIdoSale::new(sale, self.provider.clone())
    }
}

fn unavailable<E: std::fmt::Display>(what: &'static str) -> impl FnOnce(E) -> Error {
    move |e| {
        tracing::debug!("Read {} failed: {}", what, e);
        Error::ReadUnavailable(what.to_string())
    }
}

/// Prefer the node's short error message (e.g. "execution reverted: sale closed") over the fully
/// decorated error chain.
fn rejected(e: ContractError) -> Error {
    let short_message = match &e {
        ContractError::TransportError(err) => err
            .as_error_resp()
            .map(|payload| payload.message.to_string()),
        _ => None,
    };
    let message = short_message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| e.to_string());
    tracing::warn!("Transaction rejected: {}", message);
    Error::WriteRejected(message)
}

/// Polls `fetch_status` until the receipt shows up. A failed poll is retried; only a reverted
/// receipt ends the wait early, the caller bounds the total time.
async fn poll_until_mined<F, Fut, E>(
    tx: &TxRef,
    poll: Duration,
    mut fetch_status: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<Option<bool>, E>>,
    E: Display,
{
    loop {
        match fetch_status().await {
            Ok(Some(true)) => {
                tracing::info!("Transaction {} confirmed", tx);
                return Ok(());
            }
            Ok(Some(false)) => {
                return Err(Error::WriteRejected(format!("Transaction {tx} reverted")));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Receipt poll for {} failed, retrying: {}", tx, e),
        }
        tokio::time::sleep(poll).await;
    }
}

#[async_trait]
impl ChainReader for EvmChain {
    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(unavailable("chain id"))
    }

    async fn native_balance(&self, owner: Address) -> Result<BigUint> {
        let balance = self
            .provider
            .get_balance(owner)
            .await
            .map_err(unavailable("native balance"))?;
        Ok(to_biguint(balance))
    }

    async fn token_name(&self, token: Address) -> Result<String> {
        self.token(token)
            .name()
            .call()
            .await
            .map_err(unavailable("name"))
    }

    async fn token_symbol(&self, token: Address) -> Result<String> {
        self.token(token)
            .symbol()
            .call()
            .await
            .map_err(unavailable("symbol"))
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        self.token(token)
            .decimals()
            .call()
            .await
            .map_err(unavailable("decimals"))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<BigUint> {
        let balance = self
            .token(token)
            .balanceOf(owner)
            .call()
            .await
            .map_err(unavailable("balanceOf"))?;
        Ok(to_biguint(balance))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<BigUint> {
        let allowance = self
            .token(token)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(unavailable("allowance"))?;
        Ok(to_biguint(allowance))
    }

    async fn price_b_per_a(&self, sale: Address) -> Result<BigUint> {
        let price = self
            .sale(sale)
            .priceBPerA()
            .call()
            .await
            .map_err(unavailable("priceBPerA"))?;
        Ok(to_biguint(price))
    }

    async fn available_token_a(&self, sale: Address) -> Result<BigUint> {
        let available = self
            .sale(sale)
            .availableTokenA()
            .call()
            .await
            .map_err(unavailable("availableTokenA"))?;
        Ok(to_biguint(available))
    }

    async fn is_open(&self, sale: Address) -> Result<bool> {
        self.sale(sale)
            .isOpen()
            .call()
            .await
            .map_err(unavailable("isOpen"))
    }

    async fn per_wallet_cap_a(&self, sale: Address) -> Result<BigUint> {
        let cap = self
            .sale(sale)
            .perWalletCapA()
            .call()
            .await
            .map_err(unavailable("perWalletCapA"))?;
        Ok(to_biguint(cap))
    }

    async fn remaining_for_wallet(&self, sale: Address, wallet: Address) -> Result<BigUint> {
        let remaining = self
            .sale(sale)
            .remainingForWallet(wallet)
            .call()
            .await
            .map_err(unavailable("remainingForWallet"))?;
        Ok(to_biguint(remaining))
    }
}

#[async_trait]
impl ChainWriter for EvmChain {
    async fn approve(&self, token: Address, spender: Address, amount: &BigUint) -> Result<TxRef> {
        let amount = to_u256(amount)?;
        let pending = self
            .token(token)
            .approve(spender, amount)
            .send()
            .await
            .map_err(rejected)?;

        let tx = TxRef(*pending.tx_hash());
        tracing::info!("Approve submitted: {}", tx);
        Ok(tx)
    }

    async fn buy_with_exact_b(&self, sale: Address, amount_b: &BigUint) -> Result<TxRef> {
        let amount_b = to_u256(amount_b)?;
        let pending = self
            .sale(sale)
            .buyWithExactB(amount_b)
            .send()
            .await
            .map_err(rejected)?;

        let tx = TxRef(*pending.tx_hash());
        tracing::info!("buyWithExactB submitted: {}", tx);
        Ok(tx)
    }

    async fn wait_for_confirmation(&self, tx: &TxRef) -> Result<()> {
        let provider = &self.provider;
        let hash = tx.0;
        poll_until_mined(tx, self.confirmation_poll, move || async move {
            let receipt = provider.get_transaction_receipt(hash).await?;
            Ok::<_, TransportError>(receipt.as_ref().map(ReceiptResponse::status))
        })
        .await
    }
}
