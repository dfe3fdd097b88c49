use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use num_bigint::BigUint;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{ChainReader, ChainWriter, TxRef};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Approve {
        token: Address,
        spender: Address,
        amount: BigUint,
    },
    Confirm(TxRef),
    Buy {
        sale: Address,
        amount_b: BigUint,
    },
}

#[derive(Debug, Clone)]
pub struct MockToken {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// In-memory chain. `None` fields behave like a pending or failed read.
#[derive(Default)]
pub struct MockChain {
    pub chain_id: Option<u64>,
    /// Owner of the allowances set by confirmed approvals.
    pub wallet: Address,
    pub tokens: HashMap<Address, MockToken>,
    pub balances: HashMap<(Address, Address), BigUint>,
    pub allowances: Mutex<HashMap<(Address, Address, Address), BigUint>>,

    pub price: Option<BigUint>,
    pub available: Option<BigUint>,
    pub is_open: Option<bool>,
    pub cap: Option<BigUint>,
    pub remaining: Option<BigUint>,

    /// Confirming an approval sets the allowance, as an ERC20 would.
    pub approvals_take_effect: bool,
    pub approve_error: Option<String>,
    pub buy_error: Mutex<Option<String>>,
    pub write_delay: Option<Duration>,
    /// Makes `allowance` reads hang, like a stalled RPC node.
    pub read_delay: Option<Duration>,

    pub calls: Mutex<Vec<Call>>,
    pending_approvals: Mutex<HashMap<TxRef, (Address, Address, BigUint)>>,
    nonce: AtomicU8,
}

impl MockChain {
    pub fn new(chain_id: u64, wallet: Address) -> Self {
        Self {
            chain_id: Some(chain_id),
            wallet,
            approvals_take_effect: true,
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: Address, symbol: &str, decimals: u8) -> Self {
        self.tokens.insert(
            token,
            MockToken {
                name: format!("{symbol} Token"),
                symbol: symbol.to_string(),
                decimals,
            },
        );
        self
    }

    pub fn with_balance(mut self, token: Address, owner: Address, amount: BigUint) -> Self {
        self.balances.insert((token, owner), amount);
        self
    }

    pub fn with_allowance(mut self, token: Address, spender: Address, amount: BigUint) -> Self {
        self.allowances
            .get_mut()
            .unwrap()
            .insert((token, self.wallet, spender), amount);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn approve_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Approve { .. }))
            .collect()
    }

    pub fn buy_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Buy { .. }))
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.approve_calls().len() + self.buy_calls().len()
    }

    fn next_tx(&self) -> TxRef {
        let n = self.nonce.fetch_add(1, Ordering::SeqCst) + 1;
        TxRef(TxHash::with_last_byte(n))
    }

    async fn delay(&self) {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn token(&self, token: Address) -> Result<&MockToken> {
        self.tokens
            .get(&token)
            .ok_or_else(|| Error::ReadUnavailable("token".to_string()))
    }
}

fn ready<T: Clone>(value: &Option<T>, what: &str) -> Result<T> {
    value
        .clone()
        .ok_or_else(|| Error::ReadUnavailable(what.to_string()))
}

#[async_trait]
impl ChainReader for MockChain {
    async fn chain_id(&self) -> Result<u64> {
        ready(&self.chain_id, "chain id")
    }

    async fn native_balance(&self, _owner: Address) -> Result<BigUint> {
        Ok(BigUint::from(10u8).pow(18))
    }

    async fn token_name(&self, token: Address) -> Result<String> {
        Ok(self.token(token)?.name.clone())
    }

    async fn token_symbol(&self, token: Address) -> Result<String> {
        Ok(self.token(token)?.symbol.clone())
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        Ok(self.token(token)?.decimals)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<BigUint> {
        self.balances
            .get(&(token, owner))
            .cloned()
            .ok_or_else(|| Error::ReadUnavailable("balanceOf".to_string()))
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<BigUint> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .allowances
            .lock()
            .unwrap()
            .get(&(token, owner, spender))
            .cloned()
            .unwrap_or_default())
    }

    async fn price_b_per_a(&self, _sale: Address) -> Result<BigUint> {
        ready(&self.price, "priceBPerA")
    }

    async fn available_token_a(&self, _sale: Address) -> Result<BigUint> {
        ready(&self.available, "availableTokenA")
    }

    async fn is_open(&self, _sale: Address) -> Result<bool> {
        ready(&self.is_open, "isOpen")
    }

    async fn per_wallet_cap_a(&self, _sale: Address) -> Result<BigUint> {
        ready(&self.cap, "perWalletCapA")
    }

    async fn remaining_for_wallet(&self, _sale: Address, _wallet: Address) -> Result<BigUint> {
        ready(&self.remaining, "remainingForWallet")
    }
}

#[async_trait]
impl ChainWriter for MockChain {
    async fn approve(&self, token: Address, spender: Address, amount: &BigUint) -> Result<TxRef> {
        self.calls.lock().unwrap().push(Call::Approve {
            token,
            spender,
            amount: amount.clone(),
        });
        self.delay().await;
        if let Some(message) = &self.approve_error {
            return Err(Error::WriteRejected(message.clone()));
        }

        let tx = self.next_tx();
        self.pending_approvals
            .lock()
            .unwrap()
            .insert(tx, (token, spender, amount.clone()));
        Ok(tx)
    }

    async fn buy_with_exact_b(&self, sale: Address, amount_b: &BigUint) -> Result<TxRef> {
        self.calls.lock().unwrap().push(Call::Buy {
            sale,
            amount_b: amount_b.clone(),
        });
        self.delay().await;
        if let Some(message) = self.buy_error.lock().unwrap().clone() {
            return Err(Error::WriteRejected(message));
        }
        Ok(self.next_tx())
    }

    async fn wait_for_confirmation(&self, tx: &TxRef) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Confirm(*tx));
        let approval = self.pending_approvals.lock().unwrap().remove(tx);
        if let (Some((token, spender, amount)), true) = (approval, self.approvals_take_effect) {
            self.allowances
                .lock()
                .unwrap()
                .insert((token, self.wallet, spender), amount);
        }
        Ok(())
    }
}
