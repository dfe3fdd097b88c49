pub mod reconcile;

use alloy::primitives::Address;
use num_bigint::BigUint;

use crate::amount::Amount;
use crate::chain::ChainReader;
use crate::error::Result;
use crate::token::structs::TokenPanel;
use crate::token::utils::read_token_panel;
use reconcile::{cap_usage, reconcile_availability, CapUsage, Reading, Reconciled};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleAddresses {
    /// Token A, the one being sold.
    pub sale_token: Address,
    /// Token B, the one paid with.
    pub quote_token: Address,
    pub sale: Address,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleState {
    /// Quote-token base units per whole sale token.
    pub price_b_per_a: Reading<Amount>,
    pub available_a: Reconciled<Amount>,
    pub is_open: Reading<bool>,
    pub per_wallet_cap_a: Reading<Amount>,
    pub remaining_for_wallet: Reading<Amount>,
    pub cap_usage: CapUsage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowanceState {
    pub owner: Address,
    pub spender: Address,
    pub amount: Amount,
}

impl AllowanceState {
    pub async fn read<R: ChainReader + ?Sized>(
        reader: &R,
        token: Address,
        owner: Address,
        spender: Address,
        decimals: u8,
    ) -> Result<Self> {
        let amount = reader.allowance(token, owner, spender).await?;
        Ok(Self {
            owner,
            spender,
            amount: Amount::new(amount, decimals),
        })
    }

    pub fn covers(&self, spend: &Amount) -> bool {
        self.amount.base() >= spend.base()
    }
}

/// One round of reads. Every figure is independent: any of them may be unavailable while the
/// rest still render.
#[derive(Debug, Clone)]
pub struct SaleSnapshot {
    pub sale_token: TokenPanel,
    pub quote_token: TokenPanel,
    pub price_b_per_a: Reading<BigUint>,
    pub available_token_a: Reading<BigUint>,
    pub sale_token_balance: Reading<BigUint>,
    pub is_open: Reading<bool>,
    pub per_wallet_cap_a: Reading<BigUint>,
    pub remaining_for_wallet: Reading<BigUint>,
}

impl SaleSnapshot {
    pub async fn read<R: ChainReader + ?Sized>(
        reader: &R,
        addresses: &SaleAddresses,
        wallet: Option<Address>,
    ) -> Self {
        let remaining = async {
            match wallet {
                Some(wallet) => {
                    Reading::from(reader.remaining_for_wallet(addresses.sale, wallet).await)
                }
                None => Reading::Unavailable,
            }
        };

        let (
            sale_token,
            quote_token,
            price_b_per_a,
            available_token_a,
            sale_token_balance,
            is_open,
            per_wallet_cap_a,
            remaining_for_wallet,
        ) = tokio::join!(
            read_token_panel(reader, "Token A", addresses.sale_token, wallet),
            read_token_panel(reader, "Token B", addresses.quote_token, wallet),
            reader.price_b_per_a(addresses.sale),
            reader.available_token_a(addresses.sale),
            reader.balance_of(addresses.sale_token, addresses.sale),
            reader.is_open(addresses.sale),
            reader.per_wallet_cap_a(addresses.sale),
            remaining,
        );

        Self {
            sale_token,
            quote_token,
            price_b_per_a: price_b_per_a.into(),
            available_token_a: available_token_a.into(),
            sale_token_balance: sale_token_balance.into(),
            is_open: is_open.into(),
            per_wallet_cap_a: per_wallet_cap_a.into(),
            remaining_for_wallet,
        }
    }

    pub fn sale_decimals(&self) -> Reading<u8> {
        self.sale_token.decimals.clone()
    }

    pub fn quote_decimals(&self) -> Reading<u8> {
        self.quote_token.decimals.clone()
    }

    /// The price carries the quote token's scale.
    pub fn price(&self) -> Reading<Amount> {
        self.price_b_per_a
            .clone()
            .zip(self.quote_decimals())
            .map(|(base, decimals)| Amount::new(base, decimals))
    }

    pub fn availability(&self) -> Reconciled<Amount> {
        reconcile_availability(
            self.available_token_a.clone(),
            self.sale_token_balance.clone(),
            self.sale_decimals(),
        )
    }

    pub fn cap_usage(&self) -> CapUsage {
        cap_usage(
            self.per_wallet_cap_a.clone(),
            self.remaining_for_wallet.clone(),
        )
    }

    pub fn state(&self) -> SaleState {
        let sale_amount = |base: &Reading<BigUint>| {
            base.clone()
                .zip(self.sale_decimals())
                .map(|(base, decimals)| Amount::new(base, decimals))
        };

        SaleState {
            price_b_per_a: self.price(),
            available_a: self.availability(),
            is_open: self.is_open.clone(),
            per_wallet_cap_a: sale_amount(&self.per_wallet_cap_a),
            remaining_for_wallet: sale_amount(&self.remaining_for_wallet),
            cap_usage: self.cap_usage(),
        }
    }
}
