use alloy::primitives::Address;
use num_bigint::BigUint;
use serde::Serialize;

use crate::amount::Amount;
use crate::sale::reconcile::Reading;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8, // e.g. 18
}

impl std::fmt::Display for TokenMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TokenMetadata {{ address: {}, name: {}, symbol: {}, decimals: {} }}",
            self.address, self.name, self.symbol, self.decimals
        )
    }
}

/// Everything the dashboard shows for one token. Each field is read independently, so a failed
/// `symbol` call does not hide the balance.
#[derive(Debug, Clone)]
pub struct TokenPanel {
    pub label: String,
    pub address: Address,
    pub name: Reading<String>,
    pub symbol: Reading<String>,
    pub decimals: Reading<u8>,
    pub balance: Reading<Amount>,
}

impl TokenPanel {
    /// `0x9De8…F676`
    pub fn short_address(&self) -> String {
        let full = self.address.to_string();
        format!("{}…{}", &full[..6], &full[full.len() - 4..])
    }

    pub fn view(&self) -> TokenPanelView {
        TokenPanelView {
            title: format!("{} ({})", self.label, self.short_address()),
            name: self.name.display(),
            symbol: self.symbol.display(),
            decimals: self.decimals.display(),
            balance: self.balance.display(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPanelView {
    pub title: String,
    pub name: String,
    pub symbol: String,
    pub decimals: String,
    pub balance: String,
}

pub fn balance_amount(base: Reading<BigUint>, decimals: &Reading<u8>) -> Reading<Amount> {
    match decimals.ready() {
        Some(decimals) => base.map(|base| Amount::new(base, *decimals)),
        None => Reading::Unavailable,
    }
}
