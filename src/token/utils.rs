use alloy::primitives::Address;

use super::structs::{balance_amount, TokenMetadata, TokenPanel};
use crate::chain::ChainReader;
use crate::error::Result;
use crate::sale::reconcile::Reading;

pub async fn get_metadata<R: ChainReader + ?Sized>(
    reader: &R,
    token: Address,
) -> Result<TokenMetadata> {
    let (name, symbol, decimals) = tokio::try_join!(
        reader.token_name(token),
        reader.token_symbol(token),
        reader.token_decimals(token),
    )?;

    Ok(TokenMetadata {
        address: token,
        name,
        symbol,
        decimals,
    })
}

/// Reads a token card. The balance is only read when a wallet is connected.
pub async fn read_token_panel<R: ChainReader + ?Sized>(
    reader: &R,
    label: &str,
    token: Address,
    owner: Option<Address>,
) -> TokenPanel {
    let balance = async {
        match owner {
            Some(owner) => Reading::from(reader.balance_of(token, owner).await),
            None => Reading::Unavailable,
        }
    };
    let (name, symbol, decimals, balance) = tokio::join!(
        reader.token_name(token),
        reader.token_symbol(token),
        reader.token_decimals(token),
        balance,
    );

    let decimals: Reading<u8> = decimals.into();
    let balance = balance_amount(balance, &decimals);
    TokenPanel {
        label: label.to_string(),
        address: token,
        name: name.into(),
        symbol: symbol.into(),
        decimals,
        balance,
    }
}
