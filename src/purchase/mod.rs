pub mod sequencer;
pub mod state;

use crate::amount::{parse_decimal_or_zero, Amount};

/// What the user typed, resolved once against the quote token's decimals. The resolved amount is
/// what gets approved and spent, so the submitted value cannot drift from the displayed estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseIntent {
    pub input: String,
    pub quote_amount: Amount,
}

impl PurchaseIntent {
    pub fn resolve(input: &str, quote_decimals: u8) -> Self {
        Self {
            input: input.to_string(),
            quote_amount: parse_decimal_or_zero(input, quote_decimals),
        }
    }
}
