/// # Token Amounts
///
/// Using `BigUint` to represent token amounts in base units.
///
/// ERC20 balances are `uint256` on chain and a token may declare up to 255 decimals, so
/// `10^decimals` alone can exceed any fixed-width integer. Intermediate arithmetic (scaling a
/// quote amount by the sale token's decimals before dividing by the price) therefore runs on
/// arbitrary-precision integers, and values are only narrowed to `U256` at the chain boundary.
///
/// An `Amount` always carries the decimals of the token it belongs to. Amounts of two different
/// tokens are never compared or combined without going through an explicit price conversion.
use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount {
    base: BigUint,
    decimals: u8,
}

impl Amount {
    pub fn new(base: BigUint, decimals: u8) -> Self {
        Self { base, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self::new(BigUint::zero(), decimals)
    }

    pub fn base(&self) -> &BigUint {
        &self.base
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.base.is_zero()
    }

    pub fn one_token(decimals: u8) -> BigUint {
        BigUint::from(10u8).pow(decimals as u32)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_units(&self.base, self.decimals))
    }
}

/// Parses a human decimal string such as `"12.5"` into base units of a token with `decimals`.
///
/// Fractional digits beyond the token's scale are accepted only when they are all zero; anything
/// else would be silently truncated, so it is rejected instead.
pub fn parse_decimal(text: &str, decimals: u8) -> Result<Amount> {
    let err = |reason| Error::Parse {
        input: text.to_string(),
        reason,
    };

    let input = text.trim();
    if input.is_empty() {
        return Err(err("empty input"));
    }

    let (int_part, frac_part) = input.split_once('.').unwrap_or((input, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(err("no digits"));
    }
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(int_part) || !is_digits(frac_part) {
        return Err(err("not a plain decimal number"));
    }

    let scale = decimals as usize;
    let frac_part = if frac_part.len() > scale {
        let (kept, dropped) = frac_part.split_at(scale);
        if dropped.bytes().any(|b| b != b'0') {
            return Err(err("more fractional digits than the token supports"));
        }
        kept
    } else {
        frac_part
    };

    let digits = format!("{int_part}{frac_part:0<scale$}");
    let base = if digits.is_empty() {
        BigUint::zero()
    } else {
        BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| err("not a number"))?
    };

    Ok(Amount::new(base, decimals))
}

/// Same as [`parse_decimal`], but malformed or empty input resolves to zero so the estimate
/// field always has something to show.
pub fn parse_decimal_or_zero(text: &str, decimals: u8) -> Amount {
    parse_decimal(text, decimals).unwrap_or_else(|e| {
        tracing::debug!("{}, treating as zero", e);
        Amount::zero(decimals)
    })
}

/// Exact decimal rendering of `base` scaled down by `decimals`, with trailing zeros trimmed.
pub fn format_units(base: &BigUint, decimals: u8) -> String {
    let digits = base.to_str_radix(10);
    let scale = decimals as usize;
    if scale == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = scale + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}

pub fn format_amount(amount: &Amount) -> String {
    amount.to_string()
}

fn try_estimate(quote: &Amount, price_b_per_a: &Amount, sale_decimals: u8) -> Result<Amount> {
    if price_b_per_a.is_zero() {
        return Err(Error::ArithmeticDegenerate("sale is not priced yet"));
    }
    // price is expressed in quote base units per whole sale token
    if quote.decimals() != price_b_per_a.decimals() {
        return Err(Error::ArithmeticDegenerate(
            "quote amount and price use different scales",
        ));
    }

    let scaled = quote.base() * Amount::one_token(sale_decimals);
    Ok(Amount::new(scaled / price_b_per_a.base(), sale_decimals))
}

/// Sale-token base units obtainable for `quote` at `price_b_per_a`:
/// `quote * 10^sale_decimals / price`.
///
/// The estimate is advisory, so a zero price or any other degenerate input yields zero instead of
/// an error.
pub fn estimate_sale_token_amount(
    quote: &Amount,
    price_b_per_a: &Amount,
    sale_decimals: u8,
) -> Amount {
    try_estimate(quote, price_b_per_a, sale_decimals).unwrap_or_else(|e| {
        tracing::debug!("Estimate fell back to zero: {}", e);
        Amount::zero(sale_decimals)
    })
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    fn units(whole: u64, decimals: u8) -> BigUint {
        BigUint::from(whole) * Amount::one_token(decimals)
    }

    #[test]
    fn test_parse_whole_and_fraction() {
        let amount = parse_decimal("100", 18).unwrap();
        assert_eq!(amount.base(), &units(100, 18));
        assert_eq!(amount.decimals(), 18);

        let amount = parse_decimal("1.5", 6).unwrap();
        assert_eq!(amount.base(), &BigUint::from(1_500_000u64));

        let amount = parse_decimal(".25", 2).unwrap();
        assert_eq!(amount.base(), &BigUint::from(25u64));

        let amount = parse_decimal("7.", 0).unwrap();
        assert_eq!(amount.base(), &BigUint::from(7u64));

        let amount = parse_decimal("  42 ", 1).unwrap();
        assert_eq!(amount.base(), &BigUint::from(420u64));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", "   ", ".", "abc", "1,000", "-1", "+1", "1e18", "1.2.3", "0x10"] {
            assert!(
                matches!(parse_decimal(input, 18), Err(Error::Parse { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_excess_precision() {
        // lossy truncation is refused
        assert!(matches!(
            parse_decimal("1.234", 2),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(parse_decimal("0.5", 0), Err(Error::Parse { .. })));

        // extra zeros lose nothing
        let amount = parse_decimal("1.2300", 2).unwrap();
        assert_eq!(amount.base(), &BigUint::from(123u64));
    }

    #[test]
    fn test_parse_or_zero() {
        assert!(parse_decimal_or_zero("", 18).is_zero());
        assert!(parse_decimal_or_zero("abc", 18).is_zero());
        assert!(parse_decimal_or_zero("1.234", 2).is_zero());
        assert_eq!(parse_decimal_or_zero("3", 0).base(), &BigUint::from(3u64));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(&units(50, 18), 18), "50");
        assert_eq!(format_units(&BigUint::from(5u64), 2), "0.05");
        assert_eq!(format_units(&BigUint::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(&BigUint::zero(), 18), "0");
        assert_eq!(format_units(&BigUint::from(123u64), 0), "123");
    }

    #[test]
    fn test_round_trip_random() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let decimals: u8 = rng.gen_range(0..=30);
            let int_len = rng.gen_range(1..=25);
            let mut text = rng.gen_range(1..=9u8).to_string();
            for _ in 1..int_len {
                text.push(char::from(b'0' + rng.gen_range(0..=9u8)));
            }
            if decimals > 0 && rng.gen_bool(0.7) {
                let frac_len = rng.gen_range(1..=decimals as usize);
                let mut frac: String = (0..frac_len - 1)
                    .map(|_| char::from(b'0' + rng.gen_range(0..=9u8)))
                    .collect();
                frac.push(char::from(b'0' + rng.gen_range(1..=9u8)));
                text = format!("{text}.{frac}");
            }

            let amount = parse_decimal(&text, decimals).unwrap();
            assert_eq!(format_amount(&amount), text);
        }
    }

    #[test]
    fn test_estimate_same_decimals() {
        let quote = parse_decimal("100", 18).unwrap();
        let price = Amount::new(units(2, 18), 18);

        let estimate = estimate_sale_token_amount(&quote, &price, 18);
        assert_eq!(estimate.base(), &units(50, 18));
        assert_eq!(format_amount(&estimate), "50");
    }

    #[test]
    fn test_estimate_mixed_decimals() {
        // 6-decimal quote token, 18-decimal sale token, 0.25 quote per sale token
        let quote = parse_decimal("10", 6).unwrap();
        let price = Amount::new(BigUint::from(250_000u64), 6);

        let estimate = estimate_sale_token_amount(&quote, &price, 18);
        assert_eq!(format_amount(&estimate), "40");
    }

    #[test]
    fn test_estimate_zero_price() {
        let price = Amount::zero(18);
        for input in ["1", "100", "123456789.123"] {
            let quote = parse_decimal(input, 18).unwrap();
            let estimate = estimate_sale_token_amount(&quote, &price, 18);
            assert!(estimate.is_zero());
            assert_eq!(format_amount(&estimate), "0");
        }
    }

    #[test]
    fn test_estimate_scale_mismatch() {
        let quote = parse_decimal("100", 6).unwrap();
        let price = Amount::new(units(2, 18), 18);
        assert!(estimate_sale_token_amount(&quote, &price, 18).is_zero());
    }
}
