use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::Serialize;

use crate::amount::Amount;
use crate::constant::PLACEHOLDER;
use crate::error::Result;

/// A chain read whose failure has already been absorbed. `Ready(0)` is a real zero,
/// `Unavailable` means "unknown" and must never be rendered as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reading<T> {
    Ready(T),
    Unavailable,
}

impl<T> Reading<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Reading::Ready(value) => Some(value),
            Reading::Unavailable => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Reading::Ready(value) => Some(value),
            Reading::Unavailable => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        match self {
            Reading::Ready(value) => Reading::Ready(f(value)),
            Reading::Unavailable => Reading::Unavailable,
        }
    }

    pub fn zip<U>(self, other: Reading<U>) -> Reading<(T, U)> {
        match (self, other) {
            (Reading::Ready(a), Reading::Ready(b)) => Reading::Ready((a, b)),
            _ => Reading::Unavailable,
        }
    }
}

impl<T: std::fmt::Display> Reading<T> {
    pub fn display(&self) -> String {
        match self {
            Reading::Ready(value) => value.to_string(),
            Reading::Unavailable => PLACEHOLDER.to_string(),
        }
    }
}

impl<T> From<Result<T>> for Reading<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Reading::Ready(value),
            Err(e) => {
                tracing::debug!("Read absorbed: {}", e);
                Reading::Unavailable
            }
        }
    }
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Reading::Ready(value),
            None => Reading::Unavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled<T> {
    Primary(T),
    Fallback(T),
    Unknown,
}

impl<T> Reconciled<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Reconciled::Primary(value) | Reconciled::Fallback(value) => Some(value),
            Reconciled::Unknown => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reconciled<U> {
        match self {
            Reconciled::Primary(value) => Reconciled::Primary(f(value)),
            Reconciled::Fallback(value) => Reconciled::Fallback(f(value)),
            Reconciled::Unknown => Reconciled::Unknown,
        }
    }
}

/// Preferred source with fallback: the primary wins whenever it produced a value, zero included.
pub fn prefer_with_fallback<T>(primary: Reading<T>, fallback: Reading<T>) -> Reconciled<T> {
    match (primary, fallback) {
        (Reading::Ready(value), _) => Reconciled::Primary(value),
        (Reading::Unavailable, Reading::Ready(value)) => Reconciled::Fallback(value),
        (Reading::Unavailable, Reading::Unavailable) => Reconciled::Unknown,
    }
}

/// Tokens still for sale, from the sale's own view or else from the sale token's `balanceOf`.
/// Without the sale token's decimals nothing can be shown.
pub fn reconcile_availability(
    available_view: Reading<BigUint>,
    sale_balance: Reading<BigUint>,
    sale_decimals: Reading<u8>,
) -> Reconciled<Amount> {
    let Some(decimals) = sale_decimals.into_option() else {
        return Reconciled::Unknown;
    };
    prefer_with_fallback(available_view, sale_balance).map(|base| Amount::new(base, decimals))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapUsage {
    /// Cap or remaining could not be read.
    Unavailable,
    /// The sale has no per-wallet cap to measure against.
    Undefined,
    Used {
        #[serde(skip)]
        used: BigUint,
        percent: f64,
        /// `remaining` exceeded `cap`, so one of the two reads was stale.
        inconsistent: bool,
    },
}

impl CapUsage {
    pub fn percent(&self) -> Option<f64> {
        match self {
            CapUsage::Used { percent, .. } => Some(*percent),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        let Some(percent) = self.percent() else {
            return PLACEHOLDER.to_string();
        };
        match self {
            CapUsage::Used {
                inconsistent: true, ..
            } => format!("{percent:.2}% (stale)"),
            _ => format!("{percent:.2}%"),
        }
    }
}

/// `used = cap - remaining`, percentage truncated to two decimal places and kept in `[0, 100]`.
pub fn cap_usage(cap: Reading<BigUint>, remaining: Reading<BigUint>) -> CapUsage {
    let Reading::Ready((cap, remaining)) = cap.zip(remaining) else {
        return CapUsage::Unavailable;
    };
    if cap.is_zero() {
        return CapUsage::Undefined;
    }

    if remaining > cap {
        tracing::warn!(
            "remainingForWallet ({}) exceeds perWalletCapA ({}), clamping usage to zero",
            remaining,
            cap
        );
        return CapUsage::Used {
            used: BigUint::zero(),
            percent: 0.0,
            inconsistent: true,
        };
    }

    let used = &cap - &remaining;
    let basis_points = (&used * 10_000u32 / &cap).to_u32().unwrap_or(10_000);
    let percent = (basis_points.min(10_000) as f64) / 100.0;

    CapUsage::Used {
        used,
        percent,
        inconsistent: false,
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::amount::format_amount;
    use crate::error::Error;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_reading_from_result() {
        let ok: Reading<u8> = Ok(18).into();
        assert_eq!(ok, Reading::Ready(18));

        let err: Reading<u8> = Err(Error::ReadUnavailable("decimals".to_string())).into();
        assert_eq!(err, Reading::Unavailable);
        assert_eq!(err.display(), PLACEHOLDER);
    }

    #[test]
    fn test_prefer_primary_even_when_zero() {
        let reconciled = prefer_with_fallback(Reading::Ready(big(0)), Reading::Ready(big(7)));
        assert_eq!(reconciled, Reconciled::Primary(big(0)));
    }

    #[test]
    fn test_fallback_and_unknown() {
        let reconciled = prefer_with_fallback(Reading::Unavailable, Reading::Ready(big(7)));
        assert_eq!(reconciled, Reconciled::Fallback(big(7)));

        let reconciled: Reconciled<BigUint> =
            prefer_with_fallback(Reading::Unavailable, Reading::Unavailable);
        assert_eq!(reconciled, Reconciled::Unknown);
        assert!(reconciled.value().is_none());
    }

    #[test]
    fn test_availability_uses_balance_fallback() {
        let balance = big(1234) * Amount::one_token(18);
        let availability = reconcile_availability(
            Reading::Unavailable,
            Reading::Ready(balance),
            Reading::Ready(18),
        );

        let Reconciled::Fallback(amount) = availability else {
            panic!("expected fallback, got {availability:?}");
        };
        assert_eq!(format_amount(&amount), "1234");
    }

    #[test]
    fn test_availability_needs_decimals() {
        let availability = reconcile_availability(
            Reading::Ready(big(5)),
            Reading::Ready(big(9)),
            Reading::Unavailable,
        );
        assert_eq!(availability, Reconciled::Unknown);
    }

    #[test]
    fn test_cap_usage_basic() {
        let usage = cap_usage(Reading::Ready(big(1000)), Reading::Ready(big(750)));
        assert_eq!(usage.percent(), Some(25.0));
        assert_eq!(usage.display(), "25.00%");

        // 1/3 used is truncated, not rounded
        let usage = cap_usage(Reading::Ready(big(3)), Reading::Ready(big(2)));
        assert_eq!(usage.percent(), Some(33.33));

        let usage = cap_usage(Reading::Ready(big(3)), Reading::Ready(big(0)));
        assert_eq!(usage.percent(), Some(100.0));
    }

    #[test]
    fn test_cap_usage_zero_cap_is_placeholder() {
        let usage = cap_usage(Reading::Ready(big(0)), Reading::Ready(big(0)));
        assert_eq!(usage, CapUsage::Undefined);
        assert_eq!(usage.percent(), None);
        assert_eq!(usage.display(), PLACEHOLDER);
    }

    #[test]
    fn test_cap_usage_unavailable() {
        let usage = cap_usage(Reading::Ready(big(100)), Reading::Unavailable);
        assert_eq!(usage, CapUsage::Unavailable);
        assert_eq!(usage.display(), PLACEHOLDER);
    }

    #[test]
    fn test_cap_usage_stale_remaining_is_clamped() {
        let usage = cap_usage(Reading::Ready(big(100)), Reading::Ready(big(150)));
        assert_eq!(usage.percent(), Some(0.0));
        assert!(matches!(
            usage,
            CapUsage::Used {
                inconsistent: true,
                ..
            }
        ));
        assert_eq!(usage.display(), "0.00% (stale)");
    }

    #[test]
    fn test_cap_usage_always_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let cap: u128 = rng.gen_range(1..=u128::MAX);
            let remaining: u128 = rng.gen_range(0..=cap);
            let usage = cap_usage(
                Reading::Ready(BigUint::from(cap)),
                Reading::Ready(BigUint::from(remaining)),
            );
            let percent = usage.percent().unwrap();
            assert!((0.0..=100.0).contains(&percent), "{percent} out of range");
        }
    }
}
