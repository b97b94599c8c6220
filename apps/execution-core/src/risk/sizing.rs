//! Deterministic position sizing from a fixed risk budget.

use serde::{Deserialize, Serialize};

/// Result of a sizing computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingOutcome {
    /// Dollar risk budget, rounded to 2 decimals.
    pub max_risk_amount: f64,
    /// Entry-to-stop distance, rounded to 4 decimals.
    pub risk_per_share: f64,
    /// Sized quantity, floored.
    pub qty: u64,
}

impl SizingOutcome {
    /// The zero-sizing sentinel returned for any invalid input.
    pub const ZERO: Self = Self {
        max_risk_amount: 0.0,
        risk_per_share: 0.0,
        qty: 0,
    };
}

/// Conservative share count: `qty = floor(max_risk_amount / |entry - stop|)`.
///
/// Total function - any non-positive, missing or non-finite input yields
/// the zero-sizing sentinel instead of an error.
#[must_use]
pub fn compute_position_size(
    account_size: f64,
    max_risk_per_trade: f64,
    entry_price: Option<f64>,
    stop_price: Option<f64>,
) -> SizingOutcome {
    let (Some(entry), Some(stop)) = (entry_price, stop_price) else {
        return SizingOutcome::ZERO;
    };

    if !account_size.is_finite()
        || !max_risk_per_trade.is_finite()
        || !entry.is_finite()
        || !stop.is_finite()
        || account_size <= 0.0
        || max_risk_per_trade <= 0.0
    {
        return SizingOutcome::ZERO;
    }

    let risk_per_share = (entry - stop).abs();
    if risk_per_share <= 0.0 {
        return SizingOutcome::ZERO;
    }

    let max_risk_amount = account_size * max_risk_per_trade;
    let qty = (max_risk_amount / risk_per_share).floor().max(0.0) as u64;

    SizingOutcome {
        max_risk_amount: round_to(max_risk_amount, 2),
        risk_per_share: round_to(risk_per_share, 4),
        qty,
    }
}

/// Round half away from zero to `decimals` places, for display only.
fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn textbook_sizing() {
        let out = compute_position_size(100_000.0, 0.01, Some(50.0), Some(49.0));
        assert_eq!(out.max_risk_amount, 1000.00);
        assert_eq!(out.risk_per_share, 1.0000);
        assert_eq!(out.qty, 1000);
    }

    #[test]
    fn quantity_is_floored() {
        // budget 1000, risk/share 3 -> 333.33 -> 333
        let out = compute_position_size(100_000.0, 0.01, Some(53.0), Some(50.0));
        assert_eq!(out.qty, 333);
    }

    #[test_case(0.0, 0.01, Some(50.0), Some(49.0); "zero account")]
    #[test_case(-100.0, 0.01, Some(50.0), Some(49.0); "negative account")]
    #[test_case(100_000.0, 0.0, Some(50.0), Some(49.0); "zero risk fraction")]
    #[test_case(100_000.0, 0.01, None, Some(49.0); "missing entry")]
    #[test_case(100_000.0, 0.01, Some(50.0), None; "missing stop")]
    #[test_case(100_000.0, 0.01, Some(50.0), Some(50.0); "equal prices")]
    #[test_case(100_000.0, 0.01, Some(f64::NAN), Some(49.0); "nan entry")]
    fn invalid_inputs_yield_zero_sentinel(
        account: f64,
        risk: f64,
        entry: Option<f64>,
        stop: Option<f64>,
    ) {
        assert_eq!(
            compute_position_size(account, risk, entry, stop),
            SizingOutcome::ZERO
        );
    }

    #[test]
    fn rounding_for_display() {
        let out = compute_position_size(100_000.0, 0.013, Some(10.123_46), Some(10.0));
        assert!((out.max_risk_amount - 1300.00).abs() < 1e-9);
        assert!((out.risk_per_share - 0.1235).abs() < 1e-9);
    }

    proptest! {
        /// Quantity is non-decreasing in account size and risk fraction.
        #[test]
        fn qty_monotone_in_budget(
            account_a in 1.0f64..1e7,
            account_b in 1.0f64..1e7,
            risk_a in 0.001f64..0.05,
            risk_b in 0.001f64..0.05,
        ) {
            let entry = Some(50.0);
            let stop = Some(48.5);
            let lo = compute_position_size(account_a.min(account_b), risk_a, entry, stop);
            let hi = compute_position_size(account_a.max(account_b), risk_a, entry, stop);
            prop_assert!(hi.qty >= lo.qty);

            let lo = compute_position_size(account_a, risk_a.min(risk_b), entry, stop);
            let hi = compute_position_size(account_a, risk_a.max(risk_b), entry, stop);
            prop_assert!(hi.qty >= lo.qty);
        }

        /// Worst-case loss at the stop never exceeds the unrounded budget.
        #[test]
        fn loss_at_stop_within_budget(
            account in 100.0f64..1e7,
            risk in 0.001f64..0.05,
            entry in 1.0f64..500.0,
            dist in 0.01f64..50.0,
        ) {
            let out = compute_position_size(account, risk, Some(entry), Some(entry - dist));
            let loss = out.qty as f64 * dist;
            // allow for f64 division slack on the floor boundary
            prop_assert!(loss <= account * risk * (1.0 + 1e-9));
        }
    }
}
