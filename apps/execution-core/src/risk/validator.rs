//! Trade-plan sanity checks and sizing write-back.

use std::fmt;

use tracing::{debug, warn};

use crate::models::{AccountInfo, Action, Direction, MarketMeta, PositionSizing, TradePlan};
use crate::risk::sizing::compute_position_size;

/// Guard against division by a zero reference price.
const EPSILON: f64 = 1e-9;
/// Entry may deviate at most this fraction from the last close.
const MAX_ENTRY_DEVIATION: f64 = 0.05;
/// Stop may be at most this fraction of the last close away from entry.
const MAX_STOP_DISTANCE: f64 = 0.15;

/// Sanity violation detected while validating a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanityFlag {
    /// No reference close price available.
    LastCloseMissing,
    /// Plan carries no entry trigger price.
    EntryMissing,
    /// Plan carries no stop price.
    StopMissing,
    /// Entry deviates more than 5% from the last close.
    EntryFarFromLastClose,
    /// Stop distance exceeds 15% of the last close.
    StopTooFar,
    /// Long plan with a stop at or above the entry.
    StopNotBelowEntryForLong,
    /// Short plan with a stop at or below the entry.
    StopNotAboveEntryForShort,
    /// Non-positive entry-to-stop distance.
    InvalidRiskPerShare,
}

impl SanityFlag {
    /// Stable string form as recorded on the plan.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastCloseMissing => "last_close_missing",
            Self::EntryMissing => "entry_missing",
            Self::StopMissing => "stop_missing",
            Self::EntryFarFromLastClose => "entry_far_from_last_close",
            Self::StopTooFar => "stop_too_far",
            Self::StopNotBelowEntryForLong => "stop_not_below_entry_for_long",
            Self::StopNotAboveEntryForShort => "stop_not_above_entry_for_short",
            Self::InvalidRiskPerShare => "invalid_risk_per_share",
        }
    }
}

impl fmt::Display for SanityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strictly geometry flags are enforced.
///
/// The scan loop tolerates flagged plans and only refuses unsizable ones;
/// the single-symbol path refuses any flagged plan outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationProfile {
    /// Record geometry flags as warnings; force no-trade only on `qty == 0`.
    #[default]
    Scanner,
    /// Any geometry flag forces no-trade before sizing.
    Strict,
}

/// Sanity-checks plans against the last known price and stop/entry
/// geometry, then writes the sizing block.
#[derive(Debug, Clone, Copy)]
pub struct TradePlanValidator {
    profile: ValidationProfile,
    max_entry_deviation: f64,
    max_stop_distance: f64,
}

impl Default for TradePlanValidator {
    fn default() -> Self {
        Self::new(ValidationProfile::default())
    }
}

impl TradePlanValidator {
    /// Validator with the given enforcement profile and default thresholds.
    #[must_use]
    pub const fn new(profile: ValidationProfile) -> Self {
        Self {
            profile,
            max_entry_deviation: MAX_ENTRY_DEVIATION,
            max_stop_distance: MAX_STOP_DISTANCE,
        }
    }

    /// Override the deviation and stop-distance thresholds.
    #[must_use]
    pub const fn with_thresholds(mut self, max_entry_deviation: f64, max_stop_distance: f64) -> Self {
        self.max_entry_deviation = max_entry_deviation;
        self.max_stop_distance = max_stop_distance;
        self
    }

    /// Validate and size a plan. Total function, never raises; the
    /// returned plan is possibly downgraded to no-trade.
    ///
    /// An already-no-trade plan passes through unchanged.
    #[must_use]
    pub fn validate_and_size(
        &self,
        mut plan: TradePlan,
        account: &AccountInfo,
        meta: &MarketMeta,
    ) -> TradePlan {
        if plan.action != Action::OpenPosition {
            return plan;
        }

        let entry = plan.entry.as_ref().and_then(|e| e.trigger_price);
        let stop = plan.stop_loss.as_ref().and_then(|s| s.price);

        // Presence failures force no-trade in every profile.
        let mut missing = Vec::new();
        if meta.last_close.is_none() {
            missing.push(SanityFlag::LastCloseMissing);
        }
        if entry.is_none() {
            missing.push(SanityFlag::EntryMissing);
        }
        if stop.is_none() {
            missing.push(SanityFlag::StopMissing);
        }
        if !missing.is_empty() {
            return Self::downgrade_with_flags(plan, &missing);
        }

        // Presence established above.
        let (Some(last_close), Some(entry), Some(stop)) = (meta.last_close, entry, stop) else {
            return plan;
        };

        let mut flags = Vec::new();
        let reference = last_close.max(EPSILON);
        if (entry - last_close).abs() / reference > self.max_entry_deviation {
            flags.push(SanityFlag::EntryFarFromLastClose);
        }
        if (entry - stop).abs() / reference > self.max_stop_distance {
            flags.push(SanityFlag::StopTooFar);
        }
        match plan.direction {
            Some(Direction::Long) if stop >= entry => {
                flags.push(SanityFlag::StopNotBelowEntryForLong);
            }
            Some(Direction::Short) if stop <= entry => {
                flags.push(SanityFlag::StopNotAboveEntryForShort);
            }
            _ => {}
        }
        if (entry - stop).abs() <= 0.0 {
            flags.push(SanityFlag::InvalidRiskPerShare);
        }

        if !flags.is_empty() {
            match self.profile {
                ValidationProfile::Strict => {
                    return Self::downgrade_with_flags(plan, &flags);
                }
                ValidationProfile::Scanner => {
                    // Push-if-absent keeps re-validation idempotent.
                    for flag in &flags {
                        let name = flag.to_string();
                        if !plan.sanity_flags.contains(&name) {
                            plan.sanity_flags.push(name);
                        }
                    }
                    debug!(
                        symbol = %plan.symbol,
                        flags = ?plan.sanity_flags,
                        "sanity flags recorded, continuing to sizing"
                    );
                }
            }
        }

        let outcome = compute_position_size(
            account.account_size,
            account.max_risk_per_trade,
            Some(entry),
            Some(stop),
        );
        plan.position_sizing = Some(PositionSizing {
            max_risk_amount: outcome.max_risk_amount,
            risk_per_share: outcome.risk_per_share,
            contracts_or_shares: outcome.qty,
            ..PositionSizing::default()
        });

        if outcome.qty == 0 {
            warn!(symbol = %plan.symbol, "position size zero or invalid, forcing no_trade");
            plan.warnings.push("position_size_zero_or_invalid".to_string());
            plan.action = Action::NoTrade;
        }

        plan
    }

    fn downgrade_with_flags(mut plan: TradePlan, flags: &[SanityFlag]) -> TradePlan {
        for flag in flags {
            let name = flag.to_string();
            if !plan.sanity_flags.contains(&name) {
                plan.sanity_flags.push(name);
            }
        }
        let joined = flags
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(",");
        warn!(symbol = %plan.symbol, flags = %joined, "plan failed sanity checks");
        plan.sanity_reason = Some(joined);
        plan.action = Action::NoTrade;
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntrySpec, StopLoss};

    fn account() -> AccountInfo {
        AccountInfo {
            account_size: 100_000.0,
            max_risk_per_trade: 0.01,
            ..AccountInfo::default()
        }
    }

    fn meta(last_close: f64) -> MarketMeta {
        MarketMeta {
            last_close: Some(last_close),
            ..MarketMeta::default()
        }
    }

    fn long_plan(entry: f64, stop: f64) -> TradePlan {
        TradePlan {
            symbol: "AAPL".to_string(),
            action: Action::OpenPosition,
            direction: Some(Direction::Long),
            entry: Some(EntrySpec {
                trigger_price: Some(entry),
                ..EntrySpec::default()
            }),
            stop_loss: Some(StopLoss {
                price: Some(stop),
                ..StopLoss::default()
            }),
            ..TradePlan::default()
        }
    }

    #[test]
    fn clean_plan_gets_sized() {
        let validator = TradePlanValidator::new(ValidationProfile::Strict);
        let out = validator.validate_and_size(long_plan(100.0, 98.0), &account(), &meta(100.0));
        assert_eq!(out.action, Action::OpenPosition);
        assert!(out.sanity_flags.is_empty());
        assert_eq!(out.sized_quantity(), 500);
    }

    #[test]
    fn missing_last_close_forces_no_trade() {
        let validator = TradePlanValidator::default();
        let out = validator.validate_and_size(
            long_plan(100.0, 98.0),
            &account(),
            &MarketMeta::default(),
        );
        assert_eq!(out.action, Action::NoTrade);
        assert_eq!(out.sanity_flags, vec!["last_close_missing"]);
        assert_eq!(out.sanity_reason.as_deref(), Some("last_close_missing"));
    }

    #[test]
    fn missing_entry_and_stop_both_flagged() {
        let validator = TradePlanValidator::default();
        let plan = TradePlan {
            symbol: "MSFT".to_string(),
            action: Action::OpenPosition,
            ..TradePlan::default()
        };
        let out = validator.validate_and_size(plan, &account(), &meta(100.0));
        assert_eq!(out.action, Action::NoTrade);
        assert_eq!(out.sanity_flags, vec!["entry_missing", "stop_missing"]);
    }

    #[test]
    fn far_entry_forces_no_trade_in_strict() {
        // 8% deviation, stop distance only 1% of last close
        let validator = TradePlanValidator::new(ValidationProfile::Strict);
        let out = validator.validate_and_size(long_plan(108.0, 107.0), &account(), &meta(100.0));
        assert_eq!(out.action, Action::NoTrade);
        assert_eq!(out.sanity_flags, vec!["entry_far_from_last_close"]);
        assert_eq!(
            out.sanity_reason.as_deref(),
            Some("entry_far_from_last_close")
        );
        assert!(out.position_sizing.is_none());
    }

    #[test]
    fn far_entry_still_sized_in_scanner_profile() {
        let validator = TradePlanValidator::new(ValidationProfile::Scanner);
        let out = validator.validate_and_size(long_plan(108.0, 107.0), &account(), &meta(100.0));
        assert_eq!(out.action, Action::OpenPosition);
        assert_eq!(out.sanity_flags, vec!["entry_far_from_last_close"]);
        assert!(out.sanity_reason.is_none());
        assert_eq!(out.sized_quantity(), 1000);
    }

    #[test]
    fn short_with_stop_below_entry_flagged() {
        let mut plan = long_plan(100.0, 98.0);
        plan.direction = Some(Direction::Short);
        let validator = TradePlanValidator::new(ValidationProfile::Strict);
        let out = validator.validate_and_size(plan, &account(), &meta(100.0));
        assert_eq!(out.action, Action::NoTrade);
        assert_eq!(out.sanity_flags, vec!["stop_not_above_entry_for_short"]);
    }

    #[test]
    fn equal_entry_and_stop_collects_both_geometry_flags() {
        let validator = TradePlanValidator::new(ValidationProfile::Strict);
        let out = validator.validate_and_size(long_plan(100.0, 100.0), &account(), &meta(100.0));
        assert_eq!(out.action, Action::NoTrade);
        assert_eq!(
            out.sanity_flags,
            vec!["stop_not_below_entry_for_long", "invalid_risk_per_share"]
        );
    }

    #[test]
    fn wide_stop_flagged() {
        let validator = TradePlanValidator::new(ValidationProfile::Strict);
        let out = validator.validate_and_size(long_plan(100.0, 80.0), &account(), &meta(100.0));
        assert!(out
            .sanity_flags
            .iter()
            .any(|f| f == "stop_too_far"));
        assert_eq!(out.action, Action::NoTrade);
    }

    #[test]
    fn zero_quantity_downgrades_with_warning() {
        // Tiny account: budget 1.00, risk/share 2.0 -> qty 0.
        let account = AccountInfo {
            account_size: 100.0,
            max_risk_per_trade: 0.01,
            ..AccountInfo::default()
        };
        let validator = TradePlanValidator::new(ValidationProfile::Scanner);
        let out = validator.validate_and_size(long_plan(100.0, 98.0), &account, &meta(100.0));
        assert_eq!(out.action, Action::NoTrade);
        assert_eq!(out.warnings, vec!["position_size_zero_or_invalid"]);
        assert_eq!(out.sized_quantity(), 0);
    }

    #[test]
    fn validation_is_idempotent_on_downgraded_plans() {
        let validator = TradePlanValidator::new(ValidationProfile::Strict);
        let once = validator.validate_and_size(long_plan(108.0, 107.0), &account(), &meta(100.0));
        let twice = validator.validate_and_size(once.clone(), &account(), &meta(100.0));
        assert_eq!(twice.action, once.action);
        assert_eq!(twice.sanity_flags, once.sanity_flags);
        assert_eq!(twice.sanity_reason, once.sanity_reason);
    }

    #[test]
    fn scanner_revalidation_does_not_duplicate_flags() {
        // Scanner keeps a flagged plan tradeable, so it can legitimately
        // be validated again; the flag list must not grow.
        let validator = TradePlanValidator::new(ValidationProfile::Scanner);
        let once = validator.validate_and_size(long_plan(108.0, 107.0), &account(), &meta(100.0));
        assert_eq!(once.action, Action::OpenPosition);
        let twice = validator.validate_and_size(once.clone(), &account(), &meta(100.0));
        assert_eq!(twice.sanity_flags, once.sanity_flags);
        assert_eq!(twice.sanity_flags, vec!["entry_far_from_last_close"]);
    }

    #[test]
    fn no_trade_plan_passes_through_untouched() {
        let validator = TradePlanValidator::default();
        let plan = TradePlan {
            symbol: "TSLA".to_string(),
            action: Action::NoTrade,
            reason: Some("no setup".to_string()),
            ..TradePlan::default()
        };
        let out = validator.validate_and_size(plan, &account(), &meta(100.0));
        assert_eq!(out.action, Action::NoTrade);
        assert!(out.sanity_flags.is_empty());
    }
}
