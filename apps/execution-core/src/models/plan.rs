//! Trade plan and order receipt types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trading action requested by a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Enter a new position.
    OpenPosition,
    /// No trade for this symbol.
    #[default]
    NoTrade,
}

/// Position direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Long position.
    Long,
    /// Short position.
    Short,
}

/// Entry specification of a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntrySpec {
    /// Entry style hint (breakout, pullback, ...). Informational only.
    #[serde(default)]
    pub style: Option<String>,
    /// Price level that triggers the entry.
    #[serde(default)]
    pub trigger_price: Option<f64>,
}

/// Stop-loss specification of a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopLoss {
    /// Stop price.
    #[serde(default)]
    pub price: Option<f64>,
    /// Risk per share as stated by the producer (recomputed by the sizer).
    #[serde(default)]
    pub risk_per_share: Option<f64>,
}

/// Take-profit specification of a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TakeProfit {
    /// Target price.
    #[serde(default)]
    pub target_price: Option<f64>,
    /// Reward/risk ratio as stated by the producer.
    #[serde(default)]
    pub reward_risk_ratio: Option<f64>,
}

/// Position sizing block, written by the sizer and annotated by the router.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionSizing {
    /// Dollar risk budget for this trade.
    #[serde(default)]
    pub max_risk_amount: f64,
    /// Distance between entry and stop.
    #[serde(default)]
    pub risk_per_share: f64,
    /// Sized quantity.
    #[serde(default)]
    pub contracts_or_shares: u64,
    /// Set when the router clamped the quantity to the configured cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capped: Option<bool>,
    /// Quantity requested before clamping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_qty: Option<u64>,
    /// Quantity actually used after clamping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_qty: Option<u64>,
}

/// A proposed trade pending validation, sizing and execution.
///
/// Produced by an external reasoning step; every field is optional or
/// defaulted because the producer is occasionally malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradePlan {
    /// Instrument symbol.
    #[serde(default)]
    pub symbol: String,
    /// Requested action.
    #[serde(default)]
    pub action: Action,
    /// Position direction, required for `open_position`.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Entry specification.
    #[serde(default)]
    pub entry: Option<EntrySpec>,
    /// Stop-loss specification.
    #[serde(default)]
    pub stop_loss: Option<StopLoss>,
    /// Take-profit specification.
    #[serde(default)]
    pub take_profit: Option<TakeProfit>,
    /// Sizing block, filled in by the validator.
    #[serde(default)]
    pub position_sizing: Option<PositionSizing>,
    /// Instrument type (stock, option, future, fx, ...). Default stock.
    #[serde(default)]
    pub instrument_type: Option<String>,
    /// Order type (MKT, LMT, ...). Default MKT.
    #[serde(default)]
    pub order_type: Option<String>,
    /// Limit price for limit orders.
    #[serde(default)]
    pub limit_price: Option<f64>,
    /// Producer rationale.
    #[serde(default)]
    pub reason: Option<String>,
    /// Sanity flags accumulated by the validator. Never silently cleared.
    #[serde(default)]
    pub sanity_flags: Vec<String>,
    /// Comma-joined flags that forced a downgrade to no-trade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanity_reason: Option<String>,
    /// Accumulated warnings.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl TradePlan {
    /// Parse a plan from a loose JSON payload.
    ///
    /// Unknown fields are ignored; an unparseable payload yields a
    /// no-trade plan carrying the parse error as its reason.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<Self>(value) {
            Ok(plan) => plan,
            Err(e) => Self {
                action: Action::NoTrade,
                reason: Some(format!("unparseable trade plan: {e}")),
                ..Self::default()
            },
        }
    }

    /// Sized quantity, zero when the sizing block is absent.
    #[must_use]
    pub fn sized_quantity(&self) -> u64 {
        self.position_sizing
            .as_ref()
            .map_or(0, |s| s.contracts_or_shares)
    }

    /// Downgrade the plan to no-trade with a reason.
    pub fn downgrade(&mut self, reason: impl Into<String>) {
        self.action = Action::NoTrade;
        self.reason = Some(reason.into());
    }
}

/// Outcome of a single execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Dry run, no broker call made.
    Simulated,
    /// Order accepted by the broker endpoint.
    Sent,
    /// Execution guard refused the attempt.
    Blocked,
    /// Transport, configuration or broker error.
    Error,
    /// Plan did not request (or no longer requests) a position.
    NoTrade,
}

impl std::fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::Sent => write!(f, "sent"),
            Self::Blocked => write!(f, "blocked"),
            Self::Error => write!(f, "error"),
            Self::NoTrade => write!(f, "no_trade"),
        }
    }
}

/// Normalized result of routing a trade plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Terminal status of the attempt.
    pub status: ReceiptStatus,
    /// Broker that handled (or would have handled) the order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<String>,
    /// Raw broker response payload, attached for audit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    /// Human-readable reason for every non-success outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl OrderReceipt {
    /// Receipt for a dry run.
    #[must_use]
    pub fn simulated(raw: Value) -> Self {
        Self {
            status: ReceiptStatus::Simulated,
            broker: Some("simulated".to_string()),
            raw: Some(raw),
            reason: None,
        }
    }

    /// Receipt for a dispatched order.
    #[must_use]
    pub fn sent(broker: impl Into<String>, raw: Value) -> Self {
        Self {
            status: ReceiptStatus::Sent,
            broker: Some(broker.into()),
            raw: Some(raw),
            reason: None,
        }
    }

    /// Receipt for a guard refusal.
    #[must_use]
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            status: ReceiptStatus::Blocked,
            broker: None,
            raw: None,
            reason: Some(reason.into()),
        }
    }

    /// Receipt for a failed attempt.
    #[must_use]
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: ReceiptStatus::Error,
            broker: None,
            raw: None,
            reason: Some(reason.into()),
        }
    }

    /// Receipt for a plan that does not request a position.
    #[must_use]
    pub fn no_trade(reason: impl Into<String>) -> Self {
        Self {
            status: ReceiptStatus::NoTrade,
            broker: None,
            raw: None,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_parses_from_loose_json() {
        let plan = TradePlan::from_value(json!({
            "symbol": "AAPL",
            "action": "open_position",
            "direction": "long",
            "entry": {"style": "breakout", "trigger_price": 101.5},
            "stop_loss": {"price": 99.0},
            "take_profit": {"target_price": 107.0, "reward_risk_ratio": 2.2},
            "reason": "momentum setup",
            "unknown_field": {"ignored": true}
        }));

        assert_eq!(plan.symbol, "AAPL");
        assert_eq!(plan.action, Action::OpenPosition);
        assert_eq!(plan.direction, Some(Direction::Long));
        assert_eq!(
            plan.entry.as_ref().and_then(|e| e.trigger_price),
            Some(101.5)
        );
        assert!(plan.sanity_flags.is_empty());
    }

    #[test]
    fn unparseable_plan_degrades_to_no_trade() {
        let plan = TradePlan::from_value(json!({"action": 42}));
        assert_eq!(plan.action, Action::NoTrade);
        assert!(plan
            .reason
            .as_deref()
            .is_some_and(|r| r.contains("unparseable")));
    }

    #[test]
    fn missing_action_defaults_to_no_trade() {
        let plan = TradePlan::from_value(json!({"symbol": "MSFT"}));
        assert_eq!(plan.action, Action::NoTrade);
    }

    #[test]
    fn sized_quantity_defaults_to_zero() {
        let plan = TradePlan::default();
        assert_eq!(plan.sized_quantity(), 0);
    }

    #[test]
    fn receipt_status_serializes_snake_case() {
        let receipt = OrderReceipt::no_trade("nothing to do");
        let value = serde_json::to_value(&receipt).unwrap();
        assert_eq!(value["status"], "no_trade");
        assert_eq!(value["reason"], "nothing to do");
    }

    #[test]
    fn receipt_constructors_carry_reasons() {
        assert_eq!(
            OrderReceipt::blocked("guard off").status,
            ReceiptStatus::Blocked
        );
        assert_eq!(OrderReceipt::error("boom").status, ReceiptStatus::Error);
        let sent = OrderReceipt::sent("ibkr", json!({"id": 1}));
        assert_eq!(sent.broker.as_deref(), Some("ibkr"));
        assert!(sent.reason.is_none());
    }
}
