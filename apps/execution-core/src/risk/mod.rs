//! Risk layer: position sizing, circuit breaking and trade-plan
//! validation.
//!
//! Sizing and validation are total functions - they never fail, they
//! downgrade. The circuit breaker is the only stateful piece and has a
//! single logical owner per scanning session.

mod breaker;
mod sizing;
mod validator;

pub use breaker::{BreakerSnapshot, CircuitBreaker};
pub use sizing::{compute_position_size, SizingOutcome};
pub use validator::{SanityFlag, TradePlanValidator, ValidationProfile};
