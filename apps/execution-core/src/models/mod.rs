//! Boundary types shared across the execution core.
//!
//! Trade plans arrive from an external reasoning step as loosely shaped
//! JSON; everything here deserializes defensively (optional fields,
//! defaults) so a malformed payload degrades to a no-trade plan instead
//! of an error.

mod account;
mod market;
mod plan;

pub use account::{AccountInfo, TimeHorizon};
pub use market::{Candle, MarketData, MarketMeta};
pub use plan::{
    Action, Direction, EntrySpec, OrderReceipt, PositionSizing, ReceiptStatus, StopLoss,
    TakeProfit, TradePlan,
};
