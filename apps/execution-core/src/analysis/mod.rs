//! Ports to the external analysis and market-data collaborators.

mod port;
mod stub;

pub use port::{AnalysisError, AnalysisPort, MarketDataPort};
pub use stub::{StubAnalysis, StubMarketData};
