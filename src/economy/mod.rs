//! Economy layer - stockpile ledger, severity bands, scarcity, trade

pub mod ledger;
pub mod scarcity;
pub mod thresholds;
pub mod trade;

pub use ledger::{transfer_resources, Party, ResourceLedger, ResourceStore};
pub use scarcity::{analyze_scarcity, ConsumptionStats, ScarcityReport};
pub use thresholds::{classify, StockSeverity};
pub use trade::{equivalent, execute_trade, value_of};
