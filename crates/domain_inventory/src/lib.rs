//! Inventory domain - batches, FIFO costing, movements, and transfers
//!
//! Stock lives in batches, each carrying its own acquisition cost. Sales and
//! downward adjustments consume batches FIFO (soonest expiry first), which
//! yields the exact cost of goods for every outbound quantity.

pub mod batch;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod movement;
pub mod transfer;

pub use batch::{NewBatch, StockBatch};
pub use catalog::{Product, ProductCatalog};
pub use error::InventoryError;
pub use ledger::{AdjustmentOutcome, BatchDraw, ConsumptionPlan, StockLedger};
pub use movement::{MovementType, StockMovement};
pub use transfer::{transfer_stock, CreateTransfer, StockTransfer, TransferItem, TransferLine};
