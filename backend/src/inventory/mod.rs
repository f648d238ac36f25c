//! Inventory Ledger
//!
//! Depletable stock grouped by category. Stock status is derived from
//! amount/capacity on every read and never stored, so it cannot go stale.
//!
//! # Key Principles
//!
//! 1. **Floor at zero**: no depletion drives an amount negative
//! 2. **Pure status**: `StockStatus::from_levels` is the only source of status
//! 3. **Flat-rate consumption**: completing an order burns fixed quantities,
//!    not a recipe

mod item;
mod ledger;

pub use item::{InventoryCategory, InventoryItem, StockLevel, StockStatus};
pub use ledger::{
    InventoryLedger, LedgerError, COFFEE_PER_ORDER, CUPS_PER_ORDER, MILK_LARGE, MILK_REGULAR,
    MILK_SMALL,
};
