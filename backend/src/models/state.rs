//! Simulation State
//!
//! Everything a run mutates lives here and is owned by the simulator:
//! the order book, the inventory ledger and the staff message board.
//!
//! # Critical Invariants
//!
//! 1. **Order Uniqueness**: each order ID appears exactly once in the book
//! 2. **Ledger Floor**: no inventory amount is ever negative
//! 3. **Explicit Reset**: nothing survives [`SimulationState::reset`] except
//!    the book's revision counters, which keep growing

use crate::inventory::InventoryLedger;
use crate::models::message::StaffMessage;
use crate::models::order_book::OrderBook;

/// Complete mutable state of one simulator
///
/// # Example
///
/// ```rust
/// use kiosk_simulator_core_rs::SimulationState;
///
/// let state = SimulationState::new();
/// assert!(state.orders.is_empty());
/// assert_eq!(state.inventory.stock_levels().len(), 13);
/// assert_eq!(state.unread_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    pub orders: OrderBook,
    pub inventory: InventoryLedger,

    /// Newest last
    pub messages: Vec<StaffMessage>,
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all orders and messages, restore baseline stock
    pub fn reset(&mut self) {
        self.orders.clear();
        self.inventory.seed();
        self.messages.clear();
    }

    /// Flag one message as read; false if the id is unknown
    pub fn mark_message_read(&mut self, id: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.read = true;
                true
            }
            None => false,
        }
    }

    pub fn unread_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.read).count()
    }
}
