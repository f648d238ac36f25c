//! Domain models for the kiosk simulator

pub mod message;
pub mod order;
pub mod order_book;
pub mod state;
pub mod station;

// Re-exports
pub use message::StaffMessage;
pub use order::{CupSize, Order, OrderError, OrderList, OrderRequest, OrderStatus};
pub use order_book::{OrderBook, OrderRevisions};
pub use state::SimulationState;
pub use station::{Station, StationCapabilities, StationStatus};
