//! Kiosk Simulator Core - Rust Engine
//!
//! Deterministic order-lifecycle simulator and station workload balancer for
//! a coffee-order kiosk.
//!
//! # Architecture
//!
//! - **core**: Virtual clock and timer scheduler
//! - **rng**: Deterministic random number generation
//! - **events**: Typed event bus
//! - **inventory**: Stock ledger with derived status
//! - **models**: Domain types (Order, Station, StaffMessage, State)
//! - **simulator**: Order generation, batching and the timer-driven engine
//! - **balancer**: Workload analysis and transfer suggestions
//! - **facade**: Change-detecting, station-filtered order lists
//!
//! # Critical Invariants
//!
//! 1. Order status only moves forward (or to removed from a non-terminal state)
//! 2. All randomness is deterministic (seeded RNG)
//! 3. Inventory amounts never go negative; stock status is never stored

// Module declarations
pub mod balancer;
pub mod core;
pub mod events;
pub mod facade;
pub mod inventory;
pub mod models;
pub mod rng;
pub mod simulator;

// Re-exports for convenience
pub use balancer::{
    BalancerStats, BalancingRules, StationLoad, TransferError, TransferSuggestion,
    WorkloadBalancer, WorkloadSnapshot,
};
pub use crate::core::{scheduler::Scheduler, time::SimClock};
pub use events::{EventBus, EventKind, HandlerError, OrderChange, SimEvent, SubscriptionId};
pub use facade::{filter_by_station, OrderQueryCache, RefreshOutcome};
pub use inventory::{InventoryCategory, InventoryLedger, LedgerError, StockLevel, StockStatus};
pub use models::{
    message::StaffMessage,
    order::{Order, OrderError, OrderRequest, OrderStatus},
    state::SimulationState,
    station::{Station, StationCapabilities, StationStatus},
};
pub use rng::RngManager;
pub use simulator::{
    ActionError, OrderFrequency, SettingsPatch, SimulationError, SimulationSettings,
    SimulationSpeed, Simulator, SimulatorConfig,
};
