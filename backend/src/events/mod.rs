//! Event publication
//!
//! - `types`: the event vocabulary ([`SimEvent`], [`EventKind`])
//! - `bus`: synchronous publish/subscribe ([`EventBus`])

pub mod bus;
pub mod types;

pub use bus::{EventBus, HandlerError, HandlerResult, SubscriptionId};
pub use types::{AlertSeverity, AlertSource, EventKind, OrderChange, SimEvent, SystemAlert};
