//! Event types published by the simulator
//!
//! Every externally visible state change is reported as a [`SimEvent`].
//! Subscribers register per [`EventKind`]; each event belongs to exactly one
//! kind.
//!
//! # Design Principles
//!
//! 1. **Self-contained**: events carry snapshots of the entities they describe,
//!    never references into simulator state
//! 2. **Timestamped**: `at` is the simulation clock in milliseconds
//! 3. **Tagged**: order updates say what changed via [`OrderChange`]

use crate::inventory::{InventoryCategory, StockLevel, StockStatus};
use crate::models::message::StaffMessage;
use crate::models::order::Order;
use crate::simulator::settings::SimulationSettings;
use serde::{Deserialize, Serialize};

/// Subscription channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    NewOrder,
    OrderUpdated,
    StockUpdated,
    MessageReceived,
    SystemAlert,
    SimulationStatus,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::NewOrder,
        EventKind::OrderUpdated,
        EventKind::StockUpdated,
        EventKind::MessageReceived,
        EventKind::SystemAlert,
        EventKind::SimulationStatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NewOrder => "NEW_ORDER",
            EventKind::OrderUpdated => "ORDER_UPDATED",
            EventKind::StockUpdated => "STOCK_UPDATED",
            EventKind::MessageReceived => "MESSAGE_RECEIVED",
            EventKind::SystemAlert => "SYSTEM_ALERT",
            EventKind::SimulationStatus => "SIMULATION_STATUS",
        }
    }
}

/// What happened to the orders carried by an `OrderUpdated` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum OrderChange {
    Started,
    Completed,
    PickedUp,
    Removed,

    /// Pending wait crossed a positive multiple of five minutes
    WaitMilestone { minutes: u32 },

    /// Existing pending orders were tagged with a freshly minted batch key
    BatchFormed { batch_key: String },

    /// Every pending order of a batch was started
    BatchProcessed { batch_key: String },

    /// Promised wait set on all pending orders
    WaitAdjusted { minutes: u32 },

    /// Order moved between stations by an executed transfer suggestion
    Transferred { from: String, to: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// Origin of a system alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AlertSource {
    Inventory {
        category: InventoryCategory,
        item_id: String,
    },
    Equipment {
        station: String,
        fault: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemAlert {
    pub severity: AlertSeverity,
    #[serde(flatten)]
    pub source: AlertSource,
    pub message: String,
}

/// A published event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimEvent {
    NewOrder {
        at: u64,
        order: Order,
    },

    OrderUpdated {
        at: u64,
        #[serde(flatten)]
        change: OrderChange,
        orders: Vec<Order>,
    },

    StockUpdated {
        at: u64,
        category: InventoryCategory,
        item: StockLevel,
        previous_status: StockStatus,
    },

    MessageReceived {
        at: u64,
        message: StaffMessage,
    },

    SystemAlert {
        at: u64,
        alert: SystemAlert,
    },

    SimulationStatus {
        at: u64,
        running: bool,
        settings: SimulationSettings,
    },
}

impl SimEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SimEvent::NewOrder { .. } => EventKind::NewOrder,
            SimEvent::OrderUpdated { .. } => EventKind::OrderUpdated,
            SimEvent::StockUpdated { .. } => EventKind::StockUpdated,
            SimEvent::MessageReceived { .. } => EventKind::MessageReceived,
            SimEvent::SystemAlert { .. } => EventKind::SystemAlert,
            SimEvent::SimulationStatus { .. } => EventKind::SimulationStatus,
        }
    }

    /// Simulation time the event was published at
    pub fn at(&self) -> u64 {
        match self {
            SimEvent::NewOrder { at, .. }
            | SimEvent::OrderUpdated { at, .. }
            | SimEvent::StockUpdated { at, .. }
            | SimEvent::MessageReceived { at, .. }
            | SimEvent::SystemAlert { at, .. }
            | SimEvent::SimulationStatus { at, .. } => *at,
        }
    }

    /// Order IDs the event refers to
    pub fn order_ids(&self) -> Vec<&str> {
        match self {
            SimEvent::NewOrder { order, .. } => vec![order.id()],
            SimEvent::OrderUpdated { orders, .. } => orders.iter().map(|o| o.id()).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let names: Vec<&str> = EventKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "NEW_ORDER",
                "ORDER_UPDATED",
                "STOCK_UPDATED",
                "MESSAGE_RECEIVED",
                "SYSTEM_ALERT",
                "SIMULATION_STATUS"
            ]
        );
    }

    #[test]
    fn test_alert_serializes_flat() {
        let event = SimEvent::SystemAlert {
            at: 5,
            alert: SystemAlert {
                severity: AlertSeverity::Warning,
                source: AlertSource::Equipment {
                    station: "Espresso Bar".to_string(),
                    fault: "Grinder jammed".to_string(),
                },
                message: "Grinder jammed at Espresso Bar".to_string(),
            },
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SYSTEM_ALERT");
        assert_eq!(json["alert"]["source"], "equipment");
        assert_eq!(json["alert"]["station"], "Espresso Bar");
    }
}
