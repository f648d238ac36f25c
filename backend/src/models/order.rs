//! Order model
//!
//! Represents one customer order moving through the kiosk queue.
//! Each order has:
//! - Customer details (name, optional phone)
//! - Drink description (size + coffee type, milk type, sugar)
//! - VIP flag and optional batch-group key
//! - Lifecycle status with one timestamp per transition
//! - Station assignment (current field plus ids carried over from older
//!   kiosk builds)
//!
//! # Lifecycle
//!
//! ```text
//! Pending ──start──▶ InProgress ──complete──▶ Completed ──pick_up──▶ PickedUp
//!    │                    │                        │
//!    └────────────────────┴───────remove───────────┴──▶ Removed
//! ```
//!
//! CRITICAL: Status never regresses. Every transition method checks its
//! source status and leaves the order untouched on failure.

use crate::core::time::MS_PER_MINUTE;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Waiting in the queue
    Pending,

    /// Being prepared at a station
    InProgress,

    /// Ready on the counter
    Completed,

    /// Handed to the customer (terminal)
    PickedUp,

    /// Cancelled by an operator (terminal)
    Removed,
}

impl OrderStatus {
    /// Terminal statuses accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::PickedUp | OrderStatus::Removed)
    }

    /// The queue list an order in this status is shown in, if any
    pub fn list(&self) -> Option<OrderList> {
        match self {
            OrderStatus::Pending => Some(OrderList::Pending),
            OrderStatus::InProgress => Some(OrderList::InProgress),
            OrderStatus::Completed => Some(OrderList::Completed),
            OrderStatus::PickedUp | OrderStatus::Removed => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in-progress",
            OrderStatus::Completed => "completed",
            OrderStatus::PickedUp => "picked-up",
            OrderStatus::Removed => "removed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three visible queue lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderList {
    Pending,
    InProgress,
    Completed,
}

/// Cup size, parsed from the leading word of the coffee type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CupSize {
    Small,
    Regular,
    Large,
}

impl CupSize {
    /// Parse the size from a coffee type such as `"Large Latte"`
    ///
    /// Coffee types without a size prefix count as regular.
    pub fn from_coffee_type(coffee_type: &str) -> Self {
        let lower = coffee_type.trim_start().to_lowercase();
        if lower.starts_with("small") {
            CupSize::Small
        } else if lower.starts_with("large") {
            CupSize::Large
        } else {
            CupSize::Regular
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CupSize::Small => "Small",
            CupSize::Regular => "Regular",
            CupSize::Large => "Large",
        }
    }
}

/// Errors from order state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrderError {
    #[error("Order {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// Customer-facing fields of an order
///
/// Used both by the random generator and by walk-in entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_name: String,
    pub phone: Option<String>,
    pub coffee_type: String,
    pub milk_type: String,
    pub sugar: String,
    pub is_vip: bool,
}

/// A kiosk order
///
/// # Example
/// ```
/// use kiosk_simulator_core_rs::{Order, OrderRequest, OrderStatus};
///
/// let mut order = Order::new(
///     "ORD-0001".to_string(),
///     OrderRequest {
///         customer_name: "Ada".to_string(),
///         phone: Some("+15550100".to_string()),
///         coffee_type: "Large Latte".to_string(),
///         milk_type: "Oat milk".to_string(),
///         sugar: "No sugar".to_string(),
///         is_vip: false,
///     },
///     0,
/// );
///
/// order.start(60_000).unwrap();
/// assert_eq!(order.status(), OrderStatus::InProgress);
/// assert!(order.pick_up(120_000).is_err()); // cannot skip Completed
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: String,
    customer_name: String,
    phone: Option<String>,
    coffee_type: String,
    milk_type: String,
    sugar: String,
    is_vip: bool,
    batch_group: Option<String>,
    status: OrderStatus,
    created_at: u64,
    started_at: Option<u64>,
    completed_at: Option<u64>,
    picked_up_at: Option<u64>,
    removed_at: Option<u64>,

    /// Whole minutes spent waiting, refreshed by the wait-time tick
    wait_time: u32,

    /// Wait promised to the customer by the operator, in minutes
    promised_wait: Option<u32>,

    station_id: Option<String>,

    /// Station ids written by older kiosk builds (`assignedStation`,
    /// `stationId` strings, counter numbers). Only read for attribution.
    #[serde(default)]
    legacy_station_ids: Vec<String>,
}

impl Order {
    /// Create a pending order
    pub fn new(id: String, request: OrderRequest, created_at: u64) -> Self {
        Self {
            id,
            customer_name: request.customer_name,
            phone: request.phone,
            coffee_type: request.coffee_type,
            milk_type: request.milk_type,
            sugar: request.sugar,
            is_vip: request.is_vip,
            batch_group: None,
            status: OrderStatus::Pending,
            created_at,
            started_at: None,
            completed_at: None,
            picked_up_at: None,
            removed_at: None,
            wait_time: 0,
            promised_wait: None,
            station_id: None,
            legacy_station_ids: Vec::new(),
        }
    }

    /// Assign a station (builder pattern)
    pub fn with_station(mut self, station_id: impl Into<String>) -> Self {
        self.station_id = Some(station_id.into());
        self
    }

    /// Attach a legacy station id (builder pattern)
    pub fn with_legacy_station_id(mut self, station_id: impl Into<String>) -> Self {
        self.legacy_station_ids.push(station_id.into());
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn coffee_type(&self) -> &str {
        &self.coffee_type
    }

    pub fn milk_type(&self) -> &str {
        &self.milk_type
    }

    pub fn sugar(&self) -> &str {
        &self.sugar
    }

    pub fn is_vip(&self) -> bool {
        self.is_vip
    }

    pub fn batch_group(&self) -> Option<&str> {
        self.batch_group.as_deref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn started_at(&self) -> Option<u64> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<u64> {
        self.completed_at
    }

    pub fn picked_up_at(&self) -> Option<u64> {
        self.picked_up_at
    }

    pub fn removed_at(&self) -> Option<u64> {
        self.removed_at
    }

    pub fn wait_time(&self) -> u32 {
        self.wait_time
    }

    pub fn promised_wait(&self) -> Option<u32> {
        self.promised_wait
    }

    pub fn station_id(&self) -> Option<&str> {
        self.station_id.as_deref()
    }

    pub fn legacy_station_ids(&self) -> &[String] {
        &self.legacy_station_ids
    }

    pub fn cup_size(&self) -> CupSize {
        CupSize::from_coffee_type(&self.coffee_type)
    }

    /// False for empty milk fields and "No milk"
    pub fn has_milk(&self) -> bool {
        let milk = self.milk_type.trim();
        !milk.is_empty() && !milk.eq_ignore_ascii_case("no milk")
    }

    /// Key shared by every order that can be batched with this one
    pub fn batch_key(&self) -> String {
        format!("{}-{}", self.coffee_type, self.milk_type)
    }

    /// True if `other` could share a batch with this order
    pub fn same_drink_as(&self, other: &Order) -> bool {
        self.coffee_type == other.coffee_type && self.milk_type == other.milk_type
    }

    /// Minutes elapsed between creation and `now_ms`
    pub fn wait_minutes_at(&self, now_ms: u64) -> u32 {
        (now_ms.saturating_sub(self.created_at) / MS_PER_MINUTE) as u32
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn transition(&mut self, expected: &[OrderStatus], to: OrderStatus) -> Result<(), OrderError> {
        if !expected.contains(&self.status) {
            return Err(OrderError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Pending → InProgress
    pub fn start(&mut self, now_ms: u64) -> Result<(), OrderError> {
        self.transition(&[OrderStatus::Pending], OrderStatus::InProgress)?;
        self.started_at = Some(now_ms);
        Ok(())
    }

    /// InProgress → Completed
    pub fn complete(&mut self, now_ms: u64) -> Result<(), OrderError> {
        self.transition(&[OrderStatus::InProgress], OrderStatus::Completed)?;
        self.completed_at = Some(now_ms);
        Ok(())
    }

    /// Completed → PickedUp
    pub fn pick_up(&mut self, now_ms: u64) -> Result<(), OrderError> {
        self.transition(&[OrderStatus::Completed], OrderStatus::PickedUp)?;
        self.picked_up_at = Some(now_ms);
        Ok(())
    }

    /// Any non-terminal status → Removed
    pub fn remove(&mut self, now_ms: u64) -> Result<(), OrderError> {
        self.transition(
            &[
                OrderStatus::Pending,
                OrderStatus::InProgress,
                OrderStatus::Completed,
            ],
            OrderStatus::Removed,
        )?;
        self.removed_at = Some(now_ms);
        Ok(())
    }

    // ========================================================================
    // Field updates (crate-internal, no status change)
    // ========================================================================

    pub(crate) fn set_batch_group(&mut self, key: String) {
        self.batch_group = Some(key);
    }

    pub(crate) fn set_wait_time(&mut self, minutes: u32) {
        self.wait_time = minutes;
    }

    pub(crate) fn set_promised_wait(&mut self, minutes: u32) {
        self.promised_wait = Some(minutes);
    }

    pub(crate) fn assign_station(&mut self, station_id: String) {
        self.station_id = Some(station_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(coffee: &str, milk: &str) -> Order {
        Order::new(
            "ORD-T".to_string(),
            OrderRequest {
                customer_name: "Test".to_string(),
                phone: None,
                coffee_type: coffee.to_string(),
                milk_type: milk.to_string(),
                sugar: "No sugar".to_string(),
                is_vip: false,
            },
            0,
        )
    }

    #[test]
    fn test_cup_size_parsing() {
        assert_eq!(CupSize::from_coffee_type("Small Mocha"), CupSize::Small);
        assert_eq!(CupSize::from_coffee_type("large latte"), CupSize::Large);
        assert_eq!(CupSize::from_coffee_type("Regular Flat White"), CupSize::Regular);
        assert_eq!(CupSize::from_coffee_type("Espresso"), CupSize::Regular);
    }

    #[test]
    fn test_has_milk() {
        assert!(order("Large Latte", "Oat milk").has_milk());
        assert!(!order("Espresso", "No milk").has_milk());
        assert!(!order("Espresso", "").has_milk());
    }

    #[test]
    fn test_failed_transition_leaves_order_untouched() {
        let mut o = order("Large Latte", "Oat milk");
        let before = o.clone();

        let err = o.complete(10).unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidTransition {
                id: "ORD-T".to_string(),
                from: OrderStatus::Pending,
                to: OrderStatus::Completed,
            }
        );
        assert_eq!(o, before);
    }

    #[test]
    fn test_completed_order_can_be_removed() {
        let mut o = order("Small Mocha", "Whole milk");
        o.start(1).unwrap();
        o.complete(2).unwrap();
        o.remove(3).unwrap();
        assert_eq!(o.status(), OrderStatus::Removed);
        assert_eq!(o.removed_at(), Some(3));
        assert!(o.remove(4).is_err());
    }

    #[test]
    fn test_wait_minutes_floor() {
        let o = order("Small Mocha", "Whole milk");
        assert_eq!(o.wait_minutes_at(59_999), 0);
        assert_eq!(o.wait_minutes_at(5 * MS_PER_MINUTE + 1), 5);
    }
}
