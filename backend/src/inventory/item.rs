//! Stock items and their derived status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inventory grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryCategory {
    Coffee,
    Milk,
    Cups,
    Sweeteners,
}

impl InventoryCategory {
    pub const ALL: [InventoryCategory; 4] = [
        InventoryCategory::Coffee,
        InventoryCategory::Milk,
        InventoryCategory::Cups,
        InventoryCategory::Sweeteners,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryCategory::Coffee => "coffee",
            InventoryCategory::Milk => "milk",
            InventoryCategory::Cups => "cups",
            InventoryCategory::Sweeteners => "sweeteners",
        }
    }
}

impl fmt::Display for InventoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Good,
    Warning,
    Danger,
}

impl StockStatus {
    /// ≤10% of capacity → danger, ≤30% → warning, otherwise good
    ///
    /// Zero or negative capacity counts as empty.
    ///
    /// # Example
    /// ```
    /// use kiosk_simulator_core_rs::inventory::StockStatus;
    ///
    /// assert_eq!(StockStatus::from_levels(1.0, 10.0), StockStatus::Danger);
    /// assert_eq!(StockStatus::from_levels(3.0, 10.0), StockStatus::Warning);
    /// assert_eq!(StockStatus::from_levels(3.1, 10.0), StockStatus::Good);
    /// ```
    pub fn from_levels(amount: f64, capacity: f64) -> Self {
        let ratio = if capacity > 0.0 { amount / capacity } else { 0.0 };
        if ratio <= 0.10 {
            StockStatus::Danger
        } else if ratio <= 0.30 {
            StockStatus::Warning
        } else {
            StockStatus::Good
        }
    }
}

/// One depletable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    id: String,
    name: String,
    amount: f64,
    unit: String,
    capacity: f64,
}

impl InventoryItem {
    pub fn new(id: &str, name: &str, amount: f64, unit: &str, capacity: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            amount: amount.max(0.0),
            unit: unit.to_string(),
            capacity,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Always recomputed from the current amount
    pub fn status(&self) -> StockStatus {
        StockStatus::from_levels(self.amount, self.capacity)
    }

    /// Subtract `quantity`, flooring at zero
    pub(crate) fn take(&mut self, quantity: f64) {
        self.amount = (self.amount - quantity).max(0.0);
    }
}

/// Read-only view of an item with its status resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
    pub category: InventoryCategory,
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub capacity: f64,
    pub status: StockStatus,
}

impl StockLevel {
    pub fn of(category: InventoryCategory, item: &InventoryItem) -> Self {
        Self {
            category,
            id: item.id.clone(),
            name: item.name.clone(),
            amount: item.amount,
            unit: item.unit.clone(),
            capacity: item.capacity,
            status: item.status(),
        }
    }
}
