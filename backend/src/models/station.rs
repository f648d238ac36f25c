//! Station (service counter) model
//!
//! A station prepares in-progress orders up to its capacity. Load and status
//! are derived by the balancer from the order book; the station itself only
//! carries static configuration.

use serde::{Deserialize, Serialize};

/// Drinks a station can make
///
/// Entries match order fields by case-insensitive substring, so `"latte"`
/// accepts `"Large Latte"` and `"oat"` accepts `"Oat milk"`. An empty list
/// places no restriction on that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationCapabilities {
    #[serde(default)]
    pub coffee_types: Vec<String>,

    #[serde(default)]
    pub milk_types: Vec<String>,
}

impl StationCapabilities {
    /// Capabilities that accept every drink
    pub fn any() -> Self {
        Self::default()
    }

    /// Check whether a drink can be made here
    ///
    /// `milk_type` of `None` (or "No milk") is always accepted.
    pub fn accepts(&self, coffee_type: &str, milk_type: Option<&str>) -> bool {
        let coffee_ok = matches_any(&self.coffee_types, coffee_type);
        let milk_ok = match milk_type {
            None => true,
            Some(milk) if milk.trim().is_empty() || milk.eq_ignore_ascii_case("no milk") => true,
            Some(milk) => matches_any(&self.milk_types, milk),
        };
        coffee_ok && milk_ok
    }
}

fn matches_any(entries: &[String], value: &str) -> bool {
    if entries.is_empty() {
        return true;
    }
    let value = value.to_lowercase();
    entries
        .iter()
        .any(|entry| value.contains(&entry.to_lowercase()))
}

/// Load band derived from workload percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    Available,
    Active,
    Busy,
    Overloaded,
}

impl StationStatus {
    /// Band boundaries: ≥90 overloaded, ≥70 busy, ≥30 active
    pub fn from_workload(workload_percentage: f64) -> Self {
        if workload_percentage >= 90.0 {
            StationStatus::Overloaded
        } else if workload_percentage >= 70.0 {
            StationStatus::Busy
        } else if workload_percentage >= 30.0 {
            StationStatus::Active
        } else {
            StationStatus::Available
        }
    }
}

/// A service counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,

    /// In-progress orders the station handles at 100% workload
    pub max_capacity: u32,

    /// Average preparation time per order, in minutes
    pub avg_order_duration: u32,

    #[serde(default)]
    pub capabilities: StationCapabilities,
}

impl Station {
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_capacity: u32, avg_order_duration: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_capacity,
            avg_order_duration,
            capabilities: StationCapabilities::any(),
        }
    }

    /// Replace capabilities (builder pattern)
    pub fn with_capabilities(mut self, capabilities: StationCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// The three counters a kiosk ships with
    pub fn default_stations() -> Vec<Station> {
        vec![
            Station::new("1", "Espresso Bar", 6, 3),
            Station::new("2", "Milk Bar", 5, 4).with_capabilities(StationCapabilities {
                coffee_types: vec![
                    "latte".to_string(),
                    "cappuccino".to_string(),
                    "flat white".to_string(),
                    "mocha".to_string(),
                ],
                milk_types: Vec::new(),
            }),
            Station::new("3", "Express Counter", 4, 2).with_capabilities(StationCapabilities {
                coffee_types: Vec::new(),
                milk_types: vec!["whole".to_string(), "skim".to_string()],
            }),
        ]
    }
}
