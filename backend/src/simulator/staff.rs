//! Staff-side flavour: message templates, equipment faults, shift schedule

use serde::Serialize;

/// Senders drawn for simulated messages
pub const MESSAGE_SENDERS: &[&str] = &["Shift Lead", "Store Manager", "Barista Team", "Front Counter"];

/// Message bodies; `{station}` is replaced with a random station name
pub const MESSAGE_TEMPLATES: &[&str] = &[
    "Please restock lids at {station}",
    "Customer asking about a delayed order at {station}",
    "Break rotation starts in 10 minutes",
    "Remember to log milk temperatures",
    "{station} needs a quick wipe-down",
    "Delivery arriving at the back door",
];

/// Faults reported by the equipment-issue timer
pub const EQUIPMENT_FAULTS: &[&str] = &[
    "Grinder jammed",
    "Steam wand pressure low",
    "Espresso machine overheating",
    "Milk fridge temperature high",
    "Card reader offline",
];

pub const URGENT_MESSAGE_PROBABILITY: f64 = 0.20;
pub const EQUIPMENT_ISSUE_PROBABILITY: f64 = 0.05;

pub fn render_template(template: &str, station: &str) -> String {
    template.replace("{station}", station)
}

/// One line of the posted shift schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftEntry {
    pub staff: &'static str,
    pub role: &'static str,
    pub station_id: &'static str,
    /// Minutes since midnight
    pub start_minute: u32,
    pub end_minute: u32,
}

const SCHEDULE: &[ShiftEntry] = &[
    ShiftEntry { staff: "Maria", role: "Shift Lead", station_id: "1", start_minute: 6 * 60, end_minute: 14 * 60 },
    ShiftEntry { staff: "Dev", role: "Barista", station_id: "1", start_minute: 6 * 60, end_minute: 12 * 60 },
    ShiftEntry { staff: "Hana", role: "Barista", station_id: "2", start_minute: 7 * 60, end_minute: 15 * 60 },
    ShiftEntry { staff: "Luis", role: "Cashier", station_id: "3", start_minute: 7 * 60, end_minute: 13 * 60 },
    ShiftEntry { staff: "Ola", role: "Barista", station_id: "2", start_minute: 12 * 60, end_minute: 20 * 60 },
    ShiftEntry { staff: "Ben", role: "Shift Lead", station_id: "1", start_minute: 14 * 60, end_minute: 22 * 60 },
];

/// The posted schedule; static and read-only
pub fn schedule() -> &'static [ShiftEntry] {
    SCHEDULE
}
