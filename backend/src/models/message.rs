//! Staff message model

use serde::{Deserialize, Serialize};

/// A note shown on the staff message board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMessage {
    /// UUID drawn from the simulator's seeded RNG
    pub id: String,
    pub sender: String,
    pub text: String,
    pub urgent: bool,
    pub sent_at: u64,
    pub read: bool,
}

impl StaffMessage {
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        text: impl Into<String>,
        urgent: bool,
        sent_at: u64,
    ) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            text: text.into(),
            urgent,
            sent_at,
            read: false,
        }
    }
}
