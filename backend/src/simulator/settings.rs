//! Simulation settings and timer intervals
//!
//! Settings arrive from an untrusted settings form, so parsing is lenient:
//! unknown enum values fall back to their defaults and out-of-range numbers
//! are repaired by [`SimulationSettings::sanitized`] before they are applied.

use crate::core::time::{MINUTES_PER_DAY, MS_PER_SECOND};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How often customers arrive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum OrderFrequency {
    Low,
    #[default]
    Medium,
    High,
}

impl OrderFrequency {
    /// Base gap between arrivals at normal speed
    pub fn base_interval_ms(&self) -> u64 {
        match self {
            OrderFrequency::Low => 120 * MS_PER_SECOND,
            OrderFrequency::Medium => 60 * MS_PER_SECOND,
            OrderFrequency::High => 30 * MS_PER_SECOND,
        }
    }
}

impl From<String> for OrderFrequency {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" => OrderFrequency::Low,
            "medium" => OrderFrequency::Medium,
            "high" => OrderFrequency::High,
            other => {
                warn!(value = other, "unknown order frequency, using medium");
                OrderFrequency::Medium
            }
        }
    }
}

/// Global time scaling for every timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SimulationSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SimulationSpeed {
    /// Interval multiplier: slow doubles every gap, fast halves it
    pub fn multiplier(&self) -> f64 {
        match self {
            SimulationSpeed::Slow => 2.0,
            SimulationSpeed::Normal => 1.0,
            SimulationSpeed::Fast => 0.5,
        }
    }

    /// Scale a base interval
    pub fn scale(&self, base_ms: u64) -> u64 {
        (base_ms as f64 * self.multiplier()).round() as u64
    }
}

impl From<String> for SimulationSpeed {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "slow" => SimulationSpeed::Slow,
            "normal" => SimulationSpeed::Normal,
            "fast" => SimulationSpeed::Fast,
            other => {
                warn!(value = other, "unknown simulation speed, using normal");
                SimulationSpeed::Normal
            }
        }
    }
}

/// Time-of-day window with tripled arrivals
///
/// Bounds are minutes since midnight, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RushPeriod {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl RushPeriod {
    pub fn new(start_minute: u32, end_minute: u32) -> Self {
        Self {
            start_minute,
            end_minute,
        }
    }

    pub fn contains(&self, minute_of_day: u32) -> bool {
        (self.start_minute..=self.end_minute).contains(&minute_of_day)
    }

    pub fn is_valid(&self) -> bool {
        self.start_minute <= self.end_minute && self.end_minute < MINUTES_PER_DAY
    }

    /// Morning (07:00–09:00) and lunch (12:00–13:30) rushes
    pub fn defaults() -> Vec<RushPeriod> {
        vec![RushPeriod::new(7 * 60, 9 * 60), RushPeriod::new(12 * 60, 13 * 60 + 30)]
    }
}

pub const DEFAULT_VIP_PROBABILITY: f64 = 0.15;
pub const DEFAULT_BATCH_PROBABILITY: f64 = 0.30;

/// Toggles and knobs for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationSettings {
    pub order_frequency: OrderFrequency,
    pub simulation_speed: SimulationSpeed,
    pub include_vip_orders: bool,
    pub include_batch_orders: bool,
    pub simulate_stock_shortages: bool,
    pub simulate_rush_periods: bool,
    pub simulate_equipment_issues: bool,
    pub simulate_staff_messages: bool,

    /// Chance a generated order is VIP (when VIP orders are on)
    pub vip_probability: f64,

    /// Chance a generated order looks for a batch to join
    pub batch_probability: f64,

    pub rush_periods: Vec<RushPeriod>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            order_frequency: OrderFrequency::Medium,
            simulation_speed: SimulationSpeed::Normal,
            include_vip_orders: true,
            include_batch_orders: true,
            simulate_stock_shortages: true,
            simulate_rush_periods: true,
            simulate_equipment_issues: true,
            simulate_staff_messages: true,
            vip_probability: DEFAULT_VIP_PROBABILITY,
            batch_probability: DEFAULT_BATCH_PROBABILITY,
            rush_periods: RushPeriod::defaults(),
        }
    }
}

impl SimulationSettings {
    /// Apply a partial update
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.order_frequency {
            self.order_frequency = v;
        }
        if let Some(v) = patch.simulation_speed {
            self.simulation_speed = v;
        }
        if let Some(v) = patch.include_vip_orders {
            self.include_vip_orders = v;
        }
        if let Some(v) = patch.include_batch_orders {
            self.include_batch_orders = v;
        }
        if let Some(v) = patch.simulate_stock_shortages {
            self.simulate_stock_shortages = v;
        }
        if let Some(v) = patch.simulate_rush_periods {
            self.simulate_rush_periods = v;
        }
        if let Some(v) = patch.simulate_equipment_issues {
            self.simulate_equipment_issues = v;
        }
        if let Some(v) = patch.simulate_staff_messages {
            self.simulate_staff_messages = v;
        }
        if let Some(v) = patch.vip_probability {
            self.vip_probability = v;
        }
        if let Some(v) = patch.batch_probability {
            self.batch_probability = v;
        }
        if let Some(v) = &patch.rush_periods {
            self.rush_periods = v.clone();
        }
    }

    /// Repair malformed values, logging each repair
    ///
    /// - probabilities outside [0, 1] (or NaN) reset to their defaults
    /// - inverted or out-of-day rush windows are dropped
    pub fn sanitized(mut self) -> Self {
        if !(0.0..=1.0).contains(&self.vip_probability) {
            warn!(value = self.vip_probability, "vip probability out of range, using default");
            self.vip_probability = DEFAULT_VIP_PROBABILITY;
        }
        if !(0.0..=1.0).contains(&self.batch_probability) {
            warn!(value = self.batch_probability, "batch probability out of range, using default");
            self.batch_probability = DEFAULT_BATCH_PROBABILITY;
        }
        self.rush_periods.retain(|period| {
            let valid = period.is_valid();
            if !valid {
                warn!(
                    start = period.start_minute,
                    end = period.end_minute,
                    "dropping invalid rush period"
                );
            }
            valid
        });
        self
    }

    /// True when rush periods are on and `minute_of_day` falls in one
    pub fn in_rush(&self, minute_of_day: u32) -> bool {
        self.simulate_rush_periods && self.rush_periods.iter().any(|p| p.contains(minute_of_day))
    }
}

/// Partial settings update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub order_frequency: Option<OrderFrequency>,
    pub simulation_speed: Option<SimulationSpeed>,
    pub include_vip_orders: Option<bool>,
    pub include_batch_orders: Option<bool>,
    pub simulate_stock_shortages: Option<bool>,
    pub simulate_rush_periods: Option<bool>,
    pub simulate_equipment_issues: Option<bool>,
    pub simulate_staff_messages: Option<bool>,
    pub vip_probability: Option<f64>,
    pub batch_probability: Option<f64>,
    pub rush_periods: Option<Vec<RushPeriod>>,
}

// ============================================================================
// Timer intervals
// ============================================================================

const WAIT_UPDATE_BASE_MS: u64 = 30 * MS_PER_SECOND;
const ADVANCEMENT_BASE_MS: u64 = 30 * MS_PER_SECOND;
const STOCK_BASE_MS: u64 = 180 * MS_PER_SECOND;
const MESSAGE_BASE_MS: u64 = 300 * MS_PER_SECOND;
const EQUIPMENT_BASE_MS: u64 = 600 * MS_PER_SECOND;

/// Divisor applied to the arrival gap during a rush
pub const RUSH_DIVISOR: u64 = 3;

/// Speed-scaled periods for every simulator timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerIntervals {
    pub arrival_ms: u64,
    pub wait_update_ms: u64,
    pub advancement_ms: u64,
    pub stock_ms: u64,
    pub message_ms: u64,
    pub equipment_ms: u64,
}

impl TimerIntervals {
    /// # Example
    /// ```
    /// use kiosk_simulator_core_rs::simulator::settings::{
    ///     OrderFrequency, SimulationSettings, SimulationSpeed, TimerIntervals,
    /// };
    ///
    /// let settings = SimulationSettings {
    ///     order_frequency: OrderFrequency::High,
    ///     simulation_speed: SimulationSpeed::Slow,
    ///     ..Default::default()
    /// };
    /// let intervals = TimerIntervals::from_settings(&settings);
    /// assert_eq!(intervals.arrival_ms, 60_000);
    /// assert_eq!(intervals.stock_ms, 360_000);
    /// ```
    pub fn from_settings(settings: &SimulationSettings) -> Self {
        let speed = settings.simulation_speed;
        Self {
            arrival_ms: speed.scale(settings.order_frequency.base_interval_ms()),
            wait_update_ms: speed.scale(WAIT_UPDATE_BASE_MS),
            advancement_ms: speed.scale(ADVANCEMENT_BASE_MS),
            stock_ms: speed.scale(STOCK_BASE_MS),
            message_ms: speed.scale(MESSAGE_BASE_MS),
            equipment_ms: speed.scale(EQUIPMENT_BASE_MS),
        }
    }

    /// Gap until the next arrival, shortened during a rush
    pub fn arrival_gap(&self, in_rush: bool) -> u64 {
        if in_rush {
            self.arrival_ms / RUSH_DIVISOR
        } else {
            self.arrival_ms
        }
    }
}
