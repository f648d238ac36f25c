//! Order Lifecycle Simulator
//!
//! Generates synthetic orders, batches them, advances them through their
//! lifecycle on independent timers, and depletes inventory along the way.
//!
//! - **settings**: toggles, lenient parsing and speed-scaled intervals
//! - **generator**: random order drawing and online batching
//! - **staff**: message templates, equipment faults and the shift schedule
//! - **engine**: the [`Simulator`] that owns state and runs the timers

pub mod engine;
pub mod generator;
pub mod settings;
pub mod staff;

pub use engine::{ActionError, OrderStats, SimulationError, Simulator, SimulatorConfig, INITIAL_ORDERS};
pub use generator::{BatchAssignment, OrderGenerator};
pub use settings::{
    OrderFrequency, RushPeriod, SettingsPatch, SimulationSettings, SimulationSpeed, TimerIntervals,
};
pub use staff::ShiftEntry;
