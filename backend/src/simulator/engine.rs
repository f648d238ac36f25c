//! Simulator - Main Kiosk Simulation Loop
//!
//! The simulator owns every piece of run state and drives it from a
//! virtual-time scheduler. Nothing happens on its own: the host calls
//! [`Simulator::advance`] and every timer due inside that window fires in
//! order, each to completion.
//!
//! # Timers
//!
//! ```text
//! Arrival         one-shot, re-armed after each firing
//!                 gap = frequency base × speed, ÷3 inside a rush window
//! WaitUpdate      every 30s × speed: refresh pending wait, emit milestones
//! Advancement     every 30s × speed: auto-complete / auto-pick-up
//! StockShock      every 180s × speed (when stock shortages are on)
//! StaffMessage    every 300s × speed (when staff messages are on)
//! EquipmentCheck  every 600s × speed (when equipment issues are on)
//! ```
//!
//! # Operator actions
//!
//! Every manual action validates against a copy of the order before touching
//! the book, so a rejected action leaves no trace: no mutation, no revision
//! bump, no event.
//!
//! # Example
//!
//! ```rust
//! use kiosk_simulator_core_rs::simulator::{SettingsPatch, Simulator, SimulatorConfig};
//!
//! let mut sim = Simulator::new(SimulatorConfig::default()).unwrap();
//! sim.start(SettingsPatch::default());
//! assert_eq!(sim.pending_orders().len(), 3);
//!
//! sim.advance(10 * 60 * 1000);
//! sim.stop();
//! assert_eq!(sim.active_timer_count(), 0);
//! ```

use crate::balancer::{
    self, BalancerStats, BalancingRules, TransferError, TransferSuggestion, WorkloadBalancer,
    WorkloadSnapshot,
};
use crate::core::scheduler::Scheduler;
use crate::core::time::{SimClock, MS_PER_MINUTE};
use crate::events::{
    AlertSeverity, AlertSource, EventBus, EventKind, HandlerResult, OrderChange, SimEvent,
    SubscriptionId, SystemAlert,
};
use crate::inventory::StockLevel;
use crate::models::message::StaffMessage;
use crate::models::order::{Order, OrderError, OrderRequest, OrderStatus};
use crate::models::state::SimulationState;
use crate::models::station::Station;
use crate::rng::RngManager;
use crate::simulator::generator::{assign_batch, BatchAssignment, OrderGenerator};
use crate::simulator::settings::{SettingsPatch, SimulationSettings, TimerIntervals};
use crate::simulator::staff::{self, ShiftEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Orders generated synchronously by every `start`
pub const INITIAL_ORDERS: usize = 3;

/// In-progress orders older than this may auto-complete
const AUTO_COMPLETE_AFTER_MS: u64 = 2 * MS_PER_MINUTE;
const AUTO_COMPLETE_PROBABILITY: f64 = 0.5;

/// Completed orders older than this may be auto-picked-up
const AUTO_PICKUP_AFTER_MS: u64 = MS_PER_MINUTE;
const AUTO_PICKUP_PROBABILITY: f64 = 0.3;

/// Pending wait milestones fire at positive multiples of this
const WAIT_MILESTONE_MINUTES: u32 = 5;

// ============================================================================
// Configuration
// ============================================================================

/// Construction-time configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Seed for every random draw the simulator makes
    pub rng_seed: u64,

    /// Wall-clock time of day at simulation time zero
    pub start_minute_of_day: u32,

    pub stations: Vec<Station>,
    pub settings: SimulationSettings,
    pub balancing: BalancingRules,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            start_minute_of_day: 6 * 60,
            stations: Station::default_stations(),
            settings: SimulationSettings::default(),
            balancing: BalancingRules::default(),
        }
    }
}

/// Rejected simulator construction
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Rejected operator action; state is untouched when one is returned
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActionError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error(transparent)]
    InvalidTransition(#[from] OrderError),

    #[error("No pending orders in batch {0}")]
    BatchNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Order counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OrderStats {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub picked_up: usize,
    pub removed: usize,
    pub total: usize,

    /// Mean minutes waited by pending orders so far (0 with none pending)
    pub average_wait_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerTask {
    Arrival,
    WaitUpdate,
    Advancement,
    StockShock,
    StaffMessage,
    EquipmentCheck,
}

// ============================================================================
// Simulator
// ============================================================================

pub struct Simulator {
    config: SimulatorConfig,
    state: SimulationState,
    bus: EventBus,
    scheduler: Scheduler<TimerTask>,
    clock: SimClock,
    rng: RngManager,
    generator: OrderGenerator,
    settings: SimulationSettings,
    intervals: TimerIntervals,
    balancer: WorkloadBalancer,
    running: bool,
}

impl Simulator {
    /// Create a stopped simulator with baseline stock and no orders
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfig` if:
    /// - no stations are configured
    /// - two stations share an ID
    /// - a station has zero capacity
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;

        let settings = config.settings.clone().sanitized();
        let intervals = TimerIntervals::from_settings(&settings);

        Ok(Self {
            state: SimulationState::new(),
            bus: EventBus::new(),
            scheduler: Scheduler::new(),
            clock: SimClock::new(config.start_minute_of_day),
            rng: RngManager::new(config.rng_seed),
            generator: OrderGenerator::new(),
            settings,
            intervals,
            balancer: WorkloadBalancer::new(config.balancing.clone()),
            running: false,
            config,
        })
    }

    fn validate_config(config: &SimulatorConfig) -> Result<(), SimulationError> {
        if config.start_minute_of_day >= crate::core::time::MINUTES_PER_DAY {
            return Err(SimulationError::InvalidConfig(format!(
                "start_minute_of_day must be < 1440, got {}",
                config.start_minute_of_day
            )));
        }

        if config.stations.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "Must have at least one station".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        for station in &config.stations {
            if !ids.insert(&station.id) {
                return Err(SimulationError::InvalidConfig(format!(
                    "Duplicate station ID: {}",
                    station.id
                )));
            }
            if station.max_capacity == 0 {
                return Err(SimulationError::InvalidConfig(format!(
                    "Station {} must have max_capacity > 0",
                    station.id
                )));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn minute_of_day(&self) -> u32 {
        self.clock.minute_of_day()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn active_timer_count(&self) -> usize {
        self.scheduler.active_count()
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn intervals(&self) -> TimerIntervals {
        self.intervals
    }

    pub fn stations(&self) -> &[Station] {
        &self.config.stations
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn order(&self, id: &str) -> Option<&Order> {
        self.state.orders.get(id)
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Begin (or restart) a run
    ///
    /// Any prior run is stopped first. The patch is merged into the current
    /// settings, timers are armed, three orders are generated and a
    /// `SIMULATION_STATUS` event is published.
    pub fn start(&mut self, patch: SettingsPatch) {
        self.halt();
        self.apply_patch(&patch);
        self.arm_timers();
        self.running = true;

        for _ in 0..INITIAL_ORDERS {
            self.generate_order();
        }

        info!(
            frequency = ?self.settings.order_frequency,
            speed = ?self.settings.simulation_speed,
            timers = self.scheduler.active_count(),
            "simulation started"
        );
        self.publish_status();
    }

    /// Cancel every timer and publish `SIMULATION_STATUS`
    pub fn stop(&mut self) {
        let cancelled = self.halt();
        info!(cancelled, "simulation stopped");
        self.publish_status();
    }

    /// Stop, then restore baseline stock, drop all orders and messages,
    /// reseed the RNG and clear balancer statistics
    ///
    /// The clock keeps its current time.
    pub fn reset(&mut self) {
        self.halt();
        self.state.reset();
        self.generator.reset();
        self.balancer.reset();
        self.rng = RngManager::new(self.config.rng_seed);
        info!("simulation reset");
        self.publish_status();
    }

    /// Merge a settings patch; an active run is re-armed with the new
    /// intervals without generating new seed orders
    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.apply_patch(&patch);

        if self.running {
            self.scheduler.cancel_all();
            self.arm_timers();
            info!(timers = self.scheduler.active_count(), "simulation restarted with new settings");
        } else {
            debug!("settings updated while stopped");
        }
        self.publish_status();
    }

    /// Move the clock forward, firing every timer due on the way
    ///
    /// Returns how many timer firings were handled. A stopped simulator has
    /// no timers, so this only moves the clock.
    pub fn advance(&mut self, duration_ms: u64) -> usize {
        let target = self.clock.now_ms().saturating_add(duration_ms);
        let mut fired = 0;

        while let Some(due) = self.scheduler.pop_due(target) {
            self.clock.advance_to(due.due_at);
            self.dispatch(due.task);
            fired += 1;
        }

        self.clock.advance_to(target);
        fired
    }

    fn halt(&mut self) -> usize {
        self.running = false;
        self.scheduler.cancel_all()
    }

    fn apply_patch(&mut self, patch: &SettingsPatch) {
        let mut merged = self.settings.clone();
        merged.merge(patch);
        self.settings = merged.sanitized();
        self.intervals = TimerIntervals::from_settings(&self.settings);
    }

    fn arm_timers(&mut self) {
        let now = self.clock.now_ms();
        let intervals = self.intervals;

        let gap = intervals.arrival_gap(self.settings.in_rush(self.clock.minute_of_day()));
        self.scheduler.register_once(now, gap, TimerTask::Arrival);
        self.scheduler
            .register_periodic(now, intervals.wait_update_ms, TimerTask::WaitUpdate);
        self.scheduler
            .register_periodic(now, intervals.advancement_ms, TimerTask::Advancement);

        if self.settings.simulate_stock_shortages {
            self.scheduler
                .register_periodic(now, intervals.stock_ms, TimerTask::StockShock);
        }
        if self.settings.simulate_staff_messages {
            self.scheduler
                .register_periodic(now, intervals.message_ms, TimerTask::StaffMessage);
        }
        if self.settings.simulate_equipment_issues {
            self.scheduler
                .register_periodic(now, intervals.equipment_ms, TimerTask::EquipmentCheck);
        }
    }

    fn publish_status(&mut self) {
        let event = SimEvent::SimulationStatus {
            at: self.clock.now_ms(),
            running: self.running,
            settings: self.settings.clone(),
        };
        self.bus.publish(&event);
    }

    // ========================================================================
    // Timer handlers
    // ========================================================================

    fn dispatch(&mut self, task: TimerTask) {
        match task {
            TimerTask::Arrival => self.on_arrival(),
            TimerTask::WaitUpdate => self.on_wait_update(),
            TimerTask::Advancement => self.on_advancement(),
            TimerTask::StockShock => self.on_stock_shock(),
            TimerTask::StaffMessage => self.on_staff_message(),
            TimerTask::EquipmentCheck => self.on_equipment_check(),
        }
    }

    fn on_arrival(&mut self) {
        self.generate_order();

        let in_rush = self.settings.in_rush(self.clock.minute_of_day());
        let gap = self.intervals.arrival_gap(in_rush);
        self.scheduler
            .register_once(self.clock.now_ms(), gap, TimerTask::Arrival);
        debug!(gap_ms = gap, in_rush, "next arrival armed");
    }

    fn on_wait_update(&mut self) {
        let now = self.clock.now_ms();

        for id in self.state.orders.ids_with_status(OrderStatus::Pending) {
            let Some(order) = self.state.orders.get(&id) else {
                continue;
            };
            let old = order.wait_time();
            let new = order.wait_minutes_at(now);
            if new == old {
                continue;
            }

            let updated = self.state.orders.update(&id, |o| {
                o.set_wait_time(new);
                o.clone()
            });

            if let Some(order) = updated {
                if new / WAIT_MILESTONE_MINUTES > old / WAIT_MILESTONE_MINUTES {
                    let minutes = new / WAIT_MILESTONE_MINUTES * WAIT_MILESTONE_MINUTES;
                    debug!(order = %id, minutes, "wait milestone");
                    self.bus.publish(&SimEvent::OrderUpdated {
                        at: now,
                        change: OrderChange::WaitMilestone { minutes },
                        orders: vec![order],
                    });
                }
            }
        }
    }

    fn on_advancement(&mut self) {
        let now = self.clock.now_ms();

        // STEP 1: in-progress orders may finish
        for id in self.state.orders.ids_with_status(OrderStatus::InProgress) {
            let started = self
                .state
                .orders
                .get(&id)
                .and_then(|o| o.started_at())
                .unwrap_or(now);
            if now.saturating_sub(started) > AUTO_COMPLETE_AFTER_MS
                && self.rng.chance(AUTO_COMPLETE_PROBABILITY)
            {
                if let Err(e) = self.complete_order(&id) {
                    warn!(order = %id, error = %e, "auto-complete failed");
                }
            }
        }

        // STEP 2: completed orders may be collected
        for id in self.state.orders.ids_with_status(OrderStatus::Completed) {
            let completed = self
                .state
                .orders
                .get(&id)
                .and_then(|o| o.completed_at())
                .unwrap_or(now);
            if now.saturating_sub(completed) > AUTO_PICKUP_AFTER_MS
                && self.rng.chance(AUTO_PICKUP_PROBABILITY)
            {
                if let Err(e) = self.mark_order_picked_up(&id) {
                    warn!(order = %id, error = %e, "auto-pickup failed");
                }
            }
        }

        // STEP 3: surface transfer suggestions
        if self.balancer.rules().auto_balance {
            self.run_balancing_pass();
        }
    }

    fn on_stock_shock(&mut self) {
        let now = self.clock.now_ms();
        if let Some(level) = self
            .state
            .inventory
            .random_deplete(&mut self.rng, now, &mut self.bus)
        {
            debug!(item = %level.id, amount = level.amount, "random stock depletion");
        }
    }

    fn on_staff_message(&mut self) {
        let sender = self
            .rng
            .choose(staff::MESSAGE_SENDERS)
            .copied()
            .unwrap_or("Shift Lead");
        let template = self
            .rng
            .choose(staff::MESSAGE_TEMPLATES)
            .copied()
            .unwrap_or_default();
        let station = self
            .rng
            .choose(&self.config.stations)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let urgent = self.rng.chance(staff::URGENT_MESSAGE_PROBABILITY);

        let text = staff::render_template(template, &station);
        if let Err(e) = self.add_message(sender, &text, urgent) {
            warn!(error = %e, "simulated message rejected");
        }
    }

    fn on_equipment_check(&mut self) {
        if !self.rng.chance(staff::EQUIPMENT_ISSUE_PROBABILITY) {
            return;
        }

        let station = self
            .rng
            .choose(&self.config.stations)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let fault = self
            .rng
            .choose(staff::EQUIPMENT_FAULTS)
            .copied()
            .unwrap_or("Unknown fault");

        warn!(station = %station, fault, "equipment issue");
        self.bus.publish(&SimEvent::SystemAlert {
            at: self.clock.now_ms(),
            alert: SystemAlert {
                severity: AlertSeverity::Warning,
                message: format!("{} at {}", fault, station),
                source: AlertSource::Equipment {
                    station,
                    fault: fault.to_string(),
                },
            },
        });
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Generate one random order, batch it, store it and publish it
    ///
    /// Publishes `NEW_ORDER`, followed by an `ORDER_UPDATED` (batch formed)
    /// carrying the retroactively tagged orders when a new batch key was
    /// minted.
    pub fn generate_order(&mut self) -> Order {
        let now = self.clock.now_ms();
        let mut order = self.generator.generate(&mut self.rng, &self.settings, now);
        let batch = assign_batch(&mut self.rng, &self.settings, &mut order, &mut self.state.orders);

        self.state.orders.insert(order.clone());
        debug!(order = order.id(), vip = order.is_vip(), batch = ?order.batch_group(), "order arrived");
        self.bus.publish(&SimEvent::NewOrder {
            at: now,
            order: order.clone(),
        });

        if let Some(BatchAssignment::Formed { batch_key, tagged }) = batch {
            let orders = self.snapshots(&tagged);
            self.bus.publish(&SimEvent::OrderUpdated {
                at: now,
                change: OrderChange::BatchFormed { batch_key },
                orders,
            });
        }

        order
    }

    fn snapshots(&self, ids: &[String]) -> Vec<Order> {
        ids.iter()
            .filter_map(|id| self.state.orders.get(id).cloned())
            .collect()
    }

    // ========================================================================
    // Operator actions
    // ========================================================================

    /// Validate a transition on a copy, then commit it
    fn commit_transition(
        &mut self,
        id: &str,
        apply: impl FnOnce(&mut Order, u64) -> Result<(), OrderError>,
    ) -> Result<Order, ActionError> {
        let now = self.clock.now_ms();
        let mut next = self
            .state
            .orders
            .get(id)
            .cloned()
            .ok_or_else(|| ActionError::OrderNotFound(id.to_string()))?;

        if let Err(e) = apply(&mut next, now) {
            warn!(order = id, error = %e, "action rejected");
            return Err(e.into());
        }

        let committed = next.clone();
        self.state.orders.update(id, move |o| *o = next);
        Ok(committed)
    }

    fn publish_order_update(&mut self, change: OrderChange, orders: Vec<Order>) {
        let event = SimEvent::OrderUpdated {
            at: self.clock.now_ms(),
            change,
            orders,
        };
        self.bus.publish(&event);
    }

    /// Pending → InProgress, assigning a station if the order has none
    pub fn start_order(&mut self, id: &str) -> Result<Order, ActionError> {
        let order = self.start_one(id)?;
        self.publish_order_update(OrderChange::Started, vec![order.clone()]);

        if self.balancer.rules().auto_balance {
            self.run_balancing_pass();
        }
        Ok(order)
    }

    fn start_one(&mut self, id: &str) -> Result<Order, ActionError> {
        let stations = &self.config.stations;
        let book = &self.state.orders;
        let station = book
            .get(id)
            .filter(|o| o.station_id().is_none())
            .and_then(|o| balancer::least_loaded_station(stations, book, o));

        let order = self.commit_transition(id, |o, now| {
            o.start(now)?;
            if let Some(station) = station {
                o.assign_station(station);
            }
            Ok(())
        })?;

        debug!(order = id, station = ?order.station_id(), "order started");
        Ok(order)
    }

    /// InProgress → Completed, consuming inventory for the drink
    pub fn complete_order(&mut self, id: &str) -> Result<Order, ActionError> {
        let order = self.commit_transition(id, |o, now| o.complete(now))?;
        self.publish_order_update(OrderChange::Completed, vec![order.clone()]);

        let now = self.clock.now_ms();
        self.state
            .inventory
            .consume_for_order(&order, now, &mut self.bus);

        debug!(order = id, "order completed");
        Ok(order)
    }

    /// Completed → PickedUp
    pub fn mark_order_picked_up(&mut self, id: &str) -> Result<Order, ActionError> {
        let order = self.commit_transition(id, |o, now| o.pick_up(now))?;
        self.publish_order_update(OrderChange::PickedUp, vec![order.clone()]);
        debug!(order = id, "order picked up");
        Ok(order)
    }

    /// Start every pending order carrying `batch_key`
    ///
    /// One `ORDER_UPDATED` (batch processed) event carries all of them.
    pub fn process_batch_orders(&mut self, batch_key: &str) -> Result<Vec<Order>, ActionError> {
        if batch_key.trim().is_empty() {
            return Err(ActionError::InvalidInput("batch key is empty".to_string()));
        }

        let ids: Vec<String> = self
            .state
            .orders
            .with_status(OrderStatus::Pending)
            .into_iter()
            .filter(|o| o.batch_group() == Some(batch_key))
            .map(|o| o.id().to_string())
            .collect();

        if ids.is_empty() {
            return Err(ActionError::BatchNotFound(batch_key.to_string()));
        }

        let mut started = Vec::with_capacity(ids.len());
        for id in &ids {
            started.push(self.start_one(id)?);
        }

        info!(batch = batch_key, count = started.len(), "batch processed");
        self.publish_order_update(
            OrderChange::BatchProcessed {
                batch_key: batch_key.to_string(),
            },
            started.clone(),
        );

        if self.balancer.rules().auto_balance {
            self.run_balancing_pass();
        }
        Ok(started)
    }

    /// Add an order typed in by an operator; no random draws, no batching
    pub fn add_walk_in_order(&mut self, request: OrderRequest) -> Result<Order, ActionError> {
        if request.customer_name.trim().is_empty() {
            return Err(ActionError::InvalidInput("customer name is empty".to_string()));
        }
        if request.coffee_type.trim().is_empty() {
            return Err(ActionError::InvalidInput("coffee type is empty".to_string()));
        }

        let now = self.clock.now_ms();
        let order = Order::new(self.generator.next_id(), request, now);
        self.state.orders.insert(order.clone());

        info!(order = order.id(), "walk-in order added");
        self.bus.publish(&SimEvent::NewOrder {
            at: now,
            order: order.clone(),
        });
        Ok(order)
    }

    /// Cancel any non-terminal order
    pub fn remove_order(&mut self, id: &str) -> Result<Order, ActionError> {
        let order = self.commit_transition(id, |o, now| o.remove(now))?;
        self.publish_order_update(OrderChange::Removed, vec![order.clone()]);
        info!(order = id, "order removed");
        Ok(order)
    }

    /// Set the promised wait on every pending order
    ///
    /// Publishes nothing when no order is pending.
    pub fn adjust_wait_time(&mut self, minutes: u32) -> Result<Vec<Order>, ActionError> {
        let ids = self.state.orders.ids_with_status(OrderStatus::Pending);

        let mut adjusted = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(order) = self.state.orders.update(id, |o| {
                o.set_promised_wait(minutes);
                o.clone()
            }) {
                adjusted.push(order);
            }
        }

        if !adjusted.is_empty() {
            debug!(minutes, count = adjusted.len(), "promised wait adjusted");
            self.publish_order_update(OrderChange::WaitAdjusted { minutes }, adjusted.clone());
        }
        Ok(adjusted)
    }

    /// Post a message to the staff board
    pub fn add_message(
        &mut self,
        sender: &str,
        text: &str,
        urgent: bool,
    ) -> Result<StaffMessage, ActionError> {
        if text.trim().is_empty() {
            return Err(ActionError::InvalidInput("message text is empty".to_string()));
        }

        let now = self.clock.now_ms();
        let id = self.rng.next_uuid().to_string();
        let message = StaffMessage::new(id, sender, text, urgent, now);
        self.state.messages.push(message.clone());

        debug!(sender, urgent, "staff message posted");
        self.bus.publish(&SimEvent::MessageReceived {
            at: now,
            message: message.clone(),
        });
        Ok(message)
    }

    pub fn mark_message_read(&mut self, id: &str) -> Result<(), ActionError> {
        if self.state.mark_message_read(id) {
            Ok(())
        } else {
            Err(ActionError::MessageNotFound(id.to_string()))
        }
    }

    // ========================================================================
    // Balancing
    // ========================================================================

    pub fn balancing_rules(&self) -> &BalancingRules {
        self.balancer.rules()
    }

    pub fn set_balancing_rules(&mut self, rules: BalancingRules) {
        self.balancer.set_rules(rules);
    }

    /// Current load figures, without touching the suggestion list
    pub fn workload(&self) -> WorkloadSnapshot {
        balancer::analyze(&self.config.stations, &self.state.orders, self.balancer.rules())
    }

    /// Recompute transfer suggestions
    pub fn run_balancing_pass(&mut self) -> WorkloadSnapshot {
        self.balancer
            .run_pass(&self.config.stations, &self.state.orders)
    }

    pub fn transfer_suggestions(&self) -> &[TransferSuggestion] {
        self.balancer.suggestions()
    }

    pub fn balancer_stats(&self) -> BalancerStats {
        self.balancer.stats()
    }

    /// Apply one suggestion from the current list
    pub fn execute_transfer(&mut self, suggestion_id: &str) -> Result<Order, ActionError> {
        let suggestion = self.balancer.execute(suggestion_id, &mut self.state.orders)?;

        let order = self
            .state
            .orders
            .get(&suggestion.order_id)
            .cloned()
            .ok_or_else(|| ActionError::OrderNotFound(suggestion.order_id.clone()))?;

        self.publish_order_update(
            OrderChange::Transferred {
                from: suggestion.from_station,
                to: suggestion.to_station,
            },
            vec![order.clone()],
        );
        Ok(order)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Pending orders, VIP first, then oldest first
    pub fn pending_orders(&self) -> Vec<&Order> {
        let mut orders = self.state.orders.with_status(OrderStatus::Pending);
        orders.sort_by(|a, b| {
            b.is_vip()
                .cmp(&a.is_vip())
                .then(a.created_at().cmp(&b.created_at()))
        });
        orders
    }

    /// In-progress orders, earliest started first
    pub fn in_progress_orders(&self) -> Vec<&Order> {
        let mut orders = self.state.orders.with_status(OrderStatus::InProgress);
        orders.sort_by_key(|o| o.started_at());
        orders
    }

    /// Completed orders, most recently completed first
    pub fn completed_orders(&self) -> Vec<&Order> {
        let mut orders = self.state.orders.with_status(OrderStatus::Completed);
        orders.sort_by(|a, b| b.completed_at().cmp(&a.completed_at()));
        orders
    }

    pub fn stock_levels(&self) -> Vec<StockLevel> {
        self.state.inventory.stock_levels()
    }

    pub fn schedule(&self) -> &'static [ShiftEntry] {
        staff::schedule()
    }

    pub fn messages(&self) -> &[StaffMessage] {
        &self.state.messages
    }

    pub fn unread_count(&self) -> usize {
        self.state.unread_count()
    }

    pub fn stats(&self) -> OrderStats {
        let book = &self.state.orders;
        let now = self.clock.now_ms();
        let pending = book.with_status(OrderStatus::Pending);

        let average_wait_minutes = if pending.is_empty() {
            0.0
        } else {
            pending
                .iter()
                .map(|o| o.wait_minutes_at(now) as f64)
                .sum::<f64>()
                / pending.len() as f64
        };

        OrderStats {
            pending: pending.len(),
            in_progress: book.count_with_status(OrderStatus::InProgress),
            completed: book.count_with_status(OrderStatus::Completed),
            picked_up: book.count_with_status(OrderStatus::PickedUp),
            removed: book.count_with_status(OrderStatus::Removed),
            total: book.len(),
            average_wait_minutes,
        }
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&SimEvent) -> HandlerResult + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("now_ms", &self.clock.now_ms())
            .field("running", &self.running)
            .field("orders", &self.state.orders.len())
            .field("timers", &self.scheduler.active_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_stations() {
        let empty = SimulatorConfig {
            stations: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(
            Simulator::new(empty),
            Err(SimulationError::InvalidConfig(_))
        ));

        let duplicate = SimulatorConfig {
            stations: vec![Station::new("1", "A", 4, 2), Station::new("1", "B", 4, 2)],
            ..Default::default()
        };
        assert_eq!(
            Simulator::new(duplicate).unwrap_err(),
            SimulationError::InvalidConfig("Duplicate station ID: 1".to_string())
        );

        let zero = SimulatorConfig {
            stations: vec![Station::new("1", "A", 0, 2)],
            ..Default::default()
        };
        assert!(Simulator::new(zero).is_err());
    }

    #[test]
    fn test_new_simulator_is_idle() {
        let sim = Simulator::new(SimulatorConfig::default()).unwrap();
        assert!(!sim.is_running());
        assert_eq!(sim.active_timer_count(), 0);
        assert_eq!(sim.state().orders.len(), 0);
    }

    #[test]
    fn test_start_arms_all_timers() {
        let mut sim = Simulator::new(SimulatorConfig::default()).unwrap();
        sim.start(SettingsPatch::default());
        assert_eq!(sim.active_timer_count(), 6);

        sim.update_settings(SettingsPatch {
            simulate_equipment_issues: Some(false),
            simulate_staff_messages: Some(false),
            ..Default::default()
        });
        assert_eq!(sim.active_timer_count(), 4);
        assert_eq!(sim.state().orders.len(), INITIAL_ORDERS);
    }
}
