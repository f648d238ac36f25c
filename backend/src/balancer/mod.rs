//! Station Workload Balancer
//!
//! Measures how unevenly in-progress orders are spread across stations and
//! proposes single-order transfers from overloaded to lightly loaded
//! stations.
//!
//! # Algorithm
//!
//! ```text
//! 1. load% per station = in-progress assigned / max_capacity × 100
//! 2. imbalance        = population std-dev of load%
//! 3. if imbalance > balance_threshold:
//!      overloaded = load% > balance_threshold
//!      available  = load% < 50, ascending by load%
//!      for each overloaded station:
//!        candidates = non-VIP in-progress orders, newest first, ≤ max_transfers
//!        destination = first available station that can make the drink
//!        score = (wait_src − wait_dst) + (load%_src − load%_dst)
//! 4. sort by score descending, keep max_transfers
//! ```
//!
//! `balance_threshold` is a percentage compared directly against a standard
//! deviation of percentages. That comparison is kept as configured.
//!
//! Suggestions are ephemeral. Executing one removes it from the current list;
//! the list is only rebuilt by the next pass.

use crate::models::order::{Order, OrderStatus};
use crate::models::order_book::OrderBook;
use crate::models::station::{Station, StationStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Stations at or above this load are never transfer destinations
const AVAILABLE_BELOW_PERCENT: f64 = 50.0;

/// Balancer configuration, persisted by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BalancingRules {
    /// Run a pass automatically after order activity (suggest only)
    pub auto_balance: bool,

    /// Imbalance above which suggestions are produced
    pub balance_threshold: f64,

    /// Cap on candidates per station and on the final list
    pub max_transfers: usize,

    /// Only suggest destinations that can make the drink
    pub consider_capabilities: bool,
}

impl Default for BalancingRules {
    fn default() -> Self {
        Self {
            auto_balance: false,
            balance_threshold: 30.0,
            max_transfers: 3,
            consider_capabilities: true,
        }
    }
}

/// Derived load figures for one station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationLoad {
    pub station_id: String,
    pub name: String,
    pub max_capacity: u32,
    pub current_load: u32,
    pub workload_percentage: f64,
    /// Minutes: current_load × average order duration
    pub estimated_wait_time: f64,
    pub status: StationStatus,
}

/// Result of measuring every station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadSnapshot {
    pub stations: Vec<StationLoad>,
    pub average_workload: f64,
    /// Population standard deviation of workload percentages
    pub variance: f64,
    pub needs_balancing: bool,
}

impl WorkloadSnapshot {
    pub fn station(&self, station_id: &str) -> Option<&StationLoad> {
        self.stations.iter().find(|s| s.station_id == station_id)
    }
}

/// A proposed move of one order between stations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferSuggestion {
    pub id: String,
    pub order_id: String,
    pub from_station: String,
    pub to_station: String,
    /// Minutes saved: source estimated wait minus destination estimated wait
    pub wait_time_reduction: f64,
    pub priority_score: f64,
}

/// Running counters across executed transfers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BalancerStats {
    pub transfers_today: u32,
    /// Sum of `wait_time_reduction` over executed transfers, in minutes
    pub efficiency_gain: f64,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    #[error("No transfer suggestion with id {0}")]
    SuggestionNotFound(String),

    #[error("Order {order_id} is no longer in progress at station {station_id}")]
    StaleSuggestion { order_id: String, station_id: String },
}

// ============================================================================
// Measurement
// ============================================================================

/// Compute per-station load from the order book
pub fn station_loads(stations: &[Station], book: &OrderBook) -> Vec<StationLoad> {
    stations
        .iter()
        .map(|station| {
            let current_load = book
                .iter()
                .filter(|o| o.status() == OrderStatus::InProgress && o.station_id() == Some(station.id.as_str()))
                .count() as u32;

            let workload_percentage = if station.max_capacity == 0 {
                0.0
            } else {
                current_load as f64 / station.max_capacity as f64 * 100.0
            };

            StationLoad {
                station_id: station.id.clone(),
                name: station.name.clone(),
                max_capacity: station.max_capacity,
                current_load,
                workload_percentage,
                estimated_wait_time: current_load as f64 * station.avg_order_duration as f64,
                status: StationStatus::from_workload(workload_percentage),
            }
        })
        .collect()
}

/// Population standard deviation (0 for an empty slice)
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let squared = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    squared.sqrt()
}

/// Measure every station and decide whether balancing is needed
pub fn analyze(stations: &[Station], book: &OrderBook, rules: &BalancingRules) -> WorkloadSnapshot {
    let loads = station_loads(stations, book);
    let percentages: Vec<f64> = loads.iter().map(|l| l.workload_percentage).collect();

    let average_workload = if percentages.is_empty() {
        0.0
    } else {
        percentages.iter().sum::<f64>() / percentages.len() as f64
    };
    let variance = population_std_dev(&percentages);

    WorkloadSnapshot {
        stations: loads,
        average_workload,
        variance,
        needs_balancing: variance > rules.balance_threshold,
    }
}

// ============================================================================
// Suggestions
// ============================================================================

/// Rank transfers for an imbalanced snapshot
///
/// Returns an empty list when `snapshot.needs_balancing` is false.
pub fn suggest_transfers(
    stations: &[Station],
    book: &OrderBook,
    snapshot: &WorkloadSnapshot,
    rules: &BalancingRules,
) -> Vec<TransferSuggestion> {
    if !snapshot.needs_balancing || rules.max_transfers == 0 {
        return Vec::new();
    }

    let overloaded: Vec<&StationLoad> = snapshot
        .stations
        .iter()
        .filter(|s| s.workload_percentage > rules.balance_threshold)
        .collect();

    let mut available: Vec<&StationLoad> = snapshot
        .stations
        .iter()
        .filter(|s| s.workload_percentage < AVAILABLE_BELOW_PERCENT)
        .collect();
    available.sort_by(|a, b| a.workload_percentage.total_cmp(&b.workload_percentage));

    let mut suggestions = Vec::new();

    for source in overloaded {
        let mut candidates: Vec<&Order> = book
            .iter()
            .filter(|o| {
                o.status() == OrderStatus::InProgress
                    && !o.is_vip()
                    && o.station_id() == Some(source.station_id.as_str())
            })
            .collect();
        candidates.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        candidates.truncate(rules.max_transfers);

        for order in candidates {
            let destination = available.iter().find(|dest| {
                dest.station_id != source.station_id
                    && (!rules.consider_capabilities || can_make(stations, &dest.station_id, order))
            });

            let Some(destination) = destination else {
                debug!(order = order.id(), from = %source.station_id, "no destination for transfer candidate");
                continue;
            };

            let wait_time_reduction = source.estimated_wait_time - destination.estimated_wait_time;
            let priority_score =
                wait_time_reduction + (source.workload_percentage - destination.workload_percentage);

            suggestions.push(TransferSuggestion {
                id: format!("{}:{}->{}", order.id(), source.station_id, destination.station_id),
                order_id: order.id().to_string(),
                from_station: source.station_id.clone(),
                to_station: destination.station_id.clone(),
                wait_time_reduction,
                priority_score,
            });
        }
    }

    suggestions.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
    suggestions.truncate(rules.max_transfers);
    suggestions
}

fn can_make(stations: &[Station], station_id: &str, order: &Order) -> bool {
    let milk = order.has_milk().then(|| order.milk_type());
    stations
        .iter()
        .find(|s| s.id == station_id)
        .map(|s| s.capabilities.accepts(order.coffee_type(), milk))
        .unwrap_or(false)
}

/// Pick the least-loaded station able to make `order`
///
/// Ties go to the earlier station in configuration order.
pub fn least_loaded_station(stations: &[Station], book: &OrderBook, order: &Order) -> Option<String> {
    let loads = station_loads(stations, book);
    let milk = order.has_milk().then(|| order.milk_type());

    stations
        .iter()
        .zip(loads.iter())
        .filter(|(station, _)| station.capabilities.accepts(order.coffee_type(), milk))
        .min_by(|(_, a), (_, b)| a.workload_percentage.total_cmp(&b.workload_percentage))
        .map(|(station, _)| station.id.clone())
}

// ============================================================================
// Stateful balancer
// ============================================================================

/// Holds the current suggestion list and transfer counters
#[derive(Debug, Clone, Default)]
pub struct WorkloadBalancer {
    rules: BalancingRules,
    suggestions: Vec<TransferSuggestion>,
    stats: BalancerStats,
}

impl WorkloadBalancer {
    pub fn new(rules: BalancingRules) -> Self {
        Self {
            rules,
            suggestions: Vec::new(),
            stats: BalancerStats::default(),
        }
    }

    pub fn rules(&self) -> &BalancingRules {
        &self.rules
    }

    pub fn set_rules(&mut self, rules: BalancingRules) {
        self.rules = rules;
    }

    pub fn suggestions(&self) -> &[TransferSuggestion] {
        &self.suggestions
    }

    pub fn stats(&self) -> BalancerStats {
        self.stats
    }

    /// Measure and replace the suggestion list
    pub fn run_pass(&mut self, stations: &[Station], book: &OrderBook) -> WorkloadSnapshot {
        let snapshot = analyze(stations, book, &self.rules);
        self.suggestions = suggest_transfers(stations, book, &snapshot, &self.rules);

        debug!(
            variance = snapshot.variance,
            needs_balancing = snapshot.needs_balancing,
            suggestions = self.suggestions.len(),
            "balancing pass"
        );

        snapshot
    }

    /// Apply one suggestion by id
    ///
    /// The order moves from the source to the destination station in a
    /// single update. The suggestion is removed from the list either way if
    /// it turned out to be stale; other suggestions are left as they are.
    pub fn execute(
        &mut self,
        suggestion_id: &str,
        book: &mut OrderBook,
    ) -> Result<TransferSuggestion, TransferError> {
        let idx = self
            .suggestions
            .iter()
            .position(|s| s.id == suggestion_id)
            .ok_or_else(|| TransferError::SuggestionNotFound(suggestion_id.to_string()))?;
        let suggestion = self.suggestions.remove(idx);

        let still_valid = book
            .get(&suggestion.order_id)
            .map(|o| {
                o.status() == OrderStatus::InProgress
                    && o.station_id() == Some(suggestion.from_station.as_str())
            })
            .unwrap_or(false);
        if !still_valid {
            return Err(TransferError::StaleSuggestion {
                order_id: suggestion.order_id,
                station_id: suggestion.from_station,
            });
        }

        let to_station = suggestion.to_station.clone();
        book.update(&suggestion.order_id, |o| o.assign_station(to_station));

        self.stats.transfers_today += 1;
        self.stats.efficiency_gain += suggestion.wait_time_reduction;

        info!(
            order = %suggestion.order_id,
            from = %suggestion.from_station,
            to = %suggestion.to_station,
            "transfer executed"
        );

        Ok(suggestion)
    }

    /// Drop suggestions and counters
    pub fn reset(&mut self) {
        self.suggestions.clear();
        self.stats = BalancerStats::default();
    }
}
