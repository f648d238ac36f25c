//! Order Query/Cache Facade
//!
//! Station-filtered views of the simulator's order lists, rebuilt only when
//! they can have changed.
//!
//! # Problem
//!
//! A display polling the simulator would otherwise re-filter and re-sort
//! every list on every poll, and signal "updated" even when nothing moved.
//!
//! # Solution
//!
//! Each cached list remembers the [`OrderBook`](crate::models::OrderBook)
//! revision it was built from. A sync skips lists whose revision has not
//! moved; for the rest it rebuilds, compares with the cached copy, and only
//! a genuine difference replaces the cache and is reported.
//!
//! Refresh traffic is throttled:
//! - manual refreshes within 5s of the previous one are dropped
//! - polls are skipped for 15s after a manual refresh
//! - connection checks run at most once per 5s unless forced
//!
//! # Usage
//!
//! ```rust
//! use kiosk_simulator_core_rs::facade::{OrderQueryCache, RefreshOutcome};
//! use kiosk_simulator_core_rs::simulator::{SettingsPatch, Simulator, SimulatorConfig};
//!
//! let mut sim = Simulator::new(SimulatorConfig::default()).unwrap();
//! sim.start(SettingsPatch::default());
//!
//! let mut cache = OrderQueryCache::new();
//! assert!(matches!(cache.poll(&mut sim), RefreshOutcome::Updated(_)));
//! assert_eq!(cache.pending().len(), 3);
//!
//! // Nothing moved since the last sync
//! assert_eq!(cache.poll(&mut sim), RefreshOutcome::Unchanged);
//! ```

use crate::balancer::WorkloadSnapshot;
use crate::models::order::{Order, OrderList};
use crate::models::station::{Station, StationStatus};
use crate::simulator::Simulator;
use tracing::{debug, info, warn};

pub const MANUAL_REFRESH_DEBOUNCE_MS: u64 = 5_000;
pub const POLL_SUPPRESSION_MS: u64 = 15_000;
pub const CONNECTION_CHECK_INTERVAL_MS: u64 = 5_000;

/// Floor of every dynamically computed promised wait, in minutes
pub const BASE_WAIT_MINUTES: u32 = 2;

/// Station that phone orders without any station field belong to
pub const DEFAULT_STATION_ID: &str = "1";

// ============================================================================
// Station attribution
// ============================================================================

/// True if `order` is attributed to `station_id`
///
/// Matches the current station field and every legacy id, ignoring case and
/// surrounding whitespace. An order with no station information at all but
/// a phone number belongs to [`DEFAULT_STATION_ID`].
pub fn belongs_to_station(order: &Order, station_id: &str) -> bool {
    let wanted = station_id.trim();
    let matches = |candidate: &str| candidate.trim().eq_ignore_ascii_case(wanted);

    if order.station_id().map(matches).unwrap_or(false)
        || order.legacy_station_ids().iter().any(|id| matches(id.as_str()))
    {
        return true;
    }

    let unassigned = order.station_id().is_none() && order.legacy_station_ids().is_empty();
    let has_phone = order.phone().map(|p| !p.trim().is_empty()).unwrap_or(false);
    unassigned && has_phone && matches(DEFAULT_STATION_ID)
}

/// Orders attributed to `station_id`, in input order
pub fn filter_by_station<'a, I>(orders: I, station_id: &str) -> Vec<&'a Order>
where
    I: IntoIterator<Item = &'a Order>,
{
    orders
        .into_iter()
        .filter(|o| belongs_to_station(o, station_id))
        .collect()
}

/// Promised wait for a queue of `pending_len` orders
///
/// `BASE_WAIT_MINUTES`, plus the queue spread over every station at the mean
/// preparation time (rounded up), plus one minute per busy or overloaded
/// station.
pub fn dynamic_wait_minutes(
    pending_len: usize,
    workload: &WorkloadSnapshot,
    stations: &[Station],
) -> u32 {
    if stations.is_empty() {
        return BASE_WAIT_MINUTES + pending_len as u32;
    }

    let mean_duration = stations
        .iter()
        .map(|s| s.avg_order_duration as f64)
        .sum::<f64>()
        / stations.len() as f64;
    let queue_minutes = (pending_len as f64 * mean_duration / stations.len() as f64).ceil() as u32;

    let congested = workload
        .stations
        .iter()
        .filter(|s| matches!(s.status, StationStatus::Busy | StationStatus::Overloaded))
        .count() as u32;

    BASE_WAIT_MINUTES + queue_minutes + congested
}

// ============================================================================
// Connectivity
// ============================================================================

/// Reachability check for whatever backs the order lists
pub trait ConnectionCheck {
    fn is_reachable(&mut self) -> bool;
}

impl<F: FnMut() -> bool> ConnectionCheck for F {
    fn is_reachable(&mut self) -> bool {
        self()
    }
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Manual refresh inside the debounce window
    Debounced,

    /// Poll inside the window after a manual refresh
    RecentManualRefresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// These lists genuinely changed
    Updated(Vec<OrderList>),
    Unchanged,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Default)]
struct CachedList {
    revision: Option<u64>,
    orders: Vec<Order>,
}

/// Change-detecting cache over the simulator's three order lists
#[derive(Debug, Clone)]
pub struct OrderQueryCache {
    station_id: Option<String>,
    dynamic_wait: bool,
    pending: CachedList,
    in_progress: CachedList,
    completed: CachedList,
    last_manual_refresh: Option<u64>,
    last_pending_len: Option<usize>,
    last_connection_check: Option<u64>,
    connected: bool,
}

impl OrderQueryCache {
    /// Cache over every station, with dynamic wait adjustment on
    pub fn new() -> Self {
        Self {
            station_id: None,
            dynamic_wait: true,
            pending: CachedList::default(),
            in_progress: CachedList::default(),
            completed: CachedList::default(),
            last_manual_refresh: None,
            last_pending_len: None,
            last_connection_check: None,
            connected: true,
        }
    }

    /// Cache restricted to one station's orders
    pub fn for_station(station_id: impl Into<String>) -> Self {
        Self {
            station_id: Some(station_id.into()),
            ..Self::new()
        }
    }

    /// Toggle promised-wait recomputation (builder pattern)
    pub fn with_dynamic_wait(mut self, enabled: bool) -> Self {
        self.dynamic_wait = enabled;
        self
    }

    pub fn station_id(&self) -> Option<&str> {
        self.station_id.as_deref()
    }

    pub fn pending(&self) -> &[Order] {
        &self.pending.orders
    }

    pub fn in_progress(&self) -> &[Order] {
        &self.in_progress.orders
    }

    pub fn completed(&self) -> &[Order] {
        &self.completed.orders
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Bring every list up to date and report the ones that changed
    ///
    /// When the simulator's pending queue length differs from the last sync,
    /// a new promised wait is computed and pushed through
    /// [`Simulator::adjust_wait_time`] before the lists are rebuilt, so the
    /// cached pending list already carries it.
    pub fn sync(&mut self, sim: &mut Simulator) -> Vec<OrderList> {
        if self.dynamic_wait {
            self.recompute_wait(sim);
        }

        let revisions = sim.state().orders.revisions();
        let mut updated = Vec::new();

        for list in [OrderList::Pending, OrderList::InProgress, OrderList::Completed] {
            let revision = revisions.get(list);
            if self.cached(list).revision == Some(revision) {
                continue;
            }

            let fresh = self.collect(sim, list);
            let cached = self.cached_mut(list);
            cached.revision = Some(revision);
            if cached.orders != fresh {
                cached.orders = fresh;
                updated.push(list);
            }
        }

        if !updated.is_empty() {
            debug!(lists = ?updated, "order cache updated");
        }
        updated
    }

    /// Operator-requested refresh, dropped within the debounce window
    ///
    /// A refresh that goes through rebuilds every list regardless of
    /// revisions; only real differences are still reported.
    pub fn manual_refresh(&mut self, sim: &mut Simulator) -> RefreshOutcome {
        let now = sim.now_ms();
        if let Some(last) = self.last_manual_refresh {
            if now.saturating_sub(last) < MANUAL_REFRESH_DEBOUNCE_MS {
                debug!(since_ms = now - last, "manual refresh debounced");
                return RefreshOutcome::Skipped(SkipReason::Debounced);
            }
        }

        self.last_manual_refresh = Some(now);
        for list in [OrderList::Pending, OrderList::InProgress, OrderList::Completed] {
            self.cached_mut(list).revision = None;
        }
        Self::outcome(self.sync(sim))
    }

    /// Automatic poll, skipped shortly after a manual refresh
    pub fn poll(&mut self, sim: &mut Simulator) -> RefreshOutcome {
        let now = sim.now_ms();
        if let Some(last) = self.last_manual_refresh {
            if now.saturating_sub(last) < POLL_SUPPRESSION_MS {
                return RefreshOutcome::Skipped(SkipReason::RecentManualRefresh);
            }
        }
        Self::outcome(self.sync(sim))
    }

    /// Check connectivity at most once per interval unless `force` is set
    ///
    /// Throttled calls return the last known state without checking.
    pub fn check_connection<P>(&mut self, check: &mut P, now_ms: u64, force: bool) -> bool
    where
        P: ConnectionCheck + ?Sized,
    {
        if !force {
            if let Some(last) = self.last_connection_check {
                if now_ms.saturating_sub(last) < CONNECTION_CHECK_INTERVAL_MS {
                    return self.connected;
                }
            }
        }

        self.last_connection_check = Some(now_ms);
        let reachable = check.is_reachable();
        if reachable != self.connected {
            if reachable {
                info!("order source reachable again");
            } else {
                warn!("order source unreachable");
            }
        }
        self.connected = reachable;
        reachable
    }

    fn outcome(updated: Vec<OrderList>) -> RefreshOutcome {
        if updated.is_empty() {
            RefreshOutcome::Unchanged
        } else {
            RefreshOutcome::Updated(updated)
        }
    }

    fn recompute_wait(&mut self, sim: &mut Simulator) {
        let pending_len = sim.pending_orders().len();
        if self.last_pending_len == Some(pending_len) {
            return;
        }
        self.last_pending_len = Some(pending_len);
        if pending_len == 0 {
            return;
        }

        let minutes = dynamic_wait_minutes(pending_len, &sim.workload(), sim.stations());
        if let Err(e) = sim.adjust_wait_time(minutes) {
            warn!(error = %e, "dynamic wait adjustment rejected");
        }
    }

    fn collect(&self, sim: &Simulator, list: OrderList) -> Vec<Order> {
        let orders = match list {
            OrderList::Pending => sim.pending_orders(),
            OrderList::InProgress => sim.in_progress_orders(),
            OrderList::Completed => sim.completed_orders(),
        };

        match &self.station_id {
            Some(station_id) => filter_by_station(orders, station_id)
                .into_iter()
                .cloned()
                .collect(),
            None => orders.into_iter().cloned().collect(),
        }
    }

    fn cached(&self, list: OrderList) -> &CachedList {
        match list {
            OrderList::Pending => &self.pending,
            OrderList::InProgress => &self.in_progress,
            OrderList::Completed => &self.completed,
        }
    }

    fn cached_mut(&mut self, list: OrderList) -> &mut CachedList {
        match list {
            OrderList::Pending => &mut self.pending,
            OrderList::InProgress => &mut self.in_progress,
            OrderList::Completed => &mut self.completed,
        }
    }
}

impl Default for OrderQueryCache {
    fn default() -> Self {
        Self::new()
    }
}
