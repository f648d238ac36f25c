//! Virtual-time timer registry
//!
//! Replaces free-running interval timers with an explicit table of
//! `(due time, task)` entries. The owner drives it by asking for the next due
//! task up to some instant, which makes every run reproducible under test.
//!
//! # Ordering
//!
//! Due tasks come out ordered by due time, then by registration order. A
//! periodic timer is re-armed at `due + interval` before its task is returned,
//! so a late driver catches up one firing at a time.

use serde::{Deserialize, Serialize};

/// Opaque handle returned by registration, used to cancel a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Timer<T> {
    handle: TimerHandle,
    task: T,
    due_at: u64,
    /// `None` for one-shot timers
    interval: Option<u64>,
}

/// A firing handed back to the driver
#[derive(Debug, Clone, PartialEq)]
pub struct DueTask<T> {
    pub handle: TimerHandle,
    pub task: T,
    pub due_at: u64,
}

/// Timer table keyed to a virtual millisecond clock
///
/// # Example
/// ```
/// use kiosk_simulator_core_rs::core::scheduler::Scheduler;
///
/// let mut scheduler = Scheduler::new();
/// let handle = scheduler.register_periodic(0, 1_000, "tick");
///
/// let first = scheduler.pop_due(2_500).unwrap();
/// assert_eq!(first.due_at, 1_000);
/// assert_eq!(scheduler.pop_due(2_500).unwrap().due_at, 2_000);
/// assert!(scheduler.pop_due(2_500).is_none());
///
/// assert!(scheduler.cancel(handle));
/// assert_eq!(scheduler.active_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    timers: Vec<Timer<T>>,
    next_handle: u64,
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_handle: 1,
        }
    }

    /// Register a task that fires every `interval_ms`, first at `now + interval`
    ///
    /// Zero intervals are bumped to 1ms so a timer can never fire twice at
    /// the same instant.
    pub fn register_periodic(&mut self, now_ms: u64, interval_ms: u64, task: T) -> TimerHandle {
        let interval = interval_ms.max(1);
        self.insert(now_ms + interval, Some(interval), task)
    }

    /// Register a task that fires once, `delay_ms` from now
    pub fn register_once(&mut self, now_ms: u64, delay_ms: u64, task: T) -> TimerHandle {
        self.insert(now_ms + delay_ms.max(1), None, task)
    }

    fn insert(&mut self, due_at: u64, interval: Option<u64>, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.push(Timer {
            handle,
            task,
            due_at,
            interval,
        });
        handle
    }

    /// Cancel a timer; returns false if the handle is unknown or already spent
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    /// Cancel every timer, returning how many were active
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        count
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Earliest due time across all timers
    pub fn next_due(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.due_at).min()
    }

    /// Take the earliest task due at or before `until_ms`
    pub fn pop_due(&mut self, until_ms: u64) -> Option<DueTask<T>> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_at <= until_ms)
            .min_by_key(|(_, t)| (t.due_at, t.handle))
            .map(|(i, _)| i)?;

        let timer = &mut self.timers[idx];
        let due = DueTask {
            handle: timer.handle,
            task: timer.task.clone(),
            due_at: timer.due_at,
        };

        match timer.interval {
            Some(interval) => timer.due_at += interval,
            None => {
                self.timers.remove(idx);
            }
        }

        Some(due)
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
