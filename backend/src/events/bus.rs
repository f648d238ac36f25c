//! In-process publish/subscribe
//!
//! This module handles:
//! - Registering handlers per event kind
//! - Synchronous, in-order delivery
//! - Isolating failing handlers from the rest
//!
//! There is no history: a handler only sees events published after it
//! subscribed.

use crate::events::types::{EventKind, SimEvent};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::warn;

/// Failure reported by a subscriber
#[derive(Debug, Error, Clone, PartialEq)]
#[error("event handler failed: {0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type HandlerResult = Result<(), HandlerError>;

type Handler = Box<dyn FnMut(&SimEvent) -> HandlerResult>;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

/// Typed event multiplexer
///
/// # Example
/// ```
/// use kiosk_simulator_core_rs::events::{EventBus, EventKind, SimEvent};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let mut bus = EventBus::new();
/// let seen = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&seen);
///
/// let id = bus.subscribe(EventKind::MessageReceived, move |_event| {
///     counter.set(counter.get() + 1);
///     Ok(())
/// });
///
/// assert!(bus.unsubscribe(id));
/// assert_eq!(bus.subscriber_count(EventKind::MessageReceived), 0);
/// ```
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a handler for one event kind
    ///
    /// Handlers for the same kind run in subscription order.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&SimEvent) -> HandlerResult + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            kind,
            handler: Box::new(handler),
        });
        id
    }

    /// Remove a handler; returns false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Deliver an event to every handler registered for its kind
    ///
    /// Returns the number of handlers that succeeded. A handler that returns
    /// an error or panics is logged and skipped; delivery continues with the
    /// next one.
    pub fn publish(&mut self, event: &SimEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;

        for subscription in self.subscriptions.iter_mut().filter(|s| s.kind == kind) {
            let handler = &mut subscription.handler;
            match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => warn!(
                    event = kind.as_str(),
                    subscription = subscription.id.0,
                    error = %err,
                    "subscriber failed"
                ),
                Err(payload) => warn!(
                    event = kind.as_str(),
                    subscription = subscription.id.0,
                    panic = panic_message(payload.as_ref()),
                    "subscriber panicked"
                ),
            }
        }

        delivered
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscriptions.iter().filter(|s| s.kind == kind).count()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut per_kind = f.debug_map();
        for kind in EventKind::ALL {
            per_kind.entry(&kind.as_str(), &self.subscriber_count(kind));
        }
        per_kind.finish()
    }
}
