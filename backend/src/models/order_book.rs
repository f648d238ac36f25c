//! Order Book - insertion-ordered order storage with list revisions
//!
//! Holds every order the simulator has seen, including terminal ones, in
//! creation order. Iteration order is therefore deterministic, which the
//! batching search and the balancer rely on.
//!
//! # Revisions
//!
//! Each visible list (pending, in-progress, completed) has a revision counter.
//! Any mutation that touches an order bumps the revision of the list the
//! order left and the list it landed in. Readers that cache a filtered list
//! compare revisions instead of diffing whole collections.
//!
//! Revisions only grow, including across [`OrderBook::clear`], so a cache
//! built before a reset can never mistake the new book for the old one.

use crate::models::order::{Order, OrderList, OrderStatus};
use std::collections::HashMap;

/// Per-list revision counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderRevisions {
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
}

impl OrderRevisions {
    pub fn get(&self, list: OrderList) -> u64 {
        match list {
            OrderList::Pending => self.pending,
            OrderList::InProgress => self.in_progress,
            OrderList::Completed => self.completed,
        }
    }

    fn bump(&mut self, list: OrderList) {
        match list {
            OrderList::Pending => self.pending += 1,
            OrderList::InProgress => self.in_progress += 1,
            OrderList::Completed => self.completed += 1,
        }
    }

    fn bump_all(&mut self) {
        self.pending += 1;
        self.in_progress += 1;
        self.completed += 1;
    }
}

/// Creation-ordered collection of orders
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: Vec<Order>,

    /// Order ID → position in `orders`
    index: HashMap<String, usize>,

    revisions: OrderRevisions,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an order
    ///
    /// # Panics
    ///
    /// Panics if an order with the same ID already exists
    pub fn insert(&mut self, order: Order) {
        assert!(
            !self.index.contains_key(order.id()),
            "Order ID {} already exists",
            order.id()
        );
        if let Some(list) = order.status().list() {
            self.revisions.bump(list);
        }
        self.index.insert(order.id().to_string(), self.orders.len());
        self.orders.push(order);
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.index.get(id).map(|&i| &self.orders[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Mutate one order in place
    ///
    /// Returns `None` if the order does not exist. The revisions of the list
    /// the order was in and the list it ends up in are bumped whatever the
    /// closure returns, so closures should validate before touching fields.
    pub fn update<R>(&mut self, id: &str, f: impl FnOnce(&mut Order) -> R) -> Option<R> {
        let &i = self.index.get(id)?;
        let order = &mut self.orders[i];
        let before = order.status();
        let result = f(order);
        let after = order.status();

        if let Some(list) = before.list() {
            self.revisions.bump(list);
        }
        if after != before {
            if let Some(list) = after.list() {
                self.revisions.bump(list);
            }
        }
        Some(result)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Orders currently in `status`, in creation order
    pub fn with_status(&self, status: OrderStatus) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.status() == status).collect()
    }

    /// IDs of orders currently in `status`, in creation order
    pub fn ids_with_status(&self, status: OrderStatus) -> Vec<String> {
        self.orders
            .iter()
            .filter(|o| o.status() == status)
            .map(|o| o.id().to_string())
            .collect()
    }

    pub fn count_with_status(&self, status: OrderStatus) -> usize {
        self.orders.iter().filter(|o| o.status() == status).count()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn revisions(&self) -> OrderRevisions {
        self.revisions
    }

    /// Drop every order
    pub fn clear(&mut self) {
        self.orders.clear();
        self.index.clear();
        self.revisions.bump_all();
    }
}
