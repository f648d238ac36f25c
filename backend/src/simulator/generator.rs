//! Synthetic order generation and online batching
//!
//! All generation is deterministic given the RNG state: fields are drawn from
//! fixed pools in a fixed order.
//!
//! # Batching
//!
//! Batching is a greedy, one-pass clustering. A new order that rolls for
//! batching looks at pending orders with the same coffee and milk:
//! - if one of them already has a batch key, the new order joins that batch
//! - otherwise a key `"{coffee}-{milk}"` is minted and stamped on the new
//!   order and on every match
//!
//! Earlier orders are never regrouped.

use crate::models::order::{Order, OrderRequest, OrderStatus};
use crate::models::order_book::OrderBook;
use crate::rng::RngManager;
use crate::simulator::settings::SimulationSettings;

pub const CUSTOMER_NAMES: &[&str] = &[
    "Alex", "Jordan", "Sam", "Taylor", "Morgan", "Casey", "Riley", "Jamie", "Avery", "Quinn",
    "Priya", "Mateo", "Yuki", "Noor", "Lena", "Tomas",
];

pub const CUP_SIZES: &[&str] = &["Small", "Regular", "Large"];

pub const DRINKS: &[&str] = &[
    "Latte",
    "Cappuccino",
    "Flat White",
    "Americano",
    "Mocha",
    "Macchiato",
];

pub const MILK_TYPES: &[&str] = &[
    "Whole milk",
    "Skim milk",
    "Oat milk",
    "Almond milk",
    "Soy milk",
    "No milk",
];

pub const SUGAR_OPTIONS: &[&str] = &["No sugar", "1 sugar", "2 sugars", "Sweetener"];

/// Result of a batching roll that touched existing orders
#[derive(Debug, Clone, PartialEq)]
pub enum BatchAssignment {
    /// New order joined an existing batch
    Joined { batch_key: String },

    /// New key minted; `tagged` lists the existing orders stamped with it
    Formed { batch_key: String, tagged: Vec<String> },
}

/// Draws orders from the fixed pools and hands out sequential IDs
#[derive(Debug, Clone)]
pub struct OrderGenerator {
    next_seq: u64,
}

impl OrderGenerator {
    pub fn new() -> Self {
        Self { next_seq: 1 }
    }

    /// Next order ID (`ORD-0001`, `ORD-0002`, ...)
    pub fn next_id(&mut self) -> String {
        let id = format!("ORD-{:04}", self.next_seq);
        self.next_seq += 1;
        id
    }

    /// Restart numbering at 1
    pub fn reset(&mut self) {
        self.next_seq = 1;
    }

    /// Draw the customer-facing fields of a random order
    pub fn draw_request(rng: &mut RngManager, settings: &SimulationSettings) -> OrderRequest {
        let name = pick(rng, CUSTOMER_NAMES);
        let size = pick(rng, CUP_SIZES);
        let drink = pick(rng, DRINKS);
        let milk = pick(rng, MILK_TYPES);
        let sugar = pick(rng, SUGAR_OPTIONS);
        let phone = format!("+1555{:07}", rng.range(0, 10_000_000));
        let is_vip = settings.include_vip_orders && rng.chance(settings.vip_probability);

        OrderRequest {
            customer_name: name.to_string(),
            phone: Some(phone),
            coffee_type: format!("{} {}", size, drink),
            milk_type: milk.to_string(),
            sugar: sugar.to_string(),
            is_vip,
        }
    }

    /// Generate a pending order created at `now_ms`
    pub fn generate(
        &mut self,
        rng: &mut RngManager,
        settings: &SimulationSettings,
        now_ms: u64,
    ) -> Order {
        let request = Self::draw_request(rng, settings);
        Order::new(self.next_id(), request, now_ms)
    }
}

impl Default for OrderGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn pick<'a>(rng: &mut RngManager, pool: &[&'a str]) -> &'a str {
    rng.choose(pool).copied().unwrap_or_default()
}

/// Roll for batching and apply the outcome
///
/// `order` must not be in `book` yet. Returns `None` when batching is off,
/// the roll fails, or no pending order shares the drink.
pub fn assign_batch(
    rng: &mut RngManager,
    settings: &SimulationSettings,
    order: &mut Order,
    book: &mut OrderBook,
) -> Option<BatchAssignment> {
    if !settings.include_batch_orders || !rng.chance(settings.batch_probability) {
        return None;
    }

    let matches: Vec<&Order> = book
        .iter()
        .filter(|o| o.status() == OrderStatus::Pending && o.same_drink_as(order))
        .collect();

    if matches.is_empty() {
        return None;
    }

    if let Some(existing) = matches.iter().find_map(|o| o.batch_group()) {
        let batch_key = existing.to_string();
        order.set_batch_group(batch_key.clone());
        return Some(BatchAssignment::Joined { batch_key });
    }

    let batch_key = order.batch_key();
    let tagged: Vec<String> = matches.iter().map(|o| o.id().to_string()).collect();
    for id in &tagged {
        book.update(id, |o| o.set_batch_group(batch_key.clone()));
    }
    order.set_batch_group(batch_key.clone());

    Some(BatchAssignment::Formed { batch_key, tagged })
}
