//! Stock ledger with event publication
//!
//! Depletions publish through the caller's [`EventBus`]:
//! - `StockUpdated` whenever an item's status band changes
//! - `SystemAlert` when that change lands in `Danger`

use crate::events::{AlertSeverity, AlertSource, EventBus, SimEvent, SystemAlert};
use crate::inventory::item::{InventoryCategory, InventoryItem, StockLevel, StockStatus};
use crate::models::order::{CupSize, Order};
use crate::rng::RngManager;
use thiserror::Error;
use tracing::debug;

/// Milk per small drink, in litres
pub const MILK_SMALL: f64 = 0.10;
/// Milk per regular drink, in litres
pub const MILK_REGULAR: f64 = 0.15;
/// Milk per large drink, in litres
pub const MILK_LARGE: f64 = 0.25;
/// Beans per drink from the first coffee item, in kilograms
pub const COFFEE_PER_ORDER: f64 = 0.018;
/// Cups per drink from the size-matching cup item
pub const CUPS_PER_ORDER: f64 = 1.0;

/// Random shocks remove between 5% and 15% of the current amount
const RANDOM_DEPLETION_MIN: f64 = 0.05;
const RANDOM_DEPLETION_MAX: f64 = 0.15;

/// Errors from ledger operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Unknown inventory item {item_id} in {category}")]
    UnknownItem {
        category: InventoryCategory,
        item_id: String,
    },

    #[error("Depletion amount must be a non-negative number, got {0}")]
    InvalidAmount(f64),
}

/// All stock, in a fixed category order
///
/// # Example
/// ```
/// use kiosk_simulator_core_rs::events::EventBus;
/// use kiosk_simulator_core_rs::inventory::{InventoryCategory, InventoryLedger};
///
/// let mut ledger = InventoryLedger::new();
/// let mut bus = EventBus::new();
///
/// let level = ledger
///     .deplete(InventoryCategory::Milk, "milk-oat", 1.0, 0, &mut bus)
///     .unwrap();
/// assert_eq!(level.amount, 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    categories: Vec<(InventoryCategory, Vec<InventoryItem>)>,
}

impl InventoryLedger {
    /// Create a ledger holding the baseline stock
    pub fn new() -> Self {
        Self {
            categories: Self::baseline(),
        }
    }

    /// Baseline stock restored by [`InventoryLedger::seed`]
    pub fn baseline() -> Vec<(InventoryCategory, Vec<InventoryItem>)> {
        vec![
            (
                InventoryCategory::Coffee,
                vec![
                    InventoryItem::new("coffee-house-blend", "House Blend Beans", 5.0, "kg", 10.0),
                    InventoryItem::new("coffee-decaf", "Decaf Beans", 2.0, "kg", 5.0),
                    InventoryItem::new("coffee-espresso-roast", "Espresso Roast", 3.0, "kg", 8.0),
                ],
            ),
            (
                InventoryCategory::Milk,
                vec![
                    InventoryItem::new("milk-whole", "Whole milk", 10.0, "L", 20.0),
                    InventoryItem::new("milk-skim", "Skim milk", 6.0, "L", 15.0),
                    InventoryItem::new("milk-oat", "Oat milk", 5.0, "L", 10.0),
                    InventoryItem::new("milk-almond", "Almond milk", 3.0, "L", 10.0),
                    InventoryItem::new("milk-soy", "Soy milk", 2.0, "L", 8.0),
                ],
            ),
            (
                InventoryCategory::Cups,
                vec![
                    InventoryItem::new("cups-small", "Small cups", 150.0, "pcs", 300.0),
                    InventoryItem::new("cups-regular", "Regular cups", 200.0, "pcs", 300.0),
                    InventoryItem::new("cups-large", "Large cups", 80.0, "pcs", 300.0),
                ],
            ),
            (
                InventoryCategory::Sweeteners,
                vec![
                    InventoryItem::new("sugar-sachets", "Sugar sachets", 400.0, "pcs", 1000.0),
                    InventoryItem::new("sweetener-sachets", "Sweetener sachets", 150.0, "pcs", 500.0),
                ],
            ),
        ]
    }

    /// Reset every item to its baseline amount
    pub fn seed(&mut self) {
        self.categories = Self::baseline();
    }

    pub fn items(&self, category: InventoryCategory) -> &[InventoryItem] {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn item(&self, category: InventoryCategory, item_id: &str) -> Option<&InventoryItem> {
        self.items(category).iter().find(|i| i.id() == item_id)
    }

    /// Snapshot of every item, category order then item order
    pub fn stock_levels(&self) -> Vec<StockLevel> {
        self.categories
            .iter()
            .flat_map(|(category, items)| items.iter().map(move |i| StockLevel::of(*category, i)))
            .collect()
    }

    fn item_mut(&mut self, category: InventoryCategory, item_id: &str) -> Option<&mut InventoryItem> {
        self.categories
            .iter_mut()
            .find(|(c, _)| *c == category)
            .and_then(|(_, items)| items.iter_mut().find(|i| i.id() == item_id))
    }

    /// Subtract `amount` from one item, flooring at zero
    ///
    /// Publishes `StockUpdated` if the status band changed, and a critical
    /// `SystemAlert` if it changed into `Danger`.
    ///
    /// # Errors
    ///
    /// Unknown items and negative or non-finite amounts are rejected without
    /// touching the ledger.
    pub fn deplete(
        &mut self,
        category: InventoryCategory,
        item_id: &str,
        amount: f64,
        now_ms: u64,
        bus: &mut EventBus,
    ) -> Result<StockLevel, LedgerError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let item = self
            .item_mut(category, item_id)
            .ok_or_else(|| LedgerError::UnknownItem {
                category,
                item_id: item_id.to_string(),
            })?;

        let previous_status = item.status();
        item.take(amount);
        let level = StockLevel::of(category, item);

        if level.status != previous_status {
            debug!(
                item = %level.id,
                from = ?previous_status,
                to = ?level.status,
                amount = level.amount,
                "stock status changed"
            );

            bus.publish(&SimEvent::StockUpdated {
                at: now_ms,
                category,
                item: level.clone(),
                previous_status,
            });

            if level.status == StockStatus::Danger {
                bus.publish(&SimEvent::SystemAlert {
                    at: now_ms,
                    alert: SystemAlert {
                        severity: AlertSeverity::Critical,
                        source: AlertSource::Inventory {
                            category,
                            item_id: level.id.clone(),
                        },
                        message: format!(
                            "{} is critically low ({:.2} {} left)",
                            level.name, level.amount, level.unit
                        ),
                    },
                });
            }
        }

        Ok(level)
    }

    /// Knock 5–15% off one random item
    ///
    /// Returns `None` only when the ledger holds no items.
    pub fn random_deplete(
        &mut self,
        rng: &mut RngManager,
        now_ms: u64,
        bus: &mut EventBus,
    ) -> Option<StockLevel> {
        let category_idx = rng.index(self.categories.len())?;
        let (category, items) = &self.categories[category_idx];
        let category = *category;
        let item_idx = rng.index(items.len())?;
        let item = &items[item_idx];

        let item_id = item.id().to_string();
        let fraction = rng.uniform(RANDOM_DEPLETION_MIN, RANDOM_DEPLETION_MAX);
        let quantity = item.amount() * fraction;

        self.deplete(category, &item_id, quantity, now_ms, bus).ok()
    }

    /// Burn the flat per-order quantities for a finished drink
    ///
    /// - milk by cup size from the item named like the order's milk
    ///   (skipped for orders without milk)
    /// - coffee from the first coffee item
    /// - one cup from the size-matching cup item
    ///
    /// Items that cannot be found are skipped. Returns the levels that were
    /// touched, in that order.
    pub fn consume_for_order(
        &mut self,
        order: &Order,
        now_ms: u64,
        bus: &mut EventBus,
    ) -> Vec<StockLevel> {
        let mut touched = Vec::with_capacity(3);
        let size = order.cup_size();

        if order.has_milk() {
            let milk_item = self
                .items(InventoryCategory::Milk)
                .iter()
                .find(|i| i.name().eq_ignore_ascii_case(order.milk_type().trim()))
                .map(|i| i.id().to_string());

            match milk_item {
                Some(id) => {
                    let quantity = match size {
                        CupSize::Small => MILK_SMALL,
                        CupSize::Regular => MILK_REGULAR,
                        CupSize::Large => MILK_LARGE,
                    };
                    touched.extend(self.deplete(InventoryCategory::Milk, &id, quantity, now_ms, bus).ok());
                }
                None => debug!(order = order.id(), milk = order.milk_type(), "no stock item for milk"),
            }
        }

        let coffee_item = self
            .items(InventoryCategory::Coffee)
            .first()
            .map(|i| i.id().to_string());
        if let Some(id) = coffee_item {
            touched.extend(
                self.deplete(InventoryCategory::Coffee, &id, COFFEE_PER_ORDER, now_ms, bus)
                    .ok(),
            );
        }

        let cup_prefix = size.label().to_lowercase();
        let cup_item = self
            .items(InventoryCategory::Cups)
            .iter()
            .find(|i| i.name().to_lowercase().starts_with(&cup_prefix))
            .map(|i| i.id().to_string());
        match cup_item {
            Some(id) => touched.extend(
                self.deplete(InventoryCategory::Cups, &id, CUPS_PER_ORDER, now_ms, bus)
                    .ok(),
            ),
            None => debug!(order = order.id(), size = size.label(), "no cup item for size"),
        }

        touched
    }
}

impl Default for InventoryLedger {
    fn default() -> Self {
        Self::new()
    }
}
