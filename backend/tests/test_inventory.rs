//! Tests for the inventory ledger
//!
//! CRITICAL: amounts never go negative and status is always the threshold
//! function of amount / capacity.

use kiosk_simulator_core_rs::events::{AlertSeverity, EventBus, EventKind, SimEvent};
use kiosk_simulator_core_rs::inventory::{
    InventoryCategory, InventoryLedger, StockStatus, COFFEE_PER_ORDER, MILK_LARGE,
};
use kiosk_simulator_core_rs::{OrderRequest, SettingsPatch, Simulator, SimulatorConfig};
use std::cell::RefCell;
use std::rc::Rc;

fn recorder(bus: &mut EventBus, kind: EventKind) -> Rc<RefCell<Vec<SimEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    bus.subscribe(kind, move |event| {
        sink.borrow_mut().push(event.clone());
        Ok(())
    });
    events
}

fn amount(levels: &[kiosk_simulator_core_rs::StockLevel], id: &str) -> f64 {
    levels.iter().find(|l| l.id == id).unwrap().amount
}

#[test]
fn test_baseline_table() {
    let ledger = InventoryLedger::new();
    let levels = ledger.stock_levels();

    assert_eq!(levels.len(), 13);
    assert_eq!(levels[0].id, "coffee-house-blend");
    assert_eq!(amount(&levels, "milk-whole"), 10.0);
    assert_eq!(amount(&levels, "cups-large"), 80.0);
    assert_eq!(amount(&levels, "sugar-sachets"), 400.0);

    // 80 / 300 large cups already sits in the warning band
    let large = levels.iter().find(|l| l.id == "cups-large").unwrap();
    assert_eq!(large.status, StockStatus::Warning);
}

#[test]
fn test_status_change_publishes_stock_updated() {
    let mut ledger = InventoryLedger::new();
    let mut bus = EventBus::new();
    let updates = recorder(&mut bus, EventKind::StockUpdated);
    let alerts = recorder(&mut bus, EventKind::SystemAlert);

    // 5.0 → 4.0 L oat milk stays good
    ledger
        .deplete(InventoryCategory::Milk, "milk-oat", 1.0, 0, &mut bus)
        .unwrap();
    assert!(updates.borrow().is_empty());

    // 4.0 → 3.0 L is exactly 30%: warning
    ledger
        .deplete(InventoryCategory::Milk, "milk-oat", 1.0, 10, &mut bus)
        .unwrap();
    assert_eq!(updates.borrow().len(), 1);
    assert!(alerts.borrow().is_empty());

    // 3.0 → 1.0 L is 10%: danger, with a critical alert
    ledger
        .deplete(InventoryCategory::Milk, "milk-oat", 2.0, 20, &mut bus)
        .unwrap();
    assert_eq!(updates.borrow().len(), 2);
    assert_eq!(alerts.borrow().len(), 1);

    match &updates.borrow()[1] {
        SimEvent::StockUpdated {
            item,
            previous_status,
            ..
        } => {
            assert_eq!(*previous_status, StockStatus::Warning);
            assert_eq!(item.status, StockStatus::Danger);
        }
        other => panic!("unexpected event {:?}", other),
    }
    match &alerts.borrow()[0] {
        SimEvent::SystemAlert { alert, .. } => assert_eq!(alert.severity, AlertSeverity::Critical),
        other => panic!("unexpected event {:?}", other),
    };
}

#[test]
fn test_staying_in_danger_does_not_realert() {
    let mut ledger = InventoryLedger::new();
    let mut bus = EventBus::new();
    let alerts = recorder(&mut bus, EventKind::SystemAlert);

    ledger
        .deplete(InventoryCategory::Milk, "milk-soy", 1.5, 0, &mut bus)
        .unwrap();
    ledger
        .deplete(InventoryCategory::Milk, "milk-soy", 0.1, 0, &mut bus)
        .unwrap();

    assert_eq!(alerts.borrow().len(), 1);
}

#[test]
fn test_completing_order_consumes_flat_rates() {
    let mut sim = Simulator::new(SimulatorConfig::default()).unwrap();
    let updates = Rc::new(RefCell::new(0));
    let u = Rc::clone(&updates);
    sim.subscribe(EventKind::StockUpdated, move |_| {
        *u.borrow_mut() += 1;
        Ok(())
    });

    let before = sim.stock_levels();
    let order = sim
        .add_walk_in_order(OrderRequest {
            customer_name: "Ada".to_string(),
            phone: None,
            coffee_type: "Large Latte".to_string(),
            milk_type: "Oat milk".to_string(),
            sugar: "No sugar".to_string(),
            is_vip: false,
        })
        .unwrap();
    sim.start_order(order.id()).unwrap();
    sim.complete_order(order.id()).unwrap();
    let after = sim.stock_levels();

    let oat = amount(&before, "milk-oat") - amount(&after, "milk-oat");
    let coffee = amount(&before, "coffee-house-blend") - amount(&after, "coffee-house-blend");
    let cups = amount(&before, "cups-large") - amount(&after, "cups-large");

    assert!((oat - MILK_LARGE).abs() < 1e-9);
    assert!((coffee - COFFEE_PER_ORDER).abs() < 1e-9);
    assert_eq!(cups, 1.0);
    assert_eq!(amount(&before, "milk-whole"), amount(&after, "milk-whole"));

    // Nothing crossed a band
    assert_eq!(*updates.borrow(), 0);
}

#[test]
fn test_no_milk_order_skips_milk() {
    let mut sim = Simulator::new(SimulatorConfig::default()).unwrap();
    let before = sim.stock_levels();

    let order = sim
        .add_walk_in_order(OrderRequest {
            customer_name: "Bo".to_string(),
            phone: None,
            coffee_type: "Small Americano".to_string(),
            milk_type: "No milk".to_string(),
            sugar: "1 sugar".to_string(),
            is_vip: false,
        })
        .unwrap();
    sim.start_order(order.id()).unwrap();
    sim.complete_order(order.id()).unwrap();
    let after = sim.stock_levels();

    for id in ["milk-whole", "milk-skim", "milk-oat", "milk-almond", "milk-soy"] {
        assert_eq!(amount(&before, id), amount(&after, id));
    }
    assert_eq!(amount(&before, "cups-small") - amount(&after, "cups-small"), 1.0);
}

#[test]
fn test_reset_restores_seed_table() {
    let mut sim = Simulator::new(SimulatorConfig::default()).unwrap();
    let baseline = sim.stock_levels();

    sim.start(SettingsPatch::default());
    sim.advance(4 * 60 * 60_000);
    sim.reset();

    assert_eq!(sim.stock_levels(), baseline);
    assert!(sim.state().orders.is_empty());
    assert!(sim.messages().is_empty());
}
