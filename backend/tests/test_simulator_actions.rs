//! Tests for manual operator actions
//!
//! Every action validates first: a rejected action mutates nothing and
//! publishes nothing.

use kiosk_simulator_core_rs::simulator::ActionError;
use kiosk_simulator_core_rs::{
    EventKind, OrderChange, OrderError, OrderRequest, OrderStatus, SimEvent, Simulator,
    SimulatorConfig,
};
use std::cell::RefCell;
use std::rc::Rc;

fn sim() -> Simulator {
    Simulator::new(SimulatorConfig::default()).unwrap()
}

fn record_all(sim: &mut Simulator) -> Rc<RefCell<Vec<SimEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    for kind in EventKind::ALL {
        let sink = Rc::clone(&events);
        sim.subscribe(kind, move |event| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        });
    }
    events
}

fn walk_in(sim: &mut Simulator, name: &str, coffee: &str, milk: &str, vip: bool) -> String {
    sim.add_walk_in_order(OrderRequest {
        customer_name: name.to_string(),
        phone: None,
        coffee_type: coffee.to_string(),
        milk_type: milk.to_string(),
        sugar: "No sugar".to_string(),
        is_vip: vip,
    })
    .unwrap()
    .id()
    .to_string()
}

#[test]
fn test_walk_in_publishes_new_order() {
    let mut sim = sim();
    let events = record_all(&mut sim);

    let id = walk_in(&mut sim, "Ada", "Large Latte", "Oat milk", false);

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), EventKind::NewOrder);
    assert_eq!(events[0].order_ids(), vec![id.as_str()]);
}

#[test]
fn test_walk_in_rejects_blank_fields() {
    let mut sim = sim();
    let result = sim.add_walk_in_order(OrderRequest {
        customer_name: "  ".to_string(),
        phone: None,
        coffee_type: "Large Latte".to_string(),
        milk_type: "Oat milk".to_string(),
        sugar: "No sugar".to_string(),
        is_vip: false,
    });

    assert!(matches!(result, Err(ActionError::InvalidInput(_))));
    assert!(sim.state().orders.is_empty());
}

#[test]
fn test_start_assigns_least_loaded_capable_station() {
    let mut sim = sim();

    // Americano with soy: station 2 cannot make the drink, station 3 has no soy
    let first = walk_in(&mut sim, "A", "Large Americano", "Soy milk", false);
    let order = sim.start_order(&first).unwrap();
    assert_eq!(order.station_id(), Some("1"));

    // Latte with whole milk: every station can; 1 is loaded, 2 is first of the idle ones
    let second = walk_in(&mut sim, "B", "Regular Latte", "Whole milk", false);
    let order = sim.start_order(&second).unwrap();
    assert_eq!(order.station_id(), Some("2"));
    assert_eq!(order.status(), OrderStatus::InProgress);
}

#[test]
fn test_invalid_transition_leaves_no_trace() {
    let mut sim = sim();
    let id = walk_in(&mut sim, "Ada", "Large Latte", "Oat milk", false);
    let events = record_all(&mut sim);
    let revisions = sim.state().orders.revisions();
    let before = sim.order(&id).cloned();

    let err = sim.complete_order(&id).unwrap_err();
    assert_eq!(
        err,
        ActionError::InvalidTransition(OrderError::InvalidTransition {
            id: id.clone(),
            from: OrderStatus::Pending,
            to: OrderStatus::Completed,
        })
    );

    assert_eq!(sim.order(&id).cloned(), before);
    assert_eq!(sim.state().orders.revisions(), revisions);
    assert!(events.borrow().is_empty());
}

#[test]
fn test_unknown_order() {
    let mut sim = sim();
    assert_eq!(
        sim.start_order("ORD-9999"),
        Err(ActionError::OrderNotFound("ORD-9999".to_string()))
    );
}

#[test]
fn test_complete_then_pick_up() {
    let mut sim = sim();
    let events = record_all(&mut sim);
    let id = walk_in(&mut sim, "Ada", "Small Mocha", "Whole milk", false);

    sim.start_order(&id).unwrap();
    sim.complete_order(&id).unwrap();
    let order = sim.mark_order_picked_up(&id).unwrap();

    assert_eq!(order.status(), OrderStatus::PickedUp);
    assert!(sim.completed_orders().is_empty());

    let changes: Vec<OrderChange> = events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            SimEvent::OrderUpdated { change, .. } => Some(change.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![OrderChange::Started, OrderChange::Completed, OrderChange::PickedUp]
    );
}

#[test]
fn test_remove_from_completed() {
    let mut sim = sim();
    let id = walk_in(&mut sim, "Ada", "Small Mocha", "Whole milk", false);
    sim.start_order(&id).unwrap();
    sim.complete_order(&id).unwrap();

    let order = sim.remove_order(&id).unwrap();
    assert_eq!(order.status(), OrderStatus::Removed);
    assert!(sim.remove_order(&id).is_err());
}

#[test]
fn test_process_batch_starts_every_pending_member() {
    let mut sim = Simulator::new(SimulatorConfig {
        settings: kiosk_simulator_core_rs::SimulationSettings {
            batch_probability: 1.0,
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap();

    let key = loop {
        let order = sim.generate_order();
        if let Some(key) = order.batch_group() {
            break key.to_string();
        }
    };
    let members = sim
        .pending_orders()
        .iter()
        .filter(|o| o.batch_group() == Some(key.as_str()))
        .count();
    let events = record_all(&mut sim);

    let started = sim.process_batch_orders(&key).unwrap();

    assert_eq!(started.len(), members);
    assert!(started.iter().all(|o| o.status() == OrderStatus::InProgress));
    assert!(sim
        .pending_orders()
        .iter()
        .all(|o| o.batch_group() != Some(key.as_str())));

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    match &events[0] {
        SimEvent::OrderUpdated { change, orders, .. } => {
            assert_eq!(change, &OrderChange::BatchProcessed { batch_key: key.clone() });
            assert_eq!(orders.len(), members);
        }
        other => panic!("unexpected event {:?}", other),
    }

    // Nothing left to process
    assert_eq!(
        sim.process_batch_orders(&key),
        Err(ActionError::BatchNotFound(key))
    );
}

#[test]
fn test_adjust_wait_time_sets_promise_on_pending_only() {
    let mut sim = sim();
    let a = walk_in(&mut sim, "A", "Large Latte", "Oat milk", false);
    let b = walk_in(&mut sim, "B", "Large Latte", "Oat milk", false);
    sim.start_order(&b).unwrap();

    let adjusted = sim.adjust_wait_time(12).unwrap();

    assert_eq!(adjusted.len(), 1);
    assert_eq!(sim.order(&a).unwrap().promised_wait(), Some(12));
    assert_eq!(sim.order(&b).unwrap().promised_wait(), None);
}

#[test]
fn test_adjust_wait_time_with_empty_queue_is_silent() {
    let mut sim = sim();
    let events = record_all(&mut sim);
    assert!(sim.adjust_wait_time(5).unwrap().is_empty());
    assert!(events.borrow().is_empty());
}

#[test]
fn test_pending_order_sorting() {
    let mut sim = sim();
    let regular = walk_in(&mut sim, "A", "Large Latte", "Oat milk", false);
    sim.advance(1_000);
    let vip = walk_in(&mut sim, "B", "Large Latte", "Oat milk", true);

    let ids: Vec<&str> = sim.pending_orders().iter().map(|o| o.id()).collect();
    assert_eq!(ids, vec![vip.as_str(), regular.as_str()]);
}

#[test]
fn test_messages_board() {
    let mut sim = sim();
    let events = record_all(&mut sim);

    assert!(matches!(
        sim.add_message("Manager", "", false),
        Err(ActionError::InvalidInput(_))
    ));

    let message = sim.add_message("Manager", "Team meeting at 3", true).unwrap();
    assert_eq!(sim.unread_count(), 1);
    sim.mark_message_read(&message.id).unwrap();
    assert_eq!(sim.unread_count(), 0);
    assert!(matches!(
        sim.mark_message_read("nope"),
        Err(ActionError::MessageNotFound(_))
    ));

    assert_eq!(events.borrow().len(), 1);
    assert_eq!(events.borrow()[0].kind(), EventKind::MessageReceived);
}

#[test]
fn test_stats_counts_by_status() {
    let mut sim = sim();
    let a = walk_in(&mut sim, "A", "Large Latte", "Oat milk", false);
    walk_in(&mut sim, "B", "Large Latte", "Oat milk", false);
    sim.start_order(&a).unwrap();
    sim.advance(3 * 60_000);

    let stats = sim.stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.average_wait_minutes, 3.0);
}

#[test]
fn test_schedule_is_static() {
    let sim = sim();
    assert!(!sim.schedule().is_empty());
    assert_eq!(sim.schedule(), kiosk_simulator_core_rs::simulator::staff::schedule());
}
