//! Tests for random order generation and batching

use kiosk_simulator_core_rs::simulator::generator::{assign_batch, BatchAssignment, DRINKS};
use kiosk_simulator_core_rs::simulator::{OrderGenerator, SimulationSettings};
use kiosk_simulator_core_rs::models::OrderBook;
use kiosk_simulator_core_rs::{
    Order, OrderRequest, OrderStatus, RngManager, Simulator, SimulatorConfig,
};
use std::collections::HashMap;

fn config(settings: SimulationSettings) -> SimulatorConfig {
    SimulatorConfig {
        rng_seed: 77,
        settings,
        ..Default::default()
    }
}

#[test]
fn test_vip_disabled_means_no_vip() {
    let mut sim = Simulator::new(config(SimulationSettings {
        include_vip_orders: false,
        ..Default::default()
    }))
    .unwrap();

    let vip = (0..100).filter(|_| sim.generate_order().is_vip()).count();
    assert_eq!(vip, 0);
}

#[test]
fn test_vip_certain_when_probability_one() {
    let mut sim = Simulator::new(config(SimulationSettings {
        vip_probability: 1.0,
        ..Default::default()
    }))
    .unwrap();

    assert!((0..20).all(|_| sim.generate_order().is_vip()));
}

#[test]
fn test_ids_are_sequential_and_unique() {
    let mut sim = Simulator::new(SimulatorConfig::default()).unwrap();
    let ids: Vec<String> = (0..3).map(|_| sim.generate_order().id().to_string()).collect();
    assert_eq!(ids, vec!["ORD-0001", "ORD-0002", "ORD-0003"]);
}

#[test]
fn test_coffee_type_is_size_plus_drink() {
    let mut generator = OrderGenerator::new();
    let mut rng = RngManager::new(8);
    let settings = SimulationSettings::default();

    for _ in 0..30 {
        let order = generator.generate(&mut rng, &settings, 0);
        assert!(DRINKS.iter().any(|d| order.coffee_type().ends_with(d)));
        assert!(order.phone().is_some());
        assert_eq!(order.status(), OrderStatus::Pending);
    }
}

#[test]
fn test_two_matching_orders_share_batch_key() {
    let mut rng = RngManager::new(1);
    let settings = SimulationSettings {
        batch_probability: 1.0,
        ..Default::default()
    };
    let request = OrderRequest {
        customer_name: "Lin".to_string(),
        phone: None,
        coffee_type: "Regular Mocha".to_string(),
        milk_type: "Almond milk".to_string(),
        sugar: "No sugar".to_string(),
        is_vip: false,
    };

    let mut book = OrderBook::new();
    book.insert(Order::new("A".to_string(), request.clone(), 0));
    let mut second = Order::new("B".to_string(), request, 1);

    let outcome = assign_batch(&mut rng, &settings, &mut second, &mut book);
    assert!(matches!(outcome, Some(BatchAssignment::Formed { .. })));

    let key = second.batch_group().map(str::to_string);
    assert!(key.is_some());
    assert_eq!(book.get("A").unwrap().batch_group().map(str::to_string), key);
}

#[test]
fn test_batching_disabled_never_tags() {
    let mut sim = Simulator::new(config(SimulationSettings {
        include_batch_orders: false,
        ..Default::default()
    }))
    .unwrap();

    for _ in 0..200 {
        sim.generate_order();
    }
    assert!(sim.state().orders.iter().all(|o| o.batch_group().is_none()));
}

#[test]
fn test_batch_members_share_drink() {
    let mut sim = Simulator::new(config(SimulationSettings {
        batch_probability: 1.0,
        ..Default::default()
    }))
    .unwrap();

    for _ in 0..200 {
        sim.generate_order();
    }

    let mut groups: HashMap<&str, Vec<&Order>> = HashMap::new();
    for order in sim.state().orders.iter() {
        if let Some(key) = order.batch_group() {
            groups.entry(key).or_default().push(order);
        }
    }

    assert!(!groups.is_empty());
    for (key, members) in groups {
        assert!(members.len() >= 2, "batch {} has a single member", key);
        assert!(members.iter().all(|o| o.same_drink_as(members[0])));
        assert_eq!(key, members[0].batch_key());
    }
}
