//! Tests for the event bus
//!
//! Delivery is synchronous, per kind, in subscription order, with no replay.

use kiosk_simulator_core_rs::events::{EventBus, EventKind, HandlerError, SimEvent};
use kiosk_simulator_core_rs::StaffMessage;
use std::cell::RefCell;
use std::rc::Rc;

fn message_event(at: u64) -> SimEvent {
    SimEvent::MessageReceived {
        at,
        message: StaffMessage::new(format!("msg-{}", at), "Shift Lead", "Restock lids", false, at),
    }
}

#[test]
fn test_handlers_run_in_subscription_order() {
    let mut bus = EventBus::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    for name in ["first", "second", "third"] {
        let seen = Rc::clone(&seen);
        bus.subscribe(EventKind::MessageReceived, move |_| {
            seen.borrow_mut().push(name);
            Ok(())
        });
    }

    assert_eq!(bus.publish(&message_event(0)), 3);
    assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_only_matching_kind_is_delivered() {
    let mut bus = EventBus::new();
    let count = Rc::new(RefCell::new(0));
    let c = Rc::clone(&count);
    bus.subscribe(EventKind::NewOrder, move |_| {
        *c.borrow_mut() += 1;
        Ok(())
    });

    assert_eq!(bus.publish(&message_event(0)), 0);
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn test_failing_handler_does_not_block_others() {
    let mut bus = EventBus::new();
    let reached = Rc::new(RefCell::new(false));

    bus.subscribe(EventKind::MessageReceived, |_| Err(HandlerError::new("boom")));
    let r = Rc::clone(&reached);
    bus.subscribe(EventKind::MessageReceived, move |_| {
        *r.borrow_mut() = true;
        Ok(())
    });

    assert_eq!(bus.publish(&message_event(0)), 1);
    assert!(*reached.borrow());
}

#[test]
fn test_panicking_handler_does_not_block_others() {
    let mut bus = EventBus::new();
    let reached = Rc::new(RefCell::new(0));

    bus.subscribe(EventKind::MessageReceived, |_| panic!("handler blew up"));
    let r = Rc::clone(&reached);
    bus.subscribe(EventKind::MessageReceived, move |_| {
        *r.borrow_mut() += 1;
        Ok(())
    });

    assert_eq!(bus.publish(&message_event(0)), 1);
    assert_eq!(bus.publish(&message_event(1)), 1);
    assert_eq!(*reached.borrow(), 2);
}

#[test]
fn test_late_subscriber_sees_no_past_events() {
    let mut bus = EventBus::new();
    bus.publish(&message_event(0));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    bus.subscribe(EventKind::MessageReceived, move |event| {
        s.borrow_mut().push(event.at());
        Ok(())
    });
    bus.publish(&message_event(7));

    assert_eq!(*seen.borrow(), vec![7]);
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let mut bus = EventBus::new();
    let count = Rc::new(RefCell::new(0));
    let c = Rc::clone(&count);
    let id = bus.subscribe(EventKind::MessageReceived, move |_| {
        *c.borrow_mut() += 1;
        Ok(())
    });

    bus.publish(&message_event(0));
    assert!(bus.unsubscribe(id));
    assert!(!bus.unsubscribe(id));
    bus.publish(&message_event(1));

    assert_eq!(*count.borrow(), 1);
    assert_eq!(bus.subscriber_count(EventKind::MessageReceived), 0);
}

#[test]
fn test_event_json_shape() {
    let json = serde_json::to_value(message_event(42)).unwrap();
    assert_eq!(json["type"], "MESSAGE_RECEIVED");
    assert_eq!(json["at"], 42);
    assert_eq!(json["message"]["sender"], "Shift Lead");
}
