//! Delivery semantics of the stop broadcast.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use tapgrid::{StopBroadcast, StopListener};

#[derive(Default)]
struct CountingListener {
    stops: AtomicUsize,
}

impl CountingListener {
    fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl StopListener for CountingListener {
    fn on_stop_signal(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

fn subscribe(broadcast: &StopBroadcast, listener: &Arc<CountingListener>) {
    let listener: Arc<dyn StopListener> = listener.clone();
    let weak: Weak<dyn StopListener> = Arc::downgrade(&listener);
    broadcast.subscribe(weak);
}

#[test]
fn publish_reaches_every_listener_exactly_once() {
    let broadcast = StopBroadcast::new();
    let listeners: Vec<_> = (0..3).map(|_| Arc::new(CountingListener::default())).collect();
    for listener in &listeners {
        subscribe(&broadcast, listener);
    }

    broadcast.publish();

    for listener in &listeners {
        assert_eq!(listener.stops(), 1);
    }
}

#[test]
fn subscriptions_survive_a_publish() {
    let broadcast = StopBroadcast::new();
    let listener = Arc::new(CountingListener::default());
    subscribe(&broadcast, &listener);

    broadcast.publish();
    broadcast.publish();

    assert_eq!(listener.stops(), 2);
    assert_eq!(broadcast.len(), 1);
}

#[test]
fn dead_listeners_are_skipped() {
    let broadcast = StopBroadcast::new();
    let keeper = Arc::new(CountingListener::default());
    subscribe(&broadcast, &keeper);
    {
        let dropped = Arc::new(CountingListener::default());
        subscribe(&broadcast, &dropped);
    }

    broadcast.publish();

    assert_eq!(keeper.stops(), 1);
    // The dead registration lingers until the registry is cleared.
    assert_eq!(broadcast.len(), 2);
}

#[test]
fn clear_drops_all_subscriptions() {
    let broadcast = StopBroadcast::new();
    let listener = Arc::new(CountingListener::default());
    subscribe(&broadcast, &listener);

    broadcast.clear();
    broadcast.publish();

    assert_eq!(listener.stops(), 0);
    assert!(broadcast.is_empty());
}

#[test]
fn late_subscribers_receive_the_next_publish() {
    let broadcast = StopBroadcast::new();
    let early = Arc::new(CountingListener::default());
    subscribe(&broadcast, &early);
    broadcast.publish();

    let late = Arc::new(CountingListener::default());
    subscribe(&broadcast, &late);
    broadcast.publish();

    assert_eq!(early.stops(), 2);
    assert_eq!(late.stops(), 1);
}
