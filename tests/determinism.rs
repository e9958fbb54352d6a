//! Determinism Test - Golden Master verification.
//!
//! Verifies that the engine produces identical results across runs and
//! across book backends when given the same input sequence.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use trade_matcher::{
    BTreeBackend, Backend, Engine, HashedBackend, Order, OrderGenerator, OutputEvent, Side,
};

/// Generate a deterministic sequence of orders around a moving mid price
fn generate_orders(seed: u64, count: usize) -> Vec<Order> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut mid: i64 = 1_000;

    (0..count)
        .map(|_| {
            mid = (mid + rng.gen_range(-2..=2)).clamp(500, 1_500);
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let price = (mid + rng.gen_range(-10..=10)) as u32;
            Order::new(rng.gen_range(1..100), side, rng.gen_range(1..500), price)
        })
        .collect()
}

/// Compute a hash of all output events
fn hash_events(events: &[OutputEvent]) -> u64 {
    let mut hasher = DefaultHasher::new();

    for event in events {
        match event {
            OutputEvent::Trade(t) => {
                "Trade".hash(&mut hasher);
                t.hash(&mut hasher);
            }
            OutputEvent::Rested(r) => {
                "Rested".hash(&mut hasher);
                (r.trader_id, r.side, r.price, r.qty).hash(&mut hasher);
            }
            OutputEvent::Rejected(r) => {
                "Rejected".hash(&mut hasher);
                (r.trader_id, r.side, r.quantity, r.price).hash(&mut hasher);
            }
        }
    }

    hasher.finish()
}

/// Run orders and return (event hash, book hash, event count)
fn run<B: Backend>(orders: &[Order]) -> (u64, u64, usize) {
    let mut engine: Engine<B> = Engine::new().unwrap();
    let mut events = Vec::new();

    for order in orders {
        engine.submit(*order, &mut events);
    }

    (hash_events(&events), engine.state_hash(), events.len())
}

#[test]
fn test_determinism_same_seed() {
    let orders = generate_orders(42, 10_000);

    let first = run::<BTreeBackend>(&orders);
    for _ in 0..3 {
        assert_eq!(run::<BTreeBackend>(&orders), first, "runs diverged");
    }
}

#[test]
fn test_determinism_across_backends() {
    for seed in [1, 2, 3, 12_345] {
        let orders = generate_orders(seed, 10_000);
        assert_eq!(
            run::<BTreeBackend>(&orders),
            run::<HashedBackend>(&orders),
            "backends diverged for seed {seed}"
        );
    }
}

#[test]
fn test_different_seeds_differ() {
    let a = run::<BTreeBackend>(&generate_orders(1, 5_000));
    let b = run::<BTreeBackend>(&generate_orders(2, 5_000));
    assert_ne!(a.0, b.0);
}

#[test]
fn test_generated_stream_is_reproducible() {
    let orders: Vec<Order> = OrderGenerator::seeded(2024).take(20_000).collect();
    let again: Vec<Order> = OrderGenerator::seeded(2024).take(20_000).collect();
    assert_eq!(orders, again);

    assert_eq!(run::<HashedBackend>(&orders), run::<BTreeBackend>(&again));
}

#[test]
fn test_pipeline_matches_direct_submission() {
    let orders = generate_orders(77, 5_000);
    let direct = run::<BTreeBackend>(&orders);

    let mut engine: Engine<HashedBackend> = Engine::new().unwrap();
    let (mut producer, mut consumer) = rtrb::RingBuffer::new(64);
    let feed = orders.clone();

    let feeder = std::thread::spawn(move || {
        for mut order in feed {
            loop {
                match producer.push(order) {
                    Ok(()) => break,
                    Err(rtrb::PushError::Full(o)) => {
                        order = o;
                        std::thread::yield_now();
                    }
                }
            }
        }
    });

    let mut events = Vec::new();
    engine.run(&mut consumer, &mut events, false);
    feeder.join().unwrap();

    assert_eq!((hash_events(&events), engine.state_hash(), events.len()), direct);
}
