//! Fuzz Test - Compares the matcher against a reference implementation.
//!
//! Uses a naive but correct reference book (flat vectors, linear scans) to
//! verify the optimized engine produces identical trades and book state.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use trade_matcher::{
    BTreeBackend, Backend, Engine, Execution, HashedBackend, MatchingEngine, Order, OutputEvent,
    Side,
};

/// One resting entry in the reference book
#[derive(Clone, Copy, Debug)]
struct Resting {
    seq: u64,
    trader: u32,
    price: u32,
    qty: u32,
}

/// Simple reference implementation for verification
#[derive(Default)]
struct ReferenceBook {
    bids: Vec<Resting>,
    asks: Vec<Resting>,
    next_seq: u64,
}

impl ReferenceBook {
    /// Index of the best resting order on a side: best price, then oldest
    fn best(book: &[Resting], side: Side) -> Option<usize> {
        (0..book.len()).min_by_key(|&i| {
            let r = book[i];
            let price_rank = match side {
                Side::Buy => u64::from(u32::MAX - r.price),
                Side::Sell => u64::from(r.price),
            };
            (price_rank, r.seq)
        })
    }

    fn place(&mut self, trader: u32, side: Side, mut qty: u32, price: u32) -> Vec<Execution> {
        let mut trades = Vec::new();
        if trader == 0 || qty == 0 || price == 0 {
            return trades;
        }

        let (opposite, own) = match side {
            Side::Buy => (&mut self.asks, &mut self.bids),
            Side::Sell => (&mut self.bids, &mut self.asks),
        };

        while qty > 0 {
            let Some(i) = Self::best(opposite, side.opposite()) else {
                break;
            };
            let crosses = match side {
                Side::Buy => opposite[i].price <= price,
                Side::Sell => opposite[i].price >= price,
            };
            if !crosses {
                break;
            }

            let dealt = opposite[i].qty.min(qty);
            let (buyer_id, seller_id) = match side {
                Side::Buy => (trader, opposite[i].trader),
                Side::Sell => (opposite[i].trader, trader),
            };
            trades.push(Execution { buyer_id, seller_id, qty: dealt, price });

            opposite[i].qty -= dealt;
            qty -= dealt;
            if opposite[i].qty == 0 {
                opposite.remove(i);
            }
        }

        if qty > 0 {
            own.push(Resting { seq: self.next_seq, trader, price, qty });
            self.next_seq += 1;
        }
        trades
    }

    /// Resting orders of a side, best first, as (trader, qty, price)
    fn snapshot(&self, side: Side) -> Vec<(u32, u32, u32)> {
        let mut book = match side {
            Side::Buy => self.bids.clone(),
            Side::Sell => self.asks.clone(),
        };
        book.sort_by_key(|r| {
            let price_rank = match side {
                Side::Buy => u32::MAX - r.price,
                Side::Sell => r.price,
            };
            (price_rank, r.seq)
        });
        book.iter().map(|r| (r.trader, r.qty, r.price)).collect()
    }
}

fn engine_snapshot<B: Backend>(engine: &MatchingEngine<B>, side: Side) -> Vec<(u32, u32, u32)> {
    let orders: Vec<Order> = match side {
        Side::Buy => engine.bids().levels().flat_map(|l| l.orders().copied()).collect(),
        Side::Sell => engine.asks().levels().flat_map(|l| l.orders().copied()).collect(),
    };
    orders
        .iter()
        .map(|o| (o.trader_id(), o.quantity(), o.price()))
        .collect()
}

/// Random order, with a small share of invalid ones
fn random_order(rng: &mut ChaCha8Rng) -> Order {
    let trader = if rng.gen_bool(0.02) { 0 } else { rng.gen_range(1..50) };
    let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
    let qty = if rng.gen_bool(0.02) { 0 } else { rng.gen_range(1..200) };
    let price = rng.gen_range(90..110);
    Order::new(trader, side, qty, price)
}

fn fuzz_against_reference<B: Backend>(seed: u64, count: usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut engine = MatchingEngine::<B>::new();
    let mut reference = ReferenceBook::default();

    for step in 0..count {
        let order = random_order(&mut rng);

        let trades: Vec<Execution> = engine
            .process(order)
            .into_iter()
            .filter_map(|e| match e {
                OutputEvent::Trade(t) => Some(t),
                _ => None,
            })
            .collect();
        let expected = reference.place(order.trader_id(), order.side(), order.quantity(), order.price());

        assert_eq!(trades, expected, "trade mismatch at step {step} for {order}");
    }

    assert_eq!(engine_snapshot(&engine, Side::Buy), reference.snapshot(Side::Buy));
    assert_eq!(engine_snapshot(&engine, Side::Sell), reference.snapshot(Side::Sell));
}

#[test]
fn test_fuzz_btree_against_reference() {
    for seed in 0..5 {
        fuzz_against_reference::<BTreeBackend>(seed, 2_000);
    }
}

#[test]
fn test_fuzz_hashed_against_reference() {
    for seed in 100..105 {
        fuzz_against_reference::<HashedBackend>(seed, 2_000);
    }
}

// ============================================================================
// Quantity Conservation
// ============================================================================

/// Every accepted unit is either resting or was dealt: each trade consumes
/// its quantity from both the aggressor and a resting order.
fn check_conservation<B: Backend>(seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut engine: Engine<B> = Engine::new().unwrap();

    for _ in 0..10_000 {
        engine.process(random_order(&mut rng));

        let stats = engine.stats();
        assert_eq!(
            engine.matcher.resting_qty() + 2 * stats.traded_qty,
            stats.accepted_qty,
            "quantity leaked"
        );
    }

    if let (Some(bid), Some(ask)) = (engine.best_bid(), engine.best_ask()) {
        assert!(bid < ask);
    }
}

#[test]
fn test_quantity_conservation_btree() {
    check_conservation::<BTreeBackend>(7);
}

#[test]
fn test_quantity_conservation_hashed() {
    check_conservation::<HashedBackend>(8);
}

#[test]
fn test_trade_quantities_bounded_by_aggressor() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut engine: MatchingEngine = MatchingEngine::new();

    for _ in 0..5_000 {
        let order = random_order(&mut rng);
        let events = engine.process(order);

        let dealt: u64 = events
            .iter()
            .filter_map(|e| match e {
                OutputEvent::Trade(t) => Some(u64::from(t.qty)),
                _ => None,
            })
            .sum();
        let rested: u64 = events
            .iter()
            .filter_map(|e| match e {
                OutputEvent::Rested(r) => Some(u64::from(r.qty)),
                _ => None,
            })
            .sum();

        if order.is_valid() {
            assert_eq!(dealt + rested, u64::from(order.quantity()));
        } else {
            assert_eq!(dealt + rested, 0);
        }
    }
}
