//! Generator - Synthetic order streams.
//!
//! Produces valid orders over a narrow price band so that a good share of
//! them cross. Seeded streams are reproducible.

use std::io::Write;
use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::order::{Order, Price, Qty, Side, TraderId};

pub const TRADER_IDS: RangeInclusive<TraderId> = 4..=100;
pub const PRICES: RangeInclusive<Price> = 9..=99;
pub const QUANTITIES: RangeInclusive<Qty> = 16..=104;

/// Infinite iterator of random valid orders.
pub struct OrderGenerator {
    rng: ChaCha8Rng,
}

impl OrderGenerator {
    /// Reproducible stream
    pub fn seeded(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Stream seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self { rng: ChaCha8Rng::from_entropy() }
    }

    /// Generate the next order
    pub fn next_order(&mut self) -> Order {
        let trader_id = self.rng.gen_range(TRADER_IDS);
        let side = if self.rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        let quantity = self.rng.gen_range(QUANTITIES);
        let price = self.rng.gen_range(PRICES);
        Order::new(trader_id, side, quantity, price)
    }

    /// Write `count` orders in the input record format, one per line.
    pub fn write_orders<W: Write>(&mut self, writer: &mut W, count: u64) -> std::io::Result<()> {
        for _ in 0..count {
            writeln!(writer, "{}", self.next_order())?;
        }
        writer.flush()
    }
}

impl Iterator for OrderGenerator {
    type Item = Order;

    #[inline]
    fn next(&mut self) -> Option<Order> {
        Some(self.next_order())
    }
}
