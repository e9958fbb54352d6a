//! Matching Engine - Core order matching algorithm.
//!
//! Implements the cross/rest algorithm:
//! 1. CROSSING: Sweep the opposite side best-first while it crosses
//! 2. RESTING: Place any remaining quantity in the order's own side
//!
//! Orders are processed one at a time in submission order. Submission
//! order is the only source of time priority.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{self, Write};

use tracing::{debug, trace};

use crate::execution::{EventSink, Execution, OrderRejected, OrderRested, OutputEvent};
use crate::order::{Order, Price, Qty, Side};
use crate::order_book::{AskSide, BTreeBackend, Backend, BidSide, BookSide, PriceOrder};
use crate::price_level::PriceLevel;

/// Outcome of one fill against the head of a level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FillOutcome {
    /// Aggressor has nothing left; the sweep stops
    AggressorFilled,
    /// Aggressor still holds quantity; the sweep continues
    AggressorOpen,
}

/// The matching engine core. Owns both sides of the book.
pub struct MatchingEngine<B: Backend = BTreeBackend> {
    bids: BidSide<B>,
    asks: AskSide<B>,
}

impl<B: Backend> MatchingEngine<B> {
    /// Create a matching engine with an empty book
    pub fn new() -> Self {
        Self {
            bids: BookSide::new(),
            asks: BookSide::new(),
        }
    }

    /// Submit one order.
    ///
    /// # Algorithm
    /// 1. Drop invalid orders (no book mutation)
    /// 2. If the opposite side's best price crosses, sweep it
    /// 3. Rest whatever is left in the order's own side
    ///
    /// Every outcome is written to `sink`: one `Trade` per head-of-level
    /// match, then at most one `Rested` or `Rejected`.
    pub fn submit<S: EventSink>(&mut self, order: Order, sink: &mut S) {
        if !order.is_valid() {
            debug!(
                trader_id = order.trader_id(),
                side = %order.side(),
                quantity = order.quantity(),
                price = order.price(),
                "invalid order dropped"
            );
            sink.emit(OutputEvent::Rejected(OrderRejected {
                trader_id: order.trader_id(),
                side: order.side(),
                quantity: order.quantity(),
                price: order.price(),
            }));
            return;
        }

        match order.side() {
            Side::Sell => place(&mut self.bids, &mut self.asks, order, sink),
            Side::Buy => place(&mut self.asks, &mut self.bids, order, sink),
        }
    }

    /// Submit one order and collect its output events.
    pub fn process(&mut self, order: Order) -> Vec<OutputEvent> {
        let mut events = Vec::new();
        self.submit(order, &mut events);
        events
    }

    // ========================================================================
    // Utility Methods
    // ========================================================================

    /// Bid side of the book
    #[inline]
    pub fn bids(&self) -> &BidSide<B> {
        &self.bids
    }

    /// Ask side of the book
    #[inline]
    pub fn asks(&self) -> &AskSide<B> {
        &self.asks
    }

    /// Get the best bid price
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Get the best ask price
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Calculate spread (best_ask - best_bid)
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask > bid => Some(ask - bid),
            _ => None,
        }
    }

    /// Get depth at a price level: (total quantity, order count)
    pub fn depth_at(&self, side: Side, price: Price) -> (u64, usize) {
        match side {
            Side::Buy => self.bids.depth_at(price),
            Side::Sell => self.asks.depth_at(price),
        }
    }

    /// Get total resting order count
    pub fn order_count(&self) -> usize {
        self.bids.order_count() + self.asks.order_count()
    }

    /// Resting quantity across both sides
    pub fn resting_qty(&self) -> u64 {
        self.bids.total_qty() + self.asks.total_qty()
    }

    /// Clear all orders from the book
    pub fn clear(&mut self) {
        self.bids = BookSide::new();
        self.asks = BookSide::new();
    }

    /// Compute a hash of the full book contents (for determinism testing)
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        for level in self.bids.levels().chain(self.asks.levels()) {
            level.price().hash(&mut hasher);
            for order in level.orders() {
                order.trader_id().hash(&mut hasher);
                order.side().hash(&mut hasher);
                order.quantity().hash(&mut hasher);
            }
        }
        self.bids.level_count().hash(&mut hasher);
        self.asks.level_count().hash(&mut hasher);

        hasher.finish()
    }

    /// Write every resting order, bids then asks, best level first.
    pub fn write_book<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "# bids")?;
        for order in self.bids.levels().flat_map(PriceLevel::orders) {
            writeln!(w, "{order}")?;
        }
        writeln!(w, "# asks")?;
        for order in self.asks.levels().flat_map(PriceLevel::orders) {
            writeln!(w, "{order}")?;
        }
        Ok(())
    }
}

impl<B: Backend> Default for MatchingEngine<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> std::fmt::Debug for MatchingEngine<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchingEngine")
            .field("bids", &self.bids)
            .field("asks", &self.asks)
            .finish()
    }
}

// ============================================================================
// Crossing
// ============================================================================

/// Store or match a valid order against the `opposite` side.
fn place<O, S, B, K>(
    opposite: &mut BookSide<O, B>,
    own: &mut BookSide<S, B>,
    order: Order,
    sink: &mut K,
) where
    O: PriceOrder,
    S: PriceOrder,
    B: Backend,
    K: EventSink,
{
    if opposite.crosses(order.price()) {
        execute(opposite, own, order, sink);
    } else {
        rest_order(own, order, sink);
    }
}

/// Sweep the opposite side best level first.
///
/// Stops when the aggressor is filled, when the next level no longer
/// crosses, or when the opposite side runs out of levels. In the last two
/// cases the remainder rests on the aggressor's own side.
fn execute<O, S, B, K>(
    opposite: &mut BookSide<O, B>,
    own: &mut BookSide<S, B>,
    mut aggressor: Order,
    sink: &mut K,
) where
    O: PriceOrder,
    S: PriceOrder,
    B: Backend,
    K: EventSink,
{
    while let Some(level) = opposite.best_level_mut() {
        if !O::crosses(level.price(), aggressor.price()) {
            break;
        }

        let Some(resting) = level.front() else {
            // Levels are never kept empty; drop it and look further.
            let price = level.price();
            opposite.remove_level(price);
            continue;
        };
        let resting_qty = resting.quantity();
        let trade = Execution::between(resting, &aggressor);
        trace!(
            buyer = trade.buyer_id,
            seller = trade.seller_id,
            qty = trade.qty,
            price = trade.price,
            "execution"
        );
        sink.emit(OutputEvent::Trade(trade));

        let outcome = apply_fill(level, resting_qty, &mut aggressor);
        if level.is_empty() {
            let price = level.price();
            opposite.remove_level(price);
        }
        if outcome == FillOutcome::AggressorFilled {
            return;
        }
    }

    rest_order(own, aggressor, sink);
}

/// Apply one fill between the head of `level` and the aggressor.
///
/// - Equal quantities: head consumed, aggressor filled
/// - Aggressor smaller: head reduced in place, aggressor filled
/// - Aggressor larger: head consumed, aggressor reduced and still open
#[inline]
fn apply_fill(level: &mut PriceLevel, resting_qty: Qty, aggressor: &mut Order) -> FillOutcome {
    match aggressor.quantity().cmp(&resting_qty) {
        Ordering::Equal => {
            level.pop_front();
            FillOutcome::AggressorFilled
        }
        Ordering::Less => {
            level.reduce_front(aggressor.quantity());
            FillOutcome::AggressorFilled
        }
        Ordering::Greater => {
            level.pop_front();
            aggressor.reduce_quantity(resting_qty);
            FillOutcome::AggressorOpen
        }
    }
}

/// Rest an order in its own side (passive posting).
#[inline]
fn rest_order<S, B, K>(own: &mut BookSide<S, B>, order: Order, sink: &mut K)
where
    S: PriceOrder,
    B: Backend,
    K: EventSink,
{
    let rested = OrderRested {
        trader_id: order.trader_id(),
        side: order.side(),
        price: order.price(),
        qty: order.quantity(),
    };
    own.rest(order);
    sink.emit(OutputEvent::Rested(rested));
}
