//! Execution reporting and output events.
//!
//! The matching engine writes every outcome to an [`EventSink`]. What the
//! sink does with it (collect, print, journal) is not the engine's concern.

use std::fmt;
use std::io::{self, Write};

use crate::order::{Order, Price, Qty, Side, TraderId};

/// One matched quantity between a buyer and a seller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Execution {
    pub buyer_id: TraderId,
    pub seller_id: TraderId,
    /// Dealt quantity
    pub qty: Qty,
    /// Trade price (always the aggressor's limit price)
    pub price: Price,
}

impl Execution {
    /// Derive the trade record for a resting/aggressor pair.
    ///
    /// Must be evaluated before the fill mutates either order.
    #[inline]
    pub fn between(resting: &Order, aggressor: &Order) -> Self {
        let (buyer, seller) = match resting.side() {
            Side::Buy => (resting, aggressor),
            Side::Sell => (aggressor, resting),
        };
        Self {
            buyer_id: buyer.trader_id(),
            seller_id: seller.trader_id(),
            qty: resting.quantity().min(aggressor.quantity()),
            price: aggressor.price(),
        }
    }
}

/// `T<buyer>+<qty>@<price> T<seller>-<qty>@<price>`
impl fmt::Display for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T{}+{}@{} T{}-{}@{}",
            self.buyer_id, self.qty, self.price, self.seller_id, self.qty, self.price
        )
    }
}

/// An order (or its unfilled remainder) was stored in the book
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderRested {
    pub trader_id: TraderId,
    pub side: Side,
    pub price: Price,
    /// Quantity placed in the book
    pub qty: Qty,
}

/// An order failed validation and was dropped without touching the book
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderRejected {
    pub trader_id: TraderId,
    pub side: Side,
    pub quantity: Qty,
    pub price: Price,
}

/// Output events from the matching engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputEvent {
    /// Trade executed
    Trade(Execution),
    /// Order (remainder) resting in the book
    Rested(OrderRested),
    /// Invalid order dropped
    Rejected(OrderRejected),
}

impl fmt::Display for OutputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputEvent::Trade(t) => fmt::Display::fmt(t, f),
            OutputEvent::Rested(r) => {
                write!(f, "REST T{} {} {}@{}", r.trader_id, r.side, r.qty, r.price)
            }
            OutputEvent::Rejected(r) => write!(
                f,
                "REJECT {} {} {} {}",
                r.trader_id, r.side, r.quantity, r.price
            ),
        }
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Receiver of structured engine events.
pub trait EventSink {
    fn emit(&mut self, event: OutputEvent);
}

impl EventSink for Vec<OutputEvent> {
    #[inline]
    fn emit(&mut self, event: OutputEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    #[inline]
    fn emit(&mut self, event: OutputEvent) {
        (**self).emit(event);
    }
}

/// Fan-out: both sinks see every event, first `A` then `B`.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    #[inline]
    fn emit(&mut self, event: OutputEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

/// An absent sink discards.
impl<S: EventSink> EventSink for Option<S> {
    #[inline]
    fn emit(&mut self, event: OutputEvent) {
        if let Some(sink) = self {
            sink.emit(event);
        }
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    #[inline]
    fn emit(&mut self, _event: OutputEvent) {}
}

/// Writes one line per trade; other events are ignored.
///
/// The first write error is kept and every later write is skipped. Call
/// [`TradePrinter::finish`] to flush and surface it.
pub struct TradePrinter<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> TradePrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, error: None }
    }

    /// Flush the writer and return the first error seen, if any.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> EventSink for TradePrinter<W> {
    fn emit(&mut self, event: OutputEvent) {
        if self.error.is_some() {
            return;
        }
        if let OutputEvent::Trade(trade) = event {
            if let Err(err) = writeln!(self.writer, "{trade}") {
                self.error = Some(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resting_buyer() {
        let resting = Order::new(1, Side::Buy, 10, 101);
        let aggressor = Order::new(2, Side::Sell, 4, 100);
        let exec = Execution::between(&resting, &aggressor);

        assert_eq!(exec.buyer_id, 1);
        assert_eq!(exec.seller_id, 2);
        assert_eq!(exec.qty, 4);
        // Aggressor's limit, not the resting price
        assert_eq!(exec.price, 100);
    }

    #[test]
    fn test_resting_seller() {
        let resting = Order::new(3, Side::Sell, 5, 90);
        let aggressor = Order::new(9, Side::Buy, 20, 95);
        let exec = Execution::between(&resting, &aggressor);

        assert_eq!(exec.buyer_id, 9);
        assert_eq!(exec.seller_id, 3);
        assert_eq!(exec.qty, 5);
        assert_eq!(exec.price, 95);
    }

    #[test]
    fn test_trade_line_format() {
        let exec = Execution { buyer_id: 1, seller_id: 2, qty: 10, price: 100 };
        assert_eq!(exec.to_string(), "T1+10@100 T2-10@100");
    }

    #[test]
    fn test_event_lines() {
        let rested = OutputEvent::Rested(OrderRested {
            trader_id: 4,
            side: Side::Sell,
            price: 100,
            qty: 3,
        });
        assert_eq!(rested.to_string(), "REST T4 S 3@100");

        let rejected = OutputEvent::Rejected(OrderRejected {
            trader_id: 0,
            side: Side::Buy,
            quantity: 5,
            price: 100,
        });
        assert_eq!(rejected.to_string(), "REJECT 0 B 5 100");
    }

    #[test]
    fn test_trade_printer_only_prints_trades() {
        let mut printer = TradePrinter::new(Vec::new());
        printer.emit(OutputEvent::Rested(OrderRested {
            trader_id: 1,
            side: Side::Buy,
            price: 100,
            qty: 10,
        }));
        printer.emit(OutputEvent::Trade(Execution {
            buyer_id: 1,
            seller_id: 2,
            qty: 10,
            price: 100,
        }));

        let out = printer.finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "T1+10@100 T2-10@100\n");
    }

    #[test]
    fn test_fan_out() {
        let mut sink = (Vec::new(), Vec::new());
        let event = OutputEvent::Trade(Execution { buyer_id: 1, seller_id: 2, qty: 1, price: 1 });
        sink.emit(event);
        assert_eq!(sink.0, vec![event]);
        assert_eq!(sink.1, vec![event]);
    }
}
