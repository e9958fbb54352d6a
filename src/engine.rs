//! Engine - Timed facade and ring-buffer event loop around the matcher.
//!
//! Wraps the matching engine with latency measurement, running
//! statistics and I/O handling via an rtrb ring buffer.

use std::time::{Duration, Instant};

use hdrhistogram::Histogram;
use tracing::info;

use crate::error::Result;
use crate::execution::{EventSink, OutputEvent};
use crate::matching::MatchingEngine;
use crate::order::{Order, Price};
use crate::order_book::{BTreeBackend, Backend};

/// Highest latency the histogram tracks exactly (1 s); larger samples saturate.
const MAX_TRACKED_NS: u64 = 1_000_000_000;

/// Running totals over everything submitted to an [`Engine`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Orders submitted, valid or not
    pub submitted: u64,
    /// Orders dropped as invalid
    pub rejected: u64,
    /// Rest events (new resting entries)
    pub rested: u64,
    /// Execution records emitted
    pub trades: u64,
    /// Sum of dealt quantities
    pub traded_qty: u64,
    /// Sum of quantities of valid submitted orders
    pub accepted_qty: u64,
}

impl EngineStats {
    fn observe(&mut self, event: &OutputEvent) {
        match event {
            OutputEvent::Trade(t) => {
                self.trades += 1;
                self.traded_qty += u64::from(t.qty);
            }
            OutputEvent::Rested(_) => self.rested += 1,
            OutputEvent::Rejected(_) => self.rejected += 1,
        }
    }
}

/// Counts events on their way to the downstream sink.
struct Tap<'a, S> {
    stats: &'a mut EngineStats,
    inner: &'a mut S,
}

impl<S: EventSink> EventSink for Tap<'_, S> {
    #[inline]
    fn emit(&mut self, event: OutputEvent) {
        self.stats.observe(&event);
        self.inner.emit(event);
    }
}

/// The main engine: a matcher plus per-order timing.
pub struct Engine<B: Backend = BTreeBackend> {
    /// The underlying matching engine
    pub matcher: MatchingEngine<B>,
    latency: Histogram<u64>,
    busy: Duration,
    stats: EngineStats,
}

impl<B: Backend> Engine<B> {
    /// Create a new engine with an empty book.
    pub fn new() -> Result<Self> {
        Ok(Self {
            matcher: MatchingEngine::new(),
            latency: Histogram::new_with_bounds(1, MAX_TRACKED_NS, 3)?,
            busy: Duration::ZERO,
            stats: EngineStats::default(),
        })
    }

    /// Submit one order, timing the matcher and counting its events.
    #[inline]
    pub fn submit<S: EventSink>(&mut self, order: Order, sink: &mut S) {
        self.stats.submitted += 1;
        if order.is_valid() {
            self.stats.accepted_qty += u64::from(order.quantity());
        }

        let mut tap = Tap { stats: &mut self.stats, inner: sink };
        let start = Instant::now();
        self.matcher.submit(order, &mut tap);
        let elapsed = start.elapsed();

        self.busy += elapsed;
        self.latency.saturating_record(elapsed.as_nanos().max(1) as u64);
    }

    /// Submit one order and collect its output events.
    ///
    /// This is the main entry point for synchronous usage (testing, benchmarks).
    pub fn process(&mut self, order: Order) -> Vec<OutputEvent> {
        let mut events = Vec::new();
        self.submit(order, &mut events);
        events
    }

    /// Run the engine event loop over an SPSC ring of orders.
    ///
    /// The ring is the single serialising point: orders are matched in the
    /// order the producer pushed them. Returns once the producer has been
    /// dropped and the ring is drained.
    ///
    /// # Arguments
    /// * `input` - Consumer end of the order ring buffer
    /// * `sink` - Receiver of every output event
    /// * `pin_to_core` - Whether to pin to the last available CPU core
    pub fn run<S: EventSink>(
        &mut self,
        input: &mut rtrb::Consumer<Order>,
        sink: &mut S,
        pin_to_core: bool,
    ) {
        if pin_to_core {
            self.pin_to_core();
        }

        loop {
            while let Ok(order) = input.pop() {
                self.submit(order, sink);
            }
            if input.is_abandoned() {
                // The producer may have pushed right before leaving
                while let Ok(order) = input.pop() {
                    self.submit(order, sink);
                }
                break;
            }
            std::hint::spin_loop();
        }

        info!(
            submitted = self.stats.submitted,
            trades = self.stats.trades,
            "order ring drained"
        );
    }

    /// Pin the current thread to the last available CPU core.
    ///
    /// The last core is typically isolated from OS interrupts.
    pub fn pin_to_core(&self) {
        if let Some(core_ids) = core_affinity::get_core_ids() {
            if let Some(last_core) = core_ids.last() {
                if core_affinity::set_for_current(*last_core) {
                    info!(core = last_core.id, "engine thread pinned");
                }
            }
        }
    }

    /// Running totals
    #[inline]
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Per-order matching latency in nanoseconds
    #[inline]
    pub fn latency(&self) -> &Histogram<u64> {
        &self.latency
    }

    /// Total time spent inside the matcher
    #[inline]
    pub fn busy_time(&self) -> Duration {
        self.busy
    }

    /// Get the best bid price.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.matcher.best_bid()
    }

    /// Get the best ask price.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.matcher.best_ask()
    }

    /// Get total resting order count.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.matcher.order_count()
    }

    /// Compute state hash for determinism testing.
    #[inline]
    pub fn state_hash(&self) -> u64 {
        self.matcher.state_hash()
    }
}
