//! # Trade-Matcher
//!
//! A continuous double-auction order matching engine.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: One thread owns the order book exclusively (no locks)
//! - **Price-Time Priority**: Best price first, FIFO inside a price level
//! - **Compile-Time Backends**: The ordered map behind each book side is a type parameter
//! - **Injected Output**: The matcher writes events to an [`EventSink`], never to I/O directly
//!
//! ## Architecture
//!
//! ```text
//! [Reader Thread] --> [SPSC Ring Buffer] --> [Engine Thread (Pinned)]
//!                                                     |
//!                                              [Output Events]
//!                                               /          \
//!                                        [stdout trades]  [Journal Thread]
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod execution;
pub mod generator;
pub mod journal;
pub mod logging;
pub mod matching;
pub mod order;
pub mod order_book;
pub mod parser;
pub mod price_level;

// Re-exports for convenience
pub use engine::{Engine, EngineStats};
pub use error::{Error, ParseError, Result};
pub use execution::{EventSink, Execution, NullSink, OrderRejected, OrderRested, OutputEvent, TradePrinter};
pub use generator::OrderGenerator;
pub use journal::Journal;
pub use matching::MatchingEngine;
pub use order::{Order, Price, Qty, Side, TraderId};
pub use order_book::{AskSide, BTreeBackend, Backend, BidSide, BookSide, HashedBackend};
pub use parser::{feed, parse_order, FeedStats};
pub use price_level::PriceLevel;
