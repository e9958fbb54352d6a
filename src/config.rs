//! Command-line configuration for the binaries.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Ordered-map backend the book is built on
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MapBackend {
    /// Balanced tree per side (`BTreeMap`)
    #[default]
    #[value(alias = "btree_map")]
    Btree,
    /// Hash map of levels plus an ordered price index
    #[value(alias = "std_map")]
    Hashed,
}

/// Replay an order file through the engine, printing trades to stdout.
#[derive(Parser, Debug, Clone)]
#[command(name = "replay", version)]
#[command(about = "Match a stream of buy/sell orders and print the resulting trades")]
pub struct ReplayArgs {
    /// Number of orders to generate with --generate
    #[arg(value_name = "NUM_ORDERS")]
    pub num_orders: u64,

    /// Book backend
    #[arg(value_enum, value_name = "MAP")]
    pub map: MapBackend,

    /// Verbose diagnostics on stderr (rejected orders, skipped lines)
    #[arg(long)]
    pub debug: bool,

    /// Write NUM_ORDERS random orders to the input file before replaying it
    #[arg(long)]
    pub generate: bool,

    /// Order file, one `<trader> <B|S> <qty> <price>` record per line
    #[arg(short, long, default_value = "input.txt")]
    pub input: PathBuf,

    /// Seed for --generate (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also journal every event (trades, rests, rejects) to this file
    #[arg(long, value_name = "PATH")]
    pub journal: Option<PathBuf>,

    /// Parse on a reader thread and match on a separate engine thread
    #[arg(long)]
    pub pipeline: bool,

    /// Pin the engine thread to the last CPU core (with --pipeline)
    #[arg(long)]
    pub pin_core: bool,

    /// Dump the final book to stderr
    #[arg(long)]
    pub dump_book: bool,
}

/// Measure per-order matching latency over a random stream.
#[derive(Parser, Debug, Clone)]
#[command(name = "latency-report", version)]
pub struct LatencyArgs {
    /// Orders to submit
    #[arg(short = 'n', long, default_value_t = 1_000_000)]
    pub iterations: u64,

    /// Stream seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Book backend
    #[arg(long, value_enum, default_value_t = MapBackend::Btree)]
    pub map: MapBackend,
}
