use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use trade_matcher::config::{MapBackend, ReplayArgs};
use trade_matcher::{
    feed, logging, BTreeBackend, Backend, Engine, Error, EventSink, FeedStats, HashedBackend,
    Journal, Order, OrderGenerator, TradePrinter,
};

/// Orders in flight between the reader and engine threads
const RING_CAPACITY: usize = 4096;

fn main() -> Result<()> {
    let args = ReplayArgs::parse();
    logging::init(args.debug)?;

    if args.generate {
        generate(&args)?;
    }

    match args.map {
        MapBackend::Btree => replay::<BTreeBackend>(&args),
        MapBackend::Hashed => replay::<HashedBackend>(&args),
    }
}

fn generate(args: &ReplayArgs) -> Result<()> {
    let mut generator = match args.seed {
        Some(seed) => OrderGenerator::seeded(seed),
        None => OrderGenerator::from_entropy(),
    };
    let file = File::create(&args.input)
        .with_context(|| format!("cannot create {}", args.input.display()))?;
    generator.write_orders(&mut BufWriter::new(file), args.num_orders)?;

    info!(orders = args.num_orders, path = %args.input.display(), "input generated");
    Ok(())
}

fn replay<B: Backend>(args: &ReplayArgs) -> Result<()> {
    let file = File::open(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    let reader = BufReader::new(file);

    let mut engine: Engine<B> = Engine::new()?;
    let journal = args.journal.as_ref().map(Journal::create).transpose()?;
    let mut sink = (TradePrinter::new(BufWriter::new(io::stdout().lock())), journal);

    let wall = Instant::now();
    let fed = if args.pipeline {
        pipeline(&mut engine, reader, &mut sink, args.pin_core)?
    } else {
        feed(reader, |order| engine.submit(order, &mut sink))?
    };
    let wall = wall.elapsed();

    let (printer, journal) = sink;
    printer.finish().context("cannot write trades")?;
    if let Some(journal) = journal {
        let dropped = journal.dropped();
        let written = journal.close()?;
        info!(written, dropped, "journal closed");
    }

    let stats = engine.stats();
    let hist = engine.latency();
    info!(
        lines = fed.lines,
        malformed = fed.malformed,
        submitted = stats.submitted,
        rejected = stats.rejected,
        trades = stats.trades,
        traded_qty = stats.traded_qty,
        resting = engine.order_count(),
        "replay complete"
    );
    info!(
        total_processed_ns = engine.busy_time().as_nanos() as u64,
        wall_ms = wall.as_millis() as u64,
        p50_ns = hist.value_at_quantile(0.50),
        p99_ns = hist.value_at_quantile(0.99),
        max_ns = hist.max(),
        "matching time"
    );

    if args.dump_book {
        engine.matcher.write_book(&mut io::stderr().lock())?;
    }
    Ok(())
}

/// Parse on a reader thread, match on this one. The ring preserves input
/// order, so trades come out exactly as in direct mode.
fn pipeline<B, R, S>(engine: &mut Engine<B>, reader: R, sink: &mut S, pin_core: bool) -> Result<FeedStats>
where
    B: Backend,
    R: BufRead + Send,
    S: EventSink,
{
    let (mut producer, mut consumer) = rtrb::RingBuffer::<Order>::new(RING_CAPACITY);

    thread::scope(|scope| {
        // The producer drops when the reader finishes, which ends `run`
        let reader_thread = scope.spawn(move || feed(reader, |order| push_blocking(&mut producer, order)));

        engine.run(&mut consumer, sink, pin_core);

        match reader_thread.join() {
            Ok(fed) => Ok(fed?),
            Err(_) => Err(Error::FeedThread.into()),
        }
    })
}

fn push_blocking(producer: &mut rtrb::Producer<Order>, mut order: Order) {
    loop {
        match producer.push(order) {
            Ok(()) => return,
            Err(rtrb::PushError::Full(rejected)) => {
                order = rejected;
                std::hint::spin_loop();
            }
        }
    }
}
