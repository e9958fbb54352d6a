use anyhow::Result;
use clap::Parser;

use trade_matcher::config::{LatencyArgs, MapBackend};
use trade_matcher::{logging, BTreeBackend, Backend, Engine, HashedBackend, NullSink, OrderGenerator};

fn main() -> Result<()> {
    let args = LatencyArgs::parse();
    logging::init(false)?;

    match args.map {
        MapBackend::Btree => report::<BTreeBackend>(&args),
        MapBackend::Hashed => report::<HashedBackend>(&args),
    }
}

fn report<B: Backend>(args: &LatencyArgs) -> Result<()> {
    println!("Preparing Latency Benchmark ({:?} book)...", args.map);

    let mut engine: Engine<B> = Engine::new()?;
    let mut orders = OrderGenerator::seeded(args.seed);

    println!("Running {} iterations...", args.iterations);

    for _ in 0..args.iterations {
        engine.submit(orders.next_order(), &mut NullSink);
    }

    let histogram = engine.latency();
    let total = engine.busy_time();
    let stats = engine.stats();

    println!("\n=== Latency Report (ns) ===");
    println!("Total Ops:  {}", stats.submitted);
    println!("Trades:     {}", stats.trades);
    println!("Resting:    {}", engine.order_count());
    println!("Throughput: {:.2} ops/sec", stats.submitted as f64 / total.as_secs_f64());
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("P99.99: {:6} ns", histogram.value_at_quantile(0.9999));
    println!("Max:    {:6} ns", histogram.max());
    println!("---------------------------");

    println!("\nDistribution:");
    for v in histogram.iter_log(100, 2.0) {
        let count = v.count_since_last_iteration();
        if count > 0 {
            println!("<= {:9} ns: {:10} count", v.value_iterated_to(), count);
        }
    }
    Ok(())
}
