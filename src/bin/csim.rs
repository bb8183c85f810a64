use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use csim::config::CacheConfig;
use csim::lru::LruCache;
use csim::simulation::Simulation;
use csim::trace::TraceFile;

/// LRU cache simulator for valgrind memory traces
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print the outcome of every trace record
    #[arg(short, long)]
    verbose: bool,
    /// Number of set index bits (the cache has 2^s sets)
    #[arg(short = 's', long = "set-bits", value_name = "num")]
    set_bits: u32,
    /// Number of lines per set
    #[arg(short = 'E', long = "lines", value_name = "num")]
    lines_per_set: usize,
    /// Number of block offset bits (blocks are 2^b bytes)
    #[arg(short = 'b', long = "block-bits", value_name = "num")]
    block_bits: u32,
    /// Trace file
    #[arg(short = 't', long = "trace", value_name = "file")]
    trace: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::init();
    }

    let config = CacheConfig::new(args.set_bits, args.lines_per_set, args.block_bits)
        .context("invalid cache geometry")?;
    let mut lru_cache = LruCache::new(config);
    log::info!("{}", lru_cache.format_info());

    let trace_file = TraceFile::load(&args.trace)?;
    for rejected in trace_file.format_rejected() {
        log::warn!("{rejected}");
    }
    log::info!(
        "loaded {} records from {}",
        trace_file.records().len(),
        args.trace.display()
    );

    if args.verbose {
        let simulation_result = Simulation::run_traced(&mut lru_cache, &trace_file);
        log::info!("{}", simulation_result.stats.format_rates());
        println!("{}", simulation_result.format_report());
    } else {
        let stats = Simulation::run(&mut lru_cache, &trace_file);
        println!("{}", stats.format_summary());
    }

    Ok(())
}
