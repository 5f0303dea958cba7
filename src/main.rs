//! NK landscape CLI - Run local-search simulations from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::io;
use std::time::Instant;

use nk_landscape::{
    compute::{SimulationEngine, dump, simulation_landscape, write_dump_json_lines},
    schema::SimulationConfig,
};

const DUMP_LIMIT: usize = 20;

fn print_usage(program: &str) {
    eprintln!("Usage: {} <config.json> [ticks]", program);
    eprintln!("       {} dump <config.json>", program);
    eprintln!("       {} --example", program);
    eprintln!();
    eprintln!("Run agents searching an NK landscape from JSON configuration.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json  Path to simulation configuration file");
    eprintln!("  ticks        Override the configured number of ticks");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  dump         Print every point's fitness as JSON lines (N <= {DUMP_LIMIT})");
    eprintln!("  --example    Print an example configuration");
}

fn load_config(path: &str) -> SimulationConfig {
    SimulationConfig::from_json_file(path).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    })
}

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "--example" => print_example_config(),
        "dump" => {
            let Some(path) = args.get(2) else {
                print_usage(&args[0]);
                std::process::exit(1);
            };
            run_dump(&load_config(path));
        }
        path => {
            let mut config = load_config(path);
            if let Some(ticks) = args.get(2).and_then(|s| s.parse().ok()) {
                config.ticks = ticks;
            }
            run_simulation(config);
        }
    }
}

fn run_dump(config: &SimulationConfig) {
    let mut landscape = simulation_landscape(config).unwrap_or_else(|e| {
        eprintln!("Error building landscape: {}", e);
        std::process::exit(1);
    });

    let result = dump(&mut landscape, DUMP_LIMIT)
        .and_then(|rows| write_dump_json_lines(&rows, io::stdout().lock()));
    if let Err(e) = result {
        eprintln!("Error dumping landscape: {}", e);
        std::process::exit(1);
    }
}

fn run_simulation(config: SimulationConfig) {
    println!("NK Landscape Simulation");
    println!("=======================");
    println!(
        "N: {}  EvenK: {}  AftOverlap: {}  ForeOverlap: {}",
        config.landscape.n,
        config.landscape.even_k,
        config.landscape.aft_overlap,
        config.landscape.fore_overlap
    );
    println!("Strategy: {:?}", config.search.strategy);
    println!(
        "Agents: {}  Block size: {}  ProbMut: {}",
        config.agents, config.search.block_size, config.search.prob_mut
    );
    println!("Ticks: {}", config.ticks);
    println!();

    let ticks = config.ticks;
    let mut engine = SimulationEngine::new(config).unwrap_or_else(|e| {
        eprintln!("Error creating simulation: {}", e);
        std::process::exit(1);
    });

    if engine.landscape().graph().was_clamped() {
        println!("Warning: link counts exceed N, running with EvenK=0 and no overlaps");
        println!();
    }

    println!("Running simulation...");
    let start = Instant::now();
    let report_every = (ticks / 10).max(1);

    let result = engine
        .run_with_callback(|progress| {
            if progress.tick % report_every == 0 {
                let elapsed = start.elapsed().as_secs_f32();
                println!(
                    "  Tick {}/{}: mean={:.4}, best={:.4}, accepted={:.0}%, leaves={}, {:.1} ticks/s",
                    progress.tick,
                    progress.total_ticks,
                    progress.mean_fitness,
                    progress.best_fitness,
                    progress.acceptance_rate * 100.0,
                    progress.cache_leaves,
                    progress.tick as f32 / elapsed
                );
            }
        })
        .unwrap_or_else(|e| {
            eprintln!("Error during simulation: {}", e);
            std::process::exit(1);
        });

    let stats = &result.stats;
    println!();
    println!("Final state:");
    println!("  Mean fitness: {:.6}", stats.final_mean_fitness);
    println!("  Best fitness: {:.6}", stats.best_fitness);
    println!(
        "  Accepted: {}/{} ({:.1}%)",
        stats.accepted,
        stats.proposals,
        stats.accepted as f64 / stats.proposals.max(1) as f64 * 100.0
    );
    println!("  Shifts: {}", stats.shifts);
    println!("  Cached leaves: {}", stats.cache_leaves);
    println!("  Evaluations: {}", stats.evaluations);
    if let Some(best) = result
        .agents
        .iter()
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    {
        println!("  Best point: {} (agent {})", best.bits, best.id);
    }
    println!();
    println!(
        "Time: {:.2}s ({:.0} evaluations/s)",
        stats.elapsed_seconds,
        stats.evaluations as f64 / stats.elapsed_seconds.max(1e-9)
    );
}

fn print_example_config() {
    let config = SimulationConfig::default();

    println!("Example configuration (config.json):");
    println!(
        "{}",
        serde_json::to_string_pretty(&config).expect("default config serializes")
    );
}
