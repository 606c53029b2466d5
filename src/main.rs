//! Neural CA CLI - Run simulations from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use neural_ca::{Engine, EngineConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [steps]", args[0]);
        eprintln!();
        eprintln!("Run a neural CA simulation from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to engine configuration file");
        eprintln!("  steps        Number of update steps (default: 100)");
        eprintln!();
        eprintln!("An example configuration is printed with --example.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let steps: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);

    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: EngineConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    let mut engine = Engine::new(config).unwrap_or_else(|e| {
        eprintln!("Error creating engine: {}", e);
        std::process::exit(1);
    });

    let summary = engine.network_config();
    println!("Neural CA Simulation");
    println!("====================");
    println!(
        "Grid: {0}x{0} ({1} channels)",
        summary.grid_size, summary.num_channels
    );
    println!("Activation: {}", summary.activation);
    println!("Weights: {} (range {})", summary.weight_count, summary.weight_range);
    println!("Steps: {}", steps);
    println!();

    engine.reset();
    let initial = engine.stats();
    println!("Initial state:");
    println!("  Active cells: {}", initial.active_cells);
    println!(
        "  Value range: [{:.6}, {:.6}]",
        initial.min_value, initial.max_value
    );
    println!();

    println!("Running simulation...");
    let start = Instant::now();

    for i in 0..steps {
        engine.step();

        // Print progress every 10%
        if (i + 1) % (steps / 10).max(1) == 0 {
            let stats = engine.stats();
            let elapsed = start.elapsed().as_secs_f32();
            let steps_per_sec = (i + 1) as f32 / elapsed;
            println!(
                "  Step {}/{}: active={}, mean={:.6}, {:.1} steps/s",
                i + 1,
                steps,
                stats.active_cells,
                stats.mean_value,
                steps_per_sec
            );
        }
    }

    let elapsed = start.elapsed();
    let final_stats = engine.stats();

    println!();
    println!("Final state:");
    println!("  Active cells: {}", final_stats.active_cells);
    println!(
        "  Value range: [{:.6}, {:.6}]",
        final_stats.min_value, final_stats.max_value
    );
    println!("  Mutations applied: {}", engine.mutation_history().len());
    println!();
    println!(
        "Time: {:.2}s ({:.1} steps/s)",
        elapsed.as_secs_f32(),
        steps as f32 / elapsed.as_secs_f32()
    );
}

fn print_example_config() {
    let config = EngineConfig::default();
    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
