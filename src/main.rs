//! Flow-Lenia substrate CLI — a minimal demonstration harness.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use flow_lenia_substrate::compute::Substrate;
use flow_lenia_substrate::rng::Mulberry32;
use flow_lenia_substrate::schema::{Preset, SubstrateConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "--example" => print_example_config(),
        "--help" | "-h" => print_usage(&args[0]),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Flow-Lenia Cellular Substrate");
    eprintln!();
    eprintln!("Usage: {} <command> [options]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <preset> [config.json] [ticks]   Run a substrate and print stats");
    eprintln!("                                        preset: empty|noise|blob|orbium|geminium");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --example                             Print an example configuration");
    eprintln!("  --help, -h                             Show this help message");
}

fn cmd_run(args: &[String]) {
    if args.is_empty() {
        eprintln!("Usage: flow-lenia-substrate-cli run <preset> [config.json] [ticks]");
        std::process::exit(1);
    }

    let preset = parse_preset(&args[0]);
    let config = args.get(1).map(|path| load_config(&PathBuf::from(path)));
    let ticks: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);

    let mut rng = Mulberry32::new(42);
    let mut substrate = Substrate::new_from_preset(preset, config, &mut rng);

    println!("Flow-Lenia Substrate");
    println!("====================");
    let (width, height) = substrate.get_dimensions();
    println!("Grid: {}x{} ({} channels)", width, height, substrate.get_config().channels.len());
    println!("Preset: {:?}", preset);
    println!("Ticks: {}", ticks);
    println!();

    let initial = substrate.get_stats().clone();
    print_stats("Initial state", &initial);
    println!();

    println!("Running...");
    let start = Instant::now();

    for i in 0..ticks {
        substrate.update();

        if (i + 1) % (ticks / 10).max(1) == 0 {
            let stats = substrate.get_stats();
            let elapsed = start.elapsed().as_secs_f32();
            let ticks_per_sec = (i + 1) as f32 / elapsed;
            println!(
                "  Tick {}/{}: mass={:?}, flow_energy={:.4}, {:.1} ticks/s",
                i + 1,
                ticks,
                stats.total_mass,
                stats.flow_energy,
                ticks_per_sec
            );
        }
    }

    let elapsed = start.elapsed();
    println!();
    print_stats("Final state", substrate.get_stats());
    println!();
    println!(
        "Time: {:.2}s ({:.1} ticks/s)",
        elapsed.as_secs_f32(),
        ticks as f32 / elapsed.as_secs_f32()
    );
}

fn parse_preset(name: &str) -> Preset {
    match name {
        "empty" => Preset::Empty,
        "noise" => Preset::Noise,
        "blob" => Preset::Blob,
        "orbium" => Preset::Orbium,
        "geminium" => Preset::Geminium,
        other => {
            eprintln!("Unknown preset: {other}");
            eprintln!("Expected one of: empty, noise, blob, orbium, geminium");
            std::process::exit(1);
        }
    }
}

fn load_config(path: &PathBuf) -> SubstrateConfig {
    let raw = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {e}");
        std::process::exit(1);
    });
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {e}");
        std::process::exit(1);
    })
}

fn print_stats(label: &str, stats: &flow_lenia_substrate::compute::Stats) {
    println!("{label}:");
    println!("  Total mass: {:?}", stats.total_mass);
    println!("  Value range (max): {:?}", stats.max_value);
    println!("  Flow energy: {:.6}", stats.flow_energy);
    println!("  Tick count: {}", stats.tick_count);
}

fn print_example_config() {
    let config = SubstrateConfig::default();
    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
