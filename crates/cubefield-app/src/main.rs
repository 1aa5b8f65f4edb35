//! Opens a window and renders the cube field.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags:
//! `cargo run -p cubefield-app -- --cubes 2000 --seed 7`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cubefield_app::{AppState, run, simulation_settings};
use cubefield_config::{CliArgs, Config, default_config_dir};
use cubefield_render::build_cubes;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir: Option<PathBuf> = args.config.clone().or_else(|| match default_config_dir() {
        Ok(dir) => Some(dir),
        Err(e) => {
            eprintln!("{e}, running without a config file");
            None
        }
    });

    let mut config = match &config_dir {
        Some(dir) => Config::load_or_create(dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.as_ref().map(|dir| dir.join("logs"));
    cubefield_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    let seed = config.simulation.seed.unwrap_or_else(rand::random);
    info!(seed, cubes = config.simulation.cube_count, "Generating cube field");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cube_vertices = build_cubes(config.simulation.cube_count as usize, &mut rng);
    let settings = simulation_settings(&config, &mut rng);

    let mut app = AppState::new(config, config_dir, cube_vertices, settings);
    match run(&mut app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Event loop failed: {e}");
            ExitCode::FAILURE
        }
    }
}
