//! Configuration system for the cube field simulation.
//!
//! Settings persist to disk as a RON file, can be overridden from the command
//! line via clap, and can be hot-reloaded while the simulation runs.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, EffectsConfig, SimulationConfig, WindowConfig, default_config_dir,
};
pub use error::ConfigError;
