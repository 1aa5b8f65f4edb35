//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Cube field command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "cubefield", about = "Animated cube field with volumetric light")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Number of cubes to generate.
    #[arg(long)]
    pub cubes: Option<u32>,

    /// Seed for cube randomization.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable the god rays post-process.
    #[arg(long)]
    pub no_god_rays: bool,

    /// Disable the parallax background.
    #[arg(long)]
    pub no_background: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(cubes) = args.cubes {
            self.simulation.cube_count = cubes;
        }
        if args.seed.is_some() {
            self.simulation.seed = args.seed;
        }
        if args.no_god_rays {
            self.effects.god_rays_enabled = false;
        }
        if args.no_background {
            self.effects.background_enabled = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            cubes: Some(300),
            seed: Some(42),
            no_god_rays: true,
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.simulation.cube_count, 300);
        assert_eq!(config.simulation.seed, Some(42));
        assert!(!config.effects.god_rays_enabled);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert!(config.effects.background_enabled);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["cubefield", "--cubes", "64", "--no-background"]);
        assert_eq!(args.cubes, Some(64));
        assert!(args.no_background);
        assert!(!args.no_god_rays);
    }
}
