//! elevtile CLI - Command-line interface
//!
//! Downloads terrarium elevation tiles for an area and writes the resulting
//! height raster.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use elevtile::logging::init_logging;
use std::path::PathBuf;

use commands::cache::CacheAction;
use commands::common::{elevation_config, load_config};
use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::plan::PlanArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "elevtile")]
#[command(version = elevtile::VERSION)]
#[command(about = "Build terrain height rasters from terrarium elevation tiles", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.elevtile/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tile cache directory (overrides the configuration file)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download an area and write its height raster
    Fetch(FetchArgs),

    /// List the tiles an area needs without downloading them
    Plan(PlanArgs),

    /// Inspect or clear the tile cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        config: config_path,
        cache_dir,
        command,
    } = cli;

    match command {
        Commands::Config { command } => commands::config::run(command, config_path.as_deref()),
        Commands::Fetch(args) => {
            let config = load_config(config_path.as_deref())?;
            let _guard = init_logging(&config.log.directory, &config.log.file)
                .map_err(|e| CliError::LoggingInit(e.to_string()))?;
            let elevation = elevation_config(&config, cache_dir.as_ref(), args.area.zoom);
            commands::fetch::run(args, elevation)
        }
        Commands::Plan(args) => {
            let config = load_config(config_path.as_deref())?;
            let elevation = elevation_config(&config, cache_dir.as_ref(), args.area.zoom);
            commands::plan::run(args, elevation)
        }
        Commands::Cache { action } => {
            let config = load_config(config_path.as_deref())?;
            let dir = cache_dir.unwrap_or(config.cache.directory);
            commands::cache::run(action, &dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from([
            "elevtile", "fetch", "--lon", "-122.4", "--lat", "37.8", "--radius", "500", "--output",
            "out.r16", "--layer", "grass", "--layer", "rock",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.area.lon, -122.4);
                assert_eq!(args.area.radius, 500);
                assert_eq!(args.layers, vec!["grass", "rock"]);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_radius_must_be_positive() {
        assert!(Cli::try_parse_from([
            "elevtile", "plan", "--lon", "0", "--lat", "0", "--radius", "0"
        ])
        .is_err());
    }

    #[test]
    fn test_cache_dir_is_global() {
        let cli = Cli::try_parse_from(["elevtile", "cache", "stats", "--cache-dir", "/tmp/t"]).unwrap();
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/t")));
    }
}
