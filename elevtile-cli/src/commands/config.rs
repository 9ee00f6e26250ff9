//! Configuration management CLI commands.

use clap::Subcommand;
use elevtile::config::{config_file_path, ConfigFile};
use std::path::Path;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,
    /// Show the effective configuration
    Show,
    /// Write a default configuration file if none exists
    Init,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, path: Option<&Path>) -> Result<(), CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => run_show(&path),
        ConfigCommands::Init => run_init(&path),
    }
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?;
    let zoom = config
        .download
        .zoom
        .map(|z| z.to_string())
        .unwrap_or_else(|| "(highest)".to_string());

    println!("# {}", path.display());
    println!("cache.directory         = {}", config.cache.directory.display());
    println!("download.timeout_secs   = {}", config.download.timeout_secs);
    println!("download.idle_ms        = {}", config.download.idle_ms);
    println!("download.max_concurrent = {}", config.download.max_concurrent);
    println!("download.url_template   = {}", config.download.url_template);
    println!("download.zoom           = {}", zoom);
    println!("log.directory           = {}", config.log.directory.display());
    println!("log.file                = {}", config.log.file);
    Ok(())
}

fn run_init(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        println!("Configuration already exists: {}", path.display());
        return Ok(());
    }
    ConfigFile::default().save_to(path)?;
    println!("Wrote default configuration: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        run(ConfigCommands::Init, Some(&path)).unwrap();
        assert!(path.is_file());

        std::fs::write(&path, "[download]\ntimeout_secs = 42\n").unwrap();
        run(ConfigCommands::Init, Some(&path)).unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.download.timeout_secs, 42);
    }

    #[test]
    fn test_show_reports_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[download]\nzoom = 99\n").unwrap();

        assert!(matches!(
            run(ConfigCommands::Show, Some(&path)),
            Err(CliError::Config(_))
        ));
    }
}
