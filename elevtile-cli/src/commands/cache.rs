//! Cache management CLI commands.

use clap::Subcommand;
use elevtile::cache::{clear_cache, disk_cache_stats};
use std::path::Path;

use super::common::format_size;
use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Delete every cached tile
    Clear,
    /// Show disk cache statistics
    Stats,
}

/// Run a cache subcommand.
pub fn run(action: CacheAction, cache_dir: &Path) -> Result<(), CliError> {
    match action {
        CacheAction::Clear => {
            println!("Clearing tile cache at: {}", cache_dir.display());
            let result = clear_cache(cache_dir)?;
            println!(
                "Deleted {} files, freed {}",
                result.files_deleted,
                format_size(result.bytes_freed)
            );
        }
        CacheAction::Stats => {
            println!("Tile cache: {}", cache_dir.display());
            let stats = disk_cache_stats(cache_dir)?;
            println!("  Files: {}", stats.files);
            println!("  Size:  {}", format_size(stats.bytes));
        }
    }
    Ok(())
}
