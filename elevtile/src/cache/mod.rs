//! On-disk elevation tile cache
//!
//! Raw provider responses are stored one file per tile so later requests for
//! the same area skip the network. The cache is an accelerator only: read
//! problems are reported as misses and write problems are logged.

mod disk;
mod maintenance;

pub use disk::{cache_path, ElevationTileCache};
pub use maintenance::{clear_cache, disk_cache_stats, CacheError, CacheStats, ClearResult};
