//! INI serialization logic for converting `ConfigFile` → INI string.

use super::file::ConfigFile;
use std::path::Path;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let zoom = config
        .download
        .zoom
        .map(|z| z.to_string())
        .unwrap_or_default();

    format!(
        r#"[cache]
; Directory holding downloaded elevation tiles
directory = {}

[download]
; Seconds before a single tile request is abandoned
timeout_secs = {}
; Milliseconds to wait between polls when no tile finished
idle_ms = {}
; Tile requests open at the same time
max_concurrent = {}
; Tile URL with {{z}}, {{x}} and {{y}} placeholders
url_template = {}
; Zoom level to fetch (0-15); leave empty for the most detailed level
zoom = {}

[log]
directory = {}
file = {}
"#,
        path_to_string(&config.cache.directory),
        config.download.timeout_secs,
        config.download.idle_ms,
        config.download.max_concurrent,
        config.download.url_template,
        zoom,
        path_to_string(&config.log.directory),
        config.log.file,
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
