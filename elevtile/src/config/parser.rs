//! INI parsing logic for converting `Ini` → `ConfigFile`.

use super::file::{ConfigFile, ConfigFileError};
use crate::tiling::TiledMapScheme;
use ini::Ini;
use std::path::PathBuf;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout_secs") {
            config.download.timeout_secs = parse_positive(v).ok_or_else(|| invalid(
                "download",
                "timeout_secs",
                v,
                "must be a positive integer (seconds)",
            ))?;
        }
        if let Some(v) = section.get("idle_ms") {
            config.download.idle_ms = v
                .trim()
                .parse()
                .map_err(|_| invalid("download", "idle_ms", v, "must be an integer (milliseconds)"))?;
        }
        if let Some(v) = section.get("max_concurrent") {
            config.download.max_concurrent = parse_positive(v)
                .map(|n| n as usize)
                .ok_or_else(|| invalid("download", "max_concurrent", v, "must be a positive integer"))?;
        }
        if let Some(v) = section.get("url_template") {
            let v = v.trim();
            if !v.is_empty() {
                if !["{z}", "{x}", "{y}"].iter().all(|p| v.contains(p)) {
                    return Err(invalid(
                        "download",
                        "url_template",
                        v,
                        "must contain {z}, {x} and {y}",
                    ));
                }
                config.download.url_template = v.to_string();
            }
        }
        if let Some(v) = section.get("zoom") {
            let v = v.trim();
            if !v.is_empty() {
                let max = TiledMapScheme::terrarium().max_zoom();
                let zoom = v
                    .parse::<u8>()
                    .ok()
                    .filter(|z| *z <= max)
                    .ok_or_else(|| {
                        invalid("download", "zoom", v, &format!("must be between 0 and {}", max))
                    })?;
                config.download.zoom = Some(zoom);
            }
        }
    }

    // [log] section
    if let Some(section) = ini.section(Some("log")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.log.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.log.file = v.to_string();
            }
        }
    }

    Ok(config)
}

fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|v| *v > 0)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
