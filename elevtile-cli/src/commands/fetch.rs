//! `elevtile fetch`: download an area and write its height raster.
//!
//! This is the host loop of the pipeline: it steps the batch from the main
//! thread, sleeps while nothing settles, and turns Ctrl-C into batch
//! cancellation.

use clap::{Args, ValueEnum};
use console::style;
use elevtile::model::{DownloadBatch, ElevationConfig, ElevationModel};
use elevtile::provider::AsyncHttpClient;
use elevtile::raster::{HeightRasterEncoder, PaintLayer, RasterFormat, ZERO_OFFSET};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{build_runtime, format_size, AreaArgs};
use crate::error::CliError;

/// Output file format.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// 16-bit grayscale PNG
    Png,
    /// Raw little-endian 16-bit samples
    R16,
}

impl From<OutputFormat> for RasterFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Png => RasterFormat::Png16,
            OutputFormat::R16 => RasterFormat::R16,
        }
    }
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub area: AreaArgs,

    /// Output file for the height raster
    #[arg(long, short)]
    pub output: PathBuf,

    /// Output format (detected from the file extension if not specified)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Paint layer to write a default weight raster for (repeatable)
    #[arg(long = "layer")]
    pub layers: Vec<String>,

    /// Print a JSON summary instead of text
    #[arg(long)]
    pub json: bool,
}

impl FetchArgs {
    fn raster_format(&self) -> RasterFormat {
        if let Some(format) = self.format {
            return format.into();
        }
        self.output
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or_default()
    }
}

pub fn run(args: FetchArgs, config: ElevationConfig) -> Result<(), CliError> {
    let runtime = build_runtime()?;
    let idle = config.idle_interval;
    let model = ElevationModel::from_config(config, runtime.handle().clone())?;
    let request = args.area.request().with_layers(args.layers.iter().cloned());

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    ctrlc::set_handler(move || token.cancel())
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let mut batch = model
        .plan_batch(&request)
        .map_err(|e| CliError::Elevation(e.into()))?;

    if !args.json {
        println!(
            "Fetching {} tiles at zoom {} for {:.5}, {:.5} (radius {} m)",
            batch.total(),
            model.zoom(),
            args.area.lon,
            args.area.lat,
            request.radius_m()
        );
    }

    drive(&mut batch, &cancel, idle, !args.json);

    let stats = batch.stats();
    let elapsed = batch.elapsed();
    let tiles = batch.into_tile_set()?;

    let grid = model.reprojector().sample_grid(&tiles, &request);
    let (raster, encode_stats) = HeightRasterEncoder::new().encode(&grid);
    let format = args.raster_format();
    raster
        .write(&args.output, format)
        .map_err(|e| CliError::Elevation(e.into()))?;

    let layer_paths = write_layers(&args.output, request.layers(), raster.width(), raster.height())?;

    info!(
        output = %args.output.display(),
        format = %format,
        clamped = encode_stats.clamped(),
        "Height raster written"
    );

    let (min, max) = raster
        .value_range()
        .map(|(lo, hi)| (meters(lo), meters(hi)))
        .unwrap_or((0, 0));
    if args.json {
        let out = json!({
            "output": args.output.display().to_string(),
            "format": format.to_string(),
            "width": raster.width(),
            "height": raster.height(),
            "tiles": tiles.len(),
            "download": stats,
            "elapsed_ms": elapsed.as_millis() as u64,
            "clamped": encode_stats.clamped(),
            "min_elevation_m": min,
            "max_elevation_m": max,
            "layers": layer_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        return Ok(());
    }

    println!(
        "{} {} ({}x{}, {})",
        style("Wrote").green().bold(),
        args.output.display(),
        raster.width(),
        raster.height(),
        format
    );
    println!(
        "  Tiles: {} ({} cached, {} downloaded, {})",
        tiles.len(),
        stats.cache_hits,
        stats.network_fetches,
        format_size(stats.bytes_downloaded)
    );
    println!(
        "  Elevation: {} m to {} m",
        min, max
    );
    if encode_stats.clamped() > 0 {
        println!(
            "  {} {} samples clamped to the raster range",
            style("Warning:").yellow(),
            encode_stats.clamped()
        );
    }
    for path in &layer_paths {
        println!("  Layer weights: {}", path.display());
    }
    println!("  Time: {:.1}s", elapsed.as_secs_f64());
    Ok(())
}

fn meters(value: u16) -> i32 {
    value as i32 - ZERO_OFFSET as i32
}

/// Steps the batch until every job settled.
fn drive<C: AsyncHttpClient + 'static>(
    batch: &mut DownloadBatch<C>,
    cancel: &CancellationToken,
    idle: Duration,
    show_progress: bool,
) {
    let bar = if show_progress {
        let bar = ProgressBar::new(batch.total() as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} tiles ({elapsed})")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar
    } else {
        ProgressBar::hidden()
    };

    while !batch.is_complete() {
        let report = batch.step(cancel);
        bar.set_position(batch.settled() as u64);
        if report.is_idle() {
            bar.tick();
            std::thread::sleep(idle);
        }
    }

    bar.finish_and_clear();
}

/// Writes one raw 8-bit weight raster per paint layer next to `output`.
fn write_layers(
    output: &Path,
    names: &[String],
    width: u32,
    height: u32,
) -> Result<Vec<PathBuf>, CliError> {
    let mut paths = Vec::with_capacity(names.len());
    for layer in PaintLayer::default_weights(names, width, height) {
        let path = layer_path(output, &layer.name);
        std::fs::write(&path, &layer.weights).map_err(|error| CliError::FileWrite {
            path: path.display().to_string(),
            error,
        })?;
        paths.push(path);
    }
    Ok(paths)
}

/// `terrain.png` + `rock` → `terrain.rock.r8`
fn layer_path(output: &Path, layer: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "height".to_string());
    output.with_file_name(format!("{}.{}.r8", stem, layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(output: &str, format: Option<OutputFormat>) -> FetchArgs {
        FetchArgs {
            area: AreaArgs {
                lon: 0.0,
                lat: 0.0,
                radius: 10,
                zoom: None,
            },
            output: PathBuf::from(output),
            format,
            layers: Vec::new(),
            json: false,
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(args("out.r16", None).raster_format(), RasterFormat::R16);
        assert_eq!(args("out.png", None).raster_format(), RasterFormat::Png16);
        assert_eq!(args("out.bin", None).raster_format(), RasterFormat::Png16);
        assert_eq!(
            args("out.png", Some(OutputFormat::R16)).raster_format(),
            RasterFormat::R16
        );
    }

    #[test]
    fn test_layer_path() {
        assert_eq!(
            layer_path(Path::new("/data/terrain.png"), "rock"),
            PathBuf::from("/data/terrain.rock.r8")
        );
    }

    #[test]
    fn test_write_layers() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("terrain.png");
        let names = vec!["grass".to_string(), "rock".to_string()];

        let paths = write_layers(&output, &names, 4, 2).unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(std::fs::read(&paths[0]).unwrap(), vec![255; 8]);
        assert_eq!(std::fs::read(&paths[1]).unwrap(), vec![0; 8]);
    }
}
