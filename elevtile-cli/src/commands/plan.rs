//! `elevtile plan`: list the tiles an area needs.

use clap::Args;
use elevtile::model::{ElevationConfig, ElevationModel};
use serde_json::json;

use super::common::{build_runtime, AreaArgs};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub area: AreaArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: PlanArgs, config: ElevationConfig) -> Result<(), CliError> {
    let runtime = build_runtime()?;
    let model = ElevationModel::from_config(config, runtime.handle().clone())?;
    let request = args.area.request();
    let range = model
        .plan_tiles(&request)
        .map_err(|e| CliError::Elevation(e.into()))?;

    let tiles: Vec<_> = range
        .iter()
        .map(|tile| {
            let cached = model.cache().path_for(tile).is_file();
            (tile, model.scheme().url_for(tile), cached)
        })
        .collect();
    let cached = tiles.iter().filter(|(_, _, cached)| *cached).count();

    if args.json {
        let out = json!({
            "zoom": range.zoom,
            "columns": [range.min_x, range.max_x],
            "rows": [range.min_y, range.max_y],
            "raster_size": request.raster_size(),
            "tiles": tiles
                .iter()
                .map(|(tile, url, cached)| json!({
                    "tile": tile,
                    "url": url,
                    "cached": cached,
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        return Ok(());
    }

    println!(
        "Area: {:.5}, {:.5} radius {} m ({}x{} raster)",
        args.area.lon,
        args.area.lat,
        request.radius_m(),
        request.raster_size(),
        request.raster_size()
    );
    println!(
        "Zoom {}: columns {}-{}, rows {}-{} ({} tiles, {} cached)",
        range.zoom,
        range.min_x,
        range.max_x,
        range.min_y,
        range.max_y,
        range.len(),
        cached
    );
    for (tile, url, is_cached) in &tiles {
        let marker = if *is_cached { "cached" } else { "      " };
        println!("  {:<14} {} {}", tile.to_string(), marker, url);
    }
    Ok(())
}
