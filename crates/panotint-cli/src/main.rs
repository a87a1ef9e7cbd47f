//! panotint-cli: colorize panoptic segmentation maps from the command line.
//!
//! Decodes a panoptic map image from disk, runs the colorization core,
//! and writes the color image (and optionally a legend swatch sheet) as
//! PNG. Per-stage diagnostics go to stdout, human-readable by default
//! or as JSON with `--json`. Useful for:
//!
//! - Eyeballing a dataset's panoptic ground truth or predictions
//! - Tuning the noise amplitude for instance separation
//! - Checking how often perturbation degrades on instance-dense maps
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin panotint -- <MAP_PATH> --output out.png [OPTIONS]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use panotint_core::{
    DatasetCatalog, Legend, PanopticMap, Rgba, build_legend, colorize_with_diagnostics,
};

/// Colorize a panoptic segmentation map and render its legend.
///
/// Reads a panoptic map encoded as a PNG, assigns deterministic
/// per-class colors with collision-avoiding perturbation for thing
/// instances, and writes the result as a PNG.
#[derive(Parser)]
#[command(name = "panotint", version)]
struct Cli {
    /// Path to the input panoptic map image.
    map_path: PathBuf,

    /// How packed labels are encoded in the input image.
    #[arg(long, value_enum, default_value_t = MapFormat::Cityscapes)]
    format: MapFormat,

    /// Per-channel jitter amplitude for thing instances.
    #[arg(long, default_value_t = panotint_core::DEFAULT_NOISE_AMPLITUDE)]
    noise_amplitude: u8,

    /// Full dataset catalog as a JSON string.
    ///
    /// When omitted, the 19-class Cityscapes reference catalog is used.
    #[arg(long)]
    catalog_json: Option<String>,

    /// Write the colorized image to this path (PNG).
    #[arg(short, long)]
    output: PathBuf,

    /// Also write a legend swatch sheet to this path (PNG).
    #[arg(long)]
    legend: Option<PathBuf>,

    /// Output diagnostics as JSON instead of the human-readable report.
    #[arg(long)]
    json: bool,
}

/// Input encoding of the packed panoptic labels.
#[derive(Clone, Copy, ValueEnum)]
enum MapFormat {
    /// RGB packing: `value = R + 256*G + 65536*B` (Cityscapes/COCO
    /// panoptic PNG convention).
    Cityscapes,
    /// 16-bit grayscale: the packed value read directly from the
    /// single channel.
    Gray16,
}

/// Build the catalog from CLI arguments.
///
/// If `--catalog-json` is provided the JSON is parsed (and revalidated
/// by the core's catalog invariants); otherwise the Cityscapes
/// reference catalog is used.
fn catalog_from_cli(cli: &Cli) -> Result<DatasetCatalog, String> {
    cli.catalog_json.as_ref().map_or_else(
        || Ok(DatasetCatalog::cityscapes()),
        |json| {
            serde_json::from_str(json).map_err(|e| format!("Error parsing --catalog-json: {e}"))
        },
    )
}

/// Decode the panoptic map image into a grid of packed labels.
fn load_map(path: &Path, format: MapFormat) -> Result<PanopticMap, String> {
    let img = image::open(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;

    let (width, height) = (img.width() as usize, img.height() as usize);
    let data: Vec<u32> = match format {
        MapFormat::Cityscapes => img
            .to_rgb8()
            .pixels()
            .map(|p| {
                let [r, g, b] = p.0;
                u32::from(r) + 256 * u32::from(g) + 65_536 * u32::from(b)
            })
            .collect(),
        MapFormat::Gray16 => img
            .to_luma16()
            .pixels()
            .map(|p| u32::from(p.0[0]))
            .collect(),
    };

    PanopticMap::from_shape_vec(&[height, width], data).map_err(|e| e.to_string())
}

/// Swatch cell edge in pixels for the legend sheet.
const SWATCH_SIZE: u32 = 24;
/// Gap between swatch cells in pixels.
const SWATCH_GAP: u32 = 4;

/// Render the legend as a rectangular swatch grid.
///
/// One row per class, one cell per swatch; transparent filler swatches
/// stay transparent in the sheet. Labels are not rasterized (no font
/// dependency) — they go to stdout alongside the sheet.
fn render_legend_sheet(legend: &Legend) -> image::RgbaImage {
    #[allow(clippy::cast_possible_truncation)]
    let columns = legend.max_swatches() as u32;
    #[allow(clippy::cast_possible_truncation)]
    let rows = legend.len() as u32;

    let cell = SWATCH_SIZE + SWATCH_GAP;
    let mut sheet = image::RgbaImage::new(
        columns * cell + SWATCH_GAP,
        rows * cell + SWATCH_GAP,
    );

    for (row_index, row) in legend.rows().iter().enumerate() {
        for (col_index, swatch) in row.swatches.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let x0 = SWATCH_GAP + col_index as u32 * cell;
            #[allow(clippy::cast_possible_truncation)]
            let y0 = SWATCH_GAP + row_index as u32 * cell;
            fill_cell(&mut sheet, x0, y0, *swatch);
        }
    }

    sheet
}

/// Fill one `SWATCH_SIZE` square cell with a color.
fn fill_cell(sheet: &mut image::RgbaImage, x0: u32, y0: u32, color: Rgba) {
    let pixel: image::Rgba<u8> = color.into();
    for y in y0..y0 + SWATCH_SIZE {
        for x in x0..x0 + SWATCH_SIZE {
            sheet.put_pixel(x, y, pixel);
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let catalog = match catalog_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let map = match load_map(&cli.map_path, cli.format) {
        Ok(map) => map,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Map: {} ({}x{})",
        cli.map_path.display(),
        map.width(),
        map.height(),
    );

    let (result, diagnostics) = colorize_with_diagnostics(&map, &catalog, cli.noise_amplitude);

    if cli.json {
        match serde_json::to_string_pretty(&diagnostics) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing diagnostics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", diagnostics.report());
    }

    if let Err(e) = result.image.save(&cli.output) {
        eprintln!("Error writing {}: {e}", cli.output.display());
        return ExitCode::FAILURE;
    }
    eprintln!("Color image written to {}", cli.output.display());

    let legend = build_legend(&result.registry, &catalog);
    if !cli.json {
        println!();
        for row in legend.rows() {
            println!(
                "{:>5} {:<16} {} color(s)",
                row.semantic_id,
                row.label,
                row.opaque_count(),
            );
        }
    }

    if let Some(ref legend_path) = cli.legend {
        let sheet = render_legend_sheet(&legend);
        if let Err(e) = sheet.save(legend_path) {
            eprintln!("Error writing {}: {e}", legend_path.display());
            return ExitCode::FAILURE;
        }
        eprintln!("Legend sheet written to {}", legend_path.display());
    }

    ExitCode::SUCCESS
}
