//! panotint-core: deterministic panoptic segmentation colorization (sans-IO).
//!
//! Assigns stable, visually distinct colors to a panoptic segmentation
//! map — a 2-D grid of integers each packing a semantic class and an
//! instance id — through:
//! decode/group -> per-instance color assignment -> pixel painting,
//! plus legend construction from the colors used.
//!
//! This crate has **no I/O dependencies** — it operates on in-memory
//! grids and returns structured data. File loading, PNG writing, and
//! display live in `panotint-cli` (or whatever front end consumes the
//! results).
//!
//! Colorization is reproducible: each call seeds its own generator with
//! a fixed constant and iterates classes and instances in ascending
//! sorted order, so identical inputs always produce byte-identical
//! images, registries, and legends.

pub mod catalog;
pub mod diagnostics;
pub mod legend;
pub mod paint;
pub mod perturb;
pub mod segment;
pub mod types;

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use catalog::{DatasetCatalog, IGNORE_LABEL};
pub use legend::{Legend, LegendRow, build_legend};
pub use perturb::{DEFAULT_MAX_TRIALS, DEFAULT_NOISE_AMPLITUDE, perturb_color};
pub use types::{ColorizeError, ColorizeResult, PanopticMap, Rgb, RgbImage, Rgba, UsedColorRegistry};

use diagnostics::{ColorizeDiagnostics, ColorizeSummary, StageDiagnostics, StageMetrics};

/// Fixed seed for the per-call perturbation generator.
///
/// Seeding per call (rather than once per process) is what makes two
/// colorizations of the same map identical.
pub const COLOR_SEED: u64 = 0;

/// Colorize a panoptic map.
///
/// Produces a color image with the same width and height as the map and
/// the registry of colors claimed per semantic class:
///
/// 1. Decode every value into `(semantic_id, instance_id)` via the
///    catalog's label divisor and group the pairs present, ascending.
/// 2. Walk the groups: thing classes get one perturbed color per
///    instance (checked against that class's used set), stuff classes
///    and sentinel ids take the catalog base color directly.
/// 3. Paint every pixel with its pair's assigned color.
///
/// Shape validation happens when the [`PanopticMap`] is constructed, so
/// this function is total: malformed grids never reach it.
#[must_use]
pub fn colorize(
    map: &PanopticMap,
    catalog: &DatasetCatalog,
    noise_amplitude: u8,
) -> ColorizeResult {
    let divisor = catalog.label_divisor();
    let segments = segment::present_segments(map, divisor);

    let mut rng = ChaCha8Rng::seed_from_u64(COLOR_SEED);
    let assignment = paint::assign_colors(&segments, catalog, noise_amplitude, &mut rng);

    let image = paint::paint(map, divisor, &assignment);
    ColorizeResult {
        image,
        registry: assignment.registry,
    }
}

/// Like [`colorize`], also collecting per-stage timing and counts.
#[must_use]
pub fn colorize_with_diagnostics(
    map: &PanopticMap,
    catalog: &DatasetCatalog,
    noise_amplitude: u8,
) -> (ColorizeResult, ColorizeDiagnostics) {
    let divisor = catalog.label_divisor();
    let total_start = Instant::now();

    let stage_start = Instant::now();
    let segments = segment::present_segments(map, divisor);
    let grouping = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Grouping {
            width: map.width(),
            height: map.height(),
            pixel_count: map.width() * map.height(),
            semantic_id_count: segments.len(),
            segment_pair_count: segments.iter().map(|s| s.instance_ids.len()).sum(),
        },
    };

    let stage_start = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(COLOR_SEED);
    let assignment = paint::assign_colors(&segments, catalog, noise_amplitude, &mut rng);
    let (thing_class_count, instance_count) = segments
        .iter()
        .filter(|s| catalog.is_thing(s.semantic_id))
        .fold((0usize, 0usize), |(classes, instances), s| {
            (classes + 1, instances + s.instance_ids.len())
        });
    let assignment_stage = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Assignment {
            noise_amplitude,
            thing_class_count,
            stuff_class_count: segments.len() - thing_class_count,
            instance_count,
            degraded_count: assignment.degraded_count,
        },
    };

    let stage_start = Instant::now();
    let image = paint::paint(map, divisor, &assignment);
    let painting = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Painting {
            pixel_count: map.width() * map.height(),
            color_count: assignment.registry.total_colors(),
        },
    };

    let diagnostics = ColorizeDiagnostics {
        summary: ColorizeSummary {
            width: map.width(),
            height: map.height(),
            semantic_id_count: segments.len(),
            instance_count,
            color_count: assignment.registry.total_colors(),
            degraded_count: assignment.degraded_count,
        },
        grouping,
        assignment: assignment_stage,
        painting,
        total_duration: total_start.elapsed(),
    };

    (
        ColorizeResult {
            image,
            registry: assignment.registry,
        },
        diagnostics,
    )
}
