//! Color assignment and pixel painting.
//!
//! Assignment walks the present segments in ascending order: thing
//! classes get one perturbed color per instance, stuff classes (and
//! out-of-range sentinel ids, which behave exactly like stuff) take the
//! catalog base color directly. Painting then writes the assigned color
//! of every pixel's `(semantic, instance)` pair into an `RgbImage`.

use std::collections::BTreeMap;

use image::RgbImage;
use rand::Rng;

use crate::catalog::DatasetCatalog;
use crate::perturb::{DEFAULT_MAX_TRIALS, perturb};
use crate::segment::{Segment, decode};
use crate::types::{PanopticMap, Rgb, UsedColorRegistry};

/// Colors assigned to every `(semantic_id, instance_id)` pair present
/// in a map, plus the per-class used-color registry built along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    colors: BTreeMap<(u32, u32), Rgb>,
    /// Colors claimed per semantic class.
    pub registry: UsedColorRegistry,
    /// Number of perturbations that exhausted their retry budget.
    pub degraded_count: usize,
}

impl Assignment {
    /// The color assigned to a `(semantic_id, instance_id)` pair.
    #[must_use]
    pub fn color(&self, semantic_id: u32, instance_id: u32) -> Option<Rgb> {
        self.colors.get(&(semantic_id, instance_id)).copied()
    }

    /// Total number of assigned `(semantic, instance)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns `true` if nothing was assigned (empty map).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Assign a color to every present segment.
///
/// `segments` must be sorted ascending (as produced by
/// [`present_segments`](crate::segment::present_segments)); the
/// perturbation draws are consumed in that order, which is what makes
/// the output reproducible for a fixed `rng` seed.
pub fn assign_colors<R: Rng>(
    segments: &[Segment],
    catalog: &DatasetCatalog,
    noise_amplitude: u8,
    rng: &mut R,
) -> Assignment {
    let mut colors = BTreeMap::new();
    let mut registry = UsedColorRegistry::new();
    let mut degraded_count = 0usize;

    for segment in segments {
        let semantic_id = segment.semantic_id;
        let base = catalog.base_color(semantic_id);
        let used = registry.entry(semantic_id);

        if catalog.is_thing(semantic_id) {
            for &instance_id in &segment.instance_ids {
                let outcome = perturb(base, noise_amplitude, used, DEFAULT_MAX_TRIALS, rng);
                degraded_count += usize::from(outcome.degraded);
                colors.insert((semantic_id, instance_id), outcome.color);
            }
        } else {
            // Stuff class (or sentinel id at/past num_classes): one
            // shared color for every pixel, recorded once.
            used.insert(base);
            for &instance_id in &segment.instance_ids {
                colors.insert((semantic_id, instance_id), base);
            }
        }
    }

    Assignment {
        colors,
        registry,
        degraded_count,
    }
}

/// Paint every pixel of `map` with its assigned color.
///
/// The output image has the same width and height as the map, three
/// 8-bit channels per pixel.
#[must_use]
pub fn paint(map: &PanopticMap, label_divisor: u32, assignment: &Assignment) -> RgbImage {
    #[allow(clippy::cast_possible_truncation)]
    let mut image = RgbImage::new(map.width() as u32, map.height() as u32);

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let Some(value) = map.get(x as usize, y as usize) else {
            continue;
        };
        let (semantic_id, instance_id) = decode(value, label_divisor);
        // Every pair present in the map was assigned above; black is
        // unreachable.
        let color = assignment
            .color(semantic_id, instance_id)
            .unwrap_or(Rgb::BLACK);
        *pixel = color.into();
    }

    image
}
