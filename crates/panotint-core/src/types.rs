//! Shared types for the panotint colorization core.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Re-export `RgbImage` so downstream crates can reference the rendered
/// output buffer without depending on `image` directly.
pub use image::RgbImage;

/// An 8-bit RGB color.
///
/// Implements `Ord` so colors can live in `BTreeSet`s, giving the
/// used-color registry deterministic iteration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Black; also the fallback for semantic ids past the end of a colormap.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The channels as an array, in RGB order.
    #[must_use]
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// This color as a fully opaque [`Rgba`] swatch.
    #[must_use]
    pub const fn opaque(self) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: 255,
        }
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(color: Rgb) -> Self {
        Self(color.channels())
    }
}

/// An 8-bit RGBA color, used for legend swatches where unused slots
/// must be fully transparent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (0 = transparent, 255 = opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black, the filler for unused legend slots.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Returns `true` if the swatch is fully opaque.
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }
}

impl From<Rgba> for image::Rgba<u8> {
    fn from(color: Rgba) -> Self {
        Self([color.r, color.g, color.b, color.a])
    }
}

/// A 2-D grid of packed panoptic labels.
///
/// Each value encodes `semantic_id * label_divisor + instance_id`.
/// Construction validates the shape, so every live `PanopticMap` is
/// guaranteed 2-dimensional with `width * height` elements; the
/// colorization pass itself is total over well-formed maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanopticMap {
    width: usize,
    height: usize,
    data: Vec<u32>,
}

impl PanopticMap {
    /// Build a map from a `(rows, columns)` shape and row-major data.
    ///
    /// This is the shape-validation boundary: it runs before any pixel
    /// work and fails fast on malformed input.
    ///
    /// # Errors
    ///
    /// Returns [`ColorizeError::InvalidShape`] (naming the offending
    /// shape) unless `shape` has exactly two dimensions, and
    /// [`ColorizeError::DataLength`] when `data` does not hold exactly
    /// `rows * columns` elements.
    pub fn from_shape_vec(shape: &[usize], data: Vec<u32>) -> Result<Self, ColorizeError> {
        let &[height, width] = shape else {
            return Err(ColorizeError::InvalidShape {
                shape: shape.to_vec(),
            });
        };

        let expected = height
            .checked_mul(width)
            .ok_or(ColorizeError::InvalidShape {
                shape: shape.to_vec(),
            })?;
        if data.len() != expected {
            return Err(ColorizeError::DataLength {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Map width in pixels (columns).
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Map height in pixels (rows).
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// The shape as `(rows, columns)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Returns `true` if the map has no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The packed value at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            self.data.get(y * self.width + x).copied()
        } else {
            None
        }
    }

    /// Iterate over all packed values in row-major order.
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.data.iter().copied()
    }
}

/// Colors already claimed per semantic class during one colorization call.
///
/// Maps each semantic id to the set of RGB triples painted for that
/// class. Both the semantic ids and the per-class color sets iterate in
/// ascending order, which downstream consumers (the legend builder, the
/// determinism guarantee) rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedColorRegistry(BTreeMap<u32, BTreeSet<Rgb>>);

impl UsedColorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// The used-color set for a semantic id, creating an empty set on
    /// first access.
    pub fn entry(&mut self, semantic_id: u32) -> &mut BTreeSet<Rgb> {
        self.0.entry(semantic_id).or_default()
    }

    /// The used-color set for a semantic id, if any colors were recorded.
    #[must_use]
    pub fn colors(&self, semantic_id: u32) -> Option<&BTreeSet<Rgb>> {
        self.0.get(&semantic_id)
    }

    /// Iterate over `(semantic_id, colors)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &BTreeSet<Rgb>)> {
        self.0.iter().map(|(&id, colors)| (id, colors))
    }

    /// Number of semantic ids with at least one recorded color.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no colors have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The largest number of colors recorded for any single semantic id.
    #[must_use]
    pub fn max_colors(&self) -> usize {
        self.0.values().map(BTreeSet::len).max().unwrap_or(0)
    }

    /// Total colors recorded across all semantic ids.
    #[must_use]
    pub fn total_colors(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }
}

/// Result of colorizing a panoptic map.
#[derive(Debug, Clone)]
pub struct ColorizeResult {
    /// The rendered color image, same width/height as the input map.
    pub image: RgbImage,
    /// Colors claimed per semantic class during the pass.
    pub registry: UsedColorRegistry,
}

/// Errors that can occur while preparing or colorizing a panoptic map.
#[derive(Debug, thiserror::Error)]
pub enum ColorizeError {
    /// The input grid is not 2-dimensional.
    #[error("panoptic map must be 2-dimensional, got shape {shape:?}")]
    InvalidShape {
        /// The offending shape, one entry per dimension.
        shape: Vec<usize>,
    },

    /// The flat data length does not match the declared shape.
    #[error("panoptic map data holds {actual} elements, shape requires {expected}")]
    DataLength {
        /// Elements required by the shape.
        expected: usize,
        /// Elements actually supplied.
        actual: usize,
    },

    /// A dataset catalog violated one of its construction invariants.
    #[error("invalid dataset catalog: {0}")]
    InvalidCatalog(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Rgb tests ---

    #[test]
    fn rgb_channels_in_order() {
        assert_eq!(Rgb::new(1, 2, 3).channels(), [1, 2, 3]);
    }

    #[test]
    fn rgb_opaque_sets_full_alpha() {
        let swatch = Rgb::new(10, 20, 30).opaque();
        assert_eq!(swatch.a, 255);
        assert!(swatch.is_opaque());
        assert_eq!((swatch.r, swatch.g, swatch.b), (10, 20, 30));
    }

    #[test]
    fn rgb_ordering_is_lexicographic() {
        assert!(Rgb::new(0, 0, 1) < Rgb::new(0, 1, 0));
        assert!(Rgb::new(0, 255, 255) < Rgb::new(1, 0, 0));
    }

    #[test]
    fn rgb_converts_to_image_pixel() {
        let pixel: image::Rgb<u8> = Rgb::new(5, 6, 7).into();
        assert_eq!(pixel.0, [5, 6, 7]);
    }

    #[test]
    fn rgba_transparent_has_zero_alpha() {
        assert_eq!(Rgba::TRANSPARENT.a, 0);
        assert!(!Rgba::TRANSPARENT.is_opaque());
    }

    // --- PanopticMap tests ---

    #[test]
    fn map_from_shape_vec_accepts_2d() {
        let map = PanopticMap::from_shape_vec(&[2, 3], vec![0; 6]).unwrap();
        assert_eq!(map.shape(), (2, 3));
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 2);
    }

    #[test]
    fn map_rejects_1d_shape() {
        let result = PanopticMap::from_shape_vec(&[6], vec![0; 6]);
        assert!(
            matches!(result, Err(ColorizeError::InvalidShape { ref shape }) if shape == &[6]),
        );
    }

    #[test]
    fn map_rejects_3d_shape() {
        let result = PanopticMap::from_shape_vec(&[1, 2, 3], vec![0; 6]);
        assert!(
            matches!(result, Err(ColorizeError::InvalidShape { ref shape }) if shape == &[1, 2, 3]),
        );
    }

    #[test]
    fn map_rejects_wrong_data_length() {
        let result = PanopticMap::from_shape_vec(&[2, 2], vec![0; 5]);
        assert!(matches!(
            result,
            Err(ColorizeError::DataLength {
                expected: 4,
                actual: 5,
            }),
        ));
    }

    #[test]
    fn map_indexing_is_row_major() {
        let map = PanopticMap::from_shape_vec(&[2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(map.get(0, 0), Some(0));
        assert_eq!(map.get(2, 0), Some(2));
        assert_eq!(map.get(0, 1), Some(3));
        assert_eq!(map.get(2, 1), Some(5));
        assert_eq!(map.get(3, 0), None);
        assert_eq!(map.get(0, 2), None);
    }

    #[test]
    fn empty_map_is_valid() {
        let map = PanopticMap::from_shape_vec(&[0, 0], vec![]).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.values().count(), 0);
    }

    // --- UsedColorRegistry tests ---

    #[test]
    fn registry_entry_initializes_empty_set() {
        let mut registry = UsedColorRegistry::new();
        assert!(registry.colors(7).is_none());
        assert!(registry.entry(7).is_empty());
        assert_eq!(registry.colors(7).map(BTreeSet::len), Some(0));
    }

    #[test]
    fn registry_iterates_in_ascending_id_order() {
        let mut registry = UsedColorRegistry::new();
        registry.entry(11).insert(Rgb::new(1, 1, 1));
        registry.entry(0).insert(Rgb::new(2, 2, 2));
        registry.entry(3).insert(Rgb::new(3, 3, 3));

        let ids: Vec<u32> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 3, 11]);
    }

    #[test]
    fn registry_max_colors_tracks_widest_class() {
        let mut registry = UsedColorRegistry::new();
        registry.entry(0).insert(Rgb::new(1, 0, 0));
        registry.entry(5).insert(Rgb::new(0, 1, 0));
        registry.entry(5).insert(Rgb::new(0, 2, 0));
        registry.entry(5).insert(Rgb::new(0, 3, 0));

        assert_eq!(registry.max_colors(), 3);
        assert_eq!(registry.total_colors(), 4);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn registry_deduplicates_within_class() {
        let mut registry = UsedColorRegistry::new();
        registry.entry(2).insert(Rgb::new(9, 9, 9));
        registry.entry(2).insert(Rgb::new(9, 9, 9));
        assert_eq!(registry.colors(2).map(BTreeSet::len), Some(1));
    }

    // --- Error display tests ---

    #[test]
    fn invalid_shape_display_names_shape() {
        let err = ColorizeError::InvalidShape {
            shape: vec![4, 2, 3],
        };
        assert_eq!(
            err.to_string(),
            "panoptic map must be 2-dimensional, got shape [4, 2, 3]",
        );
    }

    #[test]
    fn data_length_display_names_counts() {
        let err = ColorizeError::DataLength {
            expected: 4,
            actual: 7,
        };
        assert_eq!(
            err.to_string(),
            "panoptic map data holds 7 elements, shape requires 4",
        );
    }

    // --- Serde round-trip tests ---

    #[test]
    fn rgb_serde_round_trip() {
        let color = Rgb::new(128, 64, 128);
        let json = serde_json::to_string(&color).unwrap();
        let deserialized: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(color, deserialized);
    }

    #[test]
    fn registry_serde_round_trip() {
        let mut registry = UsedColorRegistry::new();
        registry.entry(0).insert(Rgb::new(128, 64, 128));
        registry.entry(11).insert(Rgb::new(220, 20, 60));
        registry.entry(11).insert(Rgb::new(221, 21, 61));

        let json = serde_json::to_string(&registry).unwrap();
        let deserialized: UsedColorRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(registry, deserialized);
    }

    #[test]
    fn map_serde_round_trip() {
        let map = PanopticMap::from_shape_vec(&[2, 2], vec![0, 0, 11_000, 11_001]).unwrap();
        let json = serde_json::to_string(&map).unwrap();
        let deserialized: PanopticMap = serde_json::from_str(&json).unwrap();
        assert_eq!(map, deserialized);
    }
}
