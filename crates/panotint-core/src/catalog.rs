//! Dataset catalogs: the labeling scheme a colorization call runs against.
//!
//! A [`DatasetCatalog`] bundles everything the colorizer needs to know
//! about one labeling scheme: how many semantic classes exist, how
//! `(semantic_id, instance_id)` pairs are packed into a single integer,
//! which classes are countable "things", the base color table, and the
//! human-readable class names. Catalogs are immutable; all invariants
//! are checked once at construction.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{ColorizeError, Rgb};

/// Label shown for semantic ids at or beyond the catalog's class count,
/// such as a void/ignore sentinel.
pub const IGNORE_LABEL: &str = "ignore";

/// Immutable description of one labeling scheme.
///
/// Fields are private so a validated catalog can never be mutated into
/// an invalid state; use [`DatasetCatalog::try_new`] or a reference
/// constructor like [`DatasetCatalog::cityscapes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogProxy", into = "CatalogProxy")]
pub struct DatasetCatalog {
    num_classes: u32,
    label_divisor: u32,
    thing_ids: BTreeSet<u32>,
    colormap: Vec<Rgb>,
    class_names: Vec<String>,
}

impl DatasetCatalog {
    /// Build a catalog, validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ColorizeError::InvalidCatalog`] when:
    /// - `label_divisor` is zero,
    /// - any thing id falls outside `[0, num_classes)`,
    /// - the colormap has fewer than `num_classes` entries,
    /// - the class-name count does not equal `num_classes`.
    pub fn try_new(
        num_classes: u32,
        label_divisor: u32,
        thing_ids: BTreeSet<u32>,
        colormap: Vec<Rgb>,
        class_names: Vec<String>,
    ) -> Result<Self, ColorizeError> {
        if label_divisor == 0 {
            return Err(ColorizeError::InvalidCatalog(
                "label_divisor must be at least 1".to_string(),
            ));
        }
        if let Some(&id) = thing_ids.iter().find(|&&id| id >= num_classes) {
            return Err(ColorizeError::InvalidCatalog(format!(
                "thing id {id} is outside [0, {num_classes})",
            )));
        }
        if (colormap.len() as u64) < u64::from(num_classes) {
            return Err(ColorizeError::InvalidCatalog(format!(
                "colormap has {} entries, need at least {num_classes}",
                colormap.len(),
            )));
        }
        if class_names.len() as u64 != u64::from(num_classes) {
            return Err(ColorizeError::InvalidCatalog(format!(
                "expected {num_classes} class names, got {}",
                class_names.len(),
            )));
        }

        Ok(Self {
            num_classes,
            label_divisor,
            thing_ids,
            colormap,
            class_names,
        })
    }

    /// Number of semantic classes in the scheme.
    #[must_use]
    pub const fn num_classes(&self) -> u32 {
        self.num_classes
    }

    /// Divisor used to pack `(semantic_id, instance_id)` into one integer.
    ///
    /// Must exceed the largest instance count any class can produce.
    #[must_use]
    pub const fn label_divisor(&self) -> u32 {
        self.label_divisor
    }

    /// Returns `true` if the semantic id is a countable "thing" class.
    #[must_use]
    pub fn is_thing(&self, semantic_id: u32) -> bool {
        self.thing_ids.contains(&semantic_id)
    }

    /// Base display color for a semantic id.
    ///
    /// Ids past the end of the color table (possible for sentinel values
    /// beyond the padded slots) fall back to black.
    #[must_use]
    pub fn base_color(&self, semantic_id: u32) -> Rgb {
        usize::try_from(semantic_id)
            .ok()
            .and_then(|index| self.colormap.get(index))
            .copied()
            .unwrap_or(Rgb::BLACK)
    }

    /// Human-readable label for a semantic id.
    ///
    /// Ids at or beyond [`num_classes`](Self::num_classes) — e.g. a
    /// void sentinel — resolve to [`IGNORE_LABEL`].
    #[must_use]
    pub fn label(&self, semantic_id: u32) -> &str {
        usize::try_from(semantic_id)
            .ok()
            .filter(|_| semantic_id < self.num_classes)
            .and_then(|index| self.class_names.get(index))
            .map_or(IGNORE_LABEL, String::as_str)
    }

    /// The reference catalog: the 19-class Cityscapes scheme.
    ///
    /// `label_divisor` 1000, thing ids 11-18 (person through bicycle),
    /// the standard Cityscapes palette padded to a 256-entry color table
    /// so sentinel ids like 255 render black.
    #[must_use]
    pub fn cityscapes() -> Self {
        let mut colormap = vec![Rgb::BLACK; 256];
        for (slot, &(_, color)) in colormap.iter_mut().zip(CITYSCAPES_CLASSES) {
            *slot = color;
        }

        Self {
            num_classes: CITYSCAPES_CLASSES.len() as u32,
            label_divisor: 1000,
            thing_ids: (11..=18).collect(),
            colormap,
            class_names: CITYSCAPES_CLASSES
                .iter()
                .map(|&(name, _)| name.to_string())
                .collect(),
        }
    }
}

/// The 19 Cityscapes classes with their standard palette colors.
/// Ids 11-18 are the thing classes.
const CITYSCAPES_CLASSES: &[(&str, Rgb)] = &[
    ("road", Rgb::new(128, 64, 128)),
    ("sidewalk", Rgb::new(244, 35, 232)),
    ("building", Rgb::new(70, 70, 70)),
    ("wall", Rgb::new(102, 102, 156)),
    ("fence", Rgb::new(190, 153, 153)),
    ("pole", Rgb::new(153, 153, 153)),
    ("traffic light", Rgb::new(250, 170, 30)),
    ("traffic sign", Rgb::new(220, 220, 0)),
    ("vegetation", Rgb::new(107, 142, 35)),
    ("terrain", Rgb::new(152, 251, 152)),
    ("sky", Rgb::new(70, 130, 180)),
    ("person", Rgb::new(220, 20, 60)),
    ("rider", Rgb::new(255, 0, 0)),
    ("car", Rgb::new(0, 0, 142)),
    ("truck", Rgb::new(0, 0, 70)),
    ("bus", Rgb::new(0, 60, 100)),
    ("train", Rgb::new(0, 80, 100)),
    ("motorcycle", Rgb::new(0, 0, 230)),
    ("bicycle", Rgb::new(119, 11, 32)),
];

/// Serde proxy routing deserialization through [`DatasetCatalog::try_new`]
/// so a catalog parsed from JSON carries the same invariants as one built
/// in code.
#[derive(Serialize, Deserialize)]
struct CatalogProxy {
    num_classes: u32,
    label_divisor: u32,
    thing_ids: BTreeSet<u32>,
    colormap: Vec<Rgb>,
    class_names: Vec<String>,
}

impl TryFrom<CatalogProxy> for DatasetCatalog {
    type Error = String;

    fn try_from(proxy: CatalogProxy) -> Result<Self, Self::Error> {
        Self::try_new(
            proxy.num_classes,
            proxy.label_divisor,
            proxy.thing_ids,
            proxy.colormap,
            proxy.class_names,
        )
        .map_err(|e| e.to_string())
    }
}

impl From<DatasetCatalog> for CatalogProxy {
    fn from(catalog: DatasetCatalog) -> Self {
        Self {
            num_classes: catalog.num_classes,
            label_divisor: catalog.label_divisor,
            thing_ids: catalog.thing_ids,
            colormap: catalog.colormap,
            class_names: catalog.class_names,
        }
    }
}
