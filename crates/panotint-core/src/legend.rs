//! Legend construction: turning the used-color registry into an
//! ordered swatch table.
//!
//! One row per semantic id present in the registry, ascending. Every
//! row is padded to the width of the widest row so the result renders
//! as a rectangular swatch grid; padding slots are fully transparent.

use serde::{Deserialize, Serialize};

use crate::catalog::DatasetCatalog;
use crate::types::{Rgba, UsedColorRegistry};

/// One legend row: a class label and its swatches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendRow {
    /// The semantic id this row describes.
    pub semantic_id: u32,
    /// Class name, or `"ignore"` for ids at/past the class count.
    pub label: String,
    /// Exactly `max_swatches` entries: the class's used colors (opaque,
    /// ascending) followed by transparent filler.
    pub swatches: Vec<Rgba>,
}

impl LegendRow {
    /// Number of opaque (actually used) swatches in this row.
    #[must_use]
    pub fn opaque_count(&self) -> usize {
        self.swatches.iter().filter(|s| s.is_opaque()).count()
    }
}

/// An ordered swatch table describing the colors used per class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    rows: Vec<LegendRow>,
}

impl Legend {
    /// Rows in ascending semantic-id order.
    #[must_use]
    pub fn rows(&self) -> &[LegendRow] {
        &self.rows
    }

    /// Number of rows (classes present).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the legend has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width of every row in swatches (0 for an empty legend).
    #[must_use]
    pub fn max_swatches(&self) -> usize {
        self.rows.first().map_or(0, |row| row.swatches.len())
    }
}

/// Build the legend for a used-color registry.
///
/// Row order follows the registry's ascending semantic-id iteration;
/// colors within a row follow the per-class set's ascending order, so
/// two identical registries always produce identical legends.
#[must_use]
pub fn build_legend(registry: &UsedColorRegistry, catalog: &DatasetCatalog) -> Legend {
    let max_swatches = registry.max_colors();

    let rows = registry
        .iter()
        .map(|(semantic_id, colors)| {
            let mut swatches: Vec<Rgba> = colors.iter().map(|color| color.opaque()).collect();
            swatches.resize(max_swatches, Rgba::TRANSPARENT);
            LegendRow {
                semantic_id,
                label: catalog.label(semantic_id).to_string(),
                swatches,
            }
        })
        .collect();

    Legend { rows }
}
