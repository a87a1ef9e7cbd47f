//! Decoding packed panoptic labels and grouping the segments present.
//!
//! A packed value `v` decodes as `semantic_id = v / label_divisor`,
//! `instance_id = v % label_divisor`. Grouping collects the distinct
//! `(semantic, instance)` pairs present in a map in explicitly sorted
//! ascending order — the color assignment pass consumes perturbation
//! draws in iteration order, so the sort is a correctness requirement,
//! not a nicety.

use crate::types::PanopticMap;

/// Split a packed value into `(semantic_id, instance_id)`.
#[must_use]
pub const fn decode(value: u32, label_divisor: u32) -> (u32, u32) {
    (value / label_divisor, value % label_divisor)
}

/// One semantic class present in a map, with its present instance ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// The semantic class id.
    pub semantic_id: u32,
    /// Distinct instance ids present for this class, ascending.
    /// Stuff classes typically hold the single instance id 0.
    pub instance_ids: Vec<u32>,
}

/// Collect the segments present in a map, ascending by semantic id with
/// instance ids ascending within each segment.
///
/// The sort and dedup are explicit rather than delegated to a container
/// type: reproducibility of the color assignment depends on this exact
/// iteration order.
#[must_use]
pub fn present_segments(map: &PanopticMap, label_divisor: u32) -> Vec<Segment> {
    let mut pairs: Vec<(u32, u32)> = map
        .values()
        .map(|value| decode(value, label_divisor))
        .collect();
    pairs.sort_unstable();
    pairs.dedup();

    let mut segments: Vec<Segment> = Vec::new();
    for (semantic_id, instance_id) in pairs {
        match segments.last_mut() {
            Some(segment) if segment.semantic_id == semantic_id => {
                segment.instance_ids.push(instance_id);
            }
            _ => segments.push(Segment {
                semantic_id,
                instance_ids: vec![instance_id],
            }),
        }
    }
    segments
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn map(shape: &[usize], data: Vec<u32>) -> PanopticMap {
        PanopticMap::from_shape_vec(shape, data).unwrap()
    }

    #[test]
    fn decode_splits_value() {
        assert_eq!(decode(11_002, 1000), (11, 2));
        assert_eq!(decode(0, 1000), (0, 0));
        assert_eq!(decode(999, 1000), (0, 999));
        assert_eq!(decode(255_000, 1000), (255, 0));
    }

    #[test]
    fn segments_are_sorted_and_deduplicated() {
        // Values deliberately out of order and with repeats.
        let map = map(&[2, 3], vec![11_001, 0, 11_000, 11_001, 7000, 0]);
        let segments = present_segments(&map, 1000);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].semantic_id, 0);
        assert_eq!(segments[0].instance_ids, vec![0]);
        assert_eq!(segments[1].semantic_id, 7);
        assert_eq!(segments[1].instance_ids, vec![0]);
        assert_eq!(segments[2].semantic_id, 11);
        assert_eq!(segments[2].instance_ids, vec![0, 1]);
    }

    #[test]
    fn empty_map_has_no_segments() {
        let map = map(&[0, 0], vec![]);
        assert!(present_segments(&map, 1000).is_empty());
    }

    #[test]
    fn divisor_one_keeps_full_value_as_semantic_id() {
        let map = map(&[1, 2], vec![3, 5]);
        let segments = present_segments(&map, 1);
        let ids: Vec<u32> = segments.iter().map(|s| s.semantic_id).collect();
        assert_eq!(ids, vec![3, 5]);
        assert!(segments.iter().all(|s| s.instance_ids == vec![0]));
    }
}
