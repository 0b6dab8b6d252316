//! Keypoint-descriptor scorer.

use crate::keypoint::{cross_checked_matches, DescriptorSet, GOOD_MATCH_DISTANCE};

/// Share of cross-checked matches closer than [`GOOD_MATCH_DISTANCE`], in `[0, 100]`.
///
/// Empty descriptor sets, or sets with no mutual matches, score 0.
pub fn keypoint_similarity(query: &DescriptorSet, item: &DescriptorSet) -> f32 {
    let matches = cross_checked_matches(query.descriptors(), item.descriptors());
    if matches.is_empty() {
        return 0.0;
    }
    let good = matches
        .iter()
        .filter(|m| m.distance < GOOD_MATCH_DISTANCE)
        .count();
    good as f32 / matches.len() as f32 * 100.0
}
