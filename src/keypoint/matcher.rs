//! Brute-force Hamming matching with cross-checking.

use crate::keypoint::Descriptor;

/// Mutually-best descriptor pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorMatch {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: u32,
}

/// Hamming distance between two descriptors.
#[inline]
pub fn hamming(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

fn nearest(probe: &Descriptor, candidates: &[Descriptor]) -> Option<(usize, u32)> {
    let mut best: Option<(usize, u32)> = None;
    for (idx, cand) in candidates.iter().enumerate() {
        let d = hamming(probe, cand);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((idx, d));
        }
    }
    best
}

/// Returns pairs where each descriptor is the other's nearest neighbour.
///
/// Ties resolve to the lowest index. Output is ordered by ascending distance,
/// then by query index.
pub fn cross_checked_matches(query: &[Descriptor], train: &[Descriptor]) -> Vec<DescriptorMatch> {
    if query.is_empty() || train.is_empty() {
        return Vec::new();
    }
    let reverse: Vec<Option<usize>> = train
        .iter()
        .map(|t| nearest(t, query).map(|(idx, _)| idx))
        .collect();

    let mut matches: Vec<DescriptorMatch> = query
        .iter()
        .enumerate()
        .filter_map(|(qi, q)| {
            let (ti, distance) = nearest(q, train)?;
            (reverse[ti] == Some(qi)).then_some(DescriptorMatch {
                query_idx: qi,
                train_idx: ti,
                distance,
            })
        })
        .collect();
    matches.sort_by_key(|m| (m.distance, m.query_idx));
    matches
}
