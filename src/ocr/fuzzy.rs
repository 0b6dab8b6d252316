//! Longest-matching-block string similarity (Ratcliff/Obershelp).
//!
//! `ratio = 2 * M / T`, where `T` is the combined length of both strings and
//! `M` the number of characters in matching blocks found by repeatedly taking
//! the longest common substring and recursing on both sides of it.

use std::collections::HashMap;

/// Similarity ratio in `[0, 1]`; two empty strings are identical.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        positions.entry(c).or_default().push(j);
    }

    let mut matched = 0usize;
    let mut queue = vec![(0usize, a.len(), 0usize, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &positions, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common block in `a[alo..ahi]` x `b[blo..bhi]`.
///
/// Among equally long blocks the one starting earliest in `a`, then earliest
/// in `b`, wins.
fn longest_match(
    a: &[char],
    positions: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0usize);
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();
    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = positions.get(c) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let prev = if j > 0 {
                    run_ending_at.get(&(j - 1)).copied().unwrap_or(0)
                } else {
                    0
                };
                let len = prev + 1;
                next.insert(j, len);
                if len > best_len {
                    best_i = i + 1 - len;
                    best_j = j + 1 - len;
                    best_len = len;
                }
            }
        }
        run_ending_at = next;
    }
    (best_i, best_j, best_len)
}

#[cfg(test)]
mod tests {
    use super::sequence_ratio;

    #[test]
    fn identical_strings_have_unit_ratio() {
        assert_eq!(sequence_ratio("john smith", "john smith"), 1.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_strings_have_zero_ratio() {
        assert_eq!(sequence_ratio("abc", "xyz"), 0.0);
        assert_eq!(sequence_ratio("abc", ""), 0.0);
    }

    #[test]
    fn matches_reference_values() {
        // abcd vs bcde: block "bcd" -> 2*3/8.
        assert!((sequence_ratio("abcd", "bcde") - 0.75).abs() < 1e-12);
        // Blocks "a", "b" are found around the longest block; order matters.
        assert!((sequence_ratio("ab", "ba") - 0.5).abs() < 1e-12);
        // "jon smith" vs "john smith": "jo" + "n smith" = 9 of 19 chars.
        assert!((sequence_ratio("jon smith", "john smith") - 18.0 / 19.0).abs() < 1e-12);
    }
}
