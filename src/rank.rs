//! Top-K aggregation of per-item scores.

use std::cmp::Ordering;

use serde::Serialize;

use crate::names::NameIndex;
use crate::score::ScoreMethod;

/// Number of matches reported by default.
pub const DEFAULT_TOP_K: usize = 3;

/// One pairwise comparison outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreRecord {
    /// Position of the item in corpus enumeration order.
    pub index: usize,
    pub id: String,
    /// Similarity in `[0, 100]`.
    pub similarity: f32,
    pub method: ScoreMethod,
}

fn record_cmp_desc(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| a.index.cmp(&b.index))
}

/// Sorts by descending similarity; ties keep corpus order.
pub fn sort_records_desc(records: &mut [ScoreRecord]) {
    records.sort_by(record_cmp_desc);
}

/// A ranked entry with its resolved display name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedMatch {
    pub id: String,
    pub name: String,
    pub score: f32,
    pub method: ScoreMethod,
}

/// Ranked matches, best first, at most `k` entries.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MatchReport {
    matches: Vec<RankedMatch>,
    rejected: Vec<String>,
}

impl MatchReport {
    /// Ranks records, keeps the best `k` and resolves their names.
    pub fn from_records(mut records: Vec<ScoreRecord>, k: usize, names: &NameIndex) -> Self {
        sort_records_desc(&mut records);
        records.truncate(k);
        let matches = records
            .into_iter()
            .map(|r| RankedMatch {
                name: names.resolve(&r.id).to_string(),
                id: r.id,
                score: r.similarity,
                method: r.method,
            })
            .collect();
        Self {
            matches,
            rejected: Vec::new(),
        }
    }

    /// A report holding exactly one match.
    pub fn single(entry: RankedMatch) -> Self {
        Self {
            matches: vec![entry],
            rejected: Vec::new(),
        }
    }

    /// Attaches ids of corpus items that were excluded by the quality gate.
    pub fn with_rejected(mut self, rejected: Vec<String>) -> Self {
        self.rejected = rejected;
        self
    }

    pub fn matches(&self) -> &[RankedMatch] {
        &self.matches
    }

    pub fn best(&self) -> Option<&RankedMatch> {
        self.matches.first()
    }

    /// Corpus items skipped because they failed the quality gate or could not be scored.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
