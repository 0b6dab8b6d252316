//! Matching orchestrator.
//!
//! A query moves through these states:
//!
//! ```text
//! TryOcr -> OcrMatched                       (done: single-entry report)
//!        -> OcrTextNoMatch                   (done: text detected, no match)
//!        -> OcrFailed -> VisualFallback -> QualityChecked
//!                     -> (StyleCursive | StyleBlock) -> Ranked
//! ```
//!
//! Recognized text always wins over visual comparison. Visual scoring picks a
//! scorer per corpus item: with the default style routing, a pair where
//! either side is cursive uses whole-canvas correlation and a pair of block
//! signatures uses letter-wise correlation.

use std::time::{Duration, Instant};

use crate::corpus::{Corpus, CorpusItem};
use crate::image::RasterImage;
use crate::names::NameIndex;
use crate::ocr::{best_name_match, has_alphabetic, recognize_text, OcrConfig, TextRecognizer};
use crate::quality::{QualityPolicy, QualityVerdict};
use crate::rank::{MatchReport, RankedMatch, ScoreRecord, DEFAULT_TOP_K};
use crate::score::{ScoreMethod, Scorer};
use crate::signature::{FeatureConfig, Signature};
use crate::style::Style;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{SigMatchError, SigMatchResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// How visual similarity is computed for each query/item pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VisualStrategy {
    /// Use `cursive` when either side is cursive, otherwise `block`.
    StyleRouted { cursive: Scorer, block: Scorer },
    /// Use one scorer for every pair.
    Fixed(Scorer),
}

impl Default for VisualStrategy {
    fn default() -> Self {
        VisualStrategy::StyleRouted {
            cursive: Scorer::template(),
            block: Scorer::letter_wise(),
        }
    }
}

/// Orchestrator configuration.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Maximum number of ranked matches.
    pub top_k: usize,
    pub strategy: VisualStrategy,
    /// Gate applied to the query and to every corpus item.
    pub quality: QualityPolicy,
    pub features: FeatureConfig,
    pub ocr: OcrConfig,
    /// Score corpus items on the rayon pool (requires the `rayon` feature).
    pub parallel: bool,
    /// Abort with [`SigMatchError::DeadlineExceeded`] once this much time has passed.
    pub deadline: Option<Duration>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            strategy: VisualStrategy::default(),
            quality: QualityPolicy::default(),
            features: FeatureConfig::default(),
            ocr: OcrConfig::default(),
            parallel: false,
            deadline: None,
        }
    }
}

impl MatchConfig {
    /// Descriptor-matching pipeline gated on descriptor count.
    pub fn keypoint() -> Self {
        Self {
            strategy: VisualStrategy::Fixed(Scorer::Keypoint),
            quality: QualityPolicy::descriptor_count(),
            ..Self::default()
        }
    }
}

/// States of the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchState {
    TryOcr,
    OcrMatched,
    OcrTextNoMatch,
    OcrFailed,
    VisualFallback,
    QualityChecked,
    StyleCursive,
    StyleBlock,
    Ranked,
}

impl MatchState {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchState::TryOcr => "try_ocr",
            MatchState::OcrMatched => "ocr_matched",
            MatchState::OcrTextNoMatch => "ocr_text_no_match",
            MatchState::OcrFailed => "ocr_failed",
            MatchState::VisualFallback => "visual_fallback",
            MatchState::QualityChecked => "quality_checked",
            MatchState::StyleCursive => "style_cursive",
            MatchState::StyleBlock => "style_block",
            MatchState::Ranked => "ranked",
        }
    }
}

/// Final result of one identification.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchOutcome {
    /// Recognized text matched a known name; visual comparison was skipped.
    TextMatched(MatchReport),
    /// Text was recognized but no known name was close enough.
    TextUnmatched { text: String },
    /// The query failed the quality gate.
    QualityRejected(QualityVerdict),
    /// Visual ranking of the corpus.
    Ranked(MatchReport),
}

impl MatchOutcome {
    /// The ranked report, for both text and visual matches.
    pub fn report(&self) -> Option<&MatchReport> {
        match self {
            MatchOutcome::TextMatched(report) | MatchOutcome::Ranked(report) => Some(report),
            _ => None,
        }
    }

    /// Terminal state the orchestrator stopped in.
    pub fn state(&self) -> MatchState {
        match self {
            MatchOutcome::TextMatched(_) => MatchState::OcrMatched,
            MatchOutcome::TextUnmatched { .. } => MatchState::OcrTextNoMatch,
            MatchOutcome::QualityRejected(_) => MatchState::QualityChecked,
            MatchOutcome::Ranked(_) => MatchState::Ranked,
        }
    }
}

enum ItemResult {
    Scored(ScoreRecord),
    Rejected(String),
}

/// Identifies the most likely authors of a signature image.
pub struct Matcher {
    cfg: MatchConfig,
    recognizer: Option<Box<dyn TextRecognizer>>,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    /// Creates a matcher with default configuration and no text recognizer.
    pub fn new() -> Self {
        Self {
            cfg: MatchConfig::default(),
            recognizer: None,
        }
    }

    /// Overrides the configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Enables the text-recognition branch.
    pub fn with_recognizer(mut self, recognizer: Box<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Decodes PNG/JPEG bytes and identifies them.
    #[cfg(feature = "image-io")]
    pub fn identify_bytes(
        &self,
        bytes: &[u8],
        corpus: &Corpus,
        names: &NameIndex,
    ) -> SigMatchResult<MatchOutcome> {
        let query = crate::image::io::decode_gray(bytes)?;
        self.identify(&query, corpus, names)
    }

    /// Runs the full state machine for one query image.
    pub fn identify(
        &self,
        query: &RasterImage,
        corpus: &Corpus,
        names: &NameIndex,
    ) -> SigMatchResult<MatchOutcome> {
        let _span = trace_span!("identify", corpus = corpus.len()).entered();
        let started = Instant::now();

        transition(MatchState::TryOcr);
        if let Some(outcome) = self.try_text(query, names)? {
            return Ok(outcome);
        }

        transition(MatchState::VisualFallback);
        let query = Signature::new(query.clone());
        let verdict = self.judge(&query)?;
        transition(MatchState::QualityChecked);
        trace_event!(
            "query_quality",
            measured = verdict.measured,
            passed = verdict.passed
        );
        if !verdict.passed {
            return Ok(MatchOutcome::QualityRejected(verdict));
        }

        let query_style = match self.cfg.strategy {
            VisualStrategy::StyleRouted { .. } => {
                let style = query.style(&self.cfg.features)?;
                transition(if style.is_cursive() {
                    MatchState::StyleCursive
                } else {
                    MatchState::StyleBlock
                });
                Some(style)
            }
            VisualStrategy::Fixed(_) => None,
        };

        let results = self.score_corpus(&query, query_style, corpus, started)?;
        let mut records = Vec::with_capacity(results.len());
        let mut rejected = Vec::new();
        for result in results {
            match result {
                ItemResult::Scored(record) => records.push(record),
                ItemResult::Rejected(id) => rejected.push(id),
            }
        }

        transition(MatchState::Ranked);
        let report =
            MatchReport::from_records(records, self.cfg.top_k, names).with_rejected(rejected);
        Ok(MatchOutcome::Ranked(report))
    }

    /// The text branch; `None` means fall through to visual comparison.
    fn try_text(
        &self,
        query: &RasterImage,
        names: &NameIndex,
    ) -> SigMatchResult<Option<MatchOutcome>> {
        let Some(recognizer) = self.recognizer.as_deref() else {
            transition(MatchState::OcrFailed);
            return Ok(None);
        };
        let text = recognize_text(query, recognizer, &self.cfg.ocr)?;
        if text.is_empty() || !has_alphabetic(&text) {
            transition(MatchState::OcrFailed);
            return Ok(None);
        }

        match best_name_match(&text, names) {
            Some(found) if found.is_confident(&self.cfg.ocr) => {
                transition(MatchState::OcrMatched);
                let score = (found.ratio * 100.0).clamp(0.0, 100.0) as f32;
                Ok(Some(MatchOutcome::TextMatched(MatchReport::single(
                    RankedMatch {
                        id: found.id,
                        name: found.name,
                        score,
                        method: ScoreMethod::TextRecognition,
                    },
                ))))
            }
            _ => {
                transition(MatchState::OcrTextNoMatch);
                Ok(Some(MatchOutcome::TextUnmatched { text }))
            }
        }
    }

    fn judge(&self, sig: &Signature) -> SigMatchResult<QualityVerdict> {
        let features = &self.cfg.features;
        Ok(match self.cfg.quality {
            QualityPolicy::InkDensity { .. } => {
                self.cfg.quality.judge_ink(sig.normalized(features)?)
            }
            QualityPolicy::DescriptorCount { .. } => {
                self.cfg.quality.judge_descriptors(sig.descriptors(features)?)
            }
        })
    }

    fn score_corpus(
        &self,
        query: &Signature,
        query_style: Option<Style>,
        corpus: &Corpus,
        started: Instant,
    ) -> SigMatchResult<Vec<ItemResult>> {
        let _span = trace_span!("score_corpus", items = corpus.len()).entered();
        let score_one = |(index, item): (usize, &CorpusItem)| -> SigMatchResult<ItemResult> {
            if let Some(limit) = self.cfg.deadline {
                let elapsed = started.elapsed();
                if elapsed > limit {
                    return Err(SigMatchError::DeadlineExceeded {
                        elapsed_ms: elapsed.as_millis(),
                    });
                }
            }
            Ok(self.score_item(query, query_style, index, item))
        };

        #[cfg(feature = "rayon")]
        {
            if self.cfg.parallel {
                return corpus
                    .items()
                    .par_iter()
                    .enumerate()
                    .map(score_one)
                    .collect();
            }
        }

        corpus.items().iter().enumerate().map(score_one).collect()
    }

    /// Scores one item; failures are isolated to that item.
    fn score_item(
        &self,
        query: &Signature,
        query_style: Option<Style>,
        index: usize,
        item: &CorpusItem,
    ) -> ItemResult {
        let features = &self.cfg.features;
        let signature = item.signature();

        match self.judge(signature) {
            Ok(verdict) if verdict.passed => {}
            Ok(verdict) => {
                trace_warn!(
                    "corpus_item_rejected",
                    id = item.id(),
                    measured = verdict.measured
                );
                return ItemResult::Rejected(item.id().to_string());
            }
            Err(err) => {
                let reason = err.to_string();
                trace_warn!("corpus_item_failed", id = item.id(), reason = reason.as_str());
                return ItemResult::Rejected(item.id().to_string());
            }
        }

        let scorer = match (self.cfg.strategy, query_style) {
            (VisualStrategy::Fixed(scorer), _) => Ok(scorer),
            (VisualStrategy::StyleRouted { cursive, block }, query_style) => {
                let item_style = signature.style(features);
                item_style.map(|item_style| {
                    let either_cursive = item_style.is_cursive()
                        || query_style.is_some_and(Style::is_cursive);
                    if either_cursive {
                        cursive
                    } else {
                        block
                    }
                })
            }
        };

        match scorer.and_then(|scorer| {
            scorer
                .score(query, signature, features)
                .map(|similarity| (scorer.method(), similarity))
        }) {
            Ok((method, similarity)) => {
                trace_event!(
                    "item_scored",
                    id = item.id(),
                    method = method.as_str(),
                    similarity = similarity
                );
                ItemResult::Scored(ScoreRecord {
                    index,
                    id: item.id().to_string(),
                    similarity,
                    method,
                })
            }
            Err(err) => {
                let reason = err.to_string();
                trace_warn!("corpus_item_failed", id = item.id(), reason = reason.as_str());
                ItemResult::Rejected(item.id().to_string())
            }
        }
    }
}

fn transition(state: MatchState) {
    trace_event!("state", state = state.as_str());
}
