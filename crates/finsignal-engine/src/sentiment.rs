//! Sentence-level sentiment scoring and aggregation
//!
//! Each sentence gets a VADER compound score in [-1, 1]; the document score
//! is the arithmetic mean of the sentence scores, defined as 0 when there are
//! no sentences.

use serde::{Deserialize, Serialize};
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::text::Sentence;

/// Compound polarity scoring for a single sentence
#[cfg_attr(test, mockall::automock)]
pub trait SentimentScorer: Send + Sync {
    /// Score one sentence. Implementations should stay within [-1, 1];
    /// callers clamp regardless.
    fn score(&self, sentence: &str) -> f64;
}

/// Lexicon scorer backed by VADER
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    /// Create a new VADER scorer
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VaderScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaderScorer").finish_non_exhaustive()
    }
}

impl SentimentScorer for VaderScorer {
    fn score(&self, sentence: &str) -> f64 {
        if sentence.trim().is_empty() {
            return 0.0;
        }
        let scores = self.analyzer.polarity_scores(sentence);
        scores.get("compound").copied().unwrap_or(0.0)
    }
}

/// Score of one sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceScore {
    /// 1-based sentence index
    pub index: usize,
    /// Sentence text
    pub text: String,
    /// Compound score in [-1, 1]
    pub score: f64,
}

/// Sentiment trajectory of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSignal {
    /// Per-sentence scores in document order
    pub sentences: Vec<SentenceScore>,
    /// Mean of the sentence scores, 0 for an empty document
    pub overall: f64,
}

impl SentimentSignal {
    /// Score every sentence and aggregate
    pub fn from_sentences(sentences: &[Sentence], scorer: &dyn SentimentScorer) -> Self {
        let scored: Vec<SentenceScore> = sentences
            .iter()
            .map(|s| {
                let score = clamp_score(scorer.score(&s.text));
                tracing::trace!(index = s.index, score, "scored sentence");
                SentenceScore {
                    index: s.index,
                    text: s.text.clone(),
                    score,
                }
            })
            .collect();

        let overall = aggregate(&scored.iter().map(|s| s.score).collect::<Vec<_>>());

        Self {
            sentences: scored,
            overall,
        }
    }

    /// Raw scores in document order
    pub fn scores(&self) -> Vec<f64> {
        self.sentences.iter().map(|s| s.score).collect()
    }

    /// True when no sentence was scored
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// Arithmetic mean of the scores, exactly 0 for an empty slice
pub fn aggregate(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    clamp_score(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Force a score into [-1, 1], mapping NaN to neutral
fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(-1.0, 1.0)
    }
}
