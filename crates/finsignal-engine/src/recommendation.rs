//! Recommendation rules
//!
//! Sentiment is classified into three bands by a symmetric threshold. Two
//! thresholds are in use: a wide one for the narrated recommendation and a
//! narrow one for the terse chart annotation. A third band drives the trade
//! signal. All comparisons are strict, so a value equal to a threshold is
//! neutral.
//!
//! Metrics go through a short ordered decision tree; an empty metric set
//! yields no recommendation at all.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics::{MetricName, MetricSet};

/// Threshold for the narrated sentiment recommendation
pub const NARRATED_SENTIMENT_THRESHOLD: f64 = 0.2;

/// Threshold for the terse chart annotation
pub const ANNOTATION_SENTIMENT_THRESHOLD: f64 = 0.05;

/// Threshold for the sentiment trade signal
pub const TRADE_SIGNAL_THRESHOLD: f64 = 0.3;

/// Minimum EPS for the metrics BUY rule
pub const DEFAULT_MIN_EPS: f64 = 1.0;

/// Minimum ROE (percentage points) for the metrics BUY rule
pub const DEFAULT_MIN_ROE: f64 = 15.0;

/// Debt ratio above which the metrics SELL rule fires
pub const DEFAULT_MAX_DEBT_RATIO: f64 = 0.5;

/// Discrete investment recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "HOLD")]
    Hold,
    /// Negative sentiment; reevaluate rather than sell
    #[serde(rename = "DON'T BUY")]
    DontBuy,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
            Self::DontBuy => write!(f, "DON'T BUY"),
        }
    }
}

/// A recommendation with the reason that triggered it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub recommendation: Recommendation,
    pub reason: String,
}

impl Verdict {
    pub fn new(recommendation: Recommendation, reason: impl Into<String>) -> Self {
        Self {
            recommendation,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.recommendation, self.reason)
    }
}

/// Three-way sentiment band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentBand {
    Positive,
    Negative,
    Neutral,
}

impl SentimentBand {
    /// Classify a score against a symmetric threshold, strictly
    pub fn classify(score: f64, threshold: f64) -> Self {
        if score > threshold {
            Self::Positive
        } else if score < -threshold {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

/// Narrated recommendation from the overall sentiment
pub fn recommend_from_sentiment(overall: f64, threshold: f64) -> Verdict {
    match SentimentBand::classify(overall, threshold) {
        SentimentBand::Positive => Verdict::new(
            Recommendation::Buy,
            format!(
                "Positive sentiment (overall {overall:.3} > {threshold}) signals optimism."
            ),
        ),
        SentimentBand::Negative => Verdict::new(
            Recommendation::DontBuy,
            format!(
                "Negative sentiment (overall {overall:.3} < -{threshold}) signals caution."
            ),
        ),
        SentimentBand::Neutral => Verdict::new(
            Recommendation::Hold,
            format!(
                "Neutral or uncertain sentiment (overall {overall:.3} within ±{threshold}); re-evaluate."
            ),
        ),
    }
}

/// Colour of a chart annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationColor {
    Green,
    Red,
    Orange,
}

/// Terse label drawn on the sentiment chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub label: String,
    pub color: AnnotationColor,
}

/// Terse chart annotation from the overall sentiment
pub fn annotate(overall: f64, threshold: f64) -> Annotation {
    let (label, color) = match SentimentBand::classify(overall, threshold) {
        SentimentBand::Positive => ("BUY", AnnotationColor::Green),
        SentimentBand::Negative => ("DON'T BUY", AnnotationColor::Red),
        SentimentBand::Neutral => ("HOLD/RE-EVALUATE", AnnotationColor::Orange),
    };
    Annotation {
        label: label.to_string(),
        color,
    }
}

/// Trading action derived from a sentiment score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// Map a sentiment score to a trade action
pub fn trade_signal(score: f64, threshold: f64) -> TradeAction {
    match SentimentBand::classify(score, threshold) {
        SentimentBand::Positive => TradeAction::Buy,
        SentimentBand::Negative => TradeAction::Sell,
        SentimentBand::Neutral => TradeAction::Hold,
    }
}

/// Thresholds for the metrics decision tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricThresholds {
    /// EPS must exceed this for BUY
    pub min_eps: f64,
    /// ROE must exceed this for BUY
    pub min_roe: f64,
    /// Debt ratio above this means SELL
    pub max_debt_ratio: f64,
}

impl Default for MetricThresholds {
    fn default() -> Self {
        Self {
            min_eps: DEFAULT_MIN_EPS,
            min_roe: DEFAULT_MIN_ROE,
            max_debt_ratio: DEFAULT_MAX_DEBT_RATIO,
        }
    }
}

/// Recommendation from extracted metrics
///
/// Rules in order: strong EPS and ROE is BUY, high debt ratio is SELL,
/// anything else is HOLD. A rule whose metrics are missing is skipped.
/// Returns `None` for an empty metric set.
pub fn recommend_from_metrics(metrics: &MetricSet, thresholds: &MetricThresholds) -> Option<Verdict> {
    if metrics.is_empty() {
        return None;
    }

    let eps = metrics.get(MetricName::EarningsPerShare);
    let roe = metrics.get(MetricName::ReturnOnEquity);
    if let (Some(eps), Some(roe)) = (eps, roe) {
        if eps > thresholds.min_eps && roe > thresholds.min_roe {
            return Some(Verdict::new(
                Recommendation::Buy,
                format!("Strong EPS and ROE (EPS {eps} > {}, ROE {roe} > {}).", thresholds.min_eps, thresholds.min_roe),
            ));
        }
    }

    if let Some(debt) = metrics.get(MetricName::DebtRatio) {
        if debt > thresholds.max_debt_ratio {
            return Some(Verdict::new(
                Recommendation::Sell,
                format!("High debt ratio ({debt} > {}).", thresholds.max_debt_ratio),
            ));
        }
    }

    Some(Verdict::new(Recommendation::Hold, "Stable metrics."))
}
