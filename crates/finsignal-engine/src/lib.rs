//! Financial signal extraction and recommendation engine
//!
//! This crate turns unstructured financial prose into an explainable
//! investment recommendation plus chart-ready data. Two pipelines share a
//! sentence segmentation step:
//!
//! - **Sentiment**: news text is scored sentence by sentence (VADER compound
//!   score), averaged, and classified into BUY / DON'T BUY / HOLD
//! - **Metrics**: report text is scanned by a pattern bank of 23 financial
//!   metrics (P/E, EPS, ROE, margins, ...) and a small decision tree turns the
//!   extracted values into BUY / SELL / HOLD
//!
//! Both produce a `ChartDataset` for an external renderer.
//!
//! # Example
//!
//! ```rust
//! use finsignal_engine::{AnalysisMode, Recommendation, SignalEngine};
//!
//! let engine = SignalEngine::default();
//! let analysis = engine.analyze("Debt ratio stood at 0.65.", AnalysisMode::Metrics);
//!
//! assert_eq!(analysis.recommendation(), Some(Recommendation::Sell));
//! println!("{}", analysis.reason());
//! ```

pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod recommendation;
pub mod sentiment;
pub mod text;

// Re-export main types for convenience
pub use chart::{CategoricalStyle, ChartDataset, ChartKind};
pub use config::EngineConfig;
pub use engine::{Analysis, AnalysisMode, Signal, SignalEngine};
pub use error::{Result, SignalError};
pub use metrics::{MatchPolicy, MetricExtractor, MetricName, MetricSet};
pub use recommendation::{
    ANNOTATION_SENTIMENT_THRESHOLD, NARRATED_SENTIMENT_THRESHOLD, Recommendation,
    TRADE_SIGNAL_THRESHOLD, TradeAction, Verdict,
};
pub use sentiment::{SentimentScorer, SentimentSignal, VaderScorer};
pub use text::{PunctuationSegmenter, Segmenter, Sentence, segment};
