//! Financial metric extraction from report text

pub mod extractor;
pub mod table;

pub use extractor::{MatchPolicy, MetricExtractor, MetricSet, capture};
pub use table::{CaptureKind, METRIC_RULES, MetricName, MetricRule};
