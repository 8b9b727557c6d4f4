//! Chart-ready datasets
//!
//! The engine produces the data a chart needs, never pixels. Metric sets
//! become categorical (bar or pie) or histogram data; sentiment signals
//! become a time series with the terse recommendation annotation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::AnalysisMode;
use crate::error::SignalError;
use crate::metrics::MetricSet;
use crate::recommendation::{Annotation, annotate};
use crate::sentiment::SentimentSignal;

/// Chart requested by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Bar,
    Pie,
    Histogram,
    SentimentLine,
}

impl ChartKind {
    /// The pipeline that feeds this chart
    pub fn mode(self) -> AnalysisMode {
        match self {
            Self::Bar | Self::Pie | Self::Histogram => AnalysisMode::Metrics,
            Self::SentimentLine => AnalysisMode::Sentiment,
        }
    }

    /// Chart title
    pub fn title(self) -> &'static str {
        match self {
            Self::Bar => "Financial Metrics - Bar Chart",
            Self::Pie => "Financial Metrics - Pie Chart",
            Self::Histogram => "Financial Metrics - Histogram",
            Self::SentimentLine => "Sentiment Analysis Over Time",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bar => write!(f, "bar"),
            Self::Pie => write!(f, "pie"),
            Self::Histogram => write!(f, "histogram"),
            Self::SentimentLine => write!(f, "line"),
        }
    }
}

impl FromStr for ChartKind {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" | "bar chart" => Ok(Self::Bar),
            "pie" | "pie chart" => Ok(Self::Pie),
            "histogram" | "hist" => Ok(Self::Histogram),
            "line" | "sentiment" | "sentiment line chart" | "sentiment_line" => {
                Ok(Self::SentimentLine)
            }
            other => Err(SignalError::InvalidChartKind(other.to_string())),
        }
    }
}

/// Rendering style of a categorical chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalStyle {
    Bar,
    Pie,
}

/// Metric labels with their magnitudes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalChart {
    pub style: CategoricalStyle,
    pub title: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Percentage share of each value (pie style only, empty otherwise)
    pub shares: Vec<f64>,
}

/// Distribution of metric values over equal-width bins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// `bins + 1` edges, empty when there are no values
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// One point of the sentiment series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// 1-based sentence index
    pub index: usize,
    pub score: f64,
}

/// Sentiment per sentence plus the document score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<SeriesPoint>,
    pub overall: f64,
    /// Neutral reference line
    pub baseline: f64,
    /// Terse recommendation label, absent for an empty series
    pub annotation: Option<Annotation>,
}

/// Data handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartDataset {
    Categorical(CategoricalChart),
    Histogram(HistogramChart),
    TimeSeries(TimeSeriesChart),
}

impl ChartDataset {
    /// Bar or pie data from a metric set, labels in declaration order
    pub fn categorical(metrics: &MetricSet, style: CategoricalStyle) -> Self {
        let labels: Vec<String> = metrics.labels().into_iter().map(String::from).collect();
        let values = metrics.values();
        let (title, shares) = match style {
            CategoricalStyle::Bar => (ChartKind::Bar.title(), Vec::new()),
            CategoricalStyle::Pie => (ChartKind::Pie.title(), percentage_shares(&values)),
        };

        Self::Categorical(CategoricalChart {
            style,
            title: title.to_string(),
            y_label: "Value".to_string(),
            labels,
            values,
            shares,
        })
    }

    /// Histogram of the metric values
    pub fn histogram(metrics: &MetricSet, bins: usize) -> Self {
        let (edges, counts) = bin_values(&metrics.values(), bins);

        Self::Histogram(HistogramChart {
            title: ChartKind::Histogram.title().to_string(),
            x_label: "Value".to_string(),
            y_label: "Frequency".to_string(),
            edges,
            counts,
        })
    }

    /// Time series of sentence scores with the terse annotation
    pub fn time_series(signal: &SentimentSignal, annotation_threshold: f64) -> Self {
        let points = signal
            .sentences
            .iter()
            .map(|s| SeriesPoint {
                index: s.index,
                score: s.score,
            })
            .collect::<Vec<_>>();
        let annotation = (!points.is_empty()).then(|| annotate(signal.overall, annotation_threshold));

        Self::TimeSeries(TimeSeriesChart {
            title: ChartKind::SentimentLine.title().to_string(),
            x_label: "Sentence Number".to_string(),
            y_label: "Sentiment Score".to_string(),
            points,
            overall: signal.overall,
            baseline: 0.0,
            annotation,
        })
    }

    /// Metric chart for the requested kind; a sentiment kind falls back to bar
    pub fn for_metrics(kind: ChartKind, metrics: &MetricSet, bins: usize) -> Self {
        match kind {
            ChartKind::Pie => Self::categorical(metrics, CategoricalStyle::Pie),
            ChartKind::Histogram => Self::histogram(metrics, bins),
            ChartKind::Bar | ChartKind::SentimentLine => {
                Self::categorical(metrics, CategoricalStyle::Bar)
            }
        }
    }

    /// Whether there is nothing to draw
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Categorical(c) => c.values.is_empty(),
            Self::Histogram(h) => h.counts.is_empty(),
            Self::TimeSeries(t) => t.points.is_empty(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Categorical(c) => &c.title,
            Self::Histogram(h) => &h.title,
            Self::TimeSeries(t) => &t.title,
        }
    }
}

fn percentage_shares(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 || values.iter().any(|v| *v < 0.0) {
        return Vec::new();
    }
    values.iter().map(|v| v * 100.0 / total).collect()
}

/// Equal-width binning over [min, max], last bin closed on the right
fn bin_values(values: &[f64], bins: usize) -> (Vec<f64>, Vec<usize>) {
    if values.is_empty() || bins == 0 {
        return (Vec::new(), Vec::new());
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges = (0..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect();

    let mut counts = vec![0; bins];
    for v in values {
        let bin = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[bin] += 1;
    }

    (edges, counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricName;
    use crate::sentiment::SentenceScore;

    fn sample_metrics() -> MetricSet {
        [
            (MetricName::Revenue, 30.0),
            (MetricName::PriceToEarnings, 10.0),
            (MetricName::GrossMargin, 60.0),
        ]
        .into_iter()
        .collect()
    }

    fn signal(scores: &[f64], overall: f64) -> SentimentSignal {
        SentimentSignal {
            sentences: scores
                .iter()
                .enumerate()
                .map(|(i, s)| SentenceScore {
                    index: i + 1,
                    text: format!("Sentence {}.", i + 1),
                    score: *s,
                })
                .collect(),
            overall,
        }
    }

    #[test]
    fn test_bar_chart_in_declaration_order() {
        let ChartDataset::Categorical(chart) = ChartDataset::categorical(&sample_metrics(), CategoricalStyle::Bar) else {
            panic!("Expected categorical chart");
        };
        assert_eq!(chart.title, "Financial Metrics - Bar Chart");
        assert_eq!(
            chart.labels,
            vec!["Price-to-Earnings (P/E) Ratio", "Gross Margin", "Revenue"]
        );
        assert_eq!(chart.values, vec![10.0, 60.0, 30.0]);
        assert!(chart.shares.is_empty());
    }

    #[test]
    fn test_pie_shares() {
        let ChartDataset::Categorical(chart) = ChartDataset::categorical(&sample_metrics(), CategoricalStyle::Pie) else {
            panic!("Expected categorical chart");
        };
        assert_eq!(chart.title, "Financial Metrics - Pie Chart");
        assert_eq!(chart.shares, vec![10.0, 60.0, 30.0]);
    }

    #[test]
    fn test_histogram_bins() {
        let metrics: MetricSet = [
            (MetricName::DebtRatio, 0.0),
            (MetricName::Revenue, 10.0),
            (MetricName::QuickRatio, 5.0),
            (MetricName::CashRatio, 9.9),
        ]
        .into_iter()
        .collect();

        let ChartDataset::Histogram(chart) = ChartDataset::histogram(&metrics, 10) else {
            panic!("Expected histogram");
        };
        assert_eq!(chart.edges.len(), 11);
        assert_eq!(chart.edges[0], 0.0);
        assert_eq!(chart.edges[10], 10.0);
        assert_eq!(chart.counts.iter().sum::<usize>(), 4);
        assert_eq!(chart.counts[0], 1);
        assert_eq!(chart.counts[5], 1);
        // 9.9 and the max both land in the closed last bin
        assert_eq!(chart.counts[9], 2);
    }

    #[test]
    fn test_histogram_single_value() {
        let metrics: MetricSet = [(MetricName::Revenue, 4.0)].into_iter().collect();
        let ChartDataset::Histogram(chart) = ChartDataset::histogram(&metrics, 10) else {
            panic!("Expected histogram");
        };
        assert_eq!(chart.edges.first().copied(), Some(3.5));
        assert_eq!(chart.edges.last().copied(), Some(4.5));
        assert_eq!(chart.counts.iter().sum::<usize>(), 1);
    }

    #[test]
    fn test_empty_metric_charts() {
        let empty = MetricSet::new();
        for kind in [ChartKind::Bar, ChartKind::Pie, ChartKind::Histogram] {
            let chart = ChartDataset::for_metrics(kind, &empty, 10);
            assert!(chart.is_empty());
            assert_eq!(chart.title(), kind.title());
        }
    }

    #[test]
    fn test_time_series() {
        let ChartDataset::TimeSeries(chart) = ChartDataset::time_series(&signal(&[0.6, -0.1], 0.25), 0.05) else {
            panic!("Expected time series");
        };
        assert_eq!(chart.points[0], SeriesPoint { index: 1, score: 0.6 });
        assert_eq!(chart.points[1].index, 2);
        assert_eq!(chart.overall, 0.25);
        assert_eq!(chart.baseline, 0.0);
        assert_eq!(chart.annotation.unwrap().label, "BUY");
    }

    #[test]
    fn test_empty_time_series() {
        let chart = ChartDataset::time_series(&signal(&[], 0.0), 0.05);
        assert!(chart.is_empty());
        let ChartDataset::TimeSeries(series) = chart else {
            panic!("Expected time series");
        };
        assert!(series.annotation.is_none());
        assert_eq!(series.overall, 0.0);
    }

    #[test]
    fn test_builder_does_not_mutate_input() {
        let metrics = sample_metrics();
        let before = metrics.clone();
        let _ = ChartDataset::for_metrics(ChartKind::Pie, &metrics, 10);
        assert_eq!(metrics, before);
    }

    #[test]
    fn test_chart_kind_parsing() {
        assert_eq!("Bar Chart".parse::<ChartKind>().unwrap(), ChartKind::Bar);
        assert_eq!("Sentiment Line Chart".parse::<ChartKind>().unwrap(), ChartKind::SentimentLine);
        assert_eq!("hist".parse::<ChartKind>().unwrap(), ChartKind::Histogram);
        assert!("scatter".parse::<ChartKind>().is_err());
        assert_eq!(ChartKind::Pie.mode(), AnalysisMode::Metrics);
        assert_eq!(ChartKind::SentimentLine.mode(), AnalysisMode::Sentiment);
    }

    #[test]
    fn test_dataset_serialization_is_tagged() {
        let chart = ChartDataset::categorical(&MetricSet::new(), CategoricalStyle::Bar);
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["kind"], "categorical");
        assert_eq!(json["style"], "bar");
    }
}
