//! Signal engine entry point
//!
//! `SignalEngine::analyze` segments the input once and dispatches to the
//! sentiment or the metrics pipeline. Every call builds its own signal,
//! verdict and chart; the engine keeps nothing between calls.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::chart::{ChartDataset, ChartKind};
use crate::config::EngineConfig;
use crate::error::{Result, SignalError};
use crate::metrics::{MetricExtractor, MetricSet};
use crate::recommendation::{
    Recommendation, TradeAction, Verdict, recommend_from_metrics, recommend_from_sentiment,
    trade_signal,
};
use crate::sentiment::{SentimentScorer, SentimentSignal, VaderScorer};
use crate::text::{PunctuationSegmenter, Segmenter, Sentence};

/// Reason reported when the metrics pipeline finds nothing
pub const NO_SIGNAL_REASON: &str = "No recognized financial metrics found.";

/// Pipeline selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// News text: sentence sentiment trajectory
    Sentiment,
    /// Report text: named financial metrics
    Metrics,
}

impl AnalysisMode {
    /// Chart produced when the caller does not pick one
    pub fn default_chart(self) -> ChartKind {
        match self {
            Self::Sentiment => ChartKind::SentimentLine,
            Self::Metrics => ChartKind::Bar,
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sentiment => write!(f, "sentiment"),
            Self::Metrics => write!(f, "metrics"),
        }
    }
}

impl FromStr for AnalysisMode {
    type Err = SignalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sentiment" | "news" => Ok(Self::Sentiment),
            "metrics" | "financial" | "report" => Ok(Self::Metrics),
            other => Err(SignalError::InvalidMode(other.to_string())),
        }
    }
}

/// Structured signal derived from the text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Sentiment(SentimentSignal),
    Metrics(MetricSet),
}

/// Result of one `analyze` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub mode: AnalysisMode,
    /// `None` when the metrics pipeline found no signal
    pub verdict: Option<Verdict>,
    /// Trade action from the overall sentiment (sentiment mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_action: Option<TradeAction>,
    pub signal: Signal,
    pub chart: ChartDataset,
}

impl Analysis {
    /// The recommendation, if any
    pub fn recommendation(&self) -> Option<Recommendation> {
        self.verdict.as_ref().map(|v| v.recommendation)
    }

    /// The reason string; explains the absence of signal when there is no verdict
    pub fn reason(&self) -> &str {
        self.verdict.as_ref().map_or(NO_SIGNAL_REASON, |v| v.reason.as_str())
    }

    /// Extracted metrics, for a metrics analysis
    pub fn metrics(&self) -> Option<&MetricSet> {
        match &self.signal {
            Signal::Metrics(m) => Some(m),
            Signal::Sentiment(_) => None,
        }
    }

    /// Sentiment trajectory, for a sentiment analysis
    pub fn sentiment(&self) -> Option<&SentimentSignal> {
        match &self.signal {
            Signal::Sentiment(s) => Some(s),
            Signal::Metrics(_) => None,
        }
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Text-to-recommendation engine
pub struct SignalEngine {
    config: EngineConfig,
    segmenter: Box<dyn Segmenter>,
    scorer: Box<dyn SentimentScorer>,
    extractor: MetricExtractor,
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::build(
            EngineConfig::default(),
            Box::new(PunctuationSegmenter::new()),
            Box::new(VaderScorer::new()),
        )
    }
}

impl fmt::Debug for SignalEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalEngine")
            .field("config", &self.config)
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}

impl SignalEngine {
    /// Create an engine with the default segmenter and the VADER scorer
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_components(
            config,
            Box::new(PunctuationSegmenter::new()),
            Box::new(VaderScorer::new()),
        )
    }

    /// Create an engine with custom collaborators
    pub fn with_components(
        config: EngineConfig,
        segmenter: Box<dyn Segmenter>,
        scorer: Box<dyn SentimentScorer>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, segmenter, scorer))
    }

    fn build(
        config: EngineConfig,
        segmenter: Box<dyn Segmenter>,
        scorer: Box<dyn SentimentScorer>,
    ) -> Self {
        let extractor = MetricExtractor::new(config.match_policy);
        Self {
            config,
            segmenter,
            scorer,
            extractor,
        }
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze text with the pipeline selected by `mode`
    pub fn analyze(&self, text: &str, mode: AnalysisMode) -> Analysis {
        self.analyze_for_chart(text, mode.default_chart())
    }

    /// Analyze text for a specific chart; the chart kind implies the pipeline
    pub fn analyze_for_chart(&self, text: &str, chart: ChartKind) -> Analysis {
        let sentences = self.segmenter.segment(text);
        let mode = chart.mode();
        debug!("Analyzing {} sentences in {} mode", sentences.len(), mode);

        match mode {
            AnalysisMode::Sentiment => self.run_sentiment(&sentences),
            AnalysisMode::Metrics => self.run_metrics(&sentences, chart),
        }
    }

    fn run_sentiment(&self, sentences: &[Sentence]) -> Analysis {
        let signal = SentimentSignal::from_sentences(sentences, self.scorer.as_ref());
        let verdict = recommend_from_sentiment(signal.overall, self.config.narrated_threshold);
        let action = trade_signal(signal.overall, self.config.trade_threshold);
        let chart = ChartDataset::time_series(&signal, self.config.annotation_threshold);

        debug!(
            "Overall sentiment {:.3} -> {} (trade {})",
            signal.overall, verdict.recommendation, action
        );

        Analysis {
            mode: AnalysisMode::Sentiment,
            verdict: Some(verdict),
            trade_action: Some(action),
            signal: Signal::Sentiment(signal),
            chart,
        }
    }

    fn run_metrics(&self, sentences: &[Sentence], chart: ChartKind) -> Analysis {
        let metrics = self.extractor.extract(sentences);
        let verdict = recommend_from_metrics(&metrics, &self.config.metric_thresholds);
        let chart = ChartDataset::for_metrics(chart, &metrics, self.config.histogram_bins);

        match &verdict {
            Some(v) => debug!("Extracted {} metrics -> {}", metrics.len(), v.recommendation),
            None => debug!("No metrics found; no recommendation"),
        }

        Analysis {
            mode: AnalysisMode::Metrics,
            verdict,
            trade_action: None,
            signal: Signal::Metrics(metrics),
            chart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::CategoricalStyle;
    use crate::metrics::{MatchPolicy, MetricName};
    use crate::sentiment::MockSentimentScorer;

    fn scripted_engine(scores: &'static [f64]) -> SignalEngine {
        let mut scorer = MockSentimentScorer::new();
        let mut next = 0;
        scorer.expect_score().returning(move |_| {
            let score = scores[next % scores.len()];
            next += 1;
            score
        });
        SignalEngine::with_components(
            EngineConfig::default(),
            Box::new(PunctuationSegmenter::new()),
            Box::new(scorer),
        )
        .unwrap()
    }

    #[test]
    fn test_metrics_buy_scenario() {
        let engine = SignalEngine::default();
        let analysis = engine.analyze(
            "The company's EPS was 1.5 and ROE was 20%.",
            AnalysisMode::Metrics,
        );

        let metrics = analysis.metrics().unwrap();
        assert_eq!(metrics.get(MetricName::EarningsPerShare), Some(1.5));
        assert_eq!(metrics.get(MetricName::ReturnOnEquity), Some(20.0));
        assert_eq!(analysis.recommendation(), Some(Recommendation::Buy));
        assert!(analysis.reason().contains("EPS"));
        assert!(analysis.reason().contains("ROE"));
        assert!(analysis.trade_action.is_none());
    }

    #[test]
    fn test_metrics_sell_scenario() {
        let engine = SignalEngine::default();
        let analysis = engine.analyze("Debt ratio stood at 0.65.", AnalysisMode::Metrics);

        assert_eq!(analysis.metrics().unwrap().get(MetricName::DebtRatio), Some(0.65));
        assert_eq!(analysis.recommendation(), Some(Recommendation::Sell));
    }

    #[test]
    fn test_metrics_no_signal() {
        let engine = SignalEngine::default();
        let analysis = engine.analyze("Management was upbeat on the call.", AnalysisMode::Metrics);

        assert!(analysis.verdict.is_none());
        assert_eq!(analysis.reason(), NO_SIGNAL_REASON);
        assert!(analysis.chart.is_empty());
    }

    #[test]
    fn test_sentiment_buy_scenario() {
        let engine = scripted_engine(&[0.6, 0.5, 0.4]);
        let analysis = engine.analyze(
            "Record quarter. Strong guidance. Healthy demand.",
            AnalysisMode::Sentiment,
        );

        let signal = analysis.sentiment().unwrap();
        assert_eq!(signal.scores(), vec![0.6, 0.5, 0.4]);
        assert!((signal.overall - 0.5).abs() < 1e-9);
        assert_eq!(analysis.recommendation(), Some(Recommendation::Buy));
        assert_eq!(analysis.trade_action, Some(TradeAction::Buy));

        let ChartDataset::TimeSeries(chart) = &analysis.chart else {
            panic!("Expected time series");
        };
        assert_eq!(chart.points.len(), 3);
        assert_eq!(chart.annotation.as_ref().unwrap().label, "BUY");
    }

    #[test]
    fn test_sentiment_dont_buy() {
        let engine = scripted_engine(&[-0.7, -0.4]);
        let analysis = engine.analyze("Guidance cut. Shares slumped.", AnalysisMode::Sentiment);
        assert_eq!(analysis.recommendation(), Some(Recommendation::DontBuy));
        assert_eq!(analysis.trade_action, Some(TradeAction::Sell));
    }

    #[test]
    fn test_sentiment_between_thresholds() {
        // 0.1: annotation says BUY, narrated verdict says HOLD
        let engine = scripted_engine(&[0.1]);
        let analysis = engine.analyze("Slightly better.", AnalysisMode::Sentiment);
        assert_eq!(analysis.recommendation(), Some(Recommendation::Hold));
        let ChartDataset::TimeSeries(chart) = &analysis.chart else {
            panic!("Expected time series");
        };
        assert_eq!(chart.annotation.as_ref().unwrap().label, "BUY");
    }

    #[test]
    fn test_empty_input_sentiment_is_hold() {
        let engine = SignalEngine::default();
        let analysis = engine.analyze("", AnalysisMode::Sentiment);

        assert_eq!(analysis.sentiment().unwrap().overall, 0.0);
        assert_eq!(analysis.recommendation(), Some(Recommendation::Hold));
        assert_eq!(analysis.trade_action, Some(TradeAction::Hold));
        assert!(analysis.chart.is_empty());
    }

    #[test]
    fn test_empty_input_metrics_is_no_recommendation() {
        let engine = SignalEngine::default();
        let analysis = engine.analyze("", AnalysisMode::Metrics);
        assert!(analysis.recommendation().is_none());
        assert!(analysis.metrics().unwrap().is_empty());
    }

    #[test]
    fn test_chart_kind_selects_pipeline() {
        let engine = SignalEngine::default();
        let text = "Revenue was 120. Gross margin was 40%.";

        let pie = engine.analyze_for_chart(text, ChartKind::Pie);
        assert_eq!(pie.mode, AnalysisMode::Metrics);
        let ChartDataset::Categorical(chart) = &pie.chart else {
            panic!("Expected categorical chart");
        };
        assert_eq!(chart.style, CategoricalStyle::Pie);
        assert_eq!(chart.labels, vec!["Gross Margin", "Revenue"]);

        let hist = engine.analyze_for_chart(text, ChartKind::Histogram);
        assert!(matches!(hist.chart, ChartDataset::Histogram(_)));

        let line = engine.analyze_for_chart(text, ChartKind::SentimentLine);
        assert_eq!(line.mode, AnalysisMode::Sentiment);
    }

    #[test]
    fn test_match_policy_from_config() {
        let config = EngineConfig::builder()
            .match_policy(MatchPolicy::LastMatchWins)
            .build()
            .unwrap();
        let engine = SignalEngine::new(config).unwrap();
        let analysis = engine.analyze(
            "Debt ratio was 0.3 in 2022. Debt ratio rose to 0.8 this year.",
            AnalysisMode::Metrics,
        );
        assert_eq!(analysis.metrics().unwrap().get(MetricName::DebtRatio), Some(0.8));
        assert_eq!(analysis.recommendation(), Some(Recommendation::Sell));

        let engine = SignalEngine::default();
        let analysis = engine.analyze(
            "Debt ratio was 0.3 in 2022. Debt ratio rose to 0.8 this year.",
            AnalysisMode::Metrics,
        );
        assert_eq!(analysis.metrics().unwrap().get(MetricName::DebtRatio), Some(0.3));
        assert_eq!(analysis.recommendation(), Some(Recommendation::Hold));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            histogram_bins: 0,
            ..Default::default()
        };
        assert!(SignalEngine::new(config).is_err());
    }

    #[test]
    fn test_idempotent() {
        let engine = SignalEngine::default();
        let text = "Revenue grew to 5.2 billion. The P/E ratio of 18.5 looks fair. \
                    Investors cheered the strong results.";

        for mode in [AnalysisMode::Metrics, AnalysisMode::Sentiment] {
            let first = engine.analyze(text, mode).to_json().unwrap();
            let second = engine.analyze(text, mode).to_json().unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_values_stay_in_domain() {
        let engine = SignalEngine::default();
        let text = "Terrible!!! Awful, horrible, disastrous losses. \
                    Amazing, wonderful, fantastic gains!!! Revenue was 12.";
        let analysis = engine.analyze(text, AnalysisMode::Sentiment);
        let signal = analysis.sentiment().unwrap();
        assert!(signal.scores().iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!((-1.0..=1.0).contains(&signal.overall));

        let analysis = engine.analyze(text, AnalysisMode::Metrics);
        assert!(analysis.metrics().unwrap().iter().all(|(_, v)| v.is_finite()));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Sentiment".parse::<AnalysisMode>().unwrap(), AnalysisMode::Sentiment);
        assert_eq!("metrics".parse::<AnalysisMode>().unwrap(), AnalysisMode::Metrics);
        assert!("scatter".parse::<AnalysisMode>().is_err());
    }
}
