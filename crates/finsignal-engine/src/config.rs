//! Configuration for the signal engine

use crate::error::{Result, SignalError};
use crate::metrics::MatchPolicy;
use crate::recommendation::{
    ANNOTATION_SENTIMENT_THRESHOLD, MetricThresholds, NARRATED_SENTIMENT_THRESHOLD,
    TRADE_SIGNAL_THRESHOLD,
};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the narrated sentiment threshold
pub const ENV_NARRATED_THRESHOLD: &str = "FINSIGNAL_NARRATED_THRESHOLD";
/// Environment variable overriding the chart annotation threshold
pub const ENV_ANNOTATION_THRESHOLD: &str = "FINSIGNAL_ANNOTATION_THRESHOLD";
/// Environment variable overriding the trade signal threshold
pub const ENV_TRADE_THRESHOLD: &str = "FINSIGNAL_TRADE_THRESHOLD";
/// Environment variable overriding the metric match policy
pub const ENV_MATCH_POLICY: &str = "FINSIGNAL_MATCH_POLICY";

/// Configuration for analysis runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Band for the narrated BUY / DON'T BUY / HOLD recommendation
    pub narrated_threshold: f64,

    /// Band for the terse chart annotation
    pub annotation_threshold: f64,

    /// Band for the BUY / SELL / HOLD trade signal
    pub trade_threshold: f64,

    /// Thresholds for the metrics decision tree
    pub metric_thresholds: MetricThresholds,

    /// Which value wins when a metric is mentioned more than once
    pub match_policy: MatchPolicy,

    /// Number of histogram bins
    pub histogram_bins: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            narrated_threshold: NARRATED_SENTIMENT_THRESHOLD,
            annotation_threshold: ANNOTATION_SENTIMENT_THRESHOLD,
            trade_threshold: TRADE_SIGNAL_THRESHOLD,
            metric_thresholds: MetricThresholds::default(),
            match_policy: MatchPolicy::FirstMatchWins,
            histogram_bins: 10,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration builder
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Apply overrides from `FINSIGNAL_*` environment variables
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `FINSIGNAL_*` overrides read through `lookup`
    ///
    /// Unparsable values are a `ConfigError` naming the variable.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = parse_f64(ENV_NARRATED_THRESHOLD, lookup(ENV_NARRATED_THRESHOLD))? {
            self.narrated_threshold = value;
        }
        if let Some(value) = parse_f64(ENV_ANNOTATION_THRESHOLD, lookup(ENV_ANNOTATION_THRESHOLD))? {
            self.annotation_threshold = value;
        }
        if let Some(value) = parse_f64(ENV_TRADE_THRESHOLD, lookup(ENV_TRADE_THRESHOLD))? {
            self.trade_threshold = value;
        }
        if let Some(policy) = lookup(ENV_MATCH_POLICY) {
            self.match_policy = policy
                .parse()
                .map_err(|e| SignalError::ConfigError(format!("{ENV_MATCH_POLICY}: {e}")))?;
        }
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("narrated_threshold", self.narrated_threshold),
            ("annotation_threshold", self.annotation_threshold),
            ("trade_threshold", self.trade_threshold),
            ("metric_thresholds.min_eps", self.metric_thresholds.min_eps),
            ("metric_thresholds.min_roe", self.metric_thresholds.min_roe),
            ("metric_thresholds.max_debt_ratio", self.metric_thresholds.max_debt_ratio),
        ];

        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(SignalError::ConfigError(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }

        if self.histogram_bins == 0 {
            return Err(SignalError::ConfigError(
                "histogram_bins must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_f64(key: &str, raw: Option<String>) -> Result<Option<f64>> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| SignalError::ConfigError(format!("{key}={raw}: {e}"))),
        None => Ok(None),
    }
}

/// Builder for EngineConfig
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    narrated_threshold: Option<f64>,
    annotation_threshold: Option<f64>,
    trade_threshold: Option<f64>,
    metric_thresholds: Option<MetricThresholds>,
    match_policy: Option<MatchPolicy>,
    histogram_bins: Option<usize>,
}

impl EngineConfigBuilder {
    /// Set the narrated recommendation threshold
    pub fn narrated_threshold(mut self, threshold: f64) -> Self {
        self.narrated_threshold = Some(threshold);
        self
    }

    /// Set the chart annotation threshold
    pub fn annotation_threshold(mut self, threshold: f64) -> Self {
        self.annotation_threshold = Some(threshold);
        self
    }

    /// Set the trade signal threshold
    pub fn trade_threshold(mut self, threshold: f64) -> Self {
        self.trade_threshold = Some(threshold);
        self
    }

    /// Set the metrics decision thresholds
    pub fn metric_thresholds(mut self, thresholds: MetricThresholds) -> Self {
        self.metric_thresholds = Some(thresholds);
        self
    }

    /// Set the metric match policy
    pub fn match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = Some(policy);
        self
    }

    /// Set the number of histogram bins
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EngineConfig> {
        let defaults = EngineConfig::default();

        let config = EngineConfig {
            narrated_threshold: self.narrated_threshold.unwrap_or(defaults.narrated_threshold),
            annotation_threshold: self.annotation_threshold.unwrap_or(defaults.annotation_threshold),
            trade_threshold: self.trade_threshold.unwrap_or(defaults.trade_threshold),
            metric_thresholds: self.metric_thresholds.unwrap_or(defaults.metric_thresholds),
            match_policy: self.match_policy.unwrap_or(defaults.match_policy),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
        };

        config.validate()?;
        Ok(config)
    }
}
