//! Rule-based metric extraction
//!
//! For every sentence and every rule in the pattern bank: test the triggers,
//! then capture a numeral. Rules are evaluated independently, so one sentence
//! may set several metrics.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::table::{CaptureKind, METRIC_RULES, MetricName, MetricRule};
use crate::error::SignalError;
use crate::text::{Sentence, segment};

static PLAIN_NUMERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9]+(?:\.[0-9]+)?").expect("plain numeral pattern"));

static PERCENT_NUMERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]+(?:\.[0-9]+)?)%").expect("percent numeral pattern"));

/// Which value wins when several sentences trigger the same metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Keep the value from the earliest triggering sentence
    #[default]
    FirstMatchWins,
    /// Overwrite with every later triggering sentence
    LastMatchWins,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstMatchWins => write!(f, "first"),
            Self::LastMatchWins => write!(f, "last"),
        }
    }
}

impl FromStr for MatchPolicy {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" | "first_match_wins" | "first-match-wins" => Ok(Self::FirstMatchWins),
            "last" | "last_match_wins" | "last-match-wins" => Ok(Self::LastMatchWins),
            other => Err(SignalError::InvalidMatchPolicy(other.to_string())),
        }
    }
}

/// Sparse mapping of metric names to extracted values for one document
///
/// Absent keys mean "not found"; iteration follows declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet {
    values: BTreeMap<MetricName, f64>,
}

impl MetricSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for a metric, if found
    pub fn get(&self, name: MetricName) -> Option<f64> {
        self.values.get(&name).copied()
    }

    /// Whether a metric was found
    pub fn contains(&self, name: MetricName) -> bool {
        self.values.contains_key(&name)
    }

    /// Number of metrics found
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no metric was found
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (MetricName, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Display labels in declaration order
    pub fn labels(&self) -> Vec<&'static str> {
        self.values.keys().map(|k| k.label()).collect()
    }

    /// Values in declaration order
    pub fn values(&self) -> Vec<f64> {
        self.values.values().copied().collect()
    }

    fn record(&mut self, name: MetricName, value: f64, policy: MatchPolicy) {
        match policy {
            MatchPolicy::FirstMatchWins => {
                self.values.entry(name).or_insert(value);
            }
            MatchPolicy::LastMatchWins => {
                self.values.insert(name, value);
            }
        }
    }
}

impl FromIterator<(MetricName, f64)> for MetricSet {
    fn from_iter<I: IntoIterator<Item = (MetricName, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Extracts a `MetricSet` from segmented text
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricExtractor {
    policy: MatchPolicy,
}

impl MetricExtractor {
    /// Create an extractor with the given overwrite policy
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    /// The configured overwrite policy
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Run every rule over every sentence
    pub fn extract(&self, sentences: &[Sentence]) -> MetricSet {
        let mut metrics = MetricSet::new();

        for sentence in sentences {
            for rule in &METRIC_RULES {
                if self.policy == MatchPolicy::FirstMatchWins && metrics.contains(rule.name) {
                    continue;
                }
                if let Some(value) = capture(rule, &sentence.text) {
                    tracing::trace!(
                        metric = rule.name.label(),
                        sentence = sentence.index,
                        value,
                        "captured metric"
                    );
                    metrics.record(rule.name, value, self.policy);
                }
            }
        }

        metrics
    }

    /// Segment and extract in one step
    pub fn extract_text(&self, text: &str) -> MetricSet {
        self.extract(&segment(text))
    }
}

/// Capture a value for one rule from one sentence
///
/// Returns `None` when no trigger matches, no numeral of the required kind is
/// present, or the numeral does not parse to a finite number. The numeral
/// nearest after the trigger is preferred; otherwise the first one in the
/// sentence is used.
pub fn capture(rule: &MetricRule, sentence: &str) -> Option<f64> {
    let start = rule.trigger_position(sentence)?;

    let numeral = |from: usize| match rule.capture {
        CaptureKind::Plain => PLAIN_NUMERAL.find_at(sentence, from).map(|m| m.as_str()),
        CaptureKind::Percent => PERCENT_NUMERAL
            .captures_at(sentence, from)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str()),
    };

    let raw = numeral(start).or_else(|| numeral(0))?;
    parse_numeral(raw)
}

fn parse_numeral(raw: &str) -> Option<f64> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            tracing::debug!("Discarding malformed numeral: {raw}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> MetricSet {
        MetricExtractor::default().extract_text(text)
    }

    #[test]
    fn test_plain_numeral() {
        let metrics = extract("P/E ratio of 18.5");
        assert_eq!(metrics.get(MetricName::PriceToEarnings), Some(18.5));
        assert_eq!(metrics.len(), 1);
    }

    #[test]
    fn test_plain_numeral_ignores_percent_suffix() {
        let metrics = extract("Return on equity reached 22%.");
        assert_eq!(metrics.get(MetricName::ReturnOnEquity), Some(22.0));
    }

    #[test]
    fn test_percent_metric_requires_percent_sign() {
        assert!(extract("Gross margin improved.").is_empty());
        assert_eq!(
            extract("Gross margin was 42%.").get(MetricName::GrossMargin),
            Some(42.0)
        );
        assert!(!extract("Gross margin code 42.").contains(MetricName::GrossMargin));
    }

    #[test]
    fn test_percent_value_is_not_scaled() {
        let metrics = extract("Dividend yield of 12.5% beat peers.");
        assert_eq!(metrics.get(MetricName::DividendYield), Some(12.5));
    }

    #[test]
    fn test_percent_metric_skips_bare_numerals() {
        let metrics = extract("In 2023 the CAGR was 7.5% over 5 years.");
        assert_eq!(metrics.get(MetricName::Cagr), Some(7.5));
    }

    #[test]
    fn test_trigger_is_case_sensitive() {
        assert!(extract("the debt ratio stood at 0.65.").is_empty());
        assert_eq!(
            extract("Debt ratio stood at 0.65.").get(MetricName::DebtRatio),
            Some(0.65)
        );
    }

    #[test]
    fn test_value_after_trigger_is_preferred() {
        let metrics = extract("The company's EPS was 1.5 and ROE was 20%.");
        assert_eq!(metrics.get(MetricName::EarningsPerShare), Some(1.5));
        assert_eq!(metrics.get(MetricName::ReturnOnEquity), Some(20.0));
    }

    #[test]
    fn test_value_before_trigger_is_used_as_fallback() {
        let metrics = extract("At 18.5, the P/E ratio looks stretched.");
        assert_eq!(metrics.get(MetricName::PriceToEarnings), Some(18.5));
    }

    #[test]
    fn test_keyword_collision_sets_both() {
        let metrics = extract("EPS rose to 2.1 while Revenue hit 540 million.");
        assert_eq!(metrics.get(MetricName::EarningsPerShare), Some(2.1));
        assert_eq!(metrics.get(MetricName::Revenue), Some(540.0));

        let metrics = extract("Revenue per employee was 310000.");
        assert_eq!(metrics.get(MetricName::Revenue), Some(310_000.0));
        assert_eq!(metrics.get(MetricName::RevenuePerEmployee), Some(310_000.0));
    }

    #[test]
    fn test_trigger_without_numeral_leaves_metric_unset() {
        let metrics = extract("Free cash flow was strong.");
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_word_boundary_before_numeral() {
        // "Q3" has no boundary before the digit
        let metrics = extract("Revenue in Q3 was 12.4 billion.");
        assert_eq!(metrics.get(MetricName::Revenue), Some(12.4));
    }

    #[test]
    fn test_malformed_numeral_is_no_match() {
        let huge = "9".repeat(400);
        let metrics = extract(&format!("Revenue was {huge}."));
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_first_match_wins() {
        let text = "Debt ratio was 0.4 last year. Debt ratio is now 0.7.";
        let metrics = MetricExtractor::new(MatchPolicy::FirstMatchWins).extract_text(text);
        assert_eq!(metrics.get(MetricName::DebtRatio), Some(0.4));
    }

    #[test]
    fn test_last_match_wins() {
        let text = "Debt ratio was 0.4 last year. Debt ratio is now 0.7.";
        let metrics = MetricExtractor::new(MatchPolicy::LastMatchWins).extract_text(text);
        assert_eq!(metrics.get(MetricName::DebtRatio), Some(0.7));
    }

    #[test]
    fn test_first_match_skips_triggering_sentence_without_value() {
        let text = "Gross margin improved. Gross margin was 38%. Gross margin may reach 40%.";
        let metrics = extract(text);
        assert_eq!(metrics.get(MetricName::GrossMargin), Some(38.0));
    }

    #[test]
    fn test_iteration_follows_declaration_order() {
        let metrics = extract("Revenue was 90. Debt ratio was 0.3. P/E ratio of 12.");
        assert_eq!(
            metrics.labels(),
            vec!["Price-to-Earnings (P/E) Ratio", "Debt Ratio", "Revenue"]
        );
        assert_eq!(metrics.values(), vec![12.0, 0.3, 90.0]);
    }

    #[test]
    fn test_serializes_with_labels_in_order() {
        let metrics = extract("Revenue was 90. Debt ratio was 0.3.");
        let json = serde_json::to_string(&metrics).unwrap();
        assert_eq!(json, r#"{"Debt Ratio":0.3,"Revenue":90.0}"#);

        let back: MetricSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metrics);
    }

    #[test]
    fn test_match_policy_parsing() {
        assert_eq!("first".parse::<MatchPolicy>().unwrap(), MatchPolicy::FirstMatchWins);
        assert_eq!("Last".parse::<MatchPolicy>().unwrap(), MatchPolicy::LastMatchWins);
        assert!("middle".parse::<MatchPolicy>().is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(extract("").is_empty());
    }
}
