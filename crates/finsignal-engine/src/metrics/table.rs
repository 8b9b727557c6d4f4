//! Pattern bank: one trigger/capture rule per recognized metric
//!
//! Adding a metric means adding a `MetricName` variant and a row to
//! `METRIC_RULES`; the extractor iterates the table uniformly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SignalError;

/// Closed set of recognized financial metrics, in chart order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum MetricName {
    PriceToEarnings,
    DebtRatio,
    BookValuePerShare,
    EarningsPerShare,
    CurrentRatio,
    ReturnOnEquity,
    PegRatio,
    LostSalesRatio,
    DividendYield,
    FreeCashFlow,
    GrossMargin,
    OperatingMargin,
    NetProfitMargin,
    QuickRatio,
    Revenue,
    Cagr,
    CapitalRatios,
    CashRatio,
    InventoryTurnover,
    LiquidityRatio,
    RateOfReturn,
    RevenuePerEmployee,
    BottomLine,
}

impl MetricName {
    /// All metrics in declaration order
    pub const ALL: [MetricName; 23] = [
        Self::PriceToEarnings,
        Self::DebtRatio,
        Self::BookValuePerShare,
        Self::EarningsPerShare,
        Self::CurrentRatio,
        Self::ReturnOnEquity,
        Self::PegRatio,
        Self::LostSalesRatio,
        Self::DividendYield,
        Self::FreeCashFlow,
        Self::GrossMargin,
        Self::OperatingMargin,
        Self::NetProfitMargin,
        Self::QuickRatio,
        Self::Revenue,
        Self::Cagr,
        Self::CapitalRatios,
        Self::CashRatio,
        Self::InventoryTurnover,
        Self::LiquidityRatio,
        Self::RateOfReturn,
        Self::RevenuePerEmployee,
        Self::BottomLine,
    ];

    /// Display label used in charts and serialized output
    pub fn label(self) -> &'static str {
        match self {
            Self::PriceToEarnings => "Price-to-Earnings (P/E) Ratio",
            Self::DebtRatio => "Debt Ratio",
            Self::BookValuePerShare => "Book Value per Share",
            Self::EarningsPerShare => "Earnings Per Share (EPS)",
            Self::CurrentRatio => "Current Ratio",
            Self::ReturnOnEquity => "Return on Equity (ROE)",
            Self::PegRatio => "P/E Growth (PEG) Ratio",
            Self::LostSalesRatio => "Lost Sales Ratio",
            Self::DividendYield => "Dividend Yield",
            Self::FreeCashFlow => "Free Cash Flow",
            Self::GrossMargin => "Gross Margin",
            Self::OperatingMargin => "Operating Margin",
            Self::NetProfitMargin => "Net Profit Margin",
            Self::QuickRatio => "Quick Ratio",
            Self::Revenue => "Revenue",
            Self::Cagr => "CAGR (Compound Annual Growth Rate)",
            Self::CapitalRatios => "Capital Ratios",
            Self::CashRatio => "Cash Ratio",
            Self::InventoryTurnover => "Inventory Turnover",
            Self::LiquidityRatio => "Liquidity Ratio",
            Self::RateOfReturn => "Rate of Return",
            Self::RevenuePerEmployee => "Revenue Per Employee",
            Self::BottomLine => "The Bottom Line",
        }
    }

    /// The extraction rule for this metric
    pub fn rule(self) -> &'static MetricRule {
        // METRIC_RULES rows follow declaration order
        &METRIC_RULES[self as usize]
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<MetricName> for &'static str {
    fn from(name: MetricName) -> Self {
        name.label()
    }
}

impl FromStr for MetricName {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SignalError::Other(format!("Unknown metric: {s}")))
    }
}

impl TryFrom<String> for MetricName {
    type Error = SignalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How a metric's value is captured from a triggering sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    /// First decimal or integer numeral, percent sign optional
    Plain,
    /// First numeral immediately followed by `%`
    Percent,
}

/// Trigger phrases and capture kind for one metric
#[derive(Debug, Clone, Copy)]
pub struct MetricRule {
    pub name: MetricName,
    /// Case-sensitive substrings, any of which licenses a capture
    pub triggers: &'static [&'static str],
    pub capture: CaptureKind,
}

impl MetricRule {
    /// Byte offset of the earliest trigger occurrence in the sentence
    pub fn trigger_position(&self, sentence: &str) -> Option<usize> {
        self.triggers.iter().filter_map(|t| sentence.find(t)).min()
    }
}

const fn plain(name: MetricName, triggers: &'static [&'static str]) -> MetricRule {
    MetricRule {
        name,
        triggers,
        capture: CaptureKind::Plain,
    }
}

const fn percent(name: MetricName, triggers: &'static [&'static str]) -> MetricRule {
    MetricRule {
        name,
        triggers,
        capture: CaptureKind::Percent,
    }
}

/// The pattern bank, one row per `MetricName` in declaration order
pub static METRIC_RULES: [MetricRule; 23] = [
    plain(MetricName::PriceToEarnings, &["P/E ratio", "Price-to-Earnings"]),
    plain(MetricName::DebtRatio, &["Debt ratio"]),
    plain(MetricName::BookValuePerShare, &["Book value per share"]),
    plain(MetricName::EarningsPerShare, &["EPS", "Earnings per share"]),
    plain(MetricName::CurrentRatio, &["Current ratio"]),
    plain(MetricName::ReturnOnEquity, &["Return on equity", "ROE"]),
    plain(MetricName::PegRatio, &["PEG ratio", "P/E Growth"]),
    plain(MetricName::LostSalesRatio, &["Lost sales ratio"]),
    percent(MetricName::DividendYield, &["Dividend yield"]),
    plain(MetricName::FreeCashFlow, &["Free cash flow"]),
    percent(MetricName::GrossMargin, &["Gross margin"]),
    percent(MetricName::OperatingMargin, &["Operating margin"]),
    percent(MetricName::NetProfitMargin, &["Net profit", "Net profit margin"]),
    plain(MetricName::QuickRatio, &["Quick ratio"]),
    plain(MetricName::Revenue, &["Revenue"]),
    percent(MetricName::Cagr, &["CAGR"]),
    plain(MetricName::CapitalRatios, &["Capital ratio"]),
    plain(MetricName::CashRatio, &["Cash ratio"]),
    plain(MetricName::InventoryTurnover, &["Inventory turnover"]),
    plain(MetricName::LiquidityRatio, &["Liquidity"]),
    percent(MetricName::RateOfReturn, &["Rate of return"]),
    plain(MetricName::RevenuePerEmployee, &["Revenue per employee"]),
    plain(MetricName::BottomLine, &["The bottom line"]),
];
