//! Human-readable rendering of an analysis

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use finsignal_engine::{Analysis, ChartDataset, Signal};

/// Render the signal as a table followed by the verdict
pub fn render_table(analysis: &Analysis) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    match &analysis.signal {
        Signal::Metrics(metrics) => {
            table.set_header(vec!["Metric", "Value"]);
            for (name, value) in metrics.iter() {
                table.add_row(vec![name.label().to_string(), format!("{value}")]);
            }
        }
        Signal::Sentiment(signal) => {
            table.set_header(vec!["#", "Score", "Sentence"]);
            for s in &signal.sentences {
                table.add_row(vec![s.index.to_string(), format!("{:+.4}", s.score), s.text.clone()]);
            }
        }
    }

    let mut out = String::new();
    out.push_str(analysis.chart.title());
    out.push('\n');
    if analysis.chart.is_empty() {
        out.push_str("(no data)\n");
    } else {
        out.push_str(&table.to_string());
        out.push('\n');
    }

    if let ChartDataset::TimeSeries(series) = &analysis.chart {
        out.push_str(&format!("Overall sentiment: {:+.4}\n", series.overall));
        if let Some(annotation) = &series.annotation {
            out.push_str(&format!("Chart label: {}\n", annotation.label));
        }
    }

    match &analysis.verdict {
        Some(verdict) => out.push_str(&format!("Recommendation: {}\n", verdict.recommendation)),
        None => out.push_str("Recommendation: none\n"),
    }
    out.push_str(&format!("Reason: {}\n", analysis.reason()));
    if let Some(action) = analysis.trade_action {
        out.push_str(&format!("Trade signal: {action}\n"));
    }

    out
}
