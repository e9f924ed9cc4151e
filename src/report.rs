//! Chart report
//!
//! The rendering boundary: everything a charting frontend needs, assembled
//! from one request and its aggregation result. The CLI prints the text
//! form; `--json` writes the same structure for an external renderer.

use std::fmt::Write as _;

use serde::Serialize;

use crate::types::{AggregationResult, Request};

/// Serialized output of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ChartReport {
    pub title: String,
    pub period: String,
    pub group: String,
    pub window_count: usize,
    pub averages: Vec<(String, f64)>,
    pub maxima: Vec<(String, f64)>,
    pub overall_average: Option<f64>,
    pub overall_maximum: Option<f64>,
    pub disclaimers: Vec<String>,
}

impl ChartReport {
    pub fn new(request: &Request, result: AggregationResult) -> Self {
        Self {
            title: request.title(),
            period: format!(
                "Data from {} to {}",
                request.start.format("%Y-%m-%d %H:%M:%S"),
                request.end.format("%Y-%m-%d %H:%M:%S")
            ),
            group: request.group.clone(),
            window_count: request.window_count,
            averages: result.averages,
            maxima: result.maxima,
            overall_average: result.overall_average,
            overall_maximum: result.overall_maximum,
            disclaimers: result.disclaimers,
        }
    }

    /// `Cumulative Average: 61.49 kW   Cumulative Max: 63.774 kW`, with `--`
    /// standing in for a metric that was not computed.
    pub fn summary_line(&self) -> String {
        format!(
            "Cumulative Average: {} kW   Cumulative Max: {} kW",
            unavailable_or(self.overall_average),
            unavailable_or(self.overall_maximum)
        )
    }

    /// Plain-text rendering for the terminal.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", self.period);
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<14} {:>12} {:>12}", "Time", "Avg (kW)", "Max (kW)");

        let labels: &[(String, f64)] = if self.averages.is_empty() {
            &self.maxima
        } else {
            &self.averages
        };
        for (index, (label, _)) in labels.iter().enumerate() {
            let avg = metric_cell(&self.averages, index);
            let max = metric_cell(&self.maxima, index);
            let _ = writeln!(out, "{label:<14} {avg:>12} {max:>12}");
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.summary_line());
        for disclaimer in &self.disclaimers {
            let _ = writeln!(out, "NOTE: {disclaimer}");
        }
        out
    }
}

fn metric_cell(series: &[(String, f64)], index: usize) -> String {
    series
        .get(index)
        .map(|(_, value)| format!("{value:.2}"))
        .unwrap_or_else(|| "--".to_string())
}

fn unavailable_or(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_else(|| "--".to_string())
}
