//! Presentation of a finished run: a plain-text table or a JSON document.

use crate::locale::Language;
use chrono::{DateTime, Utc};
use formula_core::display::{format_pct, format_score, format_weight, MISSING};
use formula_core::{ChartSeries, FailedTicker, PipelineOutcome, ScoreWeights, ScoredRecord};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub language: Language,
    pub endpoint: String,
    pub weights: ScoreWeights,
    pub total_requested: usize,
    pub total_scored: usize,
    pub failed: Vec<FailedTicker>,
    pub ranked: Vec<ScoredRecord>,
    pub charts: ChartSeries,
}

impl RunReport {
    pub fn new(
        outcome: PipelineOutcome,
        language: Language,
        endpoint: &str,
        weights: ScoreWeights,
        top_n: usize,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            language,
            endpoint: endpoint.to_string(),
            weights,
            total_requested: outcome.total_requested(),
            total_scored: outcome.total_scored(),
            failed: outcome.failures(),
            charts: ChartSeries::from_ranked(&outcome.ranked, top_n),
            ranked: outcome.ranked,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_table(&self) -> String {
        let s = self.language.strings();
        let mut out = vec![
            s.title.to_string(),
            s.caption.to_string(),
            String::new(),
            format!("{}:", s.logic_heading),
            format!(
                "  {} = ({} x {}) + ({} x {})",
                s.score,
                s.earnings_yield,
                format_weight(self.weights.earnings_yield),
                s.roic,
                format_weight(self.weights.roic)
            ),
            String::new(),
        ];

        if self.ranked.is_empty() {
            out.push(s.empty.to_string());
        } else {
            let header = [s.rank, s.ticker, s.report_date, s.earnings_yield, s.roic, s.score]
                .map(String::from);
            let rows: Vec<[String; 6]> = self.ranked.iter().map(table_row).collect();
            out.extend(layout(&header, &rows));
        }

        if !self.failed.is_empty() {
            out.push(String::new());
            out.push(format!("{} ({}):", s.failed, self.failed.len()));
            for failure in &self.failed {
                out.push(format!("  {}: {}", failure.ticker, failure.reason));
            }
        }

        out.push(String::new());
        out.join("\n")
    }
}

fn table_row(record: &ScoredRecord) -> [String; 6] {
    [
        record
            .rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| MISSING.to_string()),
        record.ticker.clone(),
        record
            .report_date
            .clone()
            .unwrap_or_else(|| MISSING.to_string()),
        format_pct(record.earnings_yield_pct),
        format_pct(record.roic_pct),
        format_score(record.weighted_score),
    ]
}

/// Left-align text columns, right-align numeric ones.
fn layout(header: &[String; 6], rows: &[[String; 6]]) -> Vec<String> {
    let mut widths = header.clone().map(|h| h.chars().count());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let fmt_row = |cells: &[String; 6]| {
        cells
            .iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(i, (cell, &w))| match i {
                1 | 2 => format!("{:<w$}", cell, w = w),
                _ => format!("{:>w$}", cell, w = w),
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(fmt_row(header));
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(rows.iter().map(fmt_row));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula_core::{FetchFailure, RawMetrics, ScoreCalculator};

    fn outcome() -> PipelineOutcome {
        let calc = ScoreCalculator::new();
        PipelineOutcome::from_records(vec![
            calc.score(&RawMetrics {
                ticker: "PETR4.SA".to_string(),
                earnings_yield: Some(0.05),
                return_on_capital: Some(0.10),
                report_date: Some("2024-09-30".to_string()),
            }),
            calc.score(&RawMetrics {
                ticker: "VALE3.SA".to_string(),
                earnings_yield: Some(0.08),
                return_on_capital: Some(0.05),
                report_date: None,
            }),
            calc.score_outcome("X", Err(FetchFailure::Timeout)),
        ])
    }

    #[test]
    fn test_counts_and_charts() {
        let report = RunReport::new(outcome(), Language::EnUs, "ratios-ttm", ScoreWeights::default(), 20);

        assert_eq!(report.total_requested, 3);
        assert_eq!(report.total_scored, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.charts.bars.len(), 2);
        assert_eq!(report.ranked[0].ticker, "VALE3.SA");
    }

    #[test]
    fn test_table_contents() {
        let report = RunReport::new(outcome(), Language::EnUs, "ratios-ttm", ScoreWeights::default(), 20);
        let table = report.render_table();

        assert!(table.contains("Data provided by Financial Modeling Prep API"));
        assert!(table.contains("Score = (Earnings Yield x 1.0) + (ROIC x 0.2)"));
        let vale = table.lines().find(|l| l.contains("VALE3.SA")).unwrap();
        assert!(vale.contains("N/A"));
        assert!(vale.contains("8.0%"));
        assert!(vale.contains("5.0%"));
        assert!(vale.contains("9.0"));
        let petr = table.lines().find(|l| l.contains("PETR4.SA")).unwrap();
        assert!(petr.contains("2024-09-30"));
        assert!(petr.contains("7.0"));
        assert!(table.contains("X: Request timed out"));
    }

    #[test]
    fn test_formula_line_shows_configured_weights() {
        let weights = ScoreWeights::new(1.5, 0.25).unwrap();
        let report = RunReport::new(outcome(), Language::EnUs, "ratios-ttm", weights, 20);

        assert!(report
            .render_table()
            .contains("Score = (Earnings Yield x 1.5) + (ROIC x 0.25)"));
    }

    #[test]
    fn test_empty_ranking_renders_message() {
        let empty = PipelineOutcome::from_records(vec![
            ScoreCalculator::new().score_outcome("X", Err(FetchFailure::EmptyResponse)),
        ]);
        let report = RunReport::new(empty, Language::PtBr, "key-metrics-ttm", ScoreWeights::default(), 20);

        let table = report.render_table();
        assert!(table.contains("Nenhuma empresa"));
        assert!(report.charts.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let report = RunReport::new(outcome(), Language::PtBr, "ratios-ttm", ScoreWeights::default(), 1);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["language"], "PT-BR");
        assert_eq!(json["total_scored"], 2);
        assert_eq!(json["ranked"][0]["rank"], 1);
        assert_eq!(json["ranked"][0]["ticker"], "VALE3.SA");
        assert_eq!(json["failed"][0]["ticker"], "X");
        assert_eq!(json["charts"]["bars"].as_array().unwrap().len(), 1);
        assert!(json["generated_at"].is_string());
    }
}
