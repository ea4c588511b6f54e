//! Chart-ready series derived from a ranking: an EY-vs-ROIC scatter, a
//! top-N heatmap and a top-N score bar chart. Drawing is left to the consumer.

use crate::{top_n, ScoredRecord, TickerSymbol};
use serde::{Deserialize, Serialize};

/// Number of companies shown in the heatmap and bar chart by default.
pub const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub ticker: TickerSymbol,
    pub earnings_yield_pct: f64,
    pub roic_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRow {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// Tickers as columns, one row per metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub columns: Vec<TickerSymbol>,
    pub rows: Vec<HeatmapRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPoint {
    pub ticker: TickerSymbol,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub scatter: Vec<ScatterPoint>,
    pub heatmap: Heatmap,
    pub bars: Vec<BarPoint>,
}

impl ChartSeries {
    /// Build all series from ranked records. The scatter covers every record
    /// with both percentages; heatmap and bars cover the first `top` only.
    pub fn from_ranked(ranked: &[ScoredRecord], top: usize) -> Self {
        let scatter = ranked
            .iter()
            .filter_map(|r| match (r.earnings_yield_pct, r.roic_pct) {
                (Some(ey), Some(roic)) => Some(ScatterPoint {
                    ticker: r.ticker.clone(),
                    earnings_yield_pct: ey,
                    roic_pct: roic,
                }),
                _ => None,
            })
            .collect();

        let leaders = top_n(ranked, top);

        let heatmap = if leaders.is_empty() {
            Heatmap::default()
        } else {
            Heatmap {
                columns: leaders.iter().map(|r| r.ticker.clone()).collect(),
                rows: vec![
                    heatmap_row("EarningsYield", leaders, |r| r.earnings_yield_pct),
                    heatmap_row("ROIC", leaders, |r| r.roic_pct),
                    heatmap_row("WeightedScore", leaders, |r| r.weighted_score),
                ],
            }
        };

        let bars = leaders
            .iter()
            .filter_map(|r| {
                r.weighted_score.map(|score| BarPoint {
                    ticker: r.ticker.clone(),
                    score,
                })
            })
            .collect();

        Self { scatter, heatmap, bars }
    }

    pub fn is_empty(&self) -> bool {
        self.scatter.is_empty() && self.heatmap.columns.is_empty() && self.bars.is_empty()
    }
}

fn heatmap_row(
    label: &str,
    records: &[ScoredRecord],
    value: fn(&ScoredRecord) -> Option<f64>,
) -> HeatmapRow {
    HeatmapRow {
        label: label.to_string(),
        values: records.iter().map(value).collect(),
    }
}
