use serde::{Deserialize, Serialize};

/// Exchange-qualified instrument code, e.g. `PETR4.SA`.
pub type TickerSymbol = String;

/// Metrics for one ticker as returned by the provider, fractions not percents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    pub ticker: TickerSymbol,
    pub earnings_yield: Option<f64>,
    /// ROIC or ROCE depending on the endpoint profile.
    pub return_on_capital: Option<f64>,
    pub report_date: Option<String>,
}

impl RawMetrics {
    pub fn empty(ticker: impl Into<TickerSymbol>) -> Self {
        Self {
            ticker: ticker.into(),
            earnings_yield: None,
            return_on_capital: None,
            report_date: None,
        }
    }
}

/// Normalized per-ticker unit flowing through scoring and ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub ticker: TickerSymbol,
    pub report_date: Option<String>,
    pub earnings_yield_pct: Option<f64>,
    pub roic_pct: Option<f64>,
    /// Present iff both percentage fields are present and the sum is finite.
    pub weighted_score: Option<f64>,
    /// Assigned by the ranker only.
    pub rank: Option<u32>,
    /// Display form of the fetch failure behind an all-absent record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

impl ScoredRecord {
    pub fn is_scored(&self) -> bool {
        self.weighted_score.is_some_and(f64::is_finite)
    }
}
