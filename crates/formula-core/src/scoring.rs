//! Composite Magic Formula score.
//!
//! `score = EY% * EARNINGS_YIELD_WEIGHT + ROIC% * ROIC_WEIGHT`, defined only when
//! both inputs are present. Negative inputs are scored as-is; values that
//! overflow to infinity or NaN are treated as absent.

use crate::{ConfigError, FetchFailure, RawMetrics, ScoredRecord};
use serde::{Deserialize, Serialize};

/// Weight applied to earnings yield (cheapness).
pub const EARNINGS_YIELD_WEIGHT: f64 = 1.0;
/// Weight applied to return on capital (quality).
pub const ROIC_WEIGHT: f64 = 0.2;

/// Weights for the two score components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub earnings_yield: f64,
    pub roic: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            earnings_yield: EARNINGS_YIELD_WEIGHT,
            roic: ROIC_WEIGHT,
        }
    }
}

impl ScoreWeights {
    pub fn new(earnings_yield: f64, roic: f64) -> Result<Self, ConfigError> {
        if !earnings_yield.is_finite() || !roic.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "score weights must be finite (earnings_yield={}, roic={})",
                earnings_yield, roic
            )));
        }
        Ok(Self { earnings_yield, roic })
    }
}

pub struct ScoreCalculator {
    weights: ScoreWeights,
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self {
            weights: ScoreWeights::default(),
        }
    }

    pub fn with_weights(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    pub fn score(&self, raw: &RawMetrics) -> ScoredRecord {
        let earnings_yield_pct = to_pct(raw.earnings_yield);
        let roic_pct = to_pct(raw.return_on_capital);

        let weighted_score = match (earnings_yield_pct, roic_pct) {
            (Some(ey), Some(roic)) => {
                Some(ey * self.weights.earnings_yield + roic * self.weights.roic)
            }
            _ => None,
        }
        .filter(|s| s.is_finite());

        ScoredRecord {
            ticker: raw.ticker.clone(),
            report_date: raw.report_date.clone(),
            earnings_yield_pct,
            roic_pct,
            weighted_score,
            rank: None,
            fetch_error: None,
        }
    }

    /// Collapse a fetch outcome into a record. Failures become an all-absent
    /// record that keeps the failure text for diagnostics.
    pub fn score_outcome(
        &self,
        ticker: &str,
        outcome: Result<RawMetrics, FetchFailure>,
    ) -> ScoredRecord {
        match outcome {
            Ok(raw) => self.score(&raw),
            Err(failure) => {
                let mut record = self.score(&RawMetrics::empty(ticker));
                record.fetch_error = Some(failure.to_string());
                record
            }
        }
    }
}

fn to_pct(fraction: Option<f64>) -> Option<f64> {
    fraction.map(|f| f * 100.0).filter(|pct| pct.is_finite())
}
