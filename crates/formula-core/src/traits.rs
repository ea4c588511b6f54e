use async_trait::async_trait;
use crate::{FetchFailure, RawMetrics};

/// Source of trailing-twelve-months metrics for a single ticker
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn fetch(&self, ticker: &str) -> Result<RawMetrics, FetchFailure>;
}
