//! Fetch -> score -> rank pipeline.
//!
//! Fetches fan out over a bounded number of tasks. Handles are awaited in input
//! order, so the record sequence (and therefore tie-breaking in the ranker) never
//! depends on which request finished first.

use crate::{
    rank, ConfigError, FetchFailure, MetricsProvider, RawMetrics, ScoreCalculator, ScoredRecord,
    TickerSymbol,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Default number of in-flight provider requests.
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedTicker {
    pub ticker: TickerSymbol,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutcome {
    /// Every requested ticker, in input order.
    pub records: Vec<ScoredRecord>,
    /// Scored records only, ranked.
    pub ranked: Vec<ScoredRecord>,
}

impl PipelineOutcome {
    pub fn from_records(records: Vec<ScoredRecord>) -> Self {
        let ranked = rank(records.clone());
        Self { records, ranked }
    }

    pub fn total_requested(&self) -> usize {
        self.records.len()
    }

    pub fn total_scored(&self) -> usize {
        self.ranked.len()
    }

    pub fn failures(&self) -> Vec<FailedTicker> {
        self.records
            .iter()
            .filter_map(|r| {
                r.fetch_error.as_ref().map(|reason| FailedTicker {
                    ticker: r.ticker.clone(),
                    reason: reason.clone(),
                })
            })
            .collect()
    }
}

/// `[done/total]` counter shared by the credential check and the fan-out, so progress
/// runs `1..=total` over the whole batch.
#[derive(Debug)]
struct Progress {
    done: AtomicUsize,
    total: usize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            done: AtomicUsize::new(0),
            total,
        }
    }

    fn advance(&self) -> usize {
        self.done.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[cfg(test)]
    fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}

pub struct Pipeline {
    provider: Arc<dyn MetricsProvider>,
    calculator: ScoreCalculator,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(
        provider: Arc<dyn MetricsProvider>,
        calculator: ScoreCalculator,
        concurrency: usize,
    ) -> Self {
        Self {
            provider,
            calculator,
            concurrency: concurrency.max(1),
        }
    }

    /// Run the whole batch.
    ///
    /// The first ticker is fetched on its own as a credential probe. If the
    /// provider rejects the API key the run stops with [`ConfigError::Rejected`]
    /// instead of sending the remaining requests. Every other failure is
    /// absorbed per ticker.
    pub async fn run(&self, tickers: &[TickerSymbol]) -> Result<PipelineOutcome, ConfigError> {
        let Some((first, rest)) = tickers.split_first() else {
            tracing::info!("No tickers requested, nothing to rank");
            return Ok(PipelineOutcome::default());
        };

        let progress = Arc::new(Progress::new(tickers.len()));

        let probe = self.provider.fetch(first).await;
        if let Err(FetchFailure::Unauthorized(msg)) = &probe {
            tracing::error!("Provider rejected credentials while fetching {}: {}", first, msg);
            return Err(ConfigError::Rejected(msg.clone()));
        }
        log_outcome(first, &probe, progress.advance(), progress.total);

        let mut outcomes = Vec::with_capacity(tickers.len());
        outcomes.push((first.clone(), probe));
        outcomes.extend(self.fetch_with_progress(rest, progress).await);

        let records: Vec<ScoredRecord> = outcomes
            .into_iter()
            .map(|(ticker, outcome)| self.calculator.score_outcome(&ticker, outcome))
            .collect();

        let outcome = PipelineOutcome::from_records(records);
        tracing::info!(
            "Ranked {}/{} tickers ({} failed)",
            outcome.total_scored(),
            outcome.total_requested(),
            outcome.failures().len()
        );
        Ok(outcome)
    }

    /// Fetch every ticker with at most `concurrency` requests in flight.
    /// Results come back in input order.
    pub async fn fetch_all(
        &self,
        tickers: &[TickerSymbol],
    ) -> Vec<(TickerSymbol, Result<RawMetrics, FetchFailure>)> {
        self.fetch_with_progress(tickers, Arc::new(Progress::new(tickers.len())))
            .await
    }

    async fn fetch_with_progress(
        &self,
        tickers: &[TickerSymbol],
        progress: Arc<Progress>,
    ) -> Vec<(TickerSymbol, Result<RawMetrics, FetchFailure>)> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let mut handles = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&semaphore);
            let progress = Arc::clone(&progress);
            let ticker = ticker.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| FetchFailure::Task(e.to_string()))?;

                let result = provider.fetch(&ticker).await;
                log_outcome(&ticker, &result, progress.advance(), progress.total);
                result
            }));
        }

        let mut results = Vec::with_capacity(tickers.len());
        for (ticker, handle) in tickers.iter().zip(handles) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Fetch task for {} did not complete: {}", ticker, e);
                    Err(FetchFailure::Task(e.to_string()))
                }
            };
            results.push((ticker.clone(), result));
        }

        results
    }
}

fn log_outcome(ticker: &str, result: &Result<RawMetrics, FetchFailure>, done: usize, total: usize) {
    match result {
        Ok(_) => tracing::debug!("[{}/{}] {} fetched", done, total, ticker),
        Err(e) => tracing::warn!("[{}/{}] {} failed: {}", done, total, ticker, e),
    }
}
