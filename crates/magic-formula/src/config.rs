use crate::locale::Language;
use fmp_client::{Endpoint, DEFAULT_BASE_URL};
use formula_core::display::format_weight;
use formula_core::{
    ConfigError, ScoreWeights, DEFAULT_CONCURRENCY, DEFAULT_TOP_N, EARNINGS_YIELD_WEIGHT,
    ROIC_WEIGHT,
};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// B3 (Brazil) universe used when no ticker list is configured.
pub const DEFAULT_TICKERS: &[&str] = &[
    "PETR4.SA", "VALE3.SA", "ITUB4.SA", "BBDC4.SA", "BBAS3.SA", "ABEV3.SA", "WEGE3.SA",
    "B3SA3.SA", "SUZB3.SA", "GGBR4.SA", "JBSS3.SA", "RENT3.SA", "ELET3.SA", "PRIO3.SA",
    "RADL3.SA", "EQTL3.SA", "VIVT3.SA", "CSAN3.SA", "CMIG4.SA", "TAEE11.SA", "CPLE6.SA",
    "KLBN11.SA", "EMBR3.SA", "UGPA3.SA", "SBSP3.SA",
];

const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Clone)]
pub struct AppConfig {
    // Provider
    pub api_key: String,
    pub base_url: String,
    pub endpoint: Endpoint,

    // Fetch behaviour
    pub concurrency: usize,
    pub timeout_secs: u64,

    // Ranking
    pub tickers: Vec<String>,
    pub weights: ScoreWeights,

    // Presentation
    pub language: Language,
    pub top_n: usize,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("endpoint", &self.endpoint.name)
            .field("concurrency", &self.concurrency)
            .field("timeout_secs", &self.timeout_secs)
            .field("tickers", &self.tickers.len())
            .field("weights", &self.weights)
            .field("language", &self.language)
            .field("top_n", &self.top_n)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = var("API_KEY").ok_or_else(|| ConfigError::Missing("API_KEY".to_string()))?;

        let endpoint = match var("FMP_ENDPOINT") {
            None => Endpoint::key_metrics_ttm(),
            Some(name) if name.eq_ignore_ascii_case(Endpoint::CUSTOM) => Endpoint::custom(
                var("FMP_ENDPOINT_PATH")
                    .ok_or_else(|| ConfigError::Missing("FMP_ENDPOINT_PATH".to_string()))?,
                var("FMP_TICKER_PARAM"),
                var("FMP_EY_FIELD")
                    .ok_or_else(|| ConfigError::Missing("FMP_EY_FIELD".to_string()))?,
                var("FMP_ROC_FIELD")
                    .ok_or_else(|| ConfigError::Missing("FMP_ROC_FIELD".to_string()))?,
            ),
            Some(name) => Endpoint::from_profile(&name)?,
        };

        let config = Self {
            api_key,
            base_url: var("FMP_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            endpoint,

            concurrency: parse_or("FETCH_CONCURRENCY", var("FETCH_CONCURRENCY"), DEFAULT_CONCURRENCY)?,
            timeout_secs: parse_or("FETCH_TIMEOUT_SECS", var("FETCH_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS)?,

            tickers: var("TICKERS")
                .map(|list| split_tickers(&list))
                .unwrap_or_else(|| DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect()),
            weights: ScoreWeights::new(
                parse_or("EY_WEIGHT", var("EY_WEIGHT"), EARNINGS_YIELD_WEIGHT)?,
                parse_or("ROIC_WEIGHT", var("ROIC_WEIGHT"), ROIC_WEIGHT)?,
            )?,

            language: var("LANGUAGE")
                .map(|v| v.parse::<Language>())
                .transpose()?
                .unwrap_or(Language::EnUs),
            top_n: parse_or("TOP_N", var("TOP_N"), DEFAULT_TOP_N)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the environment.
    pub fn apply_overrides(
        &mut self,
        tickers: Option<Vec<String>>,
        top_n: Option<usize>,
        language: Option<&str>,
    ) -> Result<(), ConfigError> {
        if let Some(tickers) = tickers {
            self.tickers = split_tickers(&tickers.join(","));
        }
        if let Some(top_n) = top_n {
            self.top_n = top_n;
        }
        if let Some(language) = language {
            self.language = language.parse()?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::Invalid("ticker list is empty".to_string()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("FETCH_CONCURRENCY must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("FETCH_TIMEOUT_SECS must be at least 1".to_string()));
        }
        if let Err(e) = self.endpoint.url(&self.base_url, "") {
            return Err(ConfigError::Invalid(format!("FMP_BASE_URL: {}", e)));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn log_summary(&self) {
        tracing::info!("Configuration loaded and validated");
        tracing::info!("  Endpoint: {} ({})", self.endpoint.name, self.base_url);
        tracing::info!("  Tickers: {}", self.tickers.len());
        tracing::info!("  Concurrency: {}, timeout: {}s", self.concurrency, self.timeout_secs);
        tracing::info!(
            "  Weights: EY x {}, ROIC x {}",
            format_weight(self.weights.earnings_yield),
            format_weight(self.weights.roic)
        );
        tracing::info!("  Language: {}", self.language);
    }
}

fn split_tickers(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("{}='{}': {}", key, raw, e))),
    }
}
