//! Core of the Magic Formula ranker: metric records, the composite score,
//! the dense ranker and the bounded fetch pipeline that ties them together.

pub mod charts;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod ranker;
pub mod scoring;
pub mod traits;
pub mod types;

pub use charts::{BarPoint, ChartSeries, Heatmap, HeatmapRow, ScatterPoint, DEFAULT_TOP_N};
pub use error::*;
pub use pipeline::{FailedTicker, Pipeline, PipelineOutcome, DEFAULT_CONCURRENCY};
pub use ranker::{rank, top_n};
pub use scoring::{ScoreCalculator, ScoreWeights, EARNINGS_YIELD_WEIGHT, ROIC_WEIGHT};
pub use traits::*;
pub use types::*;
