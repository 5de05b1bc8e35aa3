//! Batch predictions over a bounded worker pool.
//!
//! Each symbol gets its own fetch and its own model fit; symbols never share
//! fitted state. The pool is sized by configuration rather than by the
//! machine, since the bound exists to protect the upstream data provider.

use std::thread;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use thiserror::Error;

use pricelab_core::domain::PredictionResult;

use crate::config::BatchSettings;
use crate::service::{PredictionService, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Exact number of worker threads.
    pub max_concurrency: usize,
    /// Pause before each upstream fetch.
    pub request_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        (&BatchSettings::default()).into()
    }
}

impl From<&BatchSettings> for BatchConfig {
    fn from(settings: &BatchSettings) -> Self {
        Self {
            max_concurrency: settings.max_concurrency,
            request_delay: Duration::from_millis(settings.request_delay_ms),
        }
    }
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("batch worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Outcome for one requested symbol.
#[derive(Debug)]
pub struct BatchItem {
    pub symbol: String,
    pub outcome: Result<PredictionResult, ServiceError>,
}

#[derive(Debug)]
pub struct BatchSummary {
    /// One item per requested symbol, in request order.
    pub items: Vec<BatchItem>,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn successes(&self) -> impl Iterator<Item = &PredictionResult> {
        self.items.iter().filter_map(|item| item.outcome.as_ref().ok())
    }
}

/// Predict every symbol in `symbols` for `user_id`.
///
/// Per-symbol failures are collected in the summary and never abort the
/// rest of the batch. Only a failure to build the pool itself is an error.
pub fn run_batch(
    service: &PredictionService,
    user_id: &str,
    symbols: &[String],
    model_type: Option<&str>,
    config: &BatchConfig,
) -> Result<BatchSummary, BatchError> {
    let start = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_concurrency.max(1))
        .thread_name(|i| format!("pricelab-batch-{i}"))
        .build()?;

    tracing::info!(
        symbols = symbols.len(),
        workers = config.max_concurrency,
        "starting batch"
    );

    let items: Vec<BatchItem> = pool.install(|| {
        symbols
            .par_iter()
            .map(|symbol| {
                if !config.request_delay.is_zero() {
                    thread::sleep(config.request_delay);
                }
                let outcome = service.predict(user_id, symbol, model_type);
                if let Err(e) = &outcome {
                    tracing::warn!(symbol = %symbol, error = %e, "batch item failed");
                }
                BatchItem {
                    symbol: symbol.clone(),
                    outcome,
                }
            })
            .collect()
    });

    let succeeded = items.iter().filter(|item| item.outcome.is_ok()).count();
    let failed = items.len() - succeeded;
    let elapsed = start.elapsed();
    tracing::info!(succeeded, failed, elapsed_ms = elapsed.as_millis() as u64, "batch complete");

    Ok(BatchSummary {
        items,
        succeeded,
        failed,
        elapsed,
    })
}
