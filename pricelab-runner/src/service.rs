//! Prediction service: fetch → predict → record.

use thiserror::Error;

use pricelab_core::data::{DataError, LookbackPeriod, MarketDataProvider};
use pricelab_core::domain::PredictionResult;
use pricelab_core::models::ModelKind;
use pricelab_core::pipeline::Predictor;
use pricelab_core::{ErrorClass, PredictError};

use crate::config::{ConfigError, RunnerConfig};
use crate::history::{HistoryError, PredictionHistory, PredictionRecord};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Predict(#[from] PredictError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl ServiceError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ServiceError::InvalidRequest(_) => ErrorClass::BadRequest,
            ServiceError::Predict(err) => err.class(),
            ServiceError::History(_) => ErrorClass::ServerError,
        }
    }
}

impl From<DataError> for ServiceError {
    fn from(err: DataError) -> Self {
        ServiceError::Predict(err.into())
    }
}

/// Failure while assembling a service from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("provider setup failed: {0}")]
    Provider(#[from] DataError),
}

/// Ties a market-data provider, the predictor and the history store together.
///
/// Holds no per-request state, so one instance serves every thread of the
/// batch pool and every HTTP handler.
pub struct PredictionService {
    provider: Box<dyn MarketDataProvider>,
    predictor: Predictor,
    period: LookbackPeriod,
    default_model: ModelKind,
    history: PredictionHistory,
    fingerprint: String,
    query_limit: usize,
}

impl PredictionService {
    pub fn new(provider: Box<dyn MarketDataProvider>, config: &RunnerConfig) -> Self {
        Self {
            provider,
            predictor: Predictor::new(config.prediction.seed),
            period: config.prediction.period,
            default_model: config.prediction.default_model,
            history: PredictionHistory::new(config.history.path.clone()),
            fingerprint: config.fingerprint(),
            query_limit: config.history.query_limit,
        }
    }

    /// Validate `config` and build the provider it names.
    pub fn from_config(config: &RunnerConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let provider = config.provider.build()?;
        Ok(Self::new(provider, config))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn history_store(&self) -> &PredictionHistory {
        &self.history
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Run one prediction for `user_id` and append it to history.
    ///
    /// An absent `model_type` runs the configured default strategy; an
    /// unknown one falls back to RandomForest.
    pub fn predict(
        &self,
        user_id: &str,
        symbol: &str,
        model_type: Option<&str>,
    ) -> Result<PredictionResult, ServiceError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ServiceError::InvalidRequest("symbol is required".into()));
        }
        let kind = match model_type {
            Some(requested) => ModelKind::resolve(Some(requested)),
            None => self.default_model,
        };

        tracing::debug!(symbol = %symbol, model = %kind, period = %self.period.as_str(), "fetching");
        let fetched = self.provider.fetch(&symbol, self.period)?;
        let result = self.predictor.predict_with(&symbol, &fetched.series, kind)?;

        let record = PredictionRecord::from_result(user_id, &result, &self.fingerprint);
        if let Err(e) = self.history.append(&record) {
            tracing::error!(symbol = %symbol, user = user_id, error = %e, "failed to record prediction");
            return Err(e.into());
        }
        Ok(result)
    }

    /// The caller's most recent predictions, newest first.
    ///
    /// `limit` defaults to the configured query limit.
    pub fn history(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PredictionRecord>, ServiceError> {
        let limit = limit.unwrap_or(self.query_limit);
        Ok(self.history.for_user(user_id, limit)?)
    }
}
