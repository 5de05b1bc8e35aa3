//! Prediction error taxonomy.

use thiserror::Error;

use crate::data::DataError;

/// Failures a prediction request can end in.
///
/// The predictor never returns a partially populated result: every path that
/// cannot produce a full [`PredictionResult`](crate::domain::PredictionResult)
/// ends in one of these.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("model fit failure: {0}")]
    ModelFitFailure(String),

    #[error("market data error: {0}")]
    Upstream(DataError),
}

/// Coarse caller-facing classification of a [`PredictError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The symbol does not exist upstream.
    NotFound,
    /// The request cannot be served with the data available.
    BadRequest,
    /// Collaborator is rate limiting or temporarily blocked.
    Unavailable,
    /// Collaborator transport failed.
    BadGateway,
    /// Numerical failure inside the pipeline.
    ServerError,
}

impl PredictError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PredictError::SymbolNotFound { .. } => ErrorClass::NotFound,
            PredictError::InsufficientData(_) => ErrorClass::BadRequest,
            PredictError::ModelFitFailure(_) => ErrorClass::ServerError,
            PredictError::Upstream(err) => match err {
                DataError::SymbolNotFound { .. } => ErrorClass::NotFound,
                DataError::InvalidPeriod(_) => ErrorClass::BadRequest,
                DataError::RateLimited { .. } | DataError::CircuitBreakerTripped => {
                    ErrorClass::Unavailable
                }
                _ => ErrorClass::BadGateway,
            },
        }
    }
}

impl From<DataError> for PredictError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::SymbolNotFound { symbol } => PredictError::SymbolNotFound { symbol },
            other => PredictError::Upstream(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_not_found_from_provider_is_lifted() {
        let err: PredictError = DataError::SymbolNotFound {
            symbol: "NOPE".into(),
        }
        .into();
        assert!(matches!(err, PredictError::SymbolNotFound { ref symbol } if symbol == "NOPE"));
        assert_eq!(err.class(), ErrorClass::NotFound);
    }

    #[test]
    fn classes_follow_taxonomy() {
        assert_eq!(
            PredictError::InsufficientData("x".into()).class(),
            ErrorClass::BadRequest
        );
        assert_eq!(
            PredictError::ModelFitFailure("x".into()).class(),
            ErrorClass::ServerError
        );
        assert_eq!(
            PredictError::from(DataError::NetworkUnreachable("down".into())).class(),
            ErrorClass::BadGateway
        );
        assert_eq!(
            PredictError::from(DataError::CircuitBreakerTripped).class(),
            ErrorClass::Unavailable
        );
    }
}
