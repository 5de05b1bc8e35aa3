//! HTTP payload shapes and error-status mapping.
//!
//! Transport-agnostic: the binary wires these into its router, tests use
//! them directly.

use serde::{Deserialize, Serialize};

use pricelab_core::data::catalogue::{self, SectorSummary, SymbolInfo};
use pricelab_core::domain::PredictionResult;
use pricelab_core::models::ModelKind;
use pricelab_core::pipeline::Recommendation;
use pricelab_core::ErrorClass;

use crate::history::PredictionRecord;
use crate::service::ServiceError;

/// Timestamp layout of `prediction_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header carrying the caller's identity.
pub const USER_HEADER: &str = "x-user-id";
pub const ANONYMOUS_USER: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PredictRequest {
    pub symbol: String,
    #[serde(default)]
    pub model_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictResponse {
    pub symbol: String,
    pub predicted_price: f64,
    pub current_price: f64,
    pub price_change_percent: f64,
    pub confidence: f64,
    pub model_type: ModelKind,
    pub recommendation: Recommendation,
    pub prediction_date: String,
}

impl From<&PredictionResult> for PredictResponse {
    fn from(result: &PredictionResult) -> Self {
        Self {
            symbol: result.symbol.clone(),
            predicted_price: result.predicted_price,
            current_price: result.current_price,
            price_change_percent: result.price_change_percent,
            confidence: result.confidence,
            model_type: result.model_type,
            recommendation: result.recommendation,
            prediction_date: result.timestamp.format(DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryResponse {
    pub predictions: Vec<PredictionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&ServiceError> for ErrorBody {
    fn from(err: &ServiceError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// HTTP status code for a failed request.
pub fn status_for(err: &ServiceError) -> u16 {
    match err.class() {
        ErrorClass::NotFound => 404,
        ErrorClass::BadRequest => 400,
        ErrorClass::Unavailable => 503,
        ErrorClass::BadGateway => 502,
        ErrorClass::ServerError => 500,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SymbolsQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
}

/// Catalogue listing for a symbols query.
///
/// A non-blank `search` wins over `sector`; with neither, the whole
/// catalogue is listed.
pub fn symbols(query: &SymbolsQuery) -> Vec<SymbolInfo> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let sector = query.sector.as_deref().map(str::trim).filter(|s| !s.is_empty());
    match (search, sector) {
        (Some(needle), _) => catalogue::search(needle),
        (None, Some(sector)) => catalogue::by_sector(sector),
        (None, None) => catalogue::all().to_vec(),
    }
}

pub fn sectors() -> Vec<SectorSummary> {
    catalogue::sectors()
}
