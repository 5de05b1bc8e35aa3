//! HTTP surface for `pricelab serve`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use pricelab_core::data::{SectorSummary, SymbolInfo};
use pricelab_runner::api::{self, HistoryResponse, ANONYMOUS_USER, USER_HEADER};
use pricelab_runner::{
    status_for, ErrorBody, PredictRequest, PredictResponse, PredictionService, ServiceError,
};

type AppState = Arc<PredictionService>;

/// A failed request, rendered as `{"error": ...}` with its mapped status.
enum ApiError {
    Service(ServiceError),
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("worker task failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Service(err) => {
                let status = StatusCode::from_u16(status_for(&err))
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, ErrorBody::from(&err))
            }
            ApiError::Internal(error) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody { error }),
        };
        (status, Json(body)).into_response()
    }
}

fn user_id(headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(ANONYMOUS_USER)
        .to_string()
}

async fn health() -> &'static str {
    "OK"
}

async fn predict(
    State(service): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let user = user_id(&headers);
    let result = tokio::task::spawn_blocking(move || {
        service.predict(&user, &request.symbol, request.model_type.as_deref())
    })
    .await??;
    Ok(Json(PredictResponse::from(&result)))
}

#[derive(Debug, Default, Deserialize)]
struct HistoryParams {
    limit: Option<usize>,
}

async fn predictions(
    State(service): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let user = user_id(&headers);
    let predictions =
        tokio::task::spawn_blocking(move || service.history(&user, params.limit)).await??;
    Ok(Json(HistoryResponse { predictions }))
}

async fn symbols(Query(query): Query<api::SymbolsQuery>) -> Json<Vec<SymbolInfo>> {
    Json(api::symbols(&query))
}

async fn sectors() -> Json<Vec<SectorSummary>> {
    Json(api::sectors())
}

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/predict", post(predict))
        .route("/api/predictions", get(predictions))
        .route("/api/symbols", get(symbols))
        .route("/api/sectors", get(sectors))
        .with_state(service)
}

pub async fn serve(service: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn user_header_defaults_to_anonymous() {
        let mut headers = HeaderMap::new();
        assert_eq!(user_id(&headers), "anonymous");

        headers.insert(USER_HEADER, HeaderValue::from_static("  "));
        assert_eq!(user_id(&headers), "anonymous");

        headers.insert(USER_HEADER, HeaderValue::from_static("user-17"));
        assert_eq!(user_id(&headers), "user-17");
    }

    #[test]
    fn service_errors_render_with_mapped_status() {
        let response = ApiError::from(ServiceError::InvalidRequest("symbol is required".into()))
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::Internal("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
