//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use fx_types::{
    ApiErrorBody, CurrencyCode, CurrencyInfo, FxError, FxRepository, PaymentRequest, QuoteRequest,
    TransactionId,
};

use crate::FxService;

/// Application state shared across handlers.
pub struct AppState<R: FxRepository> {
    pub service: FxService<R>,
}

/// Wrapper to implement IntoResponse for FxError (orphan rule workaround).
#[derive(Debug)]
pub struct ApiError(pub FxError);

impl From<FxError> for ApiError {
    fn from(err: FxError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(FxError::Validation(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            FxError::Validation(_) => StatusCode::BAD_REQUEST,
            FxError::UnsupportedPair(_) => StatusCode::UNPROCESSABLE_ENTITY,
            FxError::NotFound(_) => StatusCode::NOT_FOUND,
            FxError::Expired(_) => StatusCode::GONE,
            FxError::DuplicatePayment(_) => StatusCode::CONFLICT,
            FxError::Transient | FxError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            FxError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self.0, status = status.as_u16(), "request failed");
        }
        let body = ApiErrorBody::new(&self.0, status.as_u16());
        (status, Json(body)).into_response()
    }
}

fn parse_transaction_id(id: &str) -> Result<TransactionId, ApiError> {
    id.parse()
        .map_err(|_| ApiError(FxError::Validation("Invalid transaction ID".into())))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Supported currencies.
pub async fn list_currencies() -> impl IntoResponse {
    let currencies: Vec<CurrencyInfo> = CurrencyCode::all()
        .iter()
        .map(|code| code.info().into())
        .collect();
    Json(currencies)
}

// ─────────────────────────────────────────────────────────────────────────────
// Quotes
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all)]
pub async fn create_quote<R: FxRepository>(
    State(state): State<Arc<AppState<R>>>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let quote = state.service.create_quote(req).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

#[tracing::instrument(skip(state))]
pub async fn list_quotes<R: FxRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let quotes = state.service.list_quotes().await?;
    Ok(Json(quotes))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all)]
pub async fn pay<R: FxRepository>(
    State(state): State<Arc<AppState<R>>>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let paid = state.service.pay(req).await?;
    Ok((StatusCode::CREATED, Json(paid)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Transactions
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn list_transactions<R: FxRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let transactions = state.service.list_transactions().await?;
    Ok(Json(transactions))
}

/// Get transaction by ID.
#[tracing::instrument(skip(state), fields(transaction_id = %id))]
pub async fn get_transaction<R: FxRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction_id = parse_transaction_id(&id)?;
    let tx = state.service.get_transaction_status(transaction_id).await?;
    Ok(Json(tx))
}

/// Status override. `204 No Content` when the move was not applied.
#[cfg(feature = "admin-api")]
#[tracing::instrument(skip(state, payload), fields(transaction_id = %id))]
pub async fn set_transaction_status<R: FxRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    payload: Result<Json<fx_types::StatusUpdateRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let transaction_id = parse_transaction_id(&id)?;
    let Json(req) = payload?;
    let response = match state
        .service
        .set_transaction_status(transaction_id, req.status)
        .await?
    {
        Some(tx) => Json(tx).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (FxError::Validation("x".into()), 400),
            (FxError::UnsupportedPair("x".into()), 422),
            (FxError::NotFound("x".into()), 404),
            (FxError::Expired("x".into()), 410),
            (FxError::DuplicatePayment("x".into()), 409),
            (FxError::Transient, 503),
            (FxError::Unavailable("x".into()), 503),
            (FxError::Internal("x".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status().as_u16(), status);
        }
    }

    #[test]
    fn test_bad_transaction_id() {
        let err = parse_transaction_id("not-a-uuid").unwrap_err();
        assert_eq!(err.0, FxError::Validation("Invalid transaction ID".into()));
    }
}
