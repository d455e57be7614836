//! Exchange-rate lookup and conversion routes.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{app_error_response, json_error};
use crate::routes::expenses::body_rejection;
use crate::{AppState, middleware::AuthUser};
use expensa_core::currency::{CurrencyCode, CurrencyError};
use expensa_shared::AppError;

/// Creates the currency routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/currency/rates", get(latest_rates))
        .route("/currency/convert", post(convert))
}

/// Query parameters for the rate table.
#[derive(Debug, Deserialize)]
pub struct RatesQuery {
    /// Base currency, USD when omitted.
    pub base: Option<String>,
}

/// Request body for a conversion.
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    /// Source currency.
    pub from: String,
    /// Target currency.
    pub to: String,
    /// Amount in the source currency.
    pub amount: Decimal,
}

fn currency_error(err: &CurrencyError) -> Response {
    json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
}

/// GET `/currency/rates?base=USD` - Latest rates for a base currency.
async fn latest_rates(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<RatesQuery>,
) -> impl IntoResponse {
    let base = match query.base.as_deref().map(CurrencyCode::parse).transpose() {
        Ok(base) => base.unwrap_or_default(),
        Err(e) => return currency_error(&e),
    };

    match state.rates.latest(base).await {
        Ok(table) => (StatusCode::OK, Json(table)).into_response(),
        Err(e) => app_error_response(&AppError::from(e)),
    }
}

/// POST `/currency/convert` - Convert an amount at the latest rate.
async fn convert(
    State(state): State<AppState>,
    _auth: AuthUser,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => return body_rejection(&rejection),
    };

    let (from, to) = match (CurrencyCode::parse(&payload.from), CurrencyCode::parse(&payload.to)) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(e), _) | (_, Err(e)) => return currency_error(&e),
    };
    if payload.amount <= Decimal::ZERO {
        return currency_error(&CurrencyError::NonPositiveAmount);
    }

    let table = match state.rates.latest(from).await {
        Ok(table) => table,
        Err(e) => return app_error_response(&AppError::from(e)),
    };

    match table.quote(payload.amount, to) {
        Ok(quote) => (StatusCode::OK, Json(quote)).into_response(),
        Err(e) => currency_error(&e),
    }
}
