use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::get,
};
use serde::Deserialize;

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::core::{ConversionError, ConversionRequest, ConversionResult, CurrencyCode};
use crate::store::Favorite;

const DEFAULT_FROM: &str = "USD";
const DEFAULT_TO: &str = "EUR";
const DEFAULT_AMOUNT: f64 = 1.0;

#[derive(Debug, Deserialize)]
struct ConvertQuery {
    from_currency: Option<String>,
    to_currency: Option<String>,
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConvertBody {
    #[serde(alias = "source")]
    from_currency: String,
    #[serde(alias = "target")]
    to_currency: String,
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct FavoriteBody {
    #[serde(alias = "source")]
    from_currency: String,
    #[serde(alias = "target")]
    to_currency: String,
}

async fn run_conversion(
    state: &AppState,
    request: ConversionRequest,
) -> ApiResult<Json<ConversionResult>> {
    match state.resolver.convert(&request).await {
        Ok(result) => {
            state.metrics.conversion(result.origin);
            state.history.record(result.clone()).await;
            Ok(Json(result))
        }
        Err(err) => {
            if matches!(err, ConversionError::RateUnavailable { .. }) {
                state.metrics.conversion_unavailable();
            }
            Err(err.into())
        }
    }
}

/// `GET /convert?from_currency=..&to_currency=..&amount=..`, every parameter optional.
async fn convert_query(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ConvertQuery>, QueryRejection>,
) -> ApiResult<Json<ConversionResult>> {
    let Query(query) = query?;
    let request = ConversionRequest::new(
        query.from_currency.as_deref().unwrap_or(DEFAULT_FROM),
        query.to_currency.as_deref().unwrap_or(DEFAULT_TO),
        query.amount.unwrap_or(DEFAULT_AMOUNT),
    )?;
    run_conversion(&state, request).await
}

async fn convert_body(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ConvertBody>, JsonRejection>,
) -> ApiResult<Json<ConversionResult>> {
    let Json(body) = body?;
    let request = ConversionRequest::new(&body.from_currency, &body.to_currency, body.amount)?;
    run_conversion(&state, request).await
}

async fn last_conversion(State(state): State<Arc<AppState>>) -> Json<Option<ConversionResult>> {
    Json(state.history.last().await)
}

async fn add_favorite(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FavoriteBody>, JsonRejection>,
) -> ApiResult<Json<Favorite>> {
    let Json(body) = body?;
    let from_currency = CurrencyCode::new(&body.from_currency);
    let to_currency = CurrencyCode::new(&body.to_currency);
    if from_currency.is_empty() || to_currency.is_empty() {
        return Err(ApiError::BadRequest(
            "Both from_currency and to_currency are required".to_string(),
        ));
    }
    let favorite = state
        .favorites
        .add(Favorite {
            from_currency,
            to_currency,
        })
        .await;
    Ok(Json(favorite))
}

async fn list_favorites(State(state): State<Arc<AppState>>) -> Json<Vec<Favorite>> {
    Json(state.favorites.list().await)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/convert", get(convert_query).post(convert_body))
        .route("/last-conversion", get(last_conversion))
        .route("/favorites", get(list_favorites).post(add_favorite))
}
