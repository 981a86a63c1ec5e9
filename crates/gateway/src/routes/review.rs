//! Review search and analytics endpoints over the document store.

use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::{Path, Query, State},
        response::IntoResponse,
        routing::{get, post},
    },
    chrono::Utc,
    serde::Deserialize,
};

use devlog_reviews::{ReviewSort, SearchQuery};

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/userinfo/{username}", get(summary))
        .route("/user/{username}", get(by_username))
        .route("/useractivitytrend/{username}", get(user_activity_trend))
        .route("/product/wordcloud/{product_name}", get(word_cloud))
        .route("/product/trend", post(product_trend))
        .route("/search", post(search))
}

#[derive(Debug, Default, Deserialize)]
struct SortParams {
    #[serde(default)]
    sort: Option<String>,
}

async fn by_username(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(params): Query<SortParams>,
) -> Result<impl IntoResponse, ApiError> {
    let sort = params
        .sort
        .as_deref()
        .map(ReviewSort::parse)
        .unwrap_or_default();
    let reviews = state.reviews.reviews_by_username(&username, sort).await?;
    if reviews.is_empty() {
        return Err(ApiError::not_found("No reviews found for the username"));
    }
    Ok(Json(reviews))
}

async fn summary(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .reviews
        .review_summary(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("No reviews found for the username"))?;
    Ok(Json(summary))
}

async fn user_activity_trend(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let points = state
        .reviews
        .user_activity_trend(&username, Utc::now().date_naive())
        .await?;
    Ok(Json(points))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductTrendRequest {
    product_name: Option<String>,
}

async fn product_trend(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProductTrendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(product_name) = req.product_name else {
        return Err(ApiError::validation("Missing required field: productName"));
    };

    let trend = state
        .reviews
        .product_activity_trend(&product_name, Utc::now().date_naive())
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Json(trend))
}

/// Word frequencies over every review of a product. The route addresses
/// products by name; the scan below runs on the resolved id.
async fn word_cloud(
    State(state): State<Arc<AppState>>,
    Path(product_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .reviews
        .product_by_name(&product_name)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    let words = state.reviews.word_cloud(&product.id).await?;
    Ok(Json(words))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(query): Json<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.reviews.search(&query).await?;
    Ok(Json(response))
}
