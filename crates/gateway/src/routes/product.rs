use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::{Path, State},
        response::IntoResponse,
        routing::{get, post},
    },
    serde::Deserialize,
    serde_json::{Value, json},
};

use devlog_reviews::Product;

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/info", post(info))
        .route("/reviews/{product_name}", get(reviews))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductInfoRequest {
    product_name: Option<String>,
}

async fn info(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProductInfoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(product_name) = req.product_name else {
        return Err(ApiError::validation("Missing required field: productName"));
    };

    let product = state
        .reviews
        .product_by_name(&product_name)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Json(info_response(&product)))
}

async fn reviews(
    State(state): State<Arc<AppState>>,
    Path(product_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let reviews = state.reviews.reviews_by_product_name(&product_name).await?;
    if reviews.is_empty() {
        return Err(ApiError::not_found("No reviews found for the product name"));
    }
    Ok(Json(reviews))
}

/// The card shape the product page renders.
fn info_response(product: &Product) -> Value {
    json!({
        "_id": product.id,
        "name": product.name,
        "platform": product.platform,
        "brand": product.brand,
        "price": product.price,
        "reviewCount": product.review_count,
        "averageRating": product.average_rating,
        "breadCrumb": product.breadcrumbs,
        "images": product.images,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn info_response_shapes_card_fields() {
        let product = Product {
            id: "p-1".to_string(),
            url: "https://shop.example/p-1".to_string(),
            name: "Hydra Cream".to_string(),
            brand: "Acme".to_string(),
            platform: "oliveyoung.co.kr".to_string(),
            price: 12900.0,
            review_count: 321,
            average_rating: 4.6,
            typical_price: None,
            breadcrumbs: vec!["Skincare".to_string(), "Moisturizer".to_string()],
            images: vec!["https://img.example/1.jpg".to_string()],
            stock: None,
        };

        let value = info_response(&product);
        assert_eq!(value["_id"], "p-1");
        assert_eq!(value["reviewCount"], 321);
        assert_eq!(value["breadCrumb"][1], "Moisturizer");
        // The raw URL is deliberately not exposed on the card.
        assert!(value.get("url").is_none());
    }
}
