//! Document models and the shaped rows returned to API callers.
//!
//! Stored field names are camelCase (the collections predate this service);
//! the structs rename accordingly. Timestamps are BSON datetimes on disk and
//! RFC 3339 on the way out.

use {
    chrono::{DateTime, NaiveDate, Utc},
    mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A scraped product review. Collection `Review`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub author: Author,
    pub content: String,
    #[serde(deserialize_with = "chrono_datetime_as_bson_datetime::deserialize")]
    pub created_at: DateTime<Utc>,
    pub platform: String,
    pub product_id: String,
    /// Stored normalized to `0.0..=1.0` (a five-star rating is `1.0`).
    pub rating: f64,
    #[serde(default)]
    pub like_count: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
}

/// A scraped product. Collection `Product`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub url: String,
    pub name: String,
    pub brand: String,
    pub platform: String,
    pub price: f64,
    pub review_count: i64,
    pub average_rating: f64,
    #[serde(default)]
    pub typical_price: Option<f64>,
    #[serde(default)]
    pub breadcrumbs: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: Option<i64>,
}

/// Flat review-plus-product row produced by the `$lookup` pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithProduct {
    #[serde(rename(deserialize = "_id", serialize = "reviewId"))]
    pub review_id: String,
    pub username: String,
    pub rating: f64,
    pub content: String,
    #[serde(deserialize_with = "chrono_datetime_as_bson_datetime::deserialize")]
    pub created_at: DateTime<Utc>,
    pub platform: String,
    pub product_name: String,
    #[serde(default)]
    pub product_average_rating: Option<f64>,
    #[serde(default)]
    pub product_review_count: Option<i64>,
}

/// Output of the per-author `$group` summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    #[serde(rename = "_id")]
    pub username: String,
    pub review_count: i64,
    pub average_rating: f64,
    #[serde(default)]
    pub total_recommendations: Option<i64>,
}

/// One month in an activity trend. `date` is the month's last day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTrend {
    pub product_id: String,
    pub review_count: i64,
    pub monthly_review_counts: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordFrequency {
    pub text: String,
    pub value: u64,
}

/// A hit from the search pipeline's `$project` stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    pub product_name: String,
    pub user_name: String,
    pub rating: f64,
    #[serde(deserialize_with = "chrono_datetime_as_bson_datetime::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub like_count: Option<i64>,
    pub platform: String,
    #[serde(default)]
    pub user_image: Option<String>,
    #[serde(default)]
    pub product_average_rating: Option<f64>,
    #[serde(default)]
    pub product_review_count: Option<i64>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub reviews: Vec<SearchHit>,
    pub total_count: i64,
    pub current_page: u32,
    pub total_pages: u32,
}
