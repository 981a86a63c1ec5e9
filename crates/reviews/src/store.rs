//! Pipeline execution against the live collections.

use std::collections::HashMap;

use {
    chrono::{NaiveDate, NaiveTime, Utc},
    futures::TryStreamExt,
    mongodb::{
        Client, Collection,
        bson::{DateTime as BsonDateTime, Document, doc, from_document},
        options::{AggregateOptions, FindOptions, Hint},
    },
    tracing::debug,
};

use crate::{
    error::ReviewsError,
    models::{
        Product, ProductTrend, Review, ReviewSummary, ReviewWithProduct, SearchHit,
        SearchResponse, TrendPoint,
    },
    pipeline,
    query::{ReviewSort, SearchQuery},
    trend::{self, MonthCount, MonthWindow},
    wordcloud,
};

/// Batch size for the word-cloud scan.
const WORD_CLOUD_BATCH: i64 = 1000;

/// Number of months covered by the activity-trend endpoints.
const TREND_MONTHS: usize = 6;

/// Read-side repository over the `Review` and `Product` collections.
#[derive(Clone)]
pub struct ReviewStore {
    reviews: Collection<Review>,
    raw_reviews: Collection<Document>,
    products: Collection<Product>,
}

impl ReviewStore {
    pub fn new(client: &Client, database: &str) -> Self {
        let db = client.database(database);
        Self {
            reviews: db.collection("Review"),
            raw_reviews: db.collection("Review"),
            products: db.collection("Product"),
        }
    }

    /// All reviews by one author, joined with their products.
    pub async fn reviews_by_username(
        &self,
        username: &str,
        sort: ReviewSort,
    ) -> Result<Vec<ReviewWithProduct>, ReviewsError> {
        let pipeline = pipeline::reviews_by_username(username, sort);
        self.aggregate_into(pipeline, None).await
    }

    /// Aggregate counts for one author; `None` when they have no reviews.
    pub async fn review_summary(
        &self,
        username: &str,
    ) -> Result<Option<ReviewSummary>, ReviewsError> {
        let docs = self
            .run_aggregate(pipeline::review_summary(username), None)
            .await?;
        docs.into_iter()
            .next()
            .map(|doc| Ok(from_document(doc)?))
            .transpose()
    }

    /// Cumulative per-month review counts over the trailing six months,
    /// current month first.
    pub async fn user_activity_trend(
        &self,
        username: &str,
        today: NaiveDate,
    ) -> Result<Vec<TrendPoint>, ReviewsError> {
        let docs = self
            .run_aggregate(pipeline::activity_by_month(username), None)
            .await?;
        let grouped: Vec<MonthCount> = docs
            .into_iter()
            .map(from_document)
            .collect::<Result<_, _>>()?;
        let windows = trend::trailing_month_windows(today, TREND_MONTHS);
        Ok(trend::cumulative_counts(&windows, &grouped))
    }

    pub async fn product_by_name(&self, name: &str) -> Result<Option<Product>, ReviewsError> {
        let filter = doc! { "name": name, "brand": { "$exists": true } };
        Ok(self.products.find_one(filter).await?)
    }

    /// Reviews joined and filtered by product name.
    pub async fn reviews_by_product_name(
        &self,
        product_name: &str,
    ) -> Result<Vec<ReviewWithProduct>, ReviewsError> {
        self.aggregate_into(pipeline::reviews_by_product_name(product_name), None)
            .await
    }

    /// Per-month (non-cumulative) review counts for a product over the
    /// trailing six months; `None` when the product is unknown.
    pub async fn product_activity_trend(
        &self,
        product_name: &str,
        today: NaiveDate,
    ) -> Result<Option<ProductTrend>, ReviewsError> {
        let Some(product) = self.product_by_name(product_name).await? else {
            return Ok(None);
        };

        let windows = trend::trailing_month_windows(today, TREND_MONTHS);
        let mut monthly = Vec::with_capacity(windows.len());
        for window in &windows {
            let count = self
                .reviews
                .count_documents(doc! {
                    "productId": &product.id,
                    "createdAt": {
                        "$gte": month_bound(window, true),
                        "$lte": month_bound(window, false),
                    },
                })
                .await?;
            monthly.push(TrendPoint {
                date: window.end,
                count: count as i64,
            });
        }

        Ok(Some(ProductTrend {
            product_id: product.id,
            review_count: product.review_count,
            monthly_review_counts: monthly,
        }))
    }

    /// Word frequencies across all of a product's reviews, scanned in
    /// fixed-size batches so a large product never loads every review at
    /// once.
    pub async fn word_cloud(
        &self,
        product_id: &str,
    ) -> Result<Vec<crate::models::WordFrequency>, ReviewsError> {
        let mut freq = HashMap::new();
        let mut skip = 0u64;

        loop {
            let options = FindOptions::builder()
                .skip(skip)
                .limit(WORD_CLOUD_BATCH)
                .build();
            let batch: Vec<Review> = self
                .reviews
                .find(doc! { "productId": product_id })
                .with_options(options)
                .await?
                .try_collect()
                .await?;

            for review in &batch {
                wordcloud::accumulate(&mut freq, &review.content);
            }

            let full_batch = batch.len() as i64 == WORD_CLOUD_BATCH;
            skip += batch.len() as u64;
            if !full_batch {
                break;
            }
        }

        debug!(%product_id, words = freq.len(), "word cloud accumulated");
        Ok(wordcloud::into_sorted(freq))
    }

    /// Run the full search: page pipeline and count pipeline concurrently,
    /// sharing the planned index hint.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, ReviewsError> {
        let plan = pipeline::search(query, Utc::now());
        debug!(stages = plan.pipeline.len(), hint = ?plan.hint, "review search");

        let (hits, count_docs) = futures::try_join!(
            self.aggregate_into::<SearchHit>(plan.pipeline, plan.hint.clone()),
            self.run_aggregate(plan.count_pipeline, plan.hint),
        )?;

        // `$count` emits an Int32 until the total overflows it.
        let total_count = count_docs
            .first()
            .and_then(|doc| {
                doc.get_i32("total")
                    .ok()
                    .map(i64::from)
                    .or_else(|| doc.get_i64("total").ok())
            })
            .unwrap_or(0);

        let limit = query.limit();
        let total_pages = (total_count as u64).div_ceil(u64::from(limit)) as u32;

        Ok(SearchResponse {
            reviews: hits,
            total_count,
            current_page: query.page(),
            total_pages,
        })
    }

    async fn run_aggregate(
        &self,
        pipeline: Vec<Document>,
        hint: Option<Document>,
    ) -> Result<Vec<Document>, ReviewsError> {
        let mut aggregate = self.raw_reviews.aggregate(pipeline);
        if let Some(hint) = hint {
            let options = AggregateOptions::builder().hint(Hint::Keys(hint)).build();
            aggregate = aggregate.with_options(options);
        }
        Ok(aggregate.await?.try_collect().await?)
    }

    async fn aggregate_into<T: serde::de::DeserializeOwned>(
        &self,
        pipeline: Vec<Document>,
        hint: Option<Document>,
    ) -> Result<Vec<T>, ReviewsError> {
        self.run_aggregate(pipeline, hint)
            .await?
            .into_iter()
            .map(|doc| Ok(from_document(doc)?))
            .collect()
    }
}

/// Inclusive month bound as a BSON datetime (start of first day / end of
/// last day).
fn month_bound(window: &MonthWindow, start: bool) -> BsonDateTime {
    let (date, time) = if start {
        (window.start, NaiveTime::MIN)
    } else {
        (
            window.end,
            NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
        )
    };
    BsonDateTime::from_chrono(date.and_time(time).and_utc())
}
