//! Aggregation pipeline builders.
//!
//! Pure functions from a request to a stage list. Stage order for search is
//! fixed: match → lookup → unwind → (product match) → sort → skip → limit →
//! project; the count variant stops after the product match and appends
//! `$count` only.

use {
    chrono::{DateTime, Months, Utc},
    mongodb::bson::{DateTime as BsonDateTime, Document, doc},
};

use crate::query::{ReviewSort, SearchQuery};

/// Everything needed to run one search: the page pipeline, the count
/// pipeline, and an optional index hint shared by both.
#[derive(Debug)]
pub struct SearchPlan {
    pub pipeline: Vec<Document>,
    pub count_pipeline: Vec<Document>,
    pub hint: Option<Document>,
}

const PRODUCT_LOOKUP: &str = "Product";

fn product_lookup_stages() -> [Document; 2] {
    [
        doc! { "$lookup": {
            "from": PRODUCT_LOOKUP,
            "localField": "productId",
            "foreignField": "_id",
            "as": "product",
        }},
        doc! { "$unwind": "$product" },
    ]
}

/// Reviews for one author, joined with their products.
pub fn reviews_by_username(username: &str, sort: ReviewSort) -> Vec<Document> {
    let mut pipeline = vec![doc! { "$match": { "author.username": username } }];
    pipeline.extend(product_lookup_stages());
    pipeline.push(doc! { "$sort": sort.sort_doc() });
    pipeline.push(review_with_product_projection());
    pipeline
}

/// Per-author aggregate counts.
pub fn review_summary(username: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "author.username": username } },
        doc! { "$group": {
            "_id": "$author.username",
            "reviewCount": { "$sum": 1 },
            "averageRating": { "$avg": "$rating" },
            "totalRecommendations": { "$sum": "$likeCount" },
        }},
    ]
}

/// Review counts grouped by calendar month, newest first.
pub fn activity_by_month(username: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "author.username": username } },
        doc! { "$group": {
            "_id": { "year": { "$year": "$createdAt" }, "month": { "$month": "$createdAt" } },
            "count": { "$sum": 1 },
        }},
        doc! { "$sort": { "_id.year": -1, "_id.month": -1 } },
    ]
}

/// Reviews joined and filtered by the product's name.
pub fn reviews_by_product_name(product_name: &str) -> Vec<Document> {
    let mut pipeline = Vec::new();
    pipeline.extend(product_lookup_stages());
    pipeline.push(doc! { "$match": { "product.name": product_name } });
    pipeline.push(review_with_product_projection());
    pipeline
}

fn review_with_product_projection() -> Document {
    doc! { "$project": {
        "username": "$author.username",
        "rating": 1,
        "content": 1,
        "createdAt": 1,
        "platform": 1,
        "productName": "$product.name",
        "productAverageRating": "$product.averageRating",
        "productReviewCount": "$product.reviewCount",
    }}
}

/// Build the search plan for a full query.
///
/// `now` is injected so the date filters are deterministic under test.
pub fn search(query: &SearchQuery, now: DateTime<Utc>) -> SearchPlan {
    let mut match_stage = Document::new();
    let mut hint: Option<Document> = None;
    let mut hint_suppressed = false;

    // Base floor: only the trailing three months are searchable.
    let three_months_ago = now
        .checked_sub_months(Months::new(3))
        .unwrap_or(now);
    match_stage.insert(
        "createdAt",
        doc! { "$gte": BsonDateTime::from_chrono(three_months_ago) },
    );

    if !query.keywords.is_empty() {
        match_stage.insert("$text", doc! { "$search": query.keywords.join(" ") });
        // Text search picks its own index; hinting would conflict.
        hint_suppressed = true;
    }

    if !query.platforms.is_empty() {
        match_stage.insert("platform", doc! { "$in": query.platforms.clone() });
        propose_hint(&mut hint, hint_suppressed, doc! { "platform": 1 });
    }

    if !query.ratings.is_empty() {
        let normalized: Vec<f64> = query.ratings.iter().map(|r| f64::from(*r) / 5.0).collect();
        match_stage.insert("rating", doc! { "$in": normalized });
        propose_hint(&mut hint, hint_suppressed, doc! { "rating": 1 });
    }

    if let Some(start) = query.window().start(now) {
        match_stage.insert(
            "createdAt",
            doc! { "$gte": BsonDateTime::from_chrono(start) },
        );
        propose_hint(&mut hint, hint_suppressed, doc! { "createdAt": -1 });
    }

    if !query.authors.is_empty() {
        match_stage.insert("author.username", doc! { "$in": query.authors.clone() });
        propose_hint(&mut hint, hint_suppressed, doc! { "author.username": 1 });
    }

    let product_match = product_match_stage(query);

    let mut shared = vec![doc! { "$match": match_stage }];
    shared.extend(product_lookup_stages());
    if let Some(product_match) = &product_match {
        shared.push(doc! { "$match": product_match.clone() });
    }

    let mut pipeline = shared.clone();
    pipeline.push(doc! { "$sort": query.sort().sort_doc() });
    let skip = i64::from(query.page() - 1) * i64::from(query.limit());
    pipeline.push(doc! { "$skip": skip });
    pipeline.push(doc! { "$limit": i64::from(query.limit()) });
    pipeline.push(doc! { "$project": {
        "productName": "$product.name",
        "userName": "$author.username",
        "rating": 1,
        "createdAt": 1,
        "likeCount": 1,
        "platform": 1,
        "userImage": "$author.avatar",
        "productAverageRating": "$product.averageRating",
        "productReviewCount": "$product.reviewCount",
        "content": 1,
    }});

    let mut count_pipeline = shared;
    count_pipeline.push(doc! { "$count": "total" });

    SearchPlan {
        pipeline,
        count_pipeline,
        hint,
    }
}

/// Product-side filters applied after the lookup. `None` when no product
/// filter was requested, so the stage is omitted entirely.
fn product_match_stage(query: &SearchQuery) -> Option<Document> {
    let mut stage = Document::new();
    if !query.brands.is_empty() {
        stage.insert("product.brand", doc! { "$in": query.brands.clone() });
    }
    if !query.product_names.is_empty() {
        stage.insert("product.name", doc! { "$in": query.product_names.clone() });
    }
    if stage.is_empty() { None } else { Some(stage) }
}

/// First applicable filter wins the hint; `$text` suppresses hinting
/// altogether.
fn propose_hint(hint: &mut Option<Document>, suppressed: bool, candidate: Document) {
    if !suppressed && hint.is_none() {
        *hint = Some(candidate);
    }
}
