//! Review/product search over the document database.
//!
//! Queries are expressed as aggregation pipelines. Every pipeline is built
//! by a pure function in [`pipeline`] so the stage lists can be asserted on
//! without a running server; [`ReviewStore`] only executes them.

mod error;
mod models;
mod pipeline;
mod query;
mod store;
mod trend;
mod wordcloud;

pub use error::ReviewsError;
pub use models::{
    Product, ProductTrend, Review, ReviewSummary, ReviewWithProduct, SearchHit, SearchResponse,
    TrendPoint, WordFrequency,
};
pub use query::{CreatedWindow, ReviewSort, SearchQuery};
pub use store::ReviewStore;
