#[derive(Debug, thiserror::Error)]
pub enum ReviewsError {
    #[error("document database error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("failed to decode document: {0}")]
    Decode(#[from] bson::de::Error),
}
