//! Pure pieces of the scrape: URL validation and message pairing.

use devlog_common::QaPair;

use crate::scraper::ScrapeError;

/// Reject anything that is not a shared-conversation URL before a browser
/// ever launches.
pub fn validate_share_url(raw: &str, allowed_prefix: &str) -> Result<(), ScrapeError> {
    if url::Url::parse(raw).is_err() {
        return Err(ScrapeError::InvalidUrl(raw.to_string()));
    }
    if !raw.starts_with(allowed_prefix) {
        return Err(ScrapeError::InvalidUrl(raw.to_string()));
    }
    Ok(())
}

/// Pair user and assistant texts positionally. A question with no answer
/// yet gets an empty one; trailing unmatched answers are dropped.
pub fn pair_messages(user_texts: Vec<String>, assistant_texts: Vec<String>) -> Vec<QaPair> {
    user_texts
        .into_iter()
        .enumerate()
        .map(|(i, question)| QaPair {
            question,
            answer: assistant_texts.get(i).cloned().unwrap_or_default(),
        })
        .collect()
}
