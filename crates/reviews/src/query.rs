//! Search request shapes and their normalization rules.

use {
    chrono::{DateTime, Duration, Utc},
    mongodb::bson::{Document, doc},
    serde::Deserialize,
};

/// Sort options accepted by the review endpoints. Unknown strings fall back
/// to newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSort {
    #[default]
    Latest,
    Oldest,
    HighestRating,
    LowestRating,
}

impl ReviewSort {
    pub fn parse(s: &str) -> Self {
        match s {
            "oldest" => Self::Oldest,
            "highest_rating" => Self::HighestRating,
            "lowest_rating" => Self::LowestRating,
            _ => Self::Latest,
        }
    }

    /// The `$sort` stage body.
    pub fn sort_doc(self) -> Document {
        match self {
            Self::Latest => doc! { "createdAt": -1 },
            Self::Oldest => doc! { "createdAt": 1 },
            Self::HighestRating => doc! { "rating": -1 },
            Self::LowestRating => doc! { "rating": 1 },
        }
    }
}

/// Recency window on `createdAt`. `Any` adds no filter beyond the base
/// three-month floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatedWindow {
    PastDay,
    PastWeek,
    PastMonth,
    #[default]
    Any,
}

impl CreatedWindow {
    pub fn parse(s: &str) -> Self {
        match s {
            "past_day" => Self::PastDay,
            "past_week" => Self::PastWeek,
            "past_month" => Self::PastMonth,
            _ => Self::Any,
        }
    }

    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::PastDay => Some(now - Duration::hours(24)),
            Self::PastWeek => Some(now - Duration::days(7)),
            Self::PastMonth => Some(now - Duration::days(30)),
            Self::Any => None,
        }
    }
}

/// The search request body. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchQuery {
    pub keywords: Vec<String>,
    pub platforms: Vec<String>,
    pub brands: Vec<String>,
    pub product_names: Vec<String>,
    pub created_date: String,
    /// Star ratings 1–5; normalized to the stored `r / 5` scale.
    pub ratings: Vec<u8>,
    pub sort_by: String,
    pub authors: Vec<String>,
    pub page: u32,
    pub limit: u32,
}

impl SearchQuery {
    pub fn sort(&self) -> ReviewSort {
        ReviewSort::parse(&self.sort_by)
    }

    pub fn window(&self) -> CreatedWindow {
        CreatedWindow::parse(&self.created_date)
    }

    /// Page number, never below one.
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size, never zero.
    pub fn limit(&self) -> u32 {
        self.limit.max(1)
    }
}
