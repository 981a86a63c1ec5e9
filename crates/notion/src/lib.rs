//! Notion rendering and publishing.
//!
//! Three pieces: a markdown→block converter, a thin client for the official
//! Notion API, and the axum router the renderer sidecar serves. The gateway
//! never talks to Notion directly; it goes through the sidecar, which is
//! this crate running standalone.

pub mod blocks;
mod client;
mod error;
pub mod service;

pub use client::{CreatePage, CreatedPage, NotionClient, PageRecord};
pub use error::NotionError;
