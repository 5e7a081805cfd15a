// src/notion/mod.rs
//! Notion API interaction: the content source behind the site.
//!
//! Everything above this module depends on the [`ContentSource`] trait,
//! never on HTTP details, so handlers and queries can be exercised against
//! an in-memory source.

pub mod client;
mod pagination;
pub mod parser;
pub mod properties;
pub mod responses;

use crate::error::AppError;
use crate::types::{DatabaseId, PageId};
use responses::{NotionPage, NotionUser};

/// The ability to read content from the Notion workspace.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// The integration's own user; doubles as the reachability probe.
    async fn current_user(&self) -> Result<NotionUser, AppError>;

    /// Every live page in a database.
    async fn query_database(&self, database: &DatabaseId) -> Result<Vec<NotionPage>, AppError>;

    /// Full-text search across pages shared with the integration.
    async fn search_pages(&self, query: &str) -> Result<Vec<NotionPage>, AppError>;

    /// Plain text of a page's top-level blocks, one entry per block.
    async fn retrieve_block_text(&self, page: &PageId) -> Result<Vec<String>, AppError>;
}

pub use client::NotionHttpClient;
pub use properties::{ExtractionError, Properties, PropertyValue};
