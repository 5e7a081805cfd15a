// src/lib.rs
//! administrativamente library: the content and revalidation service
//! behind the Administrativa(mente) site.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `ApiError`, `ValidationError`
//! - **Configuration**: `ServerArgs`, `SiteConfig`, `DatabaseIds`
//! - **Content source**: `ContentSource`, `NotionHttpClient`, typed properties
//! - **Content**: `Post`, `Author`, `Category`, `ContentQueries`
//! - **Revalidation**: `Invalidation`, `Revalidator`, webhook dispatch
//! - **Cache**: `CacheManager`
//! - **HTTP**: `router`, `AppState`

pub mod cache;
pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod health;
pub mod notion;
pub mod revalidation;
mod routes;
pub mod search;
pub mod state;
pub mod types;
pub mod webhook;

// --- Error Handling ---
pub use crate::error::{ApiError, AppError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{DatabaseIds, ServerArgs, SiteConfig};

// --- Domain Types ---
pub use crate::types::{ApiKey, DatabaseId, PageId, SharedSecret, Slug, ValidatedUrl};

// --- Content Source ---
pub use crate::notion::{ContentSource, NotionHttpClient};

// --- Content ---
pub use crate::content::{Author, Category, ContentQueries, Post};

// --- Revalidation ---
pub use crate::revalidation::{Invalidation, Revalidator};

// --- Cache ---
pub use crate::cache::{CacheManager, CacheScope, CacheStats};

// --- HTTP ---
pub use crate::routes::router;
pub use crate::state::AppState;
