// src/constants.rs
//! Domain constants that define the operational boundaries of the service.
//!
//! Reading these constants should tell you how the site is wired: which
//! cache tags exist, which paths back which pages, and how search pages
//! through results.

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// How many objects the Notion API returns per page of results (API maximum).
pub const NOTION_API_PAGE_SIZE: usize = 100;

/// Notion API version header sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Default REST endpoint of the content source.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

// ---------------------------------------------------------------------------
// Cache tags
// ---------------------------------------------------------------------------

pub const TAG_POSTS: &str = "posts";
pub const TAG_POST: &str = "post";
pub const TAG_AUTHORS: &str = "authors";
pub const TAG_CATEGORIES: &str = "categories";

/// Every tag the site attaches to cached content, in invalidation order.
pub const ALL_TAGS: [&str; 4] = [TAG_POSTS, TAG_POST, TAG_AUTHORS, TAG_CATEGORIES];

// ---------------------------------------------------------------------------
// Site paths
// ---------------------------------------------------------------------------

pub const ROOT_PATH: &str = "/";

pub fn post_path(slug: &str) -> String {
    format!("/post/{}", slug)
}

pub fn category_path(slug: &str) -> String {
    format!("/category/{}", slug)
}

pub fn author_path(slug: &str) -> String {
    format!("/author/{}", slug)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

pub const SEARCH_DEFAULT_PAGE_SIZE: usize = 12;

/// Upper bound on `limit` so one request cannot ask for the whole archive.
pub const SEARCH_MAX_PAGE_SIZE: usize = 50;

/// How many leading results are scanned for suggestions.
pub const SUGGESTION_SCAN_DEPTH: usize = 10;

pub const MAX_SUGGESTIONS: usize = 5;

// ---------------------------------------------------------------------------
// Content shaping
// ---------------------------------------------------------------------------

pub const WORDS_PER_MINUTE: usize = 200;

/// Characters of body text used when a post has no explicit excerpt.
pub const EXCERPT_FALLBACK_LENGTH: usize = 160;

pub const DEFAULT_AUTHOR_NAME: &str = "Administrativa(mente)";

pub const DEFAULT_CATEGORY_NAME: &str = "Geral";

// ---------------------------------------------------------------------------
// Secrets and cache lifetime
// ---------------------------------------------------------------------------

/// Revalidation secret used when `REVALIDATION_SECRET` is unset (development).
pub const DEFAULT_REVALIDATION_SECRET: &str = "dev-secret";

/// Default time-to-live of cached content, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// How many recent invalidations the cache manager remembers for diagnostics.
pub const INVALIDATION_LOG_CAPACITY: usize = 32;

// ---------------------------------------------------------------------------
// Notion property names used by the site's databases
// ---------------------------------------------------------------------------

pub const PROP_SLUG: &str = "Slug";
pub const PROP_EXCERPT: &str = "Excerpt";
pub const PROP_CATEGORY: &str = "Category";
pub const PROP_AUTHOR: &str = "Author";
pub const PROP_PUBLISHED: &str = "Published";
pub const PROP_TAGS: &str = "Tags";
pub const PROP_READING_TIME: &str = "Reading Time";
pub const PROP_BIO: &str = "Bio";
pub const PROP_AVATAR: &str = "Avatar";
pub const PROP_DESCRIPTION: &str = "Description";
pub const PROP_COLOR: &str = "Color";
