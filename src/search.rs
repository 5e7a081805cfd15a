// src/search.rs
//! In-memory filtering, ordering and pagination of search results.
//!
//! The content source does the full-text matching; everything here is a
//! pure function over the posts it returned.

use crate::constants::{
    MAX_SUGGESTIONS, SEARCH_DEFAULT_PAGE_SIZE, SEARCH_MAX_PAGE_SIZE, SUGGESTION_SCAN_DEPTH,
};
use crate::content::{Category, CategoryRef, Post};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Raw query string of `GET /api/search`. Numbers stay strings so that a
/// garbled `page` falls back to the default instead of rejecting the call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Source order.
    #[default]
    Relevance,
    /// Newest first.
    Date,
    /// Alphabetical by title.
    Title,
}

impl SortOrder {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("date") => Self::Date,
            Some("title") => Self::Title,
            _ => Self::Relevance,
        }
    }
}

/// Normalised search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub category: Option<String>,
    pub author: Option<String>,
    pub page: usize,
    pub limit: usize,
    pub sort: SortOrder,
}

impl SearchRequest {
    pub fn from_params(params: &SearchParams) -> Self {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let number = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
        };

        Self {
            query: params.q.as_deref().unwrap_or_default().trim().to_string(),
            category: non_blank(&params.category),
            author: non_blank(&params.author),
            page: number(&params.page).unwrap_or(1),
            limit: number(&params.limit)
                .unwrap_or(SEARCH_DEFAULT_PAGE_SIZE)
                .min(SEARCH_MAX_PAGE_SIZE),
            sort: SortOrder::parse(params.sort.as_deref()),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.query.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let total_pages = total.div_ceil(limit.max(1));
        Self {
            page,
            limit,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1 && total_pages > 0,
        }
    }

    pub fn zeroed(limit: usize) -> Self {
        Self::new(1, limit, 0)
    }
}

/// What the frontend needs to render the filter controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub categories: Vec<CategoryRef>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub sort: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub posts: Vec<Post>,
    pub total: usize,
    pub pagination: Pagination,
    pub filters: SearchFilters,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    fn empty(request: &SearchRequest, categories: Vec<CategoryRef>) -> Self {
        Self {
            query: request.query.clone(),
            posts: Vec::new(),
            total: 0,
            pagination: Pagination::zeroed(request.limit),
            filters: SearchFilters {
                categories,
                category: request.category.clone(),
                author: request.author.clone(),
                sort: request.sort,
            },
            suggestions: Vec::new(),
            error: None,
        }
    }

    /// Answer to a blank query: no posts, only the category list.
    pub fn blank(request: &SearchRequest, categories: &[Category]) -> Self {
        let categories = categories
            .iter()
            .map(|c| CategoryRef {
                name: c.name.clone(),
                slug: c.slug.clone(),
                color: c.color.clone(),
            })
            .collect();
        Self::empty(request, categories)
    }

    /// Degraded answer carrying the failure message.
    pub fn failed(request: &SearchRequest, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(request, Vec::new())
        }
    }
}

/// Filter, order and page the posts the source matched for `request`.
pub fn run(request: &SearchRequest, results: Vec<Post>) -> SearchResponse {
    let suggestions = suggestions(&request.query, &results);
    let categories = distinct_categories(&results);

    let mut matched: Vec<Post> = results
        .into_iter()
        .filter(|post| matches_category(post, request.category.as_deref()))
        .filter(|post| matches_author(post, request.author.as_deref()))
        .collect();
    sort_posts(&mut matched, request.sort);

    let total = matched.len();
    let start = (request.page - 1).saturating_mul(request.limit);
    let posts = matched
        .into_iter()
        .skip(start)
        .take(request.limit)
        .collect();

    SearchResponse {
        posts,
        total,
        pagination: Pagination::new(request.page, request.limit, total),
        suggestions,
        ..SearchResponse::empty(request, categories)
    }
}

fn matches_category(post: &Post, wanted: Option<&str>) -> bool {
    wanted.is_none_or(|wanted| post.category.name.to_lowercase() == wanted.to_lowercase())
}

fn matches_author(post: &Post, wanted: Option<&str>) -> bool {
    let Some(wanted) = wanted.map(str::to_lowercase) else {
        return true;
    };
    post.author.name.to_lowercase() == wanted
        || post
            .author
            .slug
            .as_deref()
            .is_some_and(|slug| slug.to_lowercase() == wanted)
}

fn sort_posts(posts: &mut [Post], order: SortOrder) {
    match order {
        SortOrder::Relevance => {}
        SortOrder::Date => posts.sort_by(|a, b| b.published_at.cmp(&a.published_at)),
        SortOrder::Title => {
            posts.sort_by_cached_key(|post| post.title.to_lowercase());
        }
    }
}

fn distinct_categories(posts: &[Post]) -> Vec<CategoryRef> {
    let mut seen = IndexSet::new();
    posts
        .iter()
        .filter(|post| seen.insert(post.category.name.to_lowercase()))
        .map(|post| post.category.clone())
        .collect()
}

/// Category names, tags and title words of the leading results that contain
/// the query, de-duplicated case-insensitively.
pub fn suggestions(query: &str, results: &[Post]) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut seen = IndexSet::new();
    let mut found = Vec::new();
    let candidates = results.iter().take(SUGGESTION_SCAN_DEPTH).flat_map(|post| {
        std::iter::once(post.category.name.as_str())
            .chain(post.tags.iter().map(String::as_str))
            .chain(
                post.title
                    .split_whitespace()
                    .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric())),
            )
    });

    for candidate in candidates {
        if found.len() == MAX_SUGGESTIONS {
            break;
        }
        let lowered = candidate.to_lowercase();
        if !candidate.is_empty() && lowered.contains(&needle) && seen.insert(lowered) {
            found.push(candidate.to_string());
        }
    }
    found
}
