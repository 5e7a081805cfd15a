// src/content/queries.rs
//! Read-through accessors over the content source.
//!
//! List reads go through the cache manager, tagged so that revalidation
//! drops them; search is always live.

use super::model::{Author, Category, Post};
use super::transform::{slugify, transform_author, transform_category, transform_notion_post};
use crate::cache::{CacheManager, CacheScope};
use crate::config::DatabaseIds;
use crate::constants::{post_path, ROOT_PATH, TAG_AUTHORS, TAG_CATEGORIES, TAG_POST, TAG_POSTS};
use crate::error::AppError;
use crate::notion::properties::ExtractionError;
use crate::notion::responses::NotionPage;
use crate::notion::ContentSource;
use crate::types::DatabaseId;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct ContentQueries {
    source: Arc<dyn ContentSource>,
    cache: Arc<CacheManager>,
    databases: DatabaseIds,
}

impl ContentQueries {
    pub fn new(
        source: Arc<dyn ContentSource>,
        cache: Arc<CacheManager>,
        databases: DatabaseIds,
    ) -> Self {
        Self {
            source,
            cache,
            databases,
        }
    }

    fn posts_database(&self) -> Result<&DatabaseId, AppError> {
        self.databases.posts().ok_or_else(|| {
            AppError::MissingConfiguration("no posts database configured".to_string())
        })
    }

    /// Every published post, newest first.
    pub async fn get_all_posts(&self) -> Result<Vec<Post>, AppError> {
        let scope = CacheScope::tagged(&[TAG_POSTS]).at_path(ROOT_PATH);
        self.cache
            .get_or_compute("posts:all", scope, || async move {
                let database = self.posts_database()?;
                let authors = self.authors_or_empty().await;
                let pages = self.source.query_database(database).await?;
                let mut posts = transform_all(&pages, |page| {
                    transform_notion_post(page, &[], &authors)
                });
                posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
                Ok(posts)
            })
            .await
    }

    /// One post with its body, or `None` when no row has that slug.
    ///
    /// The slug is resolved against the cached listing first; misses are
    /// never cached.
    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, AppError> {
        if !self.get_all_posts().await?.iter().any(|post| post.slug == slug) {
            return Ok(None);
        }

        let scope = CacheScope::tagged(&[TAG_POST, TAG_POSTS]).at_path(post_path(slug));
        let key = format!("post:{}", slug);
        self.cache
            .get_or_compute(&key, scope, || async move {
                let database = self.posts_database()?;
                let authors = self.authors_or_empty().await;
                let pages = self.source.query_database(database).await?;

                let Some(page) = pages.iter().find(|page| {
                    transform_notion_post(page, &[], &authors)
                        .map(|post| post.slug == slug)
                        .unwrap_or(false)
                }) else {
                    return Ok(None);
                };

                let body = match self.source.retrieve_block_text(&page.id).await {
                    Ok(body) => body,
                    // Archived between the query and the block fetch.
                    Err(e) if e.is_not_found() => return Ok(None),
                    Err(e) => return Err(e),
                };
                let post = transform_notion_post(page, &body, &authors).map_err(|e| {
                    AppError::MalformedResponse(format!("post '{}': {}", slug, e))
                })?;
                Ok(Some(post))
            })
            .await
    }

    /// Full-text search restricted to the posts database. Never cached.
    pub async fn search_posts(&self, query: &str) -> Result<Vec<Post>, AppError> {
        let pages = self.source.search_pages(query).await?;
        let posts_db = self.databases.posts();
        let pages: Vec<NotionPage> = pages
            .into_iter()
            .filter(|page| match (posts_db, page.parent_database_id()) {
                (Some(db), Some(parent)) => db.matches_raw(parent),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .collect();

        let authors = self.authors_or_empty().await;
        Ok(transform_all(&pages, |page| {
            transform_notion_post(page, &[], &authors)
        }))
    }

    pub async fn get_all_authors(&self) -> Result<Vec<Author>, AppError> {
        let Some(database) = self.databases.authors.clone() else {
            return Ok(Vec::new());
        };
        self.cache
            .get_or_compute("authors:all", CacheScope::tagged(&[TAG_AUTHORS]), || async move {
                let pages = self.source.query_database(&database).await?;
                Ok(transform_all(&pages, transform_author))
            })
            .await
    }

    pub async fn get_all_categories(&self) -> Result<Vec<Category>, AppError> {
        let Some(database) = self.databases.categories.clone() else {
            return Ok(Vec::new());
        };
        self.cache
            .get_or_compute(
                "categories:all",
                CacheScope::tagged(&[TAG_CATEGORIES]),
                || async move {
                    let pages = self.source.query_database(&database).await?;
                    Ok(transform_all(&pages, transform_category))
                },
            )
            .await
    }

    /// Categories with their post counts, busiest first.
    ///
    /// Categories used by posts but missing from the categories database are
    /// included too, so counts always add up to the number of posts.
    pub async fn get_category_stats(&self) -> Result<Vec<Category>, AppError> {
        let scope = CacheScope::tagged(&[TAG_CATEGORIES, TAG_POSTS]);
        self.cache
            .get_or_compute("categories:stats", scope, || async move {
                let categories = self.get_all_categories().await?;
                let posts = self.get_all_posts().await?;
                Ok(count_posts_per_category(categories, &posts))
            })
            .await
    }

    async fn authors_or_empty(&self) -> Vec<Author> {
        self.get_all_authors().await.unwrap_or_else(|e| {
            log::warn!("Authors unavailable, posts fall back to the site author: {}", e);
            Vec::new()
        })
    }
}

/// Transform every page, skipping (and logging) rows that cannot be read.
fn transform_all<T>(
    pages: &[NotionPage],
    transform: impl Fn(&NotionPage) -> Result<T, ExtractionError>,
) -> Vec<T> {
    pages
        .iter()
        .filter_map(|page| match transform(page) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("Skipping page {}: {}", page.id, e);
                None
            }
        })
        .collect()
}

/// Fill in `count` per category (case-insensitive name match).
pub fn count_posts_per_category(categories: Vec<Category>, posts: &[Post]) -> Vec<Category> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for post in posts {
        *counts.entry(post.category.name.to_lowercase()).or_default() += 1;
    }

    let mut result: Vec<Category> = categories
        .into_iter()
        .map(|mut category| {
            category.count = counts
                .remove(&category.name.to_lowercase())
                .unwrap_or_default();
            category
        })
        .collect();

    for post in posts {
        if let Some(count) = counts.remove(&post.category.name.to_lowercase()) {
            result.push(Category {
                id: post.category.slug.clone(),
                name: post.category.name.clone(),
                slug: slugify(&post.category.name),
                description: None,
                color: post.category.color.clone(),
                count,
            });
        }
    }

    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    result
}
