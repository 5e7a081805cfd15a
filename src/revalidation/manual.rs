// src/revalidation/manual.rs
//! Manual revalidation: maps an explicit `type` selector onto a plan.

use super::Invalidation;
use crate::constants::{
    author_path, category_path, post_path, ALL_TAGS, ROOT_PATH, TAG_AUTHORS, TAG_CATEGORIES,
    TAG_POST, TAG_POSTS,
};
use serde::Deserialize;
use thiserror::Error;

/// Body of `POST /api/revalidate`; also the decoded query of the GET form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevalidateRequest {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// What the caller asked to revalidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevalidationTarget {
    Post { slug: Option<String> },
    Posts,
    Category { slug: Option<String> },
    Author { slug: Option<String> },
    All,
    /// Any other selector accompanied by an explicit tag list.
    Custom { label: String, tags: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("Missing revalidation type")]
    MissingType,

    #[error("Invalid revalidation type '{0}' (expected post, posts, category, author, all, or a tags list)")]
    UnknownType(String),
}

impl RevalidationTarget {
    /// Resolve the selector of a request. Unrecognised selectors are only
    /// accepted together with a non-empty tag list.
    pub fn from_request(request: &RevalidateRequest) -> Result<Self, TargetError> {
        let slug = request
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let tags: Vec<String> = request
            .tags
            .iter()
            .flatten()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let kind = request.kind.as_deref().map(str::trim).unwrap_or_default();

        match kind {
            "post" => Ok(Self::Post { slug }),
            "posts" => Ok(Self::Posts),
            "category" => Ok(Self::Category { slug }),
            "author" => Ok(Self::Author { slug }),
            "all" => Ok(Self::All),
            _ if !tags.is_empty() => Ok(Self::Custom {
                label: if kind.is_empty() {
                    "tags".to_string()
                } else {
                    kind.to_string()
                },
                tags,
            }),
            "" => Err(TargetError::MissingType),
            other => Err(TargetError::UnknownType(other.to_string())),
        }
    }

    /// The `type` echoed back to the caller.
    pub fn label(&self) -> &str {
        match self {
            Self::Post { .. } => "post",
            Self::Posts => "posts",
            Self::Category { .. } => "category",
            Self::Author { .. } => "author",
            Self::All => "all",
            Self::Custom { label, .. } => label,
        }
    }

    /// The ordered invalidations this target stands for.
    pub fn plan(&self) -> Vec<Invalidation> {
        match self {
            Self::Post { slug } => {
                let mut plan = vec![Invalidation::tag(TAG_POST), Invalidation::tag(TAG_POSTS)];
                if let Some(slug) = slug {
                    plan.push(Invalidation::path(post_path(slug)));
                }
                plan
            }
            Self::Posts => vec![Invalidation::tag(TAG_POSTS), Invalidation::path(ROOT_PATH)],
            Self::Category { slug } => {
                let mut plan = vec![Invalidation::tag(TAG_CATEGORIES)];
                if let Some(slug) = slug {
                    plan.push(Invalidation::path(category_path(slug)));
                }
                plan
            }
            Self::Author { slug } => {
                let mut plan = vec![Invalidation::tag(TAG_AUTHORS)];
                if let Some(slug) = slug {
                    plan.push(Invalidation::path(author_path(slug)));
                }
                plan
            }
            Self::All => ALL_TAGS
                .iter()
                .map(|tag| Invalidation::tag(*tag))
                .chain(std::iter::once(Invalidation::path(ROOT_PATH)))
                .collect(),
            Self::Custom { tags, .. } => tags.iter().cloned().map(Invalidation::Tag).collect(),
        }
    }
}
