// src/content/model.rs
//! The site's content shapes. All of them are request-scoped copies of
//! records owned by the content source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category as embedded in a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Author as embedded in a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    /// Paragraphs joined by blank lines; empty in list views.
    #[serde(default)]
    pub body: String,
    pub category: CategoryRef,
    pub author: AuthorRef,
    pub published_at: DateTime<Utc>,
    /// Minutes.
    pub reading_time: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Author {
    pub fn to_ref(&self) -> AuthorRef {
        AuthorRef {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            slug: Some(self.slug.clone()),
            avatar: self.avatar.clone(),
            bio: Some(self.bio.clone()).filter(|b| !b.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Number of posts in the category, computed per request.
    #[serde(default)]
    pub count: usize,
}
