// src/notion/responses.rs
//! Wire shapes of the Notion REST API responses this service reads.
//!
//! Only the fields the site uses are modelled; everything else in a
//! response is ignored by serde.

use super::properties::{plain_text, Properties, RichText};
use crate::types::PageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Generic paginated response wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Parent reference of a page. Only database parents matter to the site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentRef {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub database_id: Option<String>,
    #[serde(default)]
    pub page_id: Option<String>,
}

/// A page as returned by database queries and search.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionPage {
    pub id: PageId,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub in_trash: bool,
    #[serde(default)]
    pub parent: Option<ParentRef>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub url: Option<String>,
}

impl NotionPage {
    /// Raw database id of the page's parent, when it lives in a database.
    pub fn parent_database_id(&self) -> Option<&str> {
        self.parent.as_ref()?.database_id.as_deref()
    }

    /// Archived and trashed pages are invisible to the site.
    pub fn is_live(&self) -> bool {
        !self.archived && !self.in_trash
    }
}

/// A content block; only its rich text is read.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub content: HashMap<String, Value>,
}

impl NotionBlock {
    /// Plain text of the block's `rich_text`, if it has any.
    pub fn plain_text(&self) -> Option<String> {
        let rich_text = self.content.get(&self.kind)?.get("rich_text")?.clone();
        let items: Vec<RichText> = serde_json::from_value(rich_text).ok()?;
        let text = plain_text(&items);
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// The bot user behind the integration token (`GET /users/me`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Error envelope Notion returns with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionErrorBody {
    #[serde(default)]
    pub status: u16,
    pub code: String,
    #[serde(default)]
    pub message: String,
}
