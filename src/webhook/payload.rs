// src/webhook/payload.rs
//! Wire shape of the change notifications Notion delivers.

use crate::notion::responses::ParentRef;
use crate::notion::Properties;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Page,
    Database,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
    /// Unrecognised or absent; handled like an update.
    #[default]
    #[serde(other)]
    Other,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The object that changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangedObject {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub parent: Option<ParentRef>,
    #[serde(default)]
    pub properties: Properties,
}

impl ChangedObject {
    pub fn parent_database_id(&self) -> Option<&str> {
        self.parent.as_ref()?.database_id.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub object: ChangedObject,
    #[serde(default)]
    pub timestamp: Option<String>,
}
