use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Strong typing for Notion object IDs with phantom types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// Marker types for different ID kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatabaseMarker;

pub type PageId = Id<PageMarker>;
pub type DatabaseId = Id<DatabaseMarker>;

impl<T> Id<T> {
    /// Parse the ID formats Notion hands out (bare, dashed, or a share URL)
    /// into the normalized 32-character lowercase form.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = normalize_notion_id(input)?;
        Ok(Self {
            value: normalized,
            _phantom: PhantomData,
        })
    }

    pub(crate) fn from_normalized(value: String) -> Self {
        Self {
            value,
            _phantom: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Get the ID with dashes, the form the REST API expects in paths.
    pub fn to_dashed(&self) -> String {
        if self.value.len() == 32 && !self.value.contains('-') {
            format!(
                "{}-{}-{}-{}-{}",
                &self.value[0..8],
                &self.value[8..12],
                &self.value[12..16],
                &self.value[16..20],
                &self.value[20..32]
            )
        } else {
            self.value.clone()
        }
    }

    /// Whether a raw ID string from a payload refers to this object.
    ///
    /// Unparseable input never matches.
    pub fn matches_raw(&self, raw: &str) -> bool {
        normalize_notion_id(raw)
            .map(|normalized| normalized == self.value)
            .unwrap_or(false)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        // Payload IDs that don't look like Notion IDs are kept verbatim so a
        // single odd record never fails a whole response.
        Ok(match normalize_notion_id(&value) {
            Ok(normalized) => Self::from_normalized(normalized),
            Err(_) => Self::from_normalized(value),
        })
    }
}

/// Normalize various Notion ID formats into a consistent format
fn normalize_notion_id(input: &str) -> Result<String, ValidationError> {
    let input = input.trim();

    if input.starts_with("http://") || input.starts_with("https://") {
        if let Some(id) = extract_id_from_url(input) {
            return normalize_notion_id(id);
        }
        return Err(ValidationError::InvalidId(format!(
            "Could not extract ID from URL: {}",
            input
        )));
    }

    let normalized = input.replace('-', "");

    if normalized.len() != 32 {
        return Err(ValidationError::InvalidId(format!(
            "Invalid ID length: expected 32 characters, got {}",
            normalized.len()
        )));
    }

    if !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidId(
            "ID must contain only hexadecimal characters".to_string(),
        ));
    }

    Ok(normalized.to_lowercase())
}

/// Extract ID from a Notion share URL (query string ignored)
fn extract_id_from_url(url: &str) -> Option<&str> {
    let url = url.split('?').next().unwrap_or(url).trim_end_matches('/');

    // Format: https://www.notion.so/[workspace]/[title]-[id]
    if let Some(pos) = url.rfind('-') {
        let potential_id = &url[pos + 1..];
        if potential_id.len() == 32 {
            return Some(potential_id);
        }
    }

    // Format: https://www.notion.so/[id]
    if let Some(pos) = url.rfind('/') {
        let potential_id = &url[pos + 1..];
        if potential_id.len() == 32 || (potential_id.len() == 36 && potential_id.contains('-')) {
            return Some(potential_id);
        }
    }

    None
}
