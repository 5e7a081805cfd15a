// src/notion/properties.rs
//! Typed page properties and the extraction functions over them.
//!
//! Each property type Notion sends is a variant of [`PropertyValue`].
//! Extraction never panics and never chains optional access: every
//! `extract_*` function returns a `Result` whose error says exactly why the
//! value was unavailable, so callers decide what a missing value means.

use crate::types::{Slug, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Property bag of a page, keyed by property name.
pub type Properties = HashMap<String, PropertyValue>;

/// A fragment of rich text; only its plain rendering matters here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// Concatenate rich text fragments into their plain rendering.
pub fn plain_text(items: &[RichText]) -> String {
    items.iter().map(|item| item.plain_text.as_str()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUrl {
    pub url: String,
}

/// Uploaded (`file`) or linked (`external`) file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file: Option<FileUrl>,
    #[serde(default)]
    pub external: Option<FileUrl>,
}

impl FileRef {
    pub fn url(&self) -> Option<&str> {
        self.file
            .as_ref()
            .or(self.external.as_ref())
            .map(|f| f.url.as_str())
    }
}

/// A single property value, one variant per Notion property type.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Title(Vec<RichText>),
    RichText(Vec<RichText>),
    /// `select` and `status` share a shape.
    Select(Option<SelectOption>),
    MultiSelect(Vec<SelectOption>),
    Relation(Vec<RelationRef>),
    Date(Option<DateRange>),
    Number(Option<f64>),
    Url(Option<String>),
    Files(Vec<FileRef>),
    Checkbox(bool),
    /// A type this service does not read; carries the type name.
    Unsupported(String),
}

/// Payload keys in the order they are probed when `type` is absent.
const KNOWN_KINDS: [&str; 11] = [
    "title",
    "rich_text",
    "select",
    "status",
    "multi_select",
    "relation",
    "date",
    "number",
    "url",
    "files",
    "checkbox",
];

impl PropertyValue {
    /// The Notion type name of this value.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Title(_) => "title",
            Self::RichText(_) => "rich_text",
            Self::Select(_) => "select",
            Self::MultiSelect(_) => "multi_select",
            Self::Relation(_) => "relation",
            Self::Date(_) => "date",
            Self::Number(_) => "number",
            Self::Url(_) => "url",
            Self::Files(_) => "files",
            Self::Checkbox(_) => "checkbox",
            Self::Unsupported(kind) => kind,
        }
    }

    fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(mut object) = value else {
            return Ok(Self::Unsupported("non_object".to_string()));
        };

        // API responses carry `type`; webhook payloads are sometimes trimmed
        // down to the value key alone.
        let kind = match object.get("type").and_then(Value::as_str) {
            Some(kind) => kind.to_string(),
            None => match KNOWN_KINDS.iter().find(|k| object.contains_key(**k)) {
                Some(kind) => kind.to_string(),
                None => return Ok(Self::Unsupported("unknown".to_string())),
            },
        };

        let payload = object.remove(&kind).unwrap_or(Value::Null);
        let value = match kind.as_str() {
            "title" => Self::Title(serde_json::from_value(payload)?),
            "rich_text" => Self::RichText(serde_json::from_value(payload)?),
            "select" | "status" => Self::Select(serde_json::from_value(payload)?),
            "multi_select" => Self::MultiSelect(serde_json::from_value(payload)?),
            "relation" => Self::Relation(serde_json::from_value(payload)?),
            "date" => Self::Date(serde_json::from_value(payload)?),
            "number" => Self::Number(serde_json::from_value(payload)?),
            "url" => Self::Url(serde_json::from_value(payload)?),
            "files" => Self::Files(serde_json::from_value(payload)?),
            "checkbox" => Self::Checkbox(serde_json::from_value(payload)?),
            _ => Self::Unsupported(kind),
        };
        Ok(value)
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        // One malformed property must not sink the whole page.
        Ok(Self::from_json(raw).unwrap_or_else(|e| {
            log::debug!("Unreadable property value: {}", e);
            Self::Unsupported("malformed".to_string())
        }))
    }
}

/// Why a property value could not be extracted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("property '{property}' is not present")]
    Missing { property: String },

    #[error("property '{property}' is a {found}, expected {expected}")]
    WrongType {
        property: String,
        expected: &'static str,
        found: String,
    },

    #[error("property '{property}' is empty")]
    Empty { property: String },

    #[error("property '{property}' holds an invalid slug: {source}")]
    InvalidSlug {
        property: String,
        source: ValidationError,
    },

    #[error("property '{property}' holds an unreadable date '{value}'")]
    InvalidDate { property: String, value: String },
}

impl ExtractionError {
    /// Absence is ordinary; every other failure deserves a warning.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }

    fn wrong_type(property: &str, expected: &'static str, found: &PropertyValue) -> Self {
        Self::WrongType {
            property: property.to_string(),
            expected,
            found: found.type_name().to_string(),
        }
    }

    fn empty(property: &str) -> Self {
        Self::Empty {
            property: property.to_string(),
        }
    }
}

fn lookup<'a>(props: &'a Properties, name: &str) -> Result<&'a PropertyValue, ExtractionError> {
    props.get(name).ok_or_else(|| ExtractionError::Missing {
        property: name.to_string(),
    })
}

/// Non-empty trimmed text of a title or rich-text property.
pub fn extract_text(props: &Properties, name: &str) -> Result<String, ExtractionError> {
    let text = match lookup(props, name)? {
        PropertyValue::Title(items) | PropertyValue::RichText(items) => plain_text(items),
        other => return Err(ExtractionError::wrong_type(name, "rich_text", other)),
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractionError::empty(name));
    }
    Ok(text.to_string())
}

/// Text of whichever property is the page title, whatever its name.
pub fn extract_title(props: &Properties) -> Result<String, ExtractionError> {
    props
        .iter()
        .find_map(|(name, value)| match value {
            PropertyValue::Title(_) => Some(extract_text(props, name)),
            _ => None,
        })
        .unwrap_or_else(|| {
            Err(ExtractionError::Missing {
                property: "title".to_string(),
            })
        })
}

pub fn extract_slug(props: &Properties, name: &str) -> Result<Slug, ExtractionError> {
    let text = extract_text(props, name)?;
    Slug::new(text).map_err(|source| ExtractionError::InvalidSlug {
        property: name.to_string(),
        source,
    })
}

pub fn extract_select(props: &Properties, name: &str) -> Result<SelectOption, ExtractionError> {
    match lookup(props, name)? {
        PropertyValue::Select(Some(option)) if !option.name.trim().is_empty() => {
            Ok(option.clone())
        }
        PropertyValue::Select(_) => Err(ExtractionError::empty(name)),
        other => Err(ExtractionError::wrong_type(name, "select", other)),
    }
}

/// A select option, or plain text read as an uncoloured option. Older
/// databases keep some choices as rich text.
pub fn extract_select_or_text(
    props: &Properties,
    name: &str,
) -> Result<SelectOption, ExtractionError> {
    match extract_select(props, name) {
        Err(ExtractionError::WrongType { .. }) => Ok(SelectOption {
            id: None,
            name: extract_text(props, name)?,
            color: None,
        }),
        other => other,
    }
}

/// Option names of a multi-select, in the order Notion lists them.
pub fn extract_multi_select(props: &Properties, name: &str) -> Result<Vec<String>, ExtractionError> {
    match lookup(props, name)? {
        PropertyValue::MultiSelect(options) => Ok(options
            .iter()
            .map(|option| option.name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()),
        other => Err(ExtractionError::wrong_type(name, "multi_select", other)),
    }
}

/// IDs of related pages; an empty relation is an error.
pub fn extract_relation_ids(props: &Properties, name: &str) -> Result<Vec<String>, ExtractionError> {
    match lookup(props, name)? {
        PropertyValue::Relation(refs) if !refs.is_empty() => {
            Ok(refs.iter().map(|r| r.id.clone()).collect())
        }
        PropertyValue::Relation(_) => Err(ExtractionError::empty(name)),
        other => Err(ExtractionError::wrong_type(name, "relation", other)),
    }
}

pub fn extract_date(props: &Properties, name: &str) -> Result<DateTime<Utc>, ExtractionError> {
    match lookup(props, name)? {
        PropertyValue::Date(Some(range)) => {
            parse_notion_date(&range.start).ok_or_else(|| ExtractionError::InvalidDate {
                property: name.to_string(),
                value: range.start.clone(),
            })
        }
        PropertyValue::Date(None) => Err(ExtractionError::empty(name)),
        other => Err(ExtractionError::wrong_type(name, "date", other)),
    }
}

pub fn extract_number(props: &Properties, name: &str) -> Result<f64, ExtractionError> {
    match lookup(props, name)? {
        PropertyValue::Number(Some(n)) => Ok(*n),
        PropertyValue::Number(None) => Err(ExtractionError::empty(name)),
        other => Err(ExtractionError::wrong_type(name, "number", other)),
    }
}

/// A URL from a `url`, `files` (first file) or rich-text property.
pub fn extract_url(props: &Properties, name: &str) -> Result<String, ExtractionError> {
    match lookup(props, name)? {
        PropertyValue::Url(Some(url)) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        PropertyValue::Url(_) => Err(ExtractionError::empty(name)),
        PropertyValue::Files(files) => files
            .iter()
            .find_map(|f| f.url())
            .map(str::to_string)
            .ok_or_else(|| ExtractionError::empty(name)),
        PropertyValue::RichText(_) => extract_text(props, name),
        other => Err(ExtractionError::wrong_type(name, "url", other)),
    }
}

/// Notion dates are either full RFC 3339 timestamps or bare `YYYY-MM-DD`.
pub fn parse_notion_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
