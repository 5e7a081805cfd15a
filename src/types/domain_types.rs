// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// API key for Notion API authentication
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new API key with validation
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();

        if key.is_empty() {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key cannot be empty".to_string(),
            });
        }

        if !key.starts_with("secret_") && !key.starts_with("ntn_") {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key must start with 'secret_' or 'ntn_'".to_string(),
            });
        }

        if key.len() < 20 {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key is too short".to_string(),
            });
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Redact API key in display
        let prefix: String = self.0.chars().take(10).collect();
        write!(f, "{}...", prefix)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self)
    }
}

/// A shared secret guarding an endpoint (revalidation, webhook).
///
/// Comparison is a plain string equality; callers that need timing
/// resistance must not rely on this type.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, ValidationError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(ValidationError::EmptyField("secret"));
        }
        Ok(Self(secret))
    }

    /// Whether a caller-supplied value equals this secret.
    pub fn matches(&self, candidate: Option<&str>) -> bool {
        candidate == Some(self.0.as_str())
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret(***)")
    }
}

/// Validated URL type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl(Url);

impl Serialize for ValidatedUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValidatedUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ValidatedUrl::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl ValidatedUrl {
    /// Create a new validated URL
    pub fn parse(url: &str) -> Result<Self, ValidationError> {
        match Url::parse(url) {
            Ok(parsed_url) => {
                if parsed_url.scheme() != "http" && parsed_url.scheme() != "https" {
                    return Err(ValidationError::InvalidUrl {
                        url: url.to_string(),
                        reason: "Only HTTP and HTTPS URLs are supported".to_string(),
                    });
                }
                Ok(Self(parsed_url))
            }
            Err(e) => Err(ValidationError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// URL slug of a post, author or category.
///
/// Slugs are path segments: non-empty and free of `/` and whitespace.
/// Uniqueness is owned by the content source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField("slug"));
        }
        if trimmed.contains('/') || trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidSlug {
                slug: value.clone(),
                reason: "slugs cannot contain '/' or whitespace".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
