// src/health.rs
//! Deep health probe: content source reachability, database counts and
//! cache statistics.

use crate::cache::{CacheManager, CacheStats};
use crate::config::{DatabaseIds, SiteConfig};
use crate::notion::ContentSource;
use crate::types::DatabaseId;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceProbe {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseProbe {
    pub configured: bool,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DatabaseProbe {
    fn unconfigured() -> Self {
        Self {
            configured: false,
            reachable: false,
            count: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseProbes {
    pub posts: DatabaseProbe,
    pub authors: DatabaseProbe,
    pub categories: DatabaseProbe,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub url: Option<String>,
    /// Whether a Google site-verification token is configured.
    pub verification_configured: bool,
    pub webhook_secret_configured: bool,
}

impl SiteInfo {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            url: config.site_url.as_ref().map(|url| url.as_str().to_string()),
            verification_configured: config.google_site_verification.is_some(),
            webhook_secret_configured: config.webhook_secret.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub site: SiteInfo,
    pub notion: SourceProbe,
    pub databases: DatabaseProbes,
    pub cache: CacheStats,
}

impl HealthReport {
    /// Healthy needs the source and the posts database; the others are
    /// reported but optional.
    pub fn is_healthy(&self) -> bool {
        self.notion.reachable && self.databases.posts.reachable
    }
}

/// Probe everything concurrently and assemble the report.
pub async fn probe(
    source: &dyn ContentSource,
    databases: &DatabaseIds,
    cache: &CacheManager,
    site: SiteInfo,
) -> HealthReport {
    let (user, posts, authors, categories) = futures::join!(
        source.current_user(),
        probe_database(source, databases.posts()),
        probe_database(source, databases.authors.as_ref()),
        probe_database(source, databases.categories.as_ref()),
    );

    let notion = match user {
        Ok(user) => SourceProbe {
            reachable: true,
            user: user.name,
            error: None,
        },
        Err(e) => {
            log::warn!("Health probe: content source unreachable: {}", e);
            SourceProbe {
                reachable: false,
                user: None,
                error: Some(e.to_string()),
            }
        }
    };

    let mut report = HealthReport {
        status: HealthStatus::Degraded,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        site,
        notion,
        databases: DatabaseProbes {
            posts,
            authors,
            categories,
        },
        cache: cache.stats(),
    };
    if report.is_healthy() {
        report.status = HealthStatus::Healthy;
    }
    report
}

async fn probe_database(source: &dyn ContentSource, id: Option<&DatabaseId>) -> DatabaseProbe {
    let Some(id) = id else {
        return DatabaseProbe::unconfigured();
    };
    match source.query_database(id).await {
        Ok(pages) => DatabaseProbe {
            configured: true,
            reachable: true,
            count: Some(pages.len()),
            error: None,
        },
        Err(e) => {
            log::warn!("Health probe: database {} unreachable: {}", id, e);
            DatabaseProbe {
                configured: true,
                reachable: false,
                count: None,
                error: Some(e.to_string()),
            }
        }
    }
}
