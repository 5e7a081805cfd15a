// src/config.rs
//! Command-line and environment configuration.

use crate::constants::{DEFAULT_CACHE_TTL_SECS, DEFAULT_REVALIDATION_SECRET, NOTION_API_BASE_URL};
use crate::error::AppError;
use crate::types::{ApiKey, DatabaseId, SharedSecret, ValidatedUrl};
use clap::Parser;
use std::path::PathBuf;

/// Server process options.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerArgs {
    /// Address the HTTP server binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Seconds a cached content response stays fresh
    #[arg(long, env = "CACHE_TTL", default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl: u64,

    /// Path to a .env file loaded before configuration is read
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    pub dotenv: PathBuf,
}

/// The Notion databases backing the site. Any of them may be unset; the
/// posts database falls back to the main database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseIds {
    pub main: Option<DatabaseId>,
    pub posts: Option<DatabaseId>,
    pub authors: Option<DatabaseId>,
    pub categories: Option<DatabaseId>,
}

impl DatabaseIds {
    /// Database holding the posts.
    pub fn posts(&self) -> Option<&DatabaseId> {
        self.posts.as_ref().or(self.main.as_ref())
    }
}

/// Resolved site configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub notion_token: ApiKey,
    pub notion_api_base: String,
    pub databases: DatabaseIds,
    /// Shared secret for Notion deliveries. Reported by health only; the
    /// webhook itself checks for a signature header and nothing more.
    pub webhook_secret: Option<SharedSecret>,
    pub revalidation_secret: SharedSecret,
    pub site_url: Option<ValidatedUrl>,
    pub google_site_verification: Option<String>,
}

impl SiteConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let token = var("NOTION_TOKEN").ok_or_else(|| {
            AppError::MissingConfiguration("NOTION_TOKEN environment variable not set".to_string())
        })?;
        let notion_token = ApiKey::new(token)?;

        let database = |name: &str| -> Result<Option<DatabaseId>, AppError> {
            var(name)
                .map(|raw| DatabaseId::parse(&raw))
                .transpose()
                .map_err(|e| AppError::MissingConfiguration(format!("{}: {}", name, e)))
        };

        let databases = DatabaseIds {
            main: database("NOTION_DATABASE_ID")?,
            posts: database("NOTION_POSTS_DATABASE_ID")?,
            authors: database("NOTION_AUTHORS_DATABASE_ID")?,
            categories: database("NOTION_CATEGORIES_DATABASE_ID")?,
        };
        if databases.posts().is_none() {
            log::warn!("No posts database configured; content endpoints will fail");
        }

        let revalidation_secret = match var("REVALIDATION_SECRET") {
            Some(secret) => SharedSecret::new(secret)?,
            None => {
                log::warn!("REVALIDATION_SECRET not set, using the development default");
                SharedSecret::new(DEFAULT_REVALIDATION_SECRET)?
            }
        };

        let config = Self {
            notion_token,
            notion_api_base: var("NOTION_API_BASE_URL")
                .unwrap_or_else(|| NOTION_API_BASE_URL.to_string()),
            databases,
            webhook_secret: var("NOTION_WEBHOOK_SECRET")
                .map(SharedSecret::new)
                .transpose()?,
            revalidation_secret,
            site_url: var("NEXT_PUBLIC_SITE_URL")
                .map(|url| ValidatedUrl::parse(&url))
                .transpose()?,
            google_site_verification: var("GOOGLE_SITE_VERIFICATION"),
        };

        log::info!(
            "Configuration loaded (token: {}, posts db: {}, authors db: {}, categories db: {})",
            config.notion_token,
            describe(config.databases.posts()),
            describe(config.databases.authors.as_ref()),
            describe(config.databases.categories.as_ref()),
        );

        Ok(config)
    }
}

fn describe(id: Option<&DatabaseId>) -> String {
    id.map(ToString::to_string)
        .unwrap_or_else(|| "unset".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const POSTS: &str = "550e8400e29b41d4a716446655440000";

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn token_is_required() {
        let err = SiteConfig::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, AppError::MissingConfiguration(_)));
    }

    #[test]
    fn revalidation_secret_defaults_for_development() {
        let config =
            SiteConfig::from_lookup(env(&[("NOTION_TOKEN", "secret_abcdefghijklmnopqrstu")]))
                .unwrap();
        assert!(config.revalidation_secret.matches(Some("dev-secret")));
        assert!(config.webhook_secret.is_none());
        assert_eq!(config.notion_api_base, NOTION_API_BASE_URL);
    }

    #[test]
    fn posts_database_falls_back_to_main() {
        let config = SiteConfig::from_lookup(env(&[
            ("NOTION_TOKEN", "secret_abcdefghijklmnopqrstu"),
            ("NOTION_DATABASE_ID", POSTS),
            ("NOTION_AUTHORS_DATABASE_ID", ""),
        ]))
        .unwrap();
        assert_eq!(config.databases.posts().map(|id| id.as_str()), Some(POSTS));
        assert!(config.databases.authors.is_none());
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(SiteConfig::from_lookup(env(&[
            ("NOTION_TOKEN", "secret_abcdefghijklmnopqrstu"),
            ("NOTION_POSTS_DATABASE_ID", "not-an-id"),
        ]))
        .is_err());
        assert!(SiteConfig::from_lookup(env(&[
            ("NOTION_TOKEN", "secret_abcdefghijklmnopqrstu"),
            ("NEXT_PUBLIC_SITE_URL", "ftp://site"),
        ]))
        .is_err());
    }
}
