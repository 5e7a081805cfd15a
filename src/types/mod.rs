use thiserror::Error;

mod domain_types;
mod ids;

pub use domain_types::*;
pub use ids::*;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid Notion ID format: {0}")]
    InvalidId(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Invalid API key format: {reason}")]
    InvalidApiKey { reason: String },

    #[error("Invalid slug: {slug} - {reason}")]
    InvalidSlug { slug: String, reason: String },
}
