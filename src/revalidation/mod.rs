// src/revalidation/mod.rs
//! Revalidation primitives: what can be invalidated and who does it.
//!
//! Both the webhook and the manual endpoint reduce their input to an ordered
//! plan of [`Invalidation`]s with pure functions, then hand the plan to
//! [`execute`]. Planning never touches the network, so every dispatch
//! decision is testable on its own.

pub mod manual;

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One invalidation step: a cache tag or a site path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Invalidation {
    Tag(String),
    Path(String),
}

impl Invalidation {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }
}

impl fmt::Display for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => write!(f, "tag:{}", tag),
            Self::Path(path) => write!(f, "path:{}", path),
        }
    }
}

/// The framework-level invalidation primitives.
#[async_trait::async_trait]
pub trait Revalidator: Send + Sync {
    async fn revalidate_tag(&self, tag: &str) -> Result<(), AppError>;
    async fn revalidate_path(&self, path: &str) -> Result<(), AppError>;
}

/// Issues a plan in order, stopping at the first failure.
pub async fn execute(revalidator: &dyn Revalidator, plan: &[Invalidation]) -> Result<(), AppError> {
    for step in plan {
        log::debug!("Revalidating {}", step);
        match step {
            Invalidation::Tag(tag) => revalidator.revalidate_tag(tag).await?,
            Invalidation::Path(path) => revalidator.revalidate_path(path).await?,
        }
    }
    if !plan.is_empty() {
        log::info!(
            "Revalidated {}",
            plan.iter()
                .map(Invalidation::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}
