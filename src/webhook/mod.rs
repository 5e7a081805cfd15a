// src/webhook/mod.rs
//! Notion change notifications and the invalidations they trigger.

pub mod dispatch;
pub mod payload;

pub use dispatch::{plan, ContentDatabase, Dispatch, WebhookPlan};
pub use payload::{Action, EventKind, WebhookPayload};
