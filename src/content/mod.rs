// src/content/mod.rs
//! The site's content: domain shapes, the transform from Notion rows, and
//! cached read accessors.

pub mod model;
pub mod queries;
pub mod transform;

pub use model::{Author, AuthorRef, Category, CategoryRef, Post};
pub use queries::ContentQueries;
