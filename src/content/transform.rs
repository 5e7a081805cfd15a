// src/content/transform.rs
//! Maps raw Notion pages into posts, authors and categories.
//!
//! Only the title is mandatory. Every other property has a fallback, so a
//! half-filled row in the workspace still renders.

use super::model::{Author, AuthorRef, Category, CategoryRef, Post};
use crate::constants::{
    DEFAULT_AUTHOR_NAME, DEFAULT_CATEGORY_NAME, EXCERPT_FALLBACK_LENGTH, PROP_AUTHOR, PROP_AVATAR,
    PROP_BIO, PROP_CATEGORY, PROP_COLOR, PROP_DESCRIPTION, PROP_EXCERPT, PROP_PUBLISHED,
    PROP_READING_TIME, PROP_SLUG, PROP_TAGS, WORDS_PER_MINUTE,
};
use crate::notion::properties::{
    extract_date, extract_multi_select, extract_number, extract_relation_ids, extract_select,
    extract_select_or_text, extract_slug, extract_text, extract_title, extract_url,
    ExtractionError,
};
use crate::notion::responses::NotionPage;
use crate::types::PageId;
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Lowercase a name and replace whitespace runs with hyphens.
///
/// `"Gestão Pública"` becomes `"gestão-pública"`.
pub fn slugify(name: &str) -> String {
    WHITESPACE
        .replace_all(name.trim(), "-")
        .to_lowercase()
}

/// Minutes needed to read `text`, never less than one.
pub fn reading_time(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Leading slice of `body` used when a post has no excerpt of its own.
pub fn fallback_excerpt(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= EXCERPT_FALLBACK_LENGTH {
        return body.to_string();
    }
    let cut: String = body.chars().take(EXCERPT_FALLBACK_LENGTH).collect();
    format!("{}...", cut.trim_end())
}

/// Builds a post from a row of the posts database.
///
/// `body` holds the page's paragraphs (empty for list views); `authors`
/// resolves the `Author` relation.
pub fn transform_notion_post(
    page: &NotionPage,
    body: &[String],
    authors: &[Author],
) -> Result<Post, ExtractionError> {
    let props = &page.properties;
    let title = extract_title(props)?;
    let body = body.join("\n\n");

    let slug = extract_slug(props, PROP_SLUG)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|_| slugify(&title));

    let category = match extract_select_or_text(props, PROP_CATEGORY) {
        Ok(option) => CategoryRef {
            slug: slugify(&option.name),
            name: option.name,
            color: option.color,
        },
        Err(_) => CategoryRef {
            name: DEFAULT_CATEGORY_NAME.to_string(),
            slug: slugify(DEFAULT_CATEGORY_NAME),
            color: None,
        },
    };

    let author = extract_relation_ids(props, PROP_AUTHOR)
        .ok()
        .and_then(|ids| resolve_author(&ids, authors))
        .unwrap_or_else(default_author);

    let excerpt = extract_text(props, PROP_EXCERPT).unwrap_or_else(|_| fallback_excerpt(&body));

    let published_at = extract_date(props, PROP_PUBLISHED)
        .ok()
        .or(page.created_time)
        .unwrap_or_default();

    let reading_time = match extract_number(props, PROP_READING_TIME) {
        Ok(minutes) if minutes >= 1.0 => minutes.round() as u32,
        _ => reading_time(if body.is_empty() { &excerpt } else { &body }),
    };

    let tags: IndexSet<String> = extract_multi_select(props, PROP_TAGS)
        .unwrap_or_default()
        .into_iter()
        .collect();

    Ok(Post {
        id: page.id.as_str().to_string(),
        title,
        slug,
        excerpt,
        body,
        category,
        author,
        published_at,
        reading_time,
        tags: tags.into_iter().collect(),
        url: page.url.clone(),
    })
}

fn resolve_author(relation_ids: &[String], authors: &[Author]) -> Option<AuthorRef> {
    relation_ids.iter().find_map(|raw| {
        let normalized = PageId::parse(raw)
            .map(|id| id.as_str().to_string())
            .unwrap_or_else(|_| raw.clone());
        authors
            .iter()
            .find(|author| author.id == normalized)
            .map(Author::to_ref)
    })
}

fn default_author() -> AuthorRef {
    AuthorRef {
        id: None,
        name: DEFAULT_AUTHOR_NAME.to_string(),
        slug: None,
        avatar: None,
        bio: None,
    }
}

/// Builds an author from a row of the authors database.
pub fn transform_author(page: &NotionPage) -> Result<Author, ExtractionError> {
    let props = &page.properties;
    let name = extract_title(props)?;
    let slug = extract_slug(props, PROP_SLUG)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|_| slugify(&name));

    Ok(Author {
        id: page.id.as_str().to_string(),
        slug,
        bio: extract_text(props, PROP_BIO).unwrap_or_default(),
        avatar: extract_url(props, PROP_AVATAR).ok(),
        name,
    })
}

/// Builds a category from a row of the categories database; `count` is 0.
pub fn transform_category(page: &NotionPage) -> Result<Category, ExtractionError> {
    let props = &page.properties;
    let name = extract_title(props)?;
    let slug = extract_slug(props, PROP_SLUG)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|_| slugify(&name));
    let color = extract_select(props, PROP_COLOR)
        .map(|option| option.name)
        .or_else(|_| extract_text(props, PROP_COLOR))
        .ok();

    Ok(Category {
        id: page.id.as_str().to_string(),
        slug,
        description: extract_text(props, PROP_DESCRIPTION).ok(),
        color,
        count: 0,
        name,
    })
}
