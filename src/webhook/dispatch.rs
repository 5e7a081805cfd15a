// src/webhook/dispatch.rs
//! Maps a webhook payload onto an invalidation plan.
//!
//! Planning is pure. Every targeted detail (slug, category, author) is an
//! explicit extraction whose failure only drops that detail: the broad
//! invalidation for the database is planned first and always stands.

use super::payload::{Action, EventKind, WebhookPayload};
use crate::config::DatabaseIds;
use crate::constants::{
    author_path, category_path, post_path, PROP_AUTHOR, PROP_CATEGORY, PROP_SLUG, ROOT_PATH,
    TAG_AUTHORS, TAG_CATEGORIES, TAG_POST, TAG_POSTS,
};
use crate::content::transform::slugify;
use crate::notion::properties::{
    extract_relation_ids, extract_select_or_text, extract_slug, ExtractionError,
};
use crate::notion::Properties;
use crate::revalidation::Invalidation;
use serde::Serialize;

/// The configured database a changed page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDatabase {
    Posts,
    Authors,
    Categories,
}

impl ContentDatabase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Authors => "authors",
            Self::Categories => "categories",
        }
    }

    fn broad_tag(&self) -> &'static str {
        match self {
            Self::Posts => TAG_POSTS,
            Self::Authors => TAG_AUTHORS,
            Self::Categories => TAG_CATEGORIES,
        }
    }

    /// Match a raw parent id against the configured databases.
    pub fn resolve(databases: &DatabaseIds, raw: &str) -> Option<Self> {
        let candidates = [
            (databases.posts(), Self::Posts),
            (databases.authors.as_ref(), Self::Authors),
            (databases.categories.as_ref(), Self::Categories),
        ];
        candidates
            .into_iter()
            .find(|(id, _)| id.is_some_and(|id| id.matches_raw(raw)))
            .map(|(_, database)| database)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebhookPlan {
    pub database: ContentDatabase,
    pub action: Action,
    pub invalidations: Vec<Invalidation>,
    /// Targeted details that were present but unreadable.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Not a page event.
    Ignored,
    /// The page lives outside the configured databases.
    UnknownDatabase,
    Planned(WebhookPlan),
}

pub fn plan(payload: &WebhookPayload, databases: &DatabaseIds) -> Dispatch {
    if payload.kind != EventKind::Page {
        return Dispatch::Ignored;
    }

    let Some(database) = payload
        .object
        .parent_database_id()
        .and_then(|raw| ContentDatabase::resolve(databases, raw))
    else {
        return Dispatch::UnknownDatabase;
    };

    let mut details = Details::default();
    let invalidations = match payload.action {
        Action::Delete => delete_plan(database),
        Action::Create | Action::Update | Action::Other => {
            change_plan(database, &payload.object.properties, &mut details)
        }
    };

    Dispatch::Planned(WebhookPlan {
        database,
        action: payload.action,
        invalidations,
        warnings: details.warnings,
    })
}

/// The slug is gone once a page is deleted, so only broad targets remain.
fn delete_plan(database: ContentDatabase) -> Vec<Invalidation> {
    let mut plan = vec![Invalidation::tag(database.broad_tag())];
    if database == ContentDatabase::Posts {
        plan.push(Invalidation::path(ROOT_PATH));
    }
    plan
}

fn change_plan(
    database: ContentDatabase,
    props: &Properties,
    details: &mut Details,
) -> Vec<Invalidation> {
    match database {
        ContentDatabase::Posts => {
            let mut plan = vec![Invalidation::tag(TAG_POSTS), Invalidation::path(ROOT_PATH)];
            if let Some(slug) = details.take(extract_slug(props, PROP_SLUG)) {
                plan.push(Invalidation::path(post_path(slug.as_str())));
                plan.push(Invalidation::tag(TAG_POST));
            }
            if let Some(category) = details.take(extract_select_or_text(props, PROP_CATEGORY)) {
                plan.push(Invalidation::path(category_path(&slugify(&category.name))));
            }
            if details.take(extract_relation_ids(props, PROP_AUTHOR)).is_some() {
                plan.push(Invalidation::tag(TAG_AUTHORS));
            }
            plan
        }
        ContentDatabase::Authors => {
            let mut plan = vec![Invalidation::tag(TAG_AUTHORS), Invalidation::tag(TAG_POSTS)];
            if let Some(slug) = details.take(extract_slug(props, PROP_SLUG)) {
                plan.push(Invalidation::path(author_path(slug.as_str())));
            }
            plan
        }
        ContentDatabase::Categories => {
            let mut plan = vec![
                Invalidation::tag(TAG_CATEGORIES),
                Invalidation::tag(TAG_POSTS),
            ];
            if let Some(slug) = details.take(extract_slug(props, PROP_SLUG)) {
                plan.push(Invalidation::path(category_path(slug.as_str())));
            }
            plan
        }
    }
}

#[derive(Default)]
struct Details {
    warnings: Vec<String>,
}

impl Details {
    /// Keep a targeted detail, or fall back to the broad plan without it.
    fn take<T>(&mut self, extracted: Result<T, ExtractionError>) -> Option<T> {
        match extracted {
            Ok(value) => Some(value),
            Err(e) if e.is_missing() => {
                log::debug!("Webhook detail skipped: {}", e);
                None
            }
            Err(e) => {
                log::warn!("Webhook detail unreadable, using broad invalidation: {}", e);
                self.warnings.push(e.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DatabaseId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const POSTS: &str = "11111111111111111111111111111111";
    const AUTHORS: &str = "22222222222222222222222222222222";
    const CATEGORIES: &str = "33333333333333333333333333333333";

    fn databases() -> DatabaseIds {
        DatabaseIds {
            main: None,
            posts: Some(DatabaseId::parse(POSTS).unwrap()),
            authors: Some(DatabaseId::parse(AUTHORS).unwrap()),
            categories: Some(DatabaseId::parse(CATEGORIES).unwrap()),
        }
    }

    fn payload(value: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(value).unwrap()
    }

    fn page_event(action: &str, database: &str, properties: serde_json::Value) -> WebhookPayload {
        payload(json!({
            "type": "page",
            "action": action,
            "object": {"id": "p1", "parent": {"database_id": database}, "properties": properties}
        }))
    }

    fn planned(dispatch: Dispatch) -> WebhookPlan {
        match dispatch {
            Dispatch::Planned(plan) => plan,
            other => panic!("expected a plan, got {:?}", other),
        }
    }

    fn rendered(plan: &WebhookPlan) -> String {
        plan.invalidations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn non_page_events_are_ignored() {
        let event = payload(json!({
            "type": "database",
            "action": "update",
            "object": {"id": POSTS, "parent": {"database_id": POSTS}}
        }));
        assert_eq!(plan(&event, &databases()), Dispatch::Ignored);
    }

    #[test]
    fn unknown_database_plans_nothing() {
        let event = page_event("update", "44444444444444444444444444444444", json!({}));
        assert_eq!(plan(&event, &databases()), Dispatch::UnknownDatabase);

        let orphan = payload(json!({"type": "page", "action": "update", "object": {"id": "p1"}}));
        assert_eq!(plan(&orphan, &databases()), Dispatch::UnknownDatabase);
    }

    #[test]
    fn dashed_database_ids_resolve() {
        let event = page_event("update", "11111111-1111-1111-1111-111111111111", json!({}));
        assert_eq!(planned(plan(&event, &databases())).database, ContentDatabase::Posts);
    }

    #[test]
    fn post_update_with_every_detail() {
        let event = page_event(
            "update",
            POSTS,
            json!({
                "Slug": {"rich_text": [{"plain_text": "my-post"}]},
                "Category": {"select": {"name": "Gestão Pública"}},
                "Author": {"relation": [{"id": AUTHORS}]}
            }),
        );
        let plan = planned(plan(&event, &databases()));
        insta::assert_snapshot!(
            rendered(&plan),
            @"tag:posts path:/ path:/post/my-post tag:post path:/category/gestão-pública tag:authors"
        );
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn post_update_without_details_is_broad() {
        let plan = planned(plan(&page_event("create", POSTS, json!({})), &databases()));
        assert_eq!(
            plan.invalidations,
            vec![Invalidation::tag("posts"), Invalidation::path("/")]
        );
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn unreadable_details_fall_back_with_warnings() {
        let event = page_event(
            "update",
            POSTS,
            json!({
                "Slug": {"number": 3},
                "Category": {"select": null},
                "Author": {"relation": []}
            }),
        );
        let plan = planned(plan(&event, &databases()));
        assert_eq!(
            plan.invalidations,
            vec![Invalidation::tag("posts"), Invalidation::path("/")]
        );
        assert_eq!(plan.warnings.len(), 3);
    }

    #[test]
    fn category_as_plain_text_is_accepted() {
        let event = page_event(
            "update",
            POSTS,
            json!({"Category": {"rich_text": [{"plain_text": "Direito"}]}}),
        );
        let plan = planned(plan(&event, &databases()));
        assert!(plan
            .invalidations
            .contains(&Invalidation::path("/category/direito")));
    }

    #[test]
    fn author_and_category_changes() {
        let slug = json!({"Slug": {"rich_text": [{"plain_text": "ana"}]}});

        let author = planned(plan(&page_event("update", AUTHORS, slug.clone()), &databases()));
        assert_eq!(rendered(&author), "tag:authors tag:posts path:/author/ana");

        let category = planned(plan(&page_event("create", CATEGORIES, slug), &databases()));
        assert_eq!(rendered(&category), "tag:categories tag:posts path:/category/ana");
    }

    #[test]
    fn deletes_are_broad_only() {
        let slug = json!({"Slug": {"rich_text": [{"plain_text": "gone"}]}});

        let post = planned(plan(&page_event("delete", POSTS, slug.clone()), &databases()));
        assert_eq!(rendered(&post), "tag:posts path:/");

        let author = planned(plan(&page_event("delete", AUTHORS, slug.clone()), &databases()));
        assert_eq!(rendered(&author), "tag:authors");

        let category = planned(plan(&page_event("delete", CATEGORIES, slug), &databases()));
        assert_eq!(rendered(&category), "tag:categories");
    }

    #[test]
    fn planning_is_repeatable() {
        let event = page_event(
            "update",
            POSTS,
            json!({"Slug": {"rich_text": [{"plain_text": "my-post"}]}}),
        );
        assert_eq!(plan(&event, &databases()), plan(&event, &databases()));
    }

    #[test]
    fn posts_fall_back_to_the_main_database() {
        let databases = DatabaseIds {
            main: Some(DatabaseId::parse(POSTS).unwrap()),
            ..Default::default()
        };
        let event = page_event("update", POSTS, json!({}));
        assert_eq!(planned(plan(&event, &databases)).database, ContentDatabase::Posts);
    }
}
