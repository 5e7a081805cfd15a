// tests/common/mod.rs
//! Shared fixtures: an in-memory content source, a recording revalidator and
//! helpers to drive the router without a socket.

#![allow(dead_code)]

use administrativamente::notion::responses::{NotionPage, NotionUser};
use administrativamente::{
    router, AppError, AppState, CacheManager, ContentSource, DatabaseId, Invalidation, PageId,
    Revalidator, SiteConfig,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const POSTS_DB: &str = "11111111111111111111111111111111";
pub const AUTHORS_DB: &str = "22222222222222222222222222222222";
pub const CATEGORIES_DB: &str = "33333333333333333333333333333333";
pub const AUTHOR_ID: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    None,
    /// Every call returns an error.
    Unreachable,
    /// Every call panics.
    Panic,
}

/// Content source backed by fixed pages.
pub struct FakeSource {
    databases: HashMap<String, Vec<NotionPage>>,
    search_results: Vec<NotionPage>,
    bodies: HashMap<String, Vec<String>>,
    failure: Failure,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            databases: HashMap::new(),
            search_results: Vec::new(),
            bodies: HashMap::new(),
            failure: Failure::None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A workspace with two posts, one author and two categories.
    pub fn populated() -> Self {
        let posts = vec![
            post_page(
                "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb1",
                "Licitação sem mistério",
                "licitacao-sem-misterio",
                "Direito",
                "2024-03-01",
            ),
            post_page(
                "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2",
                "Gestão de contratos",
                "gestao-de-contratos",
                "Gestão",
                "2024-05-10",
            ),
        ];
        Self::new()
            .with_database(POSTS_DB, posts.clone())
            .with_database(AUTHORS_DB, vec![author_page(AUTHOR_ID, "Marina Costa", "marina")])
            .with_database(
                CATEGORIES_DB,
                vec![
                    category_page("cccccccccccccccccccccccccccccc01", "Direito"),
                    category_page("cccccccccccccccccccccccccccccc02", "Gestão"),
                ],
            )
            .with_search_results(posts)
            .with_body(
                "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb1",
                &["Primeiro parágrafo.", "Segundo parágrafo."],
            )
    }

    pub fn with_database(mut self, id: &str, pages: Vec<NotionPage>) -> Self {
        self.databases.insert(id.to_string(), pages);
        self
    }

    pub fn with_search_results(mut self, pages: Vec<NotionPage>) -> Self {
        self.search_results = pages;
        self
    }

    pub fn with_body(mut self, page: &str, paragraphs: &[&str]) -> Self {
        self.bodies.insert(
            page.to_string(),
            paragraphs.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    pub fn failing(mut self, failure: Failure) -> Self {
        self.failure = failure;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn enter(&self, call: String) -> Result<(), AppError> {
        self.calls.lock().push(call);
        match self.failure {
            Failure::None => Ok(()),
            Failure::Unreachable => Err(AppError::MalformedResponse(
                "content source unreachable".to_string(),
            )),
            Failure::Panic => panic!("content source exploded"),
        }
    }
}

#[async_trait::async_trait]
impl ContentSource for FakeSource {
    async fn current_user(&self) -> Result<NotionUser, AppError> {
        self.enter("current_user".to_string())?;
        Ok(serde_json::from_value(json!({"id": "bot", "name": "Site", "type": "bot"}))?)
    }

    async fn query_database(&self, database: &DatabaseId) -> Result<Vec<NotionPage>, AppError> {
        self.enter(format!("query_database:{}", database))?;
        self.databases
            .get(database.as_str())
            .cloned()
            .ok_or_else(|| AppError::MalformedResponse(format!("no database {}", database)))
    }

    async fn search_pages(&self, query: &str) -> Result<Vec<NotionPage>, AppError> {
        self.enter(format!("search_pages:{}", query))?;
        Ok(self.search_results.clone())
    }

    async fn retrieve_block_text(&self, page: &PageId) -> Result<Vec<String>, AppError> {
        self.enter(format!("retrieve_block_text:{}", page))?;
        Ok(self.bodies.get(page.as_str()).cloned().unwrap_or_default())
    }
}

/// Revalidator spy recording every invalidation in order.
#[derive(Default)]
pub struct RecordingRevalidator {
    calls: Mutex<Vec<Invalidation>>,
    fail: bool,
}

impl RecordingRevalidator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Invalidation> {
        self.calls.lock().clone()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    fn record(&self, step: Invalidation) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::RevalidationFailed {
                target: step.to_string(),
                reason: "revalidation backend down".to_string(),
            });
        }
        self.calls.lock().push(step);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Revalidator for RecordingRevalidator {
    async fn revalidate_tag(&self, tag: &str) -> Result<(), AppError> {
        self.record(Invalidation::tag(tag))
    }

    async fn revalidate_path(&self, path: &str) -> Result<(), AppError> {
        self.record(Invalidation::path(path))
    }
}

pub fn site_config(extra: &[(&str, &str)]) -> SiteConfig {
    let mut vars: HashMap<String, String> = [
        ("NOTION_TOKEN", "secret_integration_token_0123456789"),
        ("NOTION_POSTS_DATABASE_ID", POSTS_DB),
        ("NOTION_AUTHORS_DATABASE_ID", AUTHORS_DB),
        ("NOTION_CATEGORIES_DATABASE_ID", CATEGORIES_DB),
        ("NEXT_PUBLIC_SITE_URL", "https://administrativamente.com.br"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    SiteConfig::from_lookup(move |name| vars.get(name).cloned()).unwrap()
}

/// A router wired to fakes, with handles on them for assertions.
pub struct TestApp {
    pub router: Router,
    pub source: Arc<FakeSource>,
    pub revalidator: Arc<RecordingRevalidator>,
    pub cache: Arc<CacheManager>,
}

impl TestApp {
    pub fn new(source: FakeSource) -> Self {
        Self::build(source, RecordingRevalidator::default(), &[])
    }

    pub fn build(
        source: FakeSource,
        revalidator: RecordingRevalidator,
        env: &[(&str, &str)],
    ) -> Self {
        let source = Arc::new(source);
        let revalidator = Arc::new(revalidator);
        let cache = Arc::new(CacheManager::new(Duration::from_secs(60)));
        let state = AppState::new(site_config(env), source.clone(), cache.clone())
            .with_revalidator(revalidator.clone());
        Self {
            router: router(state),
            source,
            revalidator,
            cache,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

pub fn post_page(id: &str, title: &str, slug: &str, category: &str, published: &str) -> NotionPage {
    serde_json::from_value(json!({
        "object": "page",
        "id": id,
        "created_time": "2024-01-01T00:00:00.000Z",
        "parent": {"type": "database_id", "database_id": POSTS_DB},
        "properties": {
            "Title": {"type": "title", "title": [{"plain_text": title}]},
            "Slug": {"type": "rich_text", "rich_text": [{"plain_text": slug}]},
            "Category": {"type": "select", "select": {"name": category, "color": "blue"}},
            "Author": {"type": "relation", "relation": [{"id": AUTHOR_ID}]},
            "Published": {"type": "date", "date": {"start": published}},
            "Tags": {"type": "multi_select", "multi_select": [{"name": "licitação"}]}
        }
    }))
    .unwrap()
}

pub fn author_page(id: &str, name: &str, slug: &str) -> NotionPage {
    serde_json::from_value(json!({
        "id": id,
        "parent": {"type": "database_id", "database_id": AUTHORS_DB},
        "properties": {
            "Name": {"type": "title", "title": [{"plain_text": name}]},
            "Slug": {"type": "rich_text", "rich_text": [{"plain_text": slug}]},
            "Bio": {"type": "rich_text", "rich_text": [{"plain_text": "Servidora pública."}]}
        }
    }))
    .unwrap()
}

pub fn category_page(id: &str, name: &str) -> NotionPage {
    serde_json::from_value(json!({
        "id": id,
        "parent": {"type": "database_id", "database_id": CATEGORIES_DB},
        "properties": {
            "Name": {"type": "title", "title": [{"plain_text": name}]},
            "Color": {"type": "select", "select": {"name": "green"}}
        }
    }))
    .unwrap()
}
