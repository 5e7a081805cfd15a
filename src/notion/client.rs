// src/notion/client.rs
//! Pure HTTP client wrapper for the Notion API.
//!
//! Handles authentication headers and raw request/response plumbing; all
//! decoding lives in the parser.

use super::pagination::fetch_all_pages;
use super::parser::parse_api_response;
use super::responses::{NotionBlock, NotionPage, NotionUser, PaginatedResponse};
use crate::constants::{NOTION_API_BASE_URL, NOTION_VERSION};
use crate::error::AppError;
use crate::types::{ApiKey, DatabaseId, PageId};
use reqwest::{header, Client, Response};
use serde::Serialize;

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(api_key: &ApiKey) -> Result<Self, AppError> {
        Self::with_base_url(api_key, NOTION_API_BASE_URL)
    }

    /// Creates a client against a non-default API root (proxies, mocks).
    pub fn with_base_url(api_key: &ApiKey, base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Makes a GET request to `endpoint` (path without base URL).
    pub async fn get(&self, endpoint: &str) -> Result<Response, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }

    /// Makes a POST request with JSON body to `endpoint`.
    pub async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }

    async fn post_paginated(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<Vec<NotionPage>, AppError> {
        fetch_all_pages(|page_size, cursor| {
            let mut query = body.clone();
            query["page_size"] = serde_json::json!(page_size);
            if let Some(cursor) = cursor {
                query["start_cursor"] = serde_json::json!(cursor);
            }
            async move {
                let response = self.post(endpoint, &query).await?;
                let result = extract_response_text(response).await?;
                parse_api_response::<PaginatedResponse<NotionPage>>(result)
            }
        })
        .await
    }
}

#[async_trait::async_trait]
impl super::ContentSource for NotionHttpClient {
    async fn current_user(&self) -> Result<NotionUser, AppError> {
        let response = self.get("users/me").await?;
        let result = extract_response_text(response).await?;
        parse_api_response(result)
    }

    async fn query_database(&self, database: &DatabaseId) -> Result<Vec<NotionPage>, AppError> {
        let endpoint = format!("databases/{}/query", database.to_dashed());
        let pages = self
            .post_paginated(&endpoint, serde_json::json!({}))
            .await?;
        Ok(pages.into_iter().filter(NotionPage::is_live).collect())
    }

    async fn search_pages(&self, query: &str) -> Result<Vec<NotionPage>, AppError> {
        let body = serde_json::json!({
            "query": query,
            "filter": { "property": "object", "value": "page" },
        });
        let pages = self.post_paginated("search", body).await?;
        Ok(pages.into_iter().filter(NotionPage::is_live).collect())
    }

    async fn retrieve_block_text(&self, page: &PageId) -> Result<Vec<String>, AppError> {
        let base = format!("blocks/{}/children", page.to_dashed());
        let blocks = fetch_all_pages(|page_size, cursor| {
            let endpoint = match cursor {
                Some(c) => format!("{}?page_size={}&start_cursor={}", base, page_size, c),
                None => format!("{}?page_size={}", base, page_size),
            };
            async move {
                let response = self.get(&endpoint).await?;
                let result = extract_response_text(response).await?;
                parse_api_response::<PaginatedResponse<NotionBlock>>(result)
            }
        })
        .await?;
        Ok(blocks.iter().filter_map(NotionBlock::plain_text).collect())
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: u16,
    pub url: String,
}

/// Extracts the response body as text with status and URL metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
