//! # Catalog Client
//!
//! Typed access to the remote book catalog.
//!
//! ## Overview
//!
//! Every catalog endpoint is a POST with a one-field JSON body and answers
//! with the `{code, msg, data}` envelope. [`CatalogClient`] owns the envelope
//! handling and the mapping from wire shapes to domain models; the three
//! [`RemoteFetch`] implementations at the bottom plug the client into
//! [`FetchCoordinator`](crate::coordinator::FetchCoordinator)s.

use crate::coordinator::RemoteFetch;
use crate::error::{FetchError, Result};
use crate::sanitize::{glyph_count, strip_markup};
use async_trait::async_trait;
use bridge_traits::http::{CatalogTransport, HttpMethod};
use core_store::{Book, BookId, BookPatch, BookStatus, ChapterContent, ChapterRef};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const SEARCH_PATH: &str = "/novel/search";
pub const DETAIL_PATH: &str = "/novel/detail";
pub const CHAPTER_PATH: &str = "/novel/chapter";

/// Catalog response envelope. `code == 200` carries data; anything else is
/// an application-level miss with an optional message.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    // No serde(default) here: it would demand T: Default, and a missing
    // Option field already decodes to None.
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    #[serde(default)]
    search_results: Vec<CandidateDto>,
}

/// One search hit as the catalog reports it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateDto {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    source_locator: String,
    #[serde(default)]
    latest_chapter_label: Option<String>,
    #[serde(default)]
    update_label: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    source_name: Option<String>,
}

impl CandidateDto {
    fn into_book(self) -> Book {
        let mut tags = BTreeSet::new();
        if let Some(source) = self.source_name {
            if !source.trim().is_empty() {
                tags.insert(source);
            }
        }
        let category = self
            .latest_chapter_label
            .or(self.update_label)
            .filter(|label| !label.trim().is_empty());

        Book {
            id: BookId::new(self.source_locator.clone()),
            title: self.title,
            author: self.author,
            description: self.description,
            category,
            status: self
                .status
                .as_deref()
                .map(BookStatus::from_label)
                .unwrap_or_default(),
            total_chapters: 0,
            source_locator: self.source_locator,
            tags,
            added_at: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailDto {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    total_chapters: Option<u32>,
    #[serde(default)]
    chapters: Vec<ChapterDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterDto {
    #[serde(default)]
    title: String,
    /// 1-based; absent entries fall back to their list position.
    #[serde(default)]
    chapter_number: Option<u32>,
    #[serde(default)]
    source_locator: String,
    #[serde(default)]
    source_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterPayload {
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    word_count: u32,
    #[serde(default)]
    source_id: Option<String>,
}

/// Full metadata for one book, including its table of contents.
#[derive(Debug, Clone, PartialEq)]
pub struct BookDetail {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub description: String,
    pub status: Option<BookStatus>,
    pub total_chapters: u32,
    pub chapters: Vec<ChapterRef>,
}

impl BookDetail {
    /// Shelf metadata refresh derived from this detail record.
    pub fn shelf_patch(&self) -> BookPatch {
        BookPatch {
            title: Some(self.title.clone()),
            author: Some(self.author.clone()),
            description: Some(self.description.clone()),
            status: self.status,
            total_chapters: Some(self.total_chapters),
            ..Default::default()
        }
    }
}

/// Thin typed client over the injected transport.
#[derive(Clone)]
pub struct CatalogClient {
    transport: Arc<dyn CatalogTransport>,
}

impl CatalogClient {
    pub fn new(transport: Arc<dyn CatalogTransport>) -> Self {
        Self { transport }
    }

    #[instrument(skip(self))]
    pub async fn search(&self, keyword: &str) -> Result<Vec<Book>> {
        let data: SearchData = self
            .call(SEARCH_PATH, json!({ "keyword": keyword }))
            .await?;

        debug!(hits = data.search_results.len(), "Search completed");
        Ok(data
            .search_results
            .into_iter()
            .map(CandidateDto::into_book)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, book_id: &BookId) -> Result<BookDetail> {
        let data: DetailDto = self
            .call(DETAIL_PATH, json!({ "sourceLocator": book_id.as_str() }))
            .await?;

        let chapters: Vec<ChapterRef> = data
            .chapters
            .into_iter()
            .enumerate()
            .map(|(position, chapter)| ChapterRef {
                id: chapter
                    .source_id
                    .unwrap_or_else(|| chapter.source_locator.clone()),
                book_id: book_id.clone(),
                title: chapter.title,
                index: chapter.chapter_number.unwrap_or(position as u32 + 1),
                source_locator: chapter.source_locator,
            })
            .collect();

        Ok(BookDetail {
            book_id: book_id.clone(),
            title: data.title,
            author: data.author,
            description: data.description,
            status: data.status.as_deref().map(BookStatus::from_label),
            total_chapters: data.total_chapters.unwrap_or(chapters.len() as u32),
            chapters,
        })
    }

    #[instrument(skip(self))]
    pub async fn chapter(&self, locator: &str) -> Result<ChapterContent> {
        let payload: ChapterPayload = self
            .call(CHAPTER_PATH, json!({ "chapterLocator": locator }))
            .await?;

        let body_text = strip_markup(&payload.body)?;
        let word_count = if payload.word_count > 0 {
            payload.word_count
        } else {
            glyph_count(&body_text)
        };

        Ok(ChapterContent {
            chapter_id: payload.source_id.unwrap_or_else(|| locator.to_string()),
            title: payload.title,
            body_text,
            word_count,
        })
    }

    /// POST `body` to `path` and unwrap the response envelope.
    ///
    /// Transport failures and undecodable responses map to
    /// [`FetchError::Network`]; an HTTP 404 or an envelope miss maps to
    /// [`FetchError::NotFound`].
    async fn call<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        let response = self
            .transport
            .request(HttpMethod::Post, path, Some(body))
            .await
            .map_err(|e| {
                warn!(path, error = %e, "Catalog transport failed");
                FetchError::Network(e.to_string())
            })?;

        if response.status == 404 {
            return Err(FetchError::NotFound(format!("{} not found", path)));
        }
        if !response.is_success() {
            return Err(FetchError::Network(format!(
                "{} answered HTTP {}",
                path, response.status
            )));
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .map_err(|e| FetchError::Network(format!("undecodable catalog response: {}", e)))?;

        if envelope.code != 200 {
            let msg = envelope
                .msg
                .unwrap_or_else(|| format!("catalog code {}", envelope.code));
            return Err(FetchError::NotFound(msg));
        }
        envelope
            .data
            .ok_or_else(|| FetchError::NotFound("catalog response carried no data".to_string()))
    }
}

/// Search lookup keyed by keyword.
pub struct SearchFetch {
    client: CatalogClient,
}

impl SearchFetch {
    pub fn new(client: CatalogClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteFetch for SearchFetch {
    type Key = String;
    type Output = Vec<Book>;

    async fn fetch(&self, key: String) -> Result<Vec<Book>> {
        self.client.search(key.trim()).await
    }
}

/// Detail lookup keyed by book id.
pub struct DetailFetch {
    client: CatalogClient,
}

impl DetailFetch {
    pub fn new(client: CatalogClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteFetch for DetailFetch {
    type Key = BookId;
    type Output = BookDetail;

    async fn fetch(&self, key: BookId) -> Result<BookDetail> {
        self.client.detail(&key).await
    }
}

/// Chapter content lookup keyed by chapter locator.
pub struct ContentFetch {
    client: CatalogClient,
}

impl ContentFetch {
    pub fn new(client: CatalogClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteFetch for ContentFetch {
    type Key = String;
    type Output = ChapterContent;

    async fn fetch(&self, key: String) -> Result<ChapterContent> {
        self.client.chapter(&key).await
    }
}
