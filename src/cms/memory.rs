//! In-memory content source
//!
//! Serves a fixed list of documents with the same paging behaviour as the
//! HTTP API. Used for offline builds from a JSON fixture file and in tests.

use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::{ContentSource, PageTransport, RawDocument, SearchResponse};
use crate::error::CmsError;

const CURSOR_SCHEME: &str = "memory";

/// Largest page size a cursor may ask for, as on the HTTP API
const MAX_PAGE_SIZE: u32 = 100;

/// Document store backed by a `Vec`
#[derive(Debug, Clone, Default)]
pub struct MemoryCms {
    documents: Vec<RawDocument>,
    pages: HashMap<String, SearchResponse>,
}

impl MemoryCms {
    /// Create a store holding the given documents, in the given order
    pub fn new(documents: Vec<RawDocument>) -> Self {
        Self {
            documents,
            pages: HashMap::new(),
        }
    }

    /// Load documents from a JSON file holding an array of raw documents
    pub fn from_fixture<P: AsRef<Path>>(path: P) -> Result<Self, CmsError> {
        let path = path.as_ref();
        let fixture_error = |message: String| CmsError::Fixture {
            path: path.to_path_buf(),
            message,
        };

        let content = fs::read_to_string(path).map_err(|e| fixture_error(e.to_string()))?;
        let documents: Vec<RawDocument> =
            serde_json::from_str(&content).map_err(|e| fixture_error(e.to_string()))?;

        tracing::debug!("Loaded {} documents from {:?}", documents.len(), path);
        Ok(Self::new(documents))
    }

    /// Answer `cursor` with a fixed page instead of a computed one
    pub fn with_page(mut self, cursor: &str, page: SearchResponse) -> Self {
        self.pages.insert(cursor.to_string(), page);
        self
    }

    fn of_type<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a RawDocument> + 'a {
        self.documents.iter().filter(move |d| d.kind == kind)
    }

    /// Slice out page `page` (1-based) of documents of `kind`
    fn page(&self, kind: &str, page: u32, page_size: u32) -> SearchResponse {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let total = self.of_type(kind).count();
        let total_pages = total.div_ceil(page_size as usize).max(1) as u32;

        let offset = (page as usize - 1).saturating_mul(page_size as usize);
        let results: Vec<RawDocument> = self
            .of_type(kind)
            .skip(offset)
            .take(page_size as usize)
            .cloned()
            .collect();

        let next_page = (page < total_pages).then(|| cursor_for(kind, page + 1, page_size));

        SearchResponse {
            page: Some(page),
            total_pages: Some(total_pages),
            results_size: Some(results.len() as u32),
            next_page,
            results,
        }
    }
}

/// Cursor URL for a page of documents of `kind`
pub fn cursor_for(kind: &str, page: u32, page_size: u32) -> String {
    format!(
        "{}://{}?page={}&pageSize={}",
        CURSOR_SCHEME, kind, page, page_size
    )
}

#[async_trait]
impl PageTransport for MemoryCms {
    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse, CmsError> {
        if let Some(page) = self.pages.get(cursor) {
            return Ok(page.clone());
        }

        let invalid = || CmsError::InvalidCursor(cursor.to_string());
        let url = Url::parse(cursor).map_err(|_| invalid())?;
        if url.scheme() != CURSOR_SCHEME {
            return Err(invalid());
        }
        let kind = url.host_str().ok_or_else(invalid)?;

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let page: u32 = params
            .get("page")
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let page_size: u32 = params
            .get("pageSize")
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        if page == 0 || page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(invalid());
        }

        Ok(self.page(kind, page, page_size))
    }
}

#[async_trait]
impl ContentSource for MemoryCms {
    async fn get_by_type(&self, kind: &str, page_size: u32) -> Result<SearchResponse, CmsError> {
        Ok(self.page(kind, 1, page_size))
    }

    async fn get_by_uid(&self, kind: &str, uid: &str) -> Result<RawDocument, CmsError> {
        self.of_type(kind)
            .find(|d| d.uid.as_deref() == Some(uid))
            .cloned()
            .ok_or_else(|| CmsError::NotFound {
                kind: kind.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn get_all_by_type(&self, kind: &str) -> Result<Vec<RawDocument>, CmsError> {
        Ok(self.of_type(kind).cloned().collect())
    }
}
