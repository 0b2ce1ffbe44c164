//! Content source abstraction

use async_trait::async_trait;

use super::{RawDocument, SearchResponse};
use crate::error::CmsError;

/// Fetches an already-issued "next page" cursor
#[async_trait]
pub trait PageTransport: Send + Sync {
    /// Fetch the page a `next_page` cursor points at
    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse, CmsError>;
}

/// Read access to the documents of a headless CMS
#[async_trait]
pub trait ContentSource: PageTransport {
    /// First page of documents of the given type
    async fn get_by_type(&self, kind: &str, page_size: u32) -> Result<SearchResponse, CmsError>;

    /// A single document by its uid
    async fn get_by_uid(&self, kind: &str, uid: &str) -> Result<RawDocument, CmsError>;

    /// Every document of the given type, following all pages
    async fn get_all_by_type(&self, kind: &str) -> Result<Vec<RawDocument>, CmsError>;
}
