//! HTTP client for a Prismic-style REST API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::{ContentSource, PageTransport, RawDocument, SearchResponse};
use crate::error::CmsError;

/// How long a resolved master ref is reused before asking again
const REF_TTL: Duration = Duration::from_secs(5);

/// Page size used when walking every document of a type
const CRAWL_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    id: String,
    #[serde(rename = "isMasterRef", default)]
    is_master: bool,
}

/// Client for the CMS search API
pub struct PrismicClient {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
    master_ref: RwLock<Option<(String, Instant)>>,
}

impl PrismicClient {
    /// Create a client for an API endpoint such as
    /// `https://<repo>.cdn.prismic.io/api/v2`
    pub fn new(endpoint: &str, access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token,
            master_ref: RwLock::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Resolve the ref of the currently published content
    async fn master_ref(&self) -> Result<String, CmsError> {
        if let Some((id, fetched_at)) = self.master_ref.read().await.as_ref() {
            if fetched_at.elapsed() < REF_TTL {
                return Ok(id.clone());
            }
        }

        let mut request = self.client.get(&self.endpoint);
        if let Some(token) = &self.access_token {
            request = request.query(&[("access_token", token)]);
        }
        let info: ApiInfo = self.get_json(&self.endpoint, request).await?;

        let id = info
            .refs
            .into_iter()
            .find(|r| r.is_master)
            .map(|r| r.id)
            .ok_or_else(|| CmsError::NoMasterRef(self.endpoint.clone()))?;

        tracing::debug!("Resolved master ref {}", id);
        *self.master_ref.write().await = Some((id.clone(), Instant::now()));
        Ok(id)
    }

    /// Run a predicate query against the search endpoint
    async fn search(
        &self,
        predicate: &str,
        page_size: u32,
        page: u32,
    ) -> Result<SearchResponse, CmsError> {
        let master_ref = self.master_ref().await?;
        let url = format!("{}/documents/search", self.endpoint);

        let mut query: Vec<(&str, String)> = vec![
            ("ref", master_ref),
            ("q", predicate.to_string()),
            ("pageSize", page_size.to_string()),
            ("page", page.to_string()),
        ];
        if let Some(token) = &self.access_token {
            query.push(("access_token", token.clone()));
        }

        tracing::debug!("Querying {} with {}", url, predicate);
        let request = self.client.get(&url).query(&query);
        self.get_json(&url, request).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T, CmsError> {
        let response = request.send().await.map_err(|source| CmsError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| CmsError::Transport {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| CmsError::Malformed {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl PageTransport for PrismicClient {
    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse, CmsError> {
        let invalid = || CmsError::InvalidCursor(cursor.to_string());
        let mut url = Url::parse(cursor).map_err(|_| invalid())?;

        // Cursors come back from browsers; only follow ones on our own API
        let endpoint = Url::parse(&self.endpoint).map_err(|_| invalid())?;
        if url.origin() != endpoint.origin() {
            return Err(invalid());
        }

        if let Some(token) = &self.access_token {
            if !url.query_pairs().any(|(k, _)| k == "access_token") {
                url.query_pairs_mut().append_pair("access_token", token);
            }
        }

        let request = self.client.get(url);
        self.get_json(cursor, request).await
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn get_by_type(&self, kind: &str, page_size: u32) -> Result<SearchResponse, CmsError> {
        self.search(&type_predicate(kind), page_size, 1).await
    }

    async fn get_by_uid(&self, kind: &str, uid: &str) -> Result<RawDocument, CmsError> {
        let response = self.search(&uid_predicate(kind, uid), 1, 1).await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| CmsError::NotFound {
                kind: kind.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn get_all_by_type(&self, kind: &str) -> Result<Vec<RawDocument>, CmsError> {
        let mut response = self
            .search(&type_predicate(kind), CRAWL_PAGE_SIZE, 1)
            .await?;
        let mut documents = std::mem::take(&mut response.results);

        while let Some(cursor) = response.next_page.take() {
            response = self.fetch_page(&cursor).await?;
            documents.append(&mut response.results);
        }

        tracing::debug!("Fetched {} {} documents", documents.len(), kind);
        Ok(documents)
    }
}

fn type_predicate(kind: &str) -> String {
    format!(r#"[[at(document.type,"{}")]]"#, quote(kind))
}

fn uid_predicate(kind: &str, uid: &str) -> String {
    format!(r#"[[at(my.{}.uid,"{}")]]"#, kind, quote(uid))
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
