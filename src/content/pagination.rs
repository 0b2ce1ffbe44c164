//! "Load more" pagination over the post list

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::normalize::normalize;
use super::PostPage;
use crate::cms::PageTransport;
use crate::error::FeedError;

/// Fetch the page behind `current.next_page` and append it.
///
/// `current` is never modified; on failure the caller still holds the last
/// good page.
pub async fn load_next_page<T: PageTransport + ?Sized>(
    current: &PostPage,
    transport: &T,
) -> Result<PostPage, FeedError> {
    let cursor = current.next_page.as_deref().ok_or(FeedError::Exhausted)?;

    let response = transport.fetch_page(cursor).await?;

    let mut results = Vec::with_capacity(current.results.len() + response.results.len());
    results.extend(current.results.iter().cloned());
    results.extend(response.results.iter().map(normalize));

    tracing::debug!(
        "Loaded {} more posts from {} ({} total)",
        response.results.len(),
        cursor,
        results.len()
    );

    Ok(PostPage {
        next_page: response.next_page,
        results,
    })
}

/// Post list state with at most one page load in flight
#[derive(Debug)]
pub struct PostFeed {
    page: RwLock<PostPage>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the load finishes, however it finishes
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PostFeed {
    pub fn new(page: PostPage) -> Self {
        Self {
            page: RwLock::new(page),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Current list
    pub async fn snapshot(&self) -> PostPage {
        self.page.read().await.clone()
    }

    pub async fn has_more(&self) -> bool {
        self.page.read().await.has_more()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Append the next page to the list.
    ///
    /// Returns `FeedError::InFlight` without fetching if another load has
    /// not finished yet, and `FeedError::Exhausted` once there is no next
    /// page. The stored list only changes when the fetch succeeds.
    pub async fn load_more<T: PageTransport + ?Sized>(
        &self,
        transport: &T,
    ) -> Result<PostPage, FeedError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FeedError::InFlight);
        }
        let _guard = InFlight(&self.in_flight);

        let current = self.snapshot().await;
        let next = load_next_page(&current, transport).await?;

        *self.page.write().await = next.clone();
        Ok(next)
    }

    pub fn into_inner(self) -> PostPage {
        self.page.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{ContentSource, MemoryCms, RawDocument, SearchResponse};
    use crate::content::{normalize_page, Post};
    use crate::error::CmsError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn post(uid: &str) -> Post {
        Post {
            uid: Some(uid.to_string()),
            first_publication_date: None,
            title: Some(format!("Title {}", uid)),
            subtitle: None,
            author: None,
        }
    }

    fn raw(uid: &str) -> RawDocument {
        RawDocument {
            uid: Some(uid.to_string()),
            kind: "post".to_string(),
            ..Default::default()
        }
    }

    fn uids(page: &PostPage) -> Vec<&str> {
        page.results.iter().filter_map(|p| p.uid.as_deref()).collect()
    }

    fn two_posts(cursor: Option<&str>) -> PostPage {
        PostPage {
            next_page: cursor.map(str::to_string),
            results: vec![post("p1"), post("p2")],
        }
    }

    #[tokio::test]
    async fn test_appends_next_page() {
        let cms = MemoryCms::default().with_page(
            "url2",
            SearchResponse {
                next_page: None,
                results: vec![raw("p3")],
                ..Default::default()
            },
        );
        let current = two_posts(Some("url2"));

        let next = load_next_page(&current, &cms).await.unwrap();
        assert_eq!(next.next_page, None);
        assert_eq!(uids(&next), vec!["p1", "p2", "p3"]);
        assert_eq!(&next.results[..2], &current.results[..]);
    }

    #[tokio::test]
    async fn test_preserves_order_within_page() {
        let cms = MemoryCms::default().with_page(
            "url2",
            SearchResponse {
                next_page: Some("url3".to_string()),
                results: vec![raw("c"), raw("a"), raw("b")],
                ..Default::default()
            },
        );
        let next = load_next_page(&two_posts(Some("url2")), &cms).await.unwrap();
        assert_eq!(next.results.len(), 2 + 3);
        assert_eq!(uids(&next), vec!["p1", "p2", "c", "a", "b"]);
        assert_eq!(next.next_page.as_deref(), Some("url3"));
    }

    #[tokio::test]
    async fn test_no_cursor_is_rejected() {
        let cms = MemoryCms::default();
        let err = load_next_page(&two_posts(None), &cms).await.unwrap_err();
        assert!(matches!(err, FeedError::Exhausted));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_last_good_page() {
        let cms = MemoryCms::default();
        let feed = PostFeed::new(two_posts(Some("https://cms/gone")));

        let err = feed.load_more(&cms).await.unwrap_err();
        assert!(matches!(err, FeedError::Cms(CmsError::InvalidCursor(_))));
        assert_eq!(feed.snapshot().await, two_posts(Some("https://cms/gone")));
        assert!(!feed.is_loading());
    }

    /// Transport whose response body does not parse
    struct Garbled;

    #[async_trait]
    impl PageTransport for Garbled {
        async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse, CmsError> {
            let source = serde_json::from_str::<SearchResponse>("{\"results\": 7}").unwrap_err();
            Err(CmsError::Malformed {
                url: cursor.to_string(),
                source,
            })
        }
    }

    #[tokio::test]
    async fn test_malformed_response_keeps_last_good_page() {
        let feed = PostFeed::new(two_posts(Some("url2")));

        let err = feed.load_more(&Garbled).await.unwrap_err();
        assert!(matches!(err, FeedError::Cms(CmsError::Malformed { .. })));
        assert_eq!(feed.snapshot().await, two_posts(Some("url2")));
        assert!(!feed.is_loading());

        // The next attempt is not blocked by the failed one
        let err = feed.load_more(&Garbled).await.unwrap_err();
        assert!(matches!(err, FeedError::Cms(CmsError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_feed_walks_to_the_end() {
        let cms = MemoryCms::new((1..=5).map(|i| raw(&format!("d{}", i))).collect());
        let first = normalize_page(&cms.get_by_type("post", 2).await.unwrap());
        let feed = PostFeed::new(first);

        while feed.has_more().await {
            feed.load_more(&cms).await.unwrap();
        }

        let page = feed.into_inner();
        assert_eq!(uids(&page), vec!["d1", "d2", "d3", "d4", "d5"]);
        assert_eq!(page.next_page, None);
    }

    /// Transport that blocks until released, counting fetches
    struct Gate {
        release: Notify,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl PageTransport for Gate {
        async fn fetch_page(&self, _cursor: &str) -> Result<SearchResponse, CmsError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(SearchResponse {
                next_page: None,
                results: vec![raw("p3")],
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_concurrent_load_is_rejected() {
        let gate = Arc::new(Gate {
            release: Notify::new(),
            fetches: AtomicUsize::new(0),
        });
        let feed = Arc::new(PostFeed::new(two_posts(Some("url2"))));

        let first = {
            let (feed, gate) = (feed.clone(), gate.clone());
            tokio::spawn(async move { feed.load_more(gate.as_ref()).await })
        };

        while gate.fetches.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(feed.is_loading());

        let second = feed.load_more(gate.as_ref()).await.unwrap_err();
        assert!(matches!(second, FeedError::InFlight));

        gate.release.notify_one();
        let loaded = first.await.unwrap().unwrap();
        assert_eq!(uids(&loaded), vec!["p1", "p2", "p3"]);
        assert_eq!(gate.fetches.load(Ordering::SeqCst), 1);
        assert!(!feed.is_loading());
        assert_eq!(feed.snapshot().await, loaded);
    }
}
