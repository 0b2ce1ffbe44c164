//! Raw CMS documents to post models
//!
//! This is the only place that knows the CMS document layout. Missing
//! fields stay `None`; nothing here can fail.

use super::{ContentBlock, Post, PostDetail, PostPage};
use crate::cms::{RawDocument, SearchResponse};

/// Shape a raw document into a post summary
pub fn normalize(doc: &RawDocument) -> Post {
    Post {
        uid: doc.uid.clone(),
        first_publication_date: doc.first_publication_date,
        title: doc.data.title.clone(),
        subtitle: doc.data.subtitle.clone(),
        author: doc.data.author.clone(),
    }
}

/// Shape a raw document into the record rendered on the post page
pub fn normalize_detail(doc: &RawDocument) -> PostDetail {
    let content = doc
        .data
        .content
        .iter()
        .flatten()
        .map(|block| ContentBlock {
            heading: block.heading.clone(),
            body: block.body.clone(),
        })
        .collect();

    PostDetail {
        uid: doc.uid.clone(),
        first_publication_date: doc.first_publication_date,
        title: doc.data.title.clone(),
        author: doc.data.author.clone(),
        banner_url: doc.data.banner.as_ref().and_then(|b| b.url.clone()),
        content,
    }
}

/// Shape a search response into the first page of the post list
pub fn normalize_page(response: &SearchResponse) -> PostPage {
    PostPage {
        next_page: response.next_page.clone(),
        results: response.results.iter().map(normalize).collect(),
    }
}
