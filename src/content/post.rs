//! Post models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::richtext::RichTextNode;

/// Summary of a post, as shown in the post list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Unique slug, identity of the post
    pub uid: Option<String>,

    /// First publication timestamp
    pub first_publication_date: Option<DateTime<Utc>>,

    pub title: Option<String>,

    pub subtitle: Option<String>,

    pub author: Option<String>,
}

/// Everything the post page needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: Option<String>,

    pub first_publication_date: Option<DateTime<Utc>>,

    pub title: Option<String>,

    pub author: Option<String>,

    /// Banner image URL
    pub banner_url: Option<String>,

    /// Body sections in display order
    pub content: Vec<ContentBlock>,
}

/// A heading followed by its rich-text body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub heading: Option<String>,
    pub body: Vec<RichTextNode>,
}

/// An ordered, append-only list of posts plus the cursor of the next page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    /// URL of the next page, `None` once everything is loaded
    pub next_page: Option<String>,

    pub results: Vec<Post>,
}

impl PostPage {
    /// Whether another page can be requested
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }
}
