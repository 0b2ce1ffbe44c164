//! List posts

use anyhow::Result;

use crate::content::{normalize_page, PostFeed};
use crate::helpers::DateFormatter;
use crate::Blog;

/// Print the first page of posts, or every post with `all`
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let config = &blog.config;
    let source = blog.content_source()?;

    let first = source
        .get_by_type(&config.cms.document_type, config.cms.page_size)
        .await?;
    let feed = PostFeed::new(normalize_page(&first));

    if all {
        while feed.has_more().await {
            feed.load_more(source.as_ref()).await?;
        }
    }

    let page = feed.into_inner();
    let dates = DateFormatter::new(&config.date_format, &config.timezone, &config.language);

    println!(
        "Posts ({}{}):",
        page.results.len(),
        if page.has_more() { ", more available" } else { "" }
    );
    for post in &page.results {
        println!(
            "  {} - {} [{}]",
            dates.format_opt(post.first_publication_date.as_ref()),
            post.title.as_deref().unwrap_or("(untitled)"),
            post.uid.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
