//! Generator module - renders the post list and post pages into static HTML

use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tera::Context;

use crate::cms::ContentSource;
use crate::content::{
    estimate_read_minutes, normalize_detail, normalize_page, Post, PostDetail, PostPage,
};
use crate::error::CmsError;
use crate::helpers::{date_xml, DateFormatter};
use crate::richtext::{escape_html, PrismicRichText, RichTextFormat};
use crate::templates::{
    BlockData, PostData, PostDetailData, SiteData, TemplateRenderer, STYLESHEET,
};
use crate::Blog;

/// Outcome of a full generation
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    /// Posts on the first index page
    pub listed: usize,
    /// Post pages written
    pub posts: usize,
    /// Uids whose page could not be generated
    pub failed: Vec<String>,
}

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    dates: DateFormatter,
    rich_text: PrismicRichText,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let config = &blog.config;
        let dates = DateFormatter::new(&config.date_format, &config.timezone, &config.language);

        Ok(Self {
            blog: blog.clone(),
            renderer,
            dates,
            rich_text: PrismicRichText,
        })
    }

    /// Generate the entire site
    pub async fn generate(&self, source: &dyn ContentSource) -> Result<GenerateReport> {
        let kind = &self.blog.config.cms.document_type;

        fs::create_dir_all(&self.blog.public_dir)?;
        self.write_file(&self.blog.public_dir.join("css/style.css"), STYLESHEET)?;
        self.write_file(&self.blog.public_dir.join("404.html"), &self.render_not_found()?)?;

        // Index: first page only, the rest is loaded on demand
        let first = source
            .get_by_type(kind, self.blog.config.cms.page_size)
            .await?;
        let page = normalize_page(&first);
        self.write_file(
            &self.blog.public_dir.join("index.html"),
            &self.render_index(&page)?,
        )?;

        let mut report = GenerateReport {
            listed: page.results.len(),
            ..Default::default()
        };

        // One page per known slug
        let documents = source.get_all_by_type(kind).await?;
        tracing::info!("Found {} {} documents", documents.len(), kind);

        for doc in documents {
            let Some(uid) = doc.uid else {
                tracing::warn!("Skipping {} document without uid {:?}", kind, doc.id);
                continue;
            };

            match self.generate_post(source, &uid).await {
                Ok(_) => report.posts += 1,
                Err(e) => {
                    tracing::warn!("Failed to generate post {}: {}", uid, e);
                    report.failed.push(uid);
                }
            }
        }

        Ok(report)
    }

    /// Fetch one post by uid and write its page; returns the written file
    pub async fn generate_post(&self, source: &dyn ContentSource, uid: &str) -> Result<PathBuf> {
        let kind = &self.blog.config.cms.document_type;
        let doc = source.get_by_uid(kind, uid).await?;
        let detail = normalize_detail(&doc);

        let output_path = self.post_output_path(uid);
        self.write_file(&output_path, &self.render_post(&detail)?)?;
        Ok(output_path)
    }

    /// Where the page of `uid` lives under the public directory
    pub fn post_output_path(&self, uid: &str) -> PathBuf {
        self.blog
            .public_dir
            .join(post_path(uid).trim_start_matches('/'))
            .join("index.html")
    }

    /// Render the post list page
    pub fn render_index(&self, page: &PostPage) -> Result<String> {
        let page_json = serde_json::to_string(page)?.replace("</", "<\\/");

        let mut context = self.create_base_context();
        context.insert("posts", &self.post_list_data(&page.results));
        context.insert("next_page", &page.next_page);
        context.insert("page_json", &page_json);

        self.renderer.render("index.html", &context)
    }

    /// Render list items for `posts`, as appended by "load more"
    pub fn render_post_list(&self, posts: &[Post]) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert("posts", &self.post_list_data(posts));
        self.renderer.render("partials/post_list.html", &context)
    }

    /// Render a post page
    pub fn render_post(&self, post: &PostDetail) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert("post", &self.post_detail_data(post));
        self.renderer.render("post.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        let context = self.create_base_context();
        self.renderer.render("404.html", &context)
    }

    fn create_base_context(&self) -> Context {
        let config = &self.blog.config;
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: escape_html(&config.title),
                description: escape_html(&config.description),
                url: config.url.clone(),
                lang: config.language.replace('_', "-"),
            },
        );
        context
    }

    fn post_list_data(&self, posts: &[Post]) -> Vec<PostData> {
        posts
            .iter()
            .map(|p| PostData {
                uid: p.uid.clone().unwrap_or_default(),
                path: p.uid.as_deref().map(post_path).unwrap_or_default(),
                title: text(&p.title),
                subtitle: text(&p.subtitle),
                author: text(&p.author),
                date: self.dates.format_opt(p.first_publication_date.as_ref()),
                datetime: p
                    .first_publication_date
                    .as_ref()
                    .map(date_xml)
                    .unwrap_or_default(),
            })
            .collect()
    }

    fn post_detail_data(&self, post: &PostDetail) -> PostDetailData {
        let blocks = post
            .content
            .iter()
            .map(|block| BlockData {
                heading: text(&block.heading),
                html: self.rich_text.to_html(&block.body),
            })
            .collect();

        PostDetailData {
            uid: post.uid.clone().unwrap_or_default(),
            title: text(&post.title),
            author: text(&post.author),
            date: self.dates.format_opt(post.first_publication_date.as_ref()),
            datetime: post
                .first_publication_date
                .as_ref()
                .map(date_xml)
                .unwrap_or_default(),
            banner_url: text(&post.banner_url),
            read_minutes: estimate_read_minutes(&post.content, &self.rich_text),
            blocks,
        }
    }

    /// Replace `path` in one step, so the server never reads a partial page
    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let mut file = tempfile::NamedTempFile::new_in(parent)?;
        file.write_all(content.as_bytes())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))?;
        }
        file.persist(path)?;

        tracing::debug!("Generated: {:?}", path);
        Ok(())
    }
}

/// URL path of a post page
pub fn post_path(uid: &str) -> String {
    format!("/post/{}/", slug::slugify(uid))
}

/// Whether an error from [`Generator::generate_post`] means the post does
/// not exist
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<CmsError>()
        .map(CmsError::is_not_found)
        .unwrap_or(false)
}

/// Escaped display text for an optional CMS field
fn text(value: &Option<String>) -> String {
    escape_html(value.as_deref().unwrap_or(""))
}
