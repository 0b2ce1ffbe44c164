//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is off: every CMS
//! string is escaped when the view data is built, and rich-text HTML is
//! inserted as delivered.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

/// Stylesheet copied to `css/style.css`
pub const STYLESHEET: &str = include_str!("site/style.css");

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Paths and pre-rendered HTML must pass through untouched
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("404.html", include_str!("site/404.html")),
            (
                "partials/post_list.html",
                include_str!("site/partials/post_list.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub url: String,
    pub lang: String,
}

/// One entry of the post list
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub uid: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub datetime: String,
}

/// The post page
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailData {
    pub uid: String,
    pub title: String,
    pub author: String,
    pub date: String,
    pub datetime: String,
    pub banner_url: String,
    pub read_minutes: usize,
    pub blocks: Vec<BlockData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockData {
    pub heading: String,
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData {
            title: "spacetraveling".to_string(),
            description: String::new(),
            url: "http://localhost:3000".to_string(),
            lang: "pt-BR".to_string(),
        }
    }

    fn post(uid: &str) -> PostData {
        PostData {
            uid: uid.to_string(),
            path: format!("/post/{}/", uid),
            title: format!("Title {}", uid),
            subtitle: "Subtitle".to_string(),
            author: "Author".to_string(),
            date: "15 mar 2021".to_string(),
            datetime: "2021-03-15T19:25:28.000Z".to_string(),
        }
    }

    #[test]
    fn test_render_index_with_more_pages() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("posts", &vec![post("a"), post("b")]);
        context.insert("next_page", &Some("https://cms/next"));
        context.insert("page_json", r#"{"next_page":"https://cms/next","results":[]}"#);

        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains(r#"<a href="/post/a/">"#));
        assert!(html.contains("<h1>Title b</h1>"));
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains(r#"{"next_page":"https://cms/next","results":[]}"#));
    }

    #[test]
    fn test_render_index_last_page_has_no_button() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("posts", &vec![post("a")]);
        context.insert("next_page", &Option::<String>::None);
        context.insert("page_json", "");

        let html = renderer.render("index.html", &context).unwrap();
        assert!(!html.contains("load-more"));
    }

    #[test]
    fn test_render_post() {
        let renderer = TemplateRenderer::new().unwrap();
        let detail = PostDetailData {
            uid: "a".to_string(),
            title: "Title".to_string(),
            author: "Author".to_string(),
            date: "15 mar 2021".to_string(),
            datetime: String::new(),
            banner_url: "https://img/b.png".to_string(),
            read_minutes: 4,
            blocks: vec![BlockData {
                heading: "Intro".to_string(),
                html: "<p>Body <strong>text</strong></p>".to_string(),
            }],
        };
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("post", &detail);

        let html = renderer.render("post.html", &context).unwrap();
        assert!(html.contains("<title>Title | spacetraveling</title>"));
        assert!(html.contains("4 min"));
        assert!(html.contains(r#"<img src="https://img/b.png""#));
        assert!(html.contains("<p>Body <strong>text</strong></p>"));
    }
}
