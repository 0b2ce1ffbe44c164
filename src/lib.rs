//! spacetraveling: a static blog generator backed by a headless CMS
//!
//! Posts are fetched from the CMS, shaped into small post records and
//! rendered with built-in Tera templates. The bundled server regenerates
//! the site on a fixed interval, builds unknown post pages on first request
//! and answers the "load more" button of the post list.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod richtext;
pub mod server;
pub mod templates;

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cms::{ContentSource, MemoryCms, PrismicClient};

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a new blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            let mut config = config::SiteConfig::default();
            config.apply_env();
            config
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog instance from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// Build the content source described by the configuration
    pub fn content_source(&self) -> Result<Arc<dyn ContentSource>> {
        self.config.validate()?;
        let cms = &self.config.cms;

        if let Some(fixtures) = &cms.fixtures {
            let path = self.base_dir.join(fixtures);
            tracing::info!("Reading posts from fixtures {:?}", path);
            return Ok(Arc::new(MemoryCms::from_fixture(path)?));
        }

        if cms.endpoint.is_empty() {
            bail!("No content source: set cms.endpoint or cms.fixtures in _config.yml");
        }

        let client = PrismicClient::new(&cms.endpoint, cms.access_token.clone());
        tracing::debug!("Using CMS at {}", client.endpoint());
        Ok(Arc::new(client))
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<generator::GenerateReport> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "spacetraveling");
        assert_eq!(blog.public_dir, dir.path().join("public"));
    }

    #[test]
    fn test_content_source_requires_endpoint_or_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::SiteConfig::default();
        config.cms.endpoint = String::new();
        config.cms.fixtures = None;

        let blog = Blog::with_config(dir.path(), config.clone());
        assert!(blog.content_source().is_err());

        std::fs::write(dir.path().join("posts.json"), "[]").unwrap();
        config.cms.fixtures = Some(PathBuf::from("posts.json"));
        let blog = Blog::with_config(dir.path(), config.clone());
        assert!(blog.content_source().is_ok());

        config.cms.document_type = "post.uid".to_string();
        let blog = Blog::with_config(dir.path(), config);
        assert!(blog.content_source().is_err());
    }
}
