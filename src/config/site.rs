//! Site configuration (_config.yml)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `cms.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,

    // Directory
    pub public_dir: String,

    // Date format (date-fns tokens, e.g. "dd MMM yyyy")
    pub date_format: String,

    /// Seconds between two regenerations of the whole site
    pub revalidate: u64,

    // Content source
    pub cms: CmsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt_BR".to_string(),
            timezone: "UTC".to_string(),

            url: "http://localhost:3000".to_string(),

            public_dir: "public".to_string(),

            date_format: "dd MMM yyyy".to_string(),

            revalidate: 60 * 60 * 24,

            cms: CmsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Reject values that cannot be placed into a CMS query
    pub fn validate(&self) -> Result<()> {
        let kind = &self.cms.document_type;
        let valid = !kind.is_empty()
            && kind
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            bail!(
                "Invalid cms.document_type {:?}: use letters, digits, '_' or '-'",
                kind
            );
        }
        Ok(())
    }

    /// Pick up secrets that should not live in the config file
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.is_empty() {
                tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
                self.cms.access_token = Some(token);
            }
        }
    }
}

/// Headless CMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// API endpoint, e.g. `https://<repo>.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type holding the posts
    pub document_type: String,
    /// Posts on the first index page and per "load more"
    pub page_size: u32,
    /// JSON file of raw documents; when set, the API is not contacted
    pub fixtures: Option<PathBuf>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "post".to_string(),
            page_size: 2,
            fixtures: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "spacetraveling");
        assert_eq!(config.revalidate, 86_400);
        assert_eq!(config.cms.page_size, 2);
        assert_eq!(config.cms.document_type, "post");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
timezone: America/Sao_Paulo
revalidate: 600
cms:
  endpoint: https://myblog.cdn.prismic.io/api/v2
  page_size: 5
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.timezone, "America/Sao_Paulo");
        assert_eq!(config.revalidate, 600);
        assert_eq!(config.cms.endpoint, "https://myblog.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.page_size, 5);
        // Unset fields keep their defaults
        assert_eq!(config.cms.document_type, "post");
        assert_eq!(config.date_format, "dd MMM yyyy");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "title: From File\ncms:\n  fixtures: posts.json\n").unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "From File");
        assert_eq!(config.cms.fixtures, Some(PathBuf::from("posts.json")));

        fs::write(&path, "title: [unclosed").unwrap();
        assert!(SiteConfig::load(&path).is_err());
    }

    #[test]
    fn test_document_type_must_be_an_identifier() {
        let mut config = SiteConfig::default();
        assert!(config.validate().is_ok());

        config.cms.document_type = "blog_post-v2".to_string();
        assert!(config.validate().is_ok());

        for kind in ["", "post.uid", r#"post")]]"#, "a b"] {
            config.cms.document_type = kind.to_string();
            assert!(config.validate().is_err(), "{:?}", kind);
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "cms:\n  document_type: \"post)]]\"\n").unwrap();
        assert!(SiteConfig::load(&path).is_err());
    }
}
