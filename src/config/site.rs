//! Site configuration (_config.yml)

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::toc::{ViewportBand, DEFAULT_ID_PREFIX};
use crate::view::ThemeMode;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub data_dir: String,
    pub posts_file: String,
    pub updates_file: String,
    pub source_dir: String,
    pub public_dir: String,

    // Home page
    pub featured_count: usize,
    pub updates_preview: usize,

    // Appearance
    pub theme: ThemeMode,
    /// Tag name -> badge classes for the featured logs list
    pub tag_colors: IndexMap<String, String>,
    pub default_tag_color: String,
    pub default_category: String,

    // Article
    #[serde(default)]
    pub toc: TocConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut tag_colors = IndexMap::new();
        tag_colors.insert(
            "Machine Learning".to_string(),
            "bg-brand-cyan text-brand-black".to_string(),
        );
        tag_colors.insert(
            "Front End".to_string(),
            "bg-brand-salmon text-brand-black".to_string(),
        );

        Self {
            title: "GlitchyKernel".to_string(),
            description: String::new(),
            author: "GlitchyKernel".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            data_dir: "data".to_string(),
            posts_file: "posts.json".to_string(),
            updates_file: "updates.json".to_string(),
            source_dir: "source".to_string(),
            public_dir: "public".to_string(),

            featured_count: 2,
            updates_preview: 3,

            theme: ThemeMode::Light,
            tag_colors,
            default_tag_color: "bg-gray-200 dark:bg-gray-700 text-black dark:text-white"
                .to_string(),
            default_category: "Tech".to_string(),

            toc: TocConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.toc.validate()?;
        Ok(config)
    }

    /// Badge classes for a tag in the featured logs list
    pub fn tag_color(&self, tag: &str) -> &str {
        self.tag_colors
            .get(tag)
            .map(String::as_str)
            .unwrap_or(&self.default_tag_color)
    }
}

/// Table of contents and scroll-spy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    /// Prefix of generated heading ids
    pub id_prefix: String,
    /// Fraction of the viewport height excluded above the reading band
    pub top_margin: f64,
    /// Fraction of the viewport height excluded below the reading band
    pub bottom_margin: f64,
}

impl Default for TocConfig {
    fn default() -> Self {
        let band = ViewportBand::default();
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            top_margin: band.top_margin,
            bottom_margin: band.bottom_margin,
        }
    }
}

impl TocConfig {
    /// Reject an id prefix that would not survive inside `id="..."` and `#...`
    pub fn validate(&self) -> Result<()> {
        let valid = self
            .id_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            anyhow::bail!(
                "Invalid toc.id_prefix {:?}: use ASCII letters, digits, '-' or '_'",
                self.id_prefix
            );
        }
        Ok(())
    }

    pub fn band(&self) -> ViewportBand {
        ViewportBand::new(self.top_margin, self.bottom_margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "GlitchyKernel");
        assert_eq!(config.featured_count, 2);
        assert_eq!(config.updates_preview, 3);
        assert_eq!(config.toc.id_prefix, "heading-");
        assert_eq!(config.theme, ThemeMode::Light);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Log
theme: dark
featured_count: 3
tag_colors:
  Rust: bg-brand-lemon text-brand-black
toc:
  bottom_margin: 0.6
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Log");
        assert_eq!(config.theme, ThemeMode::Dark);
        assert_eq!(config.featured_count, 3);
        assert_eq!(config.updates_preview, 3);
        assert_eq!(config.toc.id_prefix, "heading-");
        assert_eq!(config.toc.band().root_margin(), "-10% 0px -60% 0px");
        assert_eq!(config.tag_color("Rust"), "bg-brand-lemon text-brand-black");
    }

    #[test]
    fn test_tag_color_fallback() {
        let config = SiteConfig::default();
        assert_eq!(
            config.tag_color("Machine Learning"),
            "bg-brand-cyan text-brand-black"
        );
        assert_eq!(config.tag_color("Unknown"), config.default_tag_color);
    }

    #[test]
    fn test_toc_prefix_validation() {
        let mut toc = TocConfig::default();
        assert!(toc.validate().is_ok());

        toc.id_prefix = "sec_2-".to_string();
        assert!(toc.validate().is_ok());

        for bad in [r#"x" onmouseover="y"#, "a b", "a#b", "<h>"] {
            toc.id_prefix = bad.to_string();
            assert!(toc.validate().is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_load_rejects_unsafe_prefix() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "toc:\n  id_prefix: 'a\"b'\n").unwrap();
        assert!(SiteConfig::load(&path).is_err());

        fs::write(&path, "toc:\n  id_prefix: sec-\n").unwrap();
        assert_eq!(SiteConfig::load(&path).unwrap().toc.id_prefix, "sec-");
    }
}
