//! glitchy-kernel: static renderer for the GlitchyKernel blog
//!
//! Posts and short updates are read from two JSON collections and rendered
//! with Tera templates into a home feed, one page per article, and deep-link
//! pages. Article bodies go through [`toc`], which anchors their headings and
//! builds the table of contents that the scroll-spy highlights.

pub mod commands;
pub mod config;
pub mod content;
pub mod context;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;
pub mod toc;
pub mod view;

use anyhow::Result;
use std::path::Path;

pub use context::{ArticleView, SiteContext};

/// A site on disk: configuration and resolved directories
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Directory holding the posts and updates collections
    pub data_dir: std::path::PathBuf,
    /// Static assets copied verbatim
    pub source_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Site {
    /// Create a site from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let data_dir = base_dir.join(&config.data_dir);
        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            data_dir,
            source_dir,
            public_dir,
        })
    }

    /// Load the data collections and build the application context.
    ///
    /// A failed load is logged and yields an empty context.
    pub fn load_context(self) -> SiteContext {
        let loader = content::DataLoader::new(&self.config, &self.base_dir);
        let data = loader.load_or_empty();
        SiteContext::new(self, data)
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
