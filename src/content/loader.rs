//! Data loader - reads the posts and updates collections

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{Post, Update};
use crate::config::SiteConfig;

/// Failures while loading a data collection
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Data file not found: {0}")]
    Missing(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Both collections, as loaded
#[derive(Debug, Clone, Default)]
pub struct ContentSet {
    pub posts: Vec<Post>,
    pub updates: Vec<Update>,
}

/// Loads `posts.json` and `updates.json` from the data directory
pub struct DataLoader {
    posts_path: PathBuf,
    updates_path: PathBuf,
}

impl DataLoader {
    /// Create a loader for a site rooted at `base_dir`
    pub fn new(config: &SiteConfig, base_dir: &Path) -> Self {
        let data_dir = base_dir.join(&config.data_dir);
        Self {
            posts_path: data_dir.join(&config.posts_file),
            updates_path: data_dir.join(&config.updates_file),
        }
    }

    /// Load both collections. Either both succeed or nothing is returned.
    pub fn load(&self) -> Result<ContentSet, DataError> {
        let posts: Vec<Post> = read_collection(&self.posts_path)?;
        let updates: Vec<Update> = read_collection(&self.updates_path)?;

        tracing::info!("Loaded {} posts and {} updates", posts.len(), updates.len());

        Ok(ContentSet { posts, updates })
    }

    /// Load both collections, logging a failure and falling back to empty data
    pub fn load_or_empty(&self) -> ContentSet {
        match self.load() {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Error loading data: {}", e);
                ContentSet::default()
            }
        }
    }
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    if !path.exists() {
        return Err(DataError::Missing(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}
