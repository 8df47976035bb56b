//! Content module - posts, updates, and loading them from the data directory

pub mod loader;
mod post;

pub use loader::{ContentSet, DataError, DataLoader};
pub use post::{newest_first, sort_newest_first, Post, PostContent, PostStyle, Update};
