//! Post and Update models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::helpers::parse_date;

/// Card style of a post on the home page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStyle {
    #[default]
    Default,
    Image,
}

/// Article body: one markup string or fragments to concatenate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostContent {
    Html(String),
    Fragments(Vec<String>),
}

impl Default for PostContent {
    fn default() -> Self {
        PostContent::Html(String::new())
    }
}

impl PostContent {
    /// The full markup string
    pub fn to_html(&self) -> String {
        match self {
            PostContent::Html(html) => html.clone(),
            PostContent::Fragments(parts) => parts.concat(),
        }
    }
}

/// A blog post from `posts.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,

    /// ISO 8601 date
    pub date: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub tag: String,

    #[serde(default)]
    pub style: PostStyle,

    /// Link target of the home page card
    #[serde(default)]
    pub link: String,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub content: PostContent,
}

impl Post {
    /// URL-friendly form of the title, used for deep links
    pub fn slug(&self) -> String {
        slug::slugify(&self.title)
    }

    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        parse_date(&self.date)
    }
}

/// A short update from `updates.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    pub id: String,
    pub title: String,

    /// Teaser shown in the list
    #[serde(default)]
    pub content: String,

    /// Text shown in the modal
    #[serde(default)]
    pub full_content: String,

    /// ISO 8601 date
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub tag: Option<String>,

    #[serde(default)]
    pub tag_color: Option<String>,

    #[serde(default)]
    pub image: Option<String>,
}

impl Update {
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        parse_date(&self.date)
    }
}

/// Ordering for newest first; undated posts compare as oldest
pub fn newest_first(a: &Post, b: &Post) -> std::cmp::Ordering {
    b.parsed_date().cmp(&a.parsed_date())
}

/// Sort posts newest first; undated posts go last in their original order
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(newest_first);
}
