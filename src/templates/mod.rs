//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers;

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Content and TOC labels are already markup
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("article.html", include_str!("site/article.html")),
            // Partials
            ("partials/head.html", include_str!("site/partials/head.html")),
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("site/partials/footer.html"),
            ),
            (
                "partials/post_card.html",
                include_str!("site/partials/post_card.html"),
            ),
            (
                "partials/updates.html",
                include_str!("site/partials/updates.html"),
            ),
            (
                "partials/modals.html",
                include_str!("site/partials/modals.html"),
            ),
            (
                "partials/scripts.html",
                include_str!("site/partials/scripts.html"),
            ),
            (
                "partials/scrollspy.html",
                include_str!("site/partials/scrollspy.html"),
            ),
        ])?;

        tera.register_filter("format_date", format_date_filter);
        tera.register_filter("relative_time", relative_time_filter);
        tera.register_filter("date_xml", date_xml_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: ISO date to "Jan 5, 2024"
fn format_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("format_date", "value", String, value);
    Ok(tera::Value::String(helpers::format_date(&s)))
}

/// Tera filter: ISO date to "Yesterday", "3 Days Ago", ...
fn relative_time_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("relative_time", "value", String, value);
    Ok(tera::Value::String(helpers::relative_time(&s)))
}

/// Tera filter: ISO date to a `datetime` attribute value
fn date_xml_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_xml", "value", String, value);
    Ok(tera::Value::String(helpers::date_xml(&s)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub root: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeData {
    pub html_class: String,
    pub icon_class: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostCardData {
    pub id: String,
    pub title: String,
    pub date: String,
    pub tag: String,
    pub tag_color: String,
    pub category: String,
    pub style: String,
    pub link: String,
    pub image: Option<String>,
    pub article_url: String,
    pub deep_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateData {
    pub id: String,
    pub title: String,
    pub content: String,
    pub full_content: String,
    pub date: String,
    pub tag: Option<String>,
    pub tag_color: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModalData {
    pub overlay_hidden: bool,
    pub body_overflow: String,
    /// Id of the visible static modal, if any
    pub open_static: String,
    /// Id of the visible update modal, if any
    pub open_update: String,
    /// Post shown in the preview modal
    pub post: Option<PostCardData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleData {
    pub id: String,
    pub title: String,
    pub tag: String,
    pub date: String,
    pub content: String,
    pub image: Option<String>,
    pub toc: String,
    pub has_toc: bool,
    pub toc_ids: Vec<String>,
    pub toc_root_margin: String,
}
