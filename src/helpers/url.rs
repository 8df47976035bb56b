//! URL helper functions

use lazy_static::lazy_static;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use std::path::Path;

use crate::config::SiteConfig;

lazy_static! {
    static ref EDGE_SLASHES: Regex = Regex::new(r"^/+|/+$").unwrap();
}

/// Characters escaped in a single path or query component
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Page that renders a post selected by `?id=`
pub const ARTICLE_PAGE: &str = "article.html";

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Encode a URL component
pub fn encode_url(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Query-string address of an article (`article.html?id=...`)
pub fn article_url(config: &SiteConfig, id: &str) -> String {
    url_for(config, &format!("{}?id={}", ARTICLE_PAGE, encode_url(id)))
}

/// Pre-rendered page of an article
pub fn article_page_url(config: &SiteConfig, id: &str) -> String {
    url_for(config, &format!("article/{}/", encode_url(id)))
}

/// Deep-link address of a post, derived from its title
pub fn deep_link_url(config: &SiteConfig, title: &str) -> String {
    url_for(config, &format!("{}/", slug::slugify(title)))
}

/// Whether `id` can be used as one directory name under the public dir
pub fn is_safe_path_segment(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && !id.contains("..")
        && !id.contains(['/', '\\', ':'])
        && !Path::new(id).is_absolute()
}

/// Extract a deep-link slug from a request path.
///
/// Leading/trailing slashes are removed and the path is percent-decoded.
/// The site root itself and `index.html` are not deep links.
pub fn deep_link_slug(path: &str) -> Option<String> {
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let trimmed = EDGE_SLASHES.replace_all(&decoded, "");
    if trimmed.is_empty() || trimmed == "index.html" {
        None
    } else {
        Some(trimmed.into_owned())
    }
}
