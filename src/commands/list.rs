//! List site content

use anyhow::Result;
use indexmap::IndexMap;

use crate::content::{sort_newest_first, ContentSet, DataLoader};
use crate::helpers::{article_url, format_date};
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let loader = DataLoader::new(&site.config, &site.base_dir);
    // Unlike the renderers, listing reports a broken data file
    let mut data = loader.load()?;
    sort_newest_first(&mut data.posts);

    for line in lines(site, &data, content_type)? {
        println!("{}", line);
    }

    Ok(())
}

fn lines(site: &Site, data: &ContentSet, content_type: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();

    match content_type {
        "post" | "posts" => {
            out.push(format!("Posts ({}):", data.posts.len()));
            for post in &data.posts {
                out.push(format!(
                    "  {} - {} [{}]",
                    format_date(&post.date),
                    post.title,
                    article_url(&site.config, &post.id)
                ));
            }
        }
        "update" | "updates" => {
            out.push(format!("Updates ({}):", data.updates.len()));
            for update in &data.updates {
                out.push(format!(
                    "  {} - {} [{}]",
                    format_date(&update.date),
                    update.title,
                    update.id
                ));
            }
        }
        "tag" | "tags" => {
            let tags = tag_counts(data);
            out.push(format!("Tags ({}):", tags.len()));
            for (tag, count) in tags {
                out.push(format!("  {} ({})", tag, count));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, updates, tags",
                content_type
            );
        }
    }

    Ok(out)
}

/// Post and update tags by use count; ties keep first-seen order
fn tag_counts(data: &ContentSet) -> Vec<(String, usize)> {
    let mut tags: IndexMap<String, usize> = IndexMap::new();
    let post_tags = data.posts.iter().map(|p| p.tag.as_str());
    let update_tags = data.updates.iter().filter_map(|u| u.tag.as_deref());

    for tag in post_tags.chain(update_tags).filter(|t| !t.is_empty()) {
        *tags.entry(tag.to_string()).or_insert(0) += 1;
    }

    let mut tags: Vec<_> = tags.into_iter().collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::{post, update};

    fn data() -> ContentSet {
        let mut tagged = update("update-1", "2024-05-02");
        tagged.tag = Some("Rust".to_string());
        let mut rust = post("b", "Borrowing", "2024-01-02", "");
        rust.tag = "Rust".to_string();

        ContentSet {
            posts: vec![post("a", "Allocators", "2024-01-01", ""), rust],
            updates: vec![tagged, update("update-2", "2024-05-03")],
        }
    }

    #[test]
    fn test_list_posts() {
        let site = Site::new("no-such-dir").unwrap();
        let out = lines(&site, &data(), "posts").unwrap();
        assert_eq!(out[0], "Posts (2):");
        assert_eq!(out[1], "  Jan 1, 2024 - Allocators [/article.html?id=a]");
    }

    #[test]
    fn test_list_updates() {
        let site = Site::new("no-such-dir").unwrap();
        let out = lines(&site, &data(), "updates").unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[2], "  May 3, 2024 - Update update-2 [update-2]");
    }

    #[test]
    fn test_tag_counts() {
        let tags = tag_counts(&data());
        assert_eq!(
            tags,
            vec![("Rust".to_string(), 2), ("Systems".to_string(), 1)]
        );
    }

    #[test]
    fn test_unknown_type() {
        let site = Site::new("no-such-dir").unwrap();
        assert!(lines(&site, &data(), "pages").is_err());
    }
}
