//! Navigation index (table of contents) built from heading descriptors

use serde::Serialize;

use super::annotate::{HeadingDescriptor, HeadingLevel};

/// Placeholder shown instead of an index when a document has no headings
pub const NO_SECTIONS_HTML: &str = r#"<span class="text-xs italic">No sections</span>"#;

/// A clickable TOC link for one heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationEntry {
    pub id: String,
    pub label: String,
    pub level: HeadingLevel,
    /// Only changed by the scroll tracker
    pub active: bool,
}

impl NavigationEntry {
    /// In-page anchor of the heading
    pub fn href(&self) -> String {
        format!("#{}", self.id)
    }

    /// Element id of the link itself
    pub fn link_id(&self) -> String {
        format!("link-{}", self.id)
    }

    /// Indentation and size classes for the entry's tier
    pub fn tier_class(&self) -> &'static str {
        match self.level {
            HeadingLevel::Major => "toc-major text-sm",
            HeadingLevel::Minor => "toc-minor pl-4 text-xs",
        }
    }

    /// Highlight classes for the active state
    pub fn state_class(&self) -> &'static str {
        if self.active {
            "toc-active text-brand-salmon font-bold border-brand-salmon"
        } else {
            "text-gray-500 dark:text-gray-500 border-transparent"
        }
    }
}

impl From<&HeadingDescriptor> for NavigationEntry {
    fn from(heading: &HeadingDescriptor) -> Self {
        Self {
            id: heading.id.clone(),
            label: heading.label.clone(),
            level: heading.level,
            active: false,
        }
    }
}

/// One entry per heading, in the same order
pub fn render_navigation(headings: &[HeadingDescriptor]) -> Vec<NavigationEntry> {
    headings.iter().map(NavigationEntry::from).collect()
}

/// Render entries as the TOC link list.
///
/// Returns an empty string for no entries; the caller decides on the
/// placeholder and on hiding the panel.
pub fn navigation_html(entries: &[NavigationEntry]) -> String {
    let mut html = String::new();
    for entry in entries {
        html.push_str(&format!(
            r#"<a href="{}" id="{}" class="toc-link block {} {} hover:text-black dark:hover:text-white transition-all duration-200 py-1 border-l-2 pl-3 hover:border-gray-300">{}</a>"#,
            entry.href(),
            entry.link_id(),
            entry.tier_class(),
            entry.state_class(),
            entry.label
        ));
        html.push('\n');
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::annotate;

    #[test]
    fn test_render_navigation_is_one_to_one() {
        let annotated = annotate("<h2>Intro</h2><h3>Details</h3><h2>End</h2>");
        let entries = render_navigation(&annotated.headings);
        assert_eq!(entries.len(), 3);
        for (entry, heading) in entries.iter().zip(&annotated.headings) {
            assert_eq!(entry.id, heading.id);
            assert_eq!(entry.label, heading.label);
            assert_eq!(entry.level, heading.level);
            assert!(!entry.active);
        }
    }

    #[test]
    fn test_empty_headings_give_empty_navigation() {
        let annotated = annotate("<p>no headings</p>");
        let entries = render_navigation(&annotated.headings);
        assert!(entries.is_empty());
        assert_eq!(navigation_html(&entries), "");
    }

    #[test]
    fn test_navigation_html_links_to_anchors() {
        let annotated = annotate("<h2>Intro</h2><h3>Details</h3>");
        let html = navigation_html(&render_navigation(&annotated.headings));
        assert!(html.contains(r##"href="#heading-0" id="link-heading-0""##));
        assert!(html.contains(r##"href="#heading-1" id="link-heading-1""##));
        assert!(html.contains("toc-major text-sm"));
        assert!(html.contains("toc-minor pl-4 text-xs"));
        assert!(html.contains(">Intro</a>"));
    }

    #[test]
    fn test_active_entry_uses_highlight_classes() {
        let mut entry = NavigationEntry::from(&HeadingDescriptor {
            id: "heading-0".to_string(),
            label: "A".to_string(),
            level: HeadingLevel::Major,
        });
        assert!(entry.state_class().contains("border-transparent"));
        entry.active = true;
        assert!(entry.state_class().contains("toc-active"));
    }
}
