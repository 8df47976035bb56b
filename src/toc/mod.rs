//! Article content processing: heading anchors, table of contents, scroll-spy

mod annotate;
pub mod markup;
mod nav;
mod spy;

pub use annotate::{
    annotate, Annotated, Annotator, HeadingDescriptor, HeadingLevel, DEFAULT_ID_PREFIX,
};
pub use nav::{navigation_html, render_navigation, NavigationEntry, NO_SECTIONS_HTML};
pub use spy::{ElementBox, ScrollSpy, ViewportBand, VisibilityEvent, VisibilityTracker, WatchHandle};

use crate::config::TocConfig;

/// Annotated article content together with its navigation index
#[derive(Debug, Clone)]
pub struct ArticleToc {
    pub annotated: Annotated,
    pub entries: Vec<NavigationEntry>,
}

impl ArticleToc {
    /// Run the annotator and navigation renderer with site settings
    pub fn build(content: &str, config: &TocConfig) -> Self {
        let annotated = Annotator::new(&config.id_prefix).annotate(content);
        let entries = render_navigation(&annotated.headings);
        Self { annotated, entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Link list, or the "No sections" placeholder
    pub fn index_html(&self) -> String {
        if self.is_empty() {
            NO_SECTIONS_HTML.to_string()
        } else {
            navigation_html(&self.entries)
        }
    }

    /// A scroll-spy already watching every heading of this article
    pub fn scroll_spy(&self) -> ScrollSpy {
        let mut spy = ScrollSpy::new(self.entries.clone());
        spy.observe(self.entries.iter().map(|e| e.id.clone()));
        spy
    }
}
