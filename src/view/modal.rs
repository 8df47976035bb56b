//! Modal dialog state: the overlay and at most one visible dialog

use crate::content::{Post, Update};

/// Element id of the dimmed overlay behind every modal
pub const OVERLAY_ID: &str = "modal-overlay";

/// Modal ids starting with this prefix address an update
pub const UPDATE_PREFIX: &str = "update-";

/// Modals that exist in the page markup itself
pub const STATIC_MODALS: &[&str] = &["about-modal"];

/// What the open overlay is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalTarget {
    /// A dialog written into the page, e.g. "About"
    Static(String),
    /// The dynamic update dialog filled from an update
    Update(String),
    /// The post preview dialog opened by a deep link
    Post(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalState {
    overlay_open: bool,
    active: Option<ModalTarget>,
}

impl ModalState {
    /// Open a modal by id. The overlay opens even when nothing matches.
    pub fn open(&mut self, modal_id: &str, updates: &[Update]) {
        self.overlay_open = true;
        self.active = if modal_id.starts_with(UPDATE_PREFIX) {
            updates
                .iter()
                .find(|u| u.id == modal_id)
                .map(|u| ModalTarget::Update(u.id.clone()))
        } else if STATIC_MODALS.contains(&modal_id) {
            Some(ModalTarget::Static(modal_id.to_string()))
        } else {
            None
        };

        if self.active.is_none() {
            tracing::debug!("No modal content for {:?}", modal_id);
        }
    }

    /// Open the preview dialog for a post
    pub fn open_post(&mut self, post_id: &str, posts: &[Post]) {
        self.overlay_open = true;
        self.active = posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| ModalTarget::Post(p.id.clone()));
    }

    pub fn close_all(&mut self) {
        self.overlay_open = false;
        self.active = None;
    }

    /// Click handler: only a click on the overlay itself closes
    pub fn close_on_overlay(&mut self, target_id: &str) {
        if target_id == OVERLAY_ID {
            self.close_all();
        }
    }

    /// Key handler: Escape closes everything
    pub fn handle_key(&mut self, key: &str) {
        if key == "Escape" {
            self.close_all();
        }
    }

    pub fn is_open(&self) -> bool {
        self.overlay_open
    }

    pub fn active(&self) -> Option<&ModalTarget> {
        self.active.as_ref()
    }

    /// `overflow` of the page body; scrolling is locked while open
    pub fn body_overflow(&self) -> &'static str {
        if self.overlay_open {
            "hidden"
        } else {
            "auto"
        }
    }

    pub fn active_update(&self) -> Option<&str> {
        match &self.active {
            Some(ModalTarget::Update(id)) => Some(id),
            _ => None,
        }
    }

    pub fn active_post(&self) -> Option<&str> {
        match &self.active {
            Some(ModalTarget::Post(id)) => Some(id),
            _ => None,
        }
    }

    pub fn active_static(&self) -> Option<&str> {
        match &self.active {
            Some(ModalTarget::Static(id)) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(id: &str) -> Update {
        Update {
            id: id.to_string(),
            title: "Title".to_string(),
            content: "short".to_string(),
            full_content: "long".to_string(),
            date: "2024-01-01".to_string(),
            tag: None,
            tag_color: None,
            image: None,
        }
    }

    #[test]
    fn test_open_update_modal() {
        let updates = vec![update("update-1"), update("update-2")];
        let mut state = ModalState::default();
        state.open("update-2", &updates);
        assert!(state.is_open());
        assert_eq!(state.active_update(), Some("update-2"));
        assert_eq!(state.body_overflow(), "hidden");
    }

    #[test]
    fn test_open_unknown_update_shows_only_overlay() {
        let mut state = ModalState::default();
        state.open("update-99", &[update("update-1")]);
        assert!(state.is_open());
        assert_eq!(state.active(), None);
    }

    #[test]
    fn test_open_static_modal() {
        let mut state = ModalState::default();
        state.open("about-modal", &[]);
        assert_eq!(state.active_static(), Some("about-modal"));
    }

    #[test]
    fn test_opening_replaces_previous_modal() {
        let updates = vec![update("update-1")];
        let mut state = ModalState::default();
        state.open("about-modal", &updates);
        state.open("update-1", &updates);
        assert_eq!(state.active_static(), None);
        assert_eq!(state.active_update(), Some("update-1"));
    }

    #[test]
    fn test_overlay_click_and_escape() {
        let mut state = ModalState::default();
        state.open("about-modal", &[]);

        state.close_on_overlay("modal-title");
        assert!(state.is_open());

        state.close_on_overlay(OVERLAY_ID);
        assert!(!state.is_open());
        assert_eq!(state.body_overflow(), "auto");

        state.open("about-modal", &[]);
        state.handle_key("Enter");
        assert!(state.is_open());
        state.handle_key("Escape");
        assert!(!state.is_open());
        assert_eq!(state.active(), None);
    }
}
