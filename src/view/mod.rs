//! Page view state: modal dialogs and the color theme

mod modal;
mod theme;

pub use modal::{ModalState, ModalTarget, OVERLAY_ID, STATIC_MODALS, UPDATE_PREFIX};
pub use theme::ThemeMode;
