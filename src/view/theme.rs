//! Light/dark theme state

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggle(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Class on the `<html>` element
    pub fn html_class(self) -> &'static str {
        match self {
            ThemeMode::Light => "",
            ThemeMode::Dark => "dark",
        }
    }

    /// Icon of the toggle button; shows the mode you would switch to
    pub fn icon_class(self) -> &'static str {
        match self {
            ThemeMode::Light => "ph-moon",
            ThemeMode::Dark => "ph-sun",
        }
    }
}
