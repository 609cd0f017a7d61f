//! Named colour themes.
//!
//! A [`ThemeRegistry`] is a closed, immutable table handed to the compiler;
//! nothing reads styling from global state. Lookup never fails: an unknown
//! name resolves to the registry's default theme.

use crate::backend::model::RgbColor;
use serde::{Deserialize, Serialize};

/// Colours applied uniformly across a deck.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub title_color: RgbColor,
    pub body_color: RgbColor,
    /// Fill behind table header cells. Header text is always white.
    pub table_header_color: RgbColor,
    pub table_body_text_color: RgbColor,
    /// Page background for every slide; `None` keeps the layout's own.
    pub background_color: Option<RgbColor>,
}

impl Theme {
    /// Navy titles on the stock white layout.
    pub const DEFAULT: Theme = Theme {
        title_color: RgbColor::new(0.1, 0.1, 0.5),
        body_color: RgbColor::new(0.2, 0.2, 0.2),
        table_header_color: RgbColor::new(0.1, 0.1, 0.5),
        table_body_text_color: RgbColor::new(0.2, 0.2, 0.2),
        background_color: None,
    };

    pub const MINIMAL: Theme = Theme {
        title_color: RgbColor::new(0.13, 0.13, 0.13),
        body_color: RgbColor::new(0.33, 0.33, 0.33),
        table_header_color: RgbColor::new(0.4, 0.4, 0.4),
        table_body_text_color: RgbColor::new(0.2, 0.2, 0.2),
        background_color: Some(RgbColor::new(1.0, 1.0, 1.0)),
    };

    pub const DARK: Theme = Theme {
        title_color: RgbColor::new(1.0, 1.0, 1.0),
        body_color: RgbColor::new(0.85, 0.86, 0.9),
        table_header_color: RgbColor::new(0.4, 0.49, 0.92),
        table_body_text_color: RgbColor::new(0.9, 0.9, 0.95),
        background_color: Some(RgbColor::new(0.06, 0.07, 0.09)),
    };

    pub const CORPORATE: Theme = Theme {
        title_color: RgbColor::new(0.0, 0.2, 0.4),
        body_color: RgbColor::new(0.15, 0.15, 0.2),
        table_header_color: RgbColor::new(0.0, 0.32, 0.6),
        table_body_text_color: RgbColor::new(0.1, 0.1, 0.15),
        background_color: Some(RgbColor::new(0.96, 0.97, 0.99)),
    };
}

/// Immutable name → [`Theme`] table with a fallback.
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    entries: Vec<(&'static str, Theme)>,
    default: Theme,
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ThemeRegistry {
    /// The four stock themes: `default`, `minimal`, `dark`, `corporate`.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                ("default", Theme::DEFAULT),
                ("minimal", Theme::MINIMAL),
                ("dark", Theme::DARK),
                ("corporate", Theme::CORPORATE),
            ],
            default: Theme::DEFAULT,
        }
    }

    /// Resolve a theme by name, case-insensitively.
    ///
    /// Display labels such as `"Default (No Theme)"` match on their first
    /// word. Anything unrecognised gets the default theme.
    pub fn resolve(&self, name: &str) -> &Theme {
        self.lookup(name).unwrap_or(&self.default)
    }

    /// Exact lookup without the fallback.
    pub fn lookup(&self, name: &str) -> Option<&Theme> {
        let key = normalise(name);
        self.entries
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, t)| t)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }
}

fn normalise(name: &str) -> String {
    name.split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_builtin_names_case_insensitively() {
        let reg = ThemeRegistry::builtin();
        assert_eq!(reg.resolve("Dark"), &Theme::DARK);
        assert_eq!(reg.resolve("  corporate "), &Theme::CORPORATE);
        assert_eq!(reg.resolve("MINIMAL"), &Theme::MINIMAL);
    }

    #[test]
    fn display_label_matches_first_word() {
        let reg = ThemeRegistry::builtin();
        assert_eq!(reg.resolve("Default (No Theme)"), &Theme::DEFAULT);
    }

    #[test]
    fn unknown_name_falls_back_to_default() {
        let reg = ThemeRegistry::builtin();
        assert_eq!(reg.resolve("Solarized"), &Theme::DEFAULT);
        assert_eq!(reg.resolve(""), &Theme::DEFAULT);
        assert!(reg.lookup("Solarized").is_none());
    }

    #[test]
    fn default_theme_keeps_layout_background() {
        assert!(Theme::DEFAULT.background_color.is_none());
        assert!(Theme::DARK.background_color.is_some());
    }

    #[test]
    fn lists_names_in_order() {
        let names: Vec<_> = ThemeRegistry::builtin().names().collect();
        assert_eq!(names, ["default", "minimal", "dark", "corporate"]);
    }
}
