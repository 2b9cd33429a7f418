//! Theme colors for the deck
//! Defaults follow the classic Terminal Farm palette; hearts can be recolored
//! from the `[theme]` table in config.toml.

use ratatui::style::Color;

use crate::config::ThemeConfig;
use crate::page::hearts::HeartVariant;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,           // Active borders, highlights
    pub danger: Color,           // Errors
    pub success: Color,          // Planted plots, confirmations
    pub warning: Color,          // Status messages
    pub text: Color,             // Primary text
    pub text_dim: Color,         // Hints, empty plots
    pub bg_selected: Color,      // Selection background
    pub inactive: Color,         // Inactive borders
    pub header: Color,           // Section headers
    pub heart_full: Color,
    pub heart_half: Color,
    pub heart_empty: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Indexed(51),        // bright cyan
            danger: Color::Indexed(196),
            success: Color::Indexed(46),       // bright green
            warning: Color::Indexed(226),      // bright yellow
            text: Color::Indexed(231),
            text_dim: Color::Indexed(245),
            bg_selected: Color::Indexed(238),
            inactive: Color::Indexed(240),
            header: Color::Indexed(208),       // orange
            heart_full: Color::Indexed(161),   // heart red
            heart_half: Color::Indexed(213),   // pink
            heart_empty: Color::Indexed(245),  // gray
        }
    }
}

impl Theme {
    /// Defaults with any valid overrides from config applied
    pub fn load(overrides: &ThemeConfig) -> Self {
        let mut theme = Self::default();

        let apply = |slot: &mut Color, value: &Option<String>, name: &str| {
            if let Some(raw) = value {
                match Self::parse_hex_color(raw) {
                    Some(color) => *slot = color,
                    None => tracing::warn!("Ignoring invalid {} color '{}'", name, raw),
                }
            }
        };

        apply(&mut theme.accent, &overrides.accent, "accent");
        apply(&mut theme.heart_full, &overrides.heart_full, "heart_full");
        apply(&mut theme.heart_half, &overrides.heart_half, "heart_half");
        apply(&mut theme.heart_empty, &overrides.heart_empty, "heart_empty");

        theme
    }

    pub fn heart(&self, variant: HeartVariant) -> Color {
        match variant {
            HeartVariant::Full => self.heart_full,
            HeartVariant::Half => self.heart_half,
            HeartVariant::Empty => self.heart_empty,
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
