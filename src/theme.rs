//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette: semantic roles to Style
// ============================================================================

/// A complete color palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Rank bands --
    pub band_a: Style,
    pub band_b: Style,
    pub band_c: Style,
    pub band_d: Style,
    /// Band D stories that still made the homepage.
    pub band_homepage: Style,

    // -- Story list --
    pub row_selected: Style,
    pub row_meta: Style,
    pub list_message: Style,

    // -- Chrome --
    pub header: Style,
    pub header_mode: Style,
    pub status_bar: Style,
    pub status_loading: Style,
    pub status_error: Style,
    pub panel_border: Style,

    // -- Help overlay --
    pub help_heading: Style,
    pub help_key: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            band_a: Style::default().fg(Color::LightGreen),
            band_b: Style::default().fg(Color::LightYellow),
            band_c: Style::default().fg(Color::LightBlue),
            band_d: Style::default().fg(Color::DarkGray),
            band_homepage: Style::default().fg(Color::White),

            row_selected: Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            row_meta: Style::default().fg(Color::Gray),
            list_message: Style::default().fg(Color::Gray),

            header: Style::default().add_modifier(Modifier::BOLD),
            header_mode: Style::default().fg(Color::Cyan),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_loading: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            status_error: Style::default().fg(Color::Red),
            panel_border: Style::default().fg(Color::DarkGray),

            help_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            help_key: Style::default().fg(Color::Yellow),
        }
    }

    /// Light palette, adapted for light terminal backgrounds.
    fn light() -> Self {
        Self {
            band_a: Style::default().fg(Color::Green),
            band_b: Style::default().fg(Color::Rgb(0xb5, 0x89, 0x00)),
            band_c: Style::default().fg(Color::Blue),
            band_d: Style::default().fg(Color::Gray),
            band_homepage: Style::default().fg(Color::Black),

            row_selected: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            row_meta: Style::default().fg(Color::DarkGray),
            list_message: Style::default().fg(Color::DarkGray),

            header: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            header_mode: Style::default().fg(Color::Blue),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_loading: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            status_error: Style::default().fg(Color::Red),
            panel_border: Style::default().fg(Color::DarkGray),

            help_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            help_key: Style::default().fg(Color::Magenta),
        }
    }
}

// ============================================================================
// Style Map: string-keyed lookup
// ============================================================================

/// String-keyed style lookup.
///
/// Built from a `ColorPalette`, so renderers can ask for a role by name
/// (e.g. `ColorBand::role()` returns `"band_a"`).
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 16] = [
    "band_a",
    "band_b",
    "band_c",
    "band_d",
    "band_homepage",
    "row_selected",
    "row_meta",
    "list_message",
    "header",
    "header_mode",
    "status_bar",
    "status_loading",
    "status_error",
    "panel_border",
    "help_heading",
    "help_key",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 16] = [
            p.band_a,
            p.band_b,
            p.band_c,
            p.band_d,
            p.band_homepage,
            p.row_selected,
            p.row_meta,
            p.list_message,
            p.header,
            p.header_mode,
            p.status_bar,
            p.status_loading,
            p.status_error,
            p.panel_border,
            p.help_heading,
            p.help_key,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
