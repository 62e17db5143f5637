//! Keybinding registry: maps key events to actions with config overrides.
//!
//! The default table mirrors the classic hckrnews viewer keys; users can rebind
//! any action from the `[keybindings]` table in config.toml.
use crate::view::{FilterMode, SortMode};
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    PrevDay,
    NextDay,
    SelectUp,
    SelectDown,
    SelectFirst,
    SelectLast,
    OpenStory,
    OpenComments,
    Filter(FilterMode),
    Sort(SortMode),
    Refresh,
    ShowHelp,
    CycleTheme,
}

/// Section of the help overlay an action is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    Navigation,
    Links,
    View,
    General,
}

impl Group {
    pub const ALL: [Group; 4] = [Group::Navigation, Group::Links, Group::View, Group::General];

    pub fn title(self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::Links => "Links",
            Self::View => "Filter & Sort",
            Self::General => "General",
        }
    }
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::PrevDay => "Previous day",
            Self::NextDay => "Next day",
            Self::SelectUp => "Select previous story",
            Self::SelectDown => "Select next story",
            Self::SelectFirst => "Jump to first story",
            Self::SelectLast => "Jump to last story",
            Self::OpenStory => "Open story in browser",
            Self::OpenComments => "Open comments in browser",
            Self::Filter(FilterMode::Top10) => "Show top 10",
            Self::Filter(FilterMode::Top20) => "Show top 20",
            Self::Filter(FilterMode::Top50Pct) => "Show top 50%",
            Self::Filter(FilterMode::All) => "Show all stories",
            Self::Filter(FilterMode::AllViaHomepage) => "Show homepage stories",
            Self::Sort(SortMode::ByPoints) => "Sort by points",
            Self::Sort(SortMode::ByComments) => "Sort by comments",
            Self::Sort(SortMode::ByDate) => "Sort by date",
            Self::Refresh => "Reload current day",
            Self::ShowHelp => "Toggle help",
            Self::CycleTheme => "Cycle theme",
        }
    }

    pub fn group(self) -> Group {
        match self {
            Self::PrevDay
            | Self::NextDay
            | Self::SelectUp
            | Self::SelectDown
            | Self::SelectFirst
            | Self::SelectLast => Group::Navigation,
            Self::OpenStory | Self::OpenComments => Group::Links,
            Self::Filter(_) | Self::Sort(_) => Group::View,
            Self::Refresh | Self::ShowHelp | Self::CycleTheme | Self::Quit => Group::General,
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Terminals report uppercase letters and symbols with SHIFT set; the
    /// character already carries that information.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(_) => Self::new(self.code, self.modifiers.difference(KeyModifiers::SHIFT)),
            _ => self,
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "?"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Left", "Right",
///   "Space", "Home", "End", "PageUp", "PageDown", "Backspace"
/// - Modifier combos: "Ctrl+d"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::char(c)),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// A key maps to at most one action. Several keys may share an action.
pub struct KeybindingRegistry {
    lookup: HashMap<KeySpec, Action>,
    /// Bindings in registration order, for the help screen.
    bindings: Vec<(KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    /// Register a single binding, replacing whatever `key` was bound to.
    fn bind(&mut self, key: KeySpec, action: Action) {
        if let Some(previous) = self.lookup.insert(key, action) {
            self.bindings
                .retain(|(k, a)| !(*k == key && *a == previous));
        }
        self.bindings.push((key, action));
    }

    fn register_defaults(&mut self) {
        // Days
        self.bind(KeySpec::char('j'), Action::PrevDay);
        self.bind(KeySpec::plain(KeyCode::Left), Action::PrevDay);
        self.bind(KeySpec::char('k'), Action::NextDay);
        self.bind(KeySpec::plain(KeyCode::Right), Action::NextDay);

        // Selection
        self.bind(KeySpec::plain(KeyCode::Up), Action::SelectUp);
        self.bind(KeySpec::plain(KeyCode::Down), Action::SelectDown);
        self.bind(KeySpec::plain(KeyCode::Home), Action::SelectFirst);
        self.bind(KeySpec::plain(KeyCode::End), Action::SelectLast);

        // Links
        self.bind(KeySpec::char(' '), Action::OpenStory);
        self.bind(KeySpec::char('l'), Action::OpenComments);
        self.bind(KeySpec::plain(KeyCode::Enter), Action::OpenComments);

        // Filters
        self.bind(KeySpec::char('1'), Action::Filter(FilterMode::Top10));
        self.bind(KeySpec::char('2'), Action::Filter(FilterMode::Top20));
        self.bind(KeySpec::char('3'), Action::Filter(FilterMode::Top50Pct));
        self.bind(KeySpec::char('4'), Action::Filter(FilterMode::All));
        self.bind(KeySpec::char('5'), Action::Filter(FilterMode::AllViaHomepage));

        // Sorts
        self.bind(KeySpec::char('p'), Action::Sort(SortMode::ByPoints));
        self.bind(KeySpec::char('c'), Action::Sort(SortMode::ByComments));
        self.bind(KeySpec::char('d'), Action::Sort(SortMode::ByDate));

        // General
        self.bind(KeySpec::char('r'), Action::Refresh);
        self.bind(KeySpec::char('?'), Action::ShowHelp);
        self.bind(KeySpec::char('T'), Action::CycleTheme);
        self.bind(KeySpec::char('q'), Action::Quit);
        self.bind(KeySpec::ctrl('c'), Action::Quit);
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "prev_day").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). An override
    /// replaces every default key of that action.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut sorted: Vec<_> = overrides.iter().collect();
        sorted.sort();

        for (action_name, key_str) in sorted {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, a)| *a != action);
            self.bind(key, action);

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    pub fn action_for_key(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        let key = KeySpec::new(code, modifiers).normalized();
        self.lookup.get(&key).copied()
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (key_display_string, action, description) tuples in registration order.
    pub fn all_bindings(&self) -> Vec<(String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(key, action)| (format_key(key), *action, action.describe()))
            .collect()
    }

    /// Display strings of every key bound to `action`.
    pub fn keys_for(&self, action: Action) -> Vec<String> {
        self.bindings
            .iter()
            .filter(|(_, a)| *a == action)
            .map(|(key, _)| format_key(key))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "prev_day" | "prevday" | "previous_day" => Some(Action::PrevDay),
        "next_day" | "nextday" => Some(Action::NextDay),
        "select_up" | "up" => Some(Action::SelectUp),
        "select_down" | "down" => Some(Action::SelectDown),
        "select_first" | "first" => Some(Action::SelectFirst),
        "select_last" | "last" => Some(Action::SelectLast),
        "open_story" | "open" => Some(Action::OpenStory),
        "open_comments" | "comments" => Some(Action::OpenComments),
        "filter_top10" | "top10" => Some(Action::Filter(FilterMode::Top10)),
        "filter_top20" | "top20" => Some(Action::Filter(FilterMode::Top20)),
        "filter_top50" | "top50" => Some(Action::Filter(FilterMode::Top50Pct)),
        "filter_all" | "all" => Some(Action::Filter(FilterMode::All)),
        "filter_homepage" | "homepage" => Some(Action::Filter(FilterMode::AllViaHomepage)),
        "sort_points" | "points" => Some(Action::Sort(SortMode::ByPoints)),
        "sort_comments" => Some(Action::Sort(SortMode::ByComments)),
        "sort_date" | "date" => Some(Action::Sort(SortMode::ByDate)),
        "refresh" | "reload" => Some(Action::Refresh),
        "show_help" | "help" => Some(Action::ShowHelp),
        "cycle_theme" | "theme" => Some(Action::CycleTheme),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
