//! Keyboard input handling.
//!
//! Keys resolve through the [`KeybindingRegistry`](crate::keybindings::KeybindingRegistry)
//! to an action, which [`dispatch`] applies to the navigator. Whatever the
//! navigator cannot do itself comes back as an [`Effect`] and is carried out here.

use crate::app::App;
use crate::dispatch::{dispatch, Effect};
use crate::keybindings::Action as KbAction;
use crate::util::validate_url_for_open;
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    // Help overlay captures all keys when visible
    if app.show_help {
        return handle_help_input(app, code);
    }

    let Some(action) = app.keybindings.action_for_key(code, modifiers) else {
        return Action::Continue;
    };
    tracing::trace!(?action, "Key action");

    if action == KbAction::Refresh {
        app.set_status(format!(
            "Refreshing {}...",
            app.nav.current_date().format("%Y-%m-%d")
        ));
    }

    match dispatch(&mut app.nav, action) {
        Effect::None => {}
        Effect::Quit => return Action::Quit,
        Effect::Open(url) => open_url(app, &url),
        Effect::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        Effect::CycleTheme => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
    }
    Action::Continue
}

/// Handle input while the help overlay is visible.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// Hand a story or comments link to the system browser.
fn open_url(app: &mut App, url: &str) {
    // Links come from the remote archive; only plain web URLs are opened.
    if let Err(e) = validate_url_for_open(url) {
        tracing::warn!(%url, error = %e, "Refusing to open link");
        app.set_status(e.to_string());
    } else if let Err(e) = open::that(url) {
        tracing::warn!(%url, error = %e, "Failed to open browser");
        app.set_status(format!("Failed to open browser: {}", e));
    } else {
        tracing::info!(%url, "Opened link");
    }
}
