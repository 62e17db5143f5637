//! Action dispatch against the [`Navigator`].
//!
//! Every action maps to exactly one navigator command. Side effects the
//! navigator cannot perform (browser launch, quitting, overlays) come back as
//! an [`Effect`] for the shell to carry out.

use crate::keybindings::Action;
use crate::nav::Navigator;

/// What the shell must do after an action was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    Open(String),
    ShowHelp,
    CycleTheme,
}

pub fn dispatch(nav: &mut Navigator, action: Action) -> Effect {
    match action {
        Action::Quit => Effect::Quit,
        Action::PrevDay => {
            nav.go_to_date(-1);
            Effect::None
        }
        Action::NextDay => {
            nav.go_to_date(1);
            Effect::None
        }
        Action::SelectUp => {
            nav.move_selection(-1);
            Effect::None
        }
        Action::SelectDown => {
            nav.move_selection(1);
            Effect::None
        }
        Action::SelectFirst => {
            nav.select_first();
            Effect::None
        }
        Action::SelectLast => {
            nav.select_last();
            Effect::None
        }
        Action::OpenStory => nav
            .selected_item()
            .map_or(Effect::None, |item| Effect::Open(item.url.clone())),
        Action::OpenComments => nav
            .selected_item()
            .map_or(Effect::None, |item| Effect::Open(item.comment_url.clone())),
        Action::Filter(mode) => {
            nav.set_filter(mode);
            Effect::None
        }
        Action::Sort(mode) => {
            nav.set_sort(mode);
            Effect::None
        }
        Action::Refresh => {
            nav.refresh();
            Effect::None
        }
        Action::ShowHelp => Effect::ShowHelp,
        Action::CycleTheme => Effect::CycleTheme,
    }
}
