use crate::app::App;
use crate::keybindings::Action as KbAction;
use crate::nav::DayStatus;
use crate::util::{fit_to_width, format_relative_time};
use chrono::Utc;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

use super::stories::SPINNER;

/// Host part of a story link, without a leading `www.`.
fn domain(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let (text, role): (Cow<'_, str>, &str) = if let Some((msg, _)) = &app.status_message {
        (Cow::Borrowed(&**msg), "status_bar")
    } else {
        match app.nav.status() {
            DayStatus::Loading => (
                Cow::Owned(format!(
                    "{} Fetching {}",
                    SPINNER[app.spinner_frame % SPINNER.len()],
                    app.nav.current_date().format("%Y-%m-%d")
                )),
                "status_loading",
            ),
            DayStatus::Failed(reason) => (Cow::Borrowed(reason.describe()), "status_error"),
            DayStatus::Ready { total } => {
                let help = app
                    .keybindings
                    .keys_for(KbAction::ShowHelp)
                    .into_iter()
                    .next()
                    .map(|k| format!("  [{}] help", k))
                    .unwrap_or_default();
                let shown = app.nav.current_display_list().len();
                let detail = app
                    .nav
                    .selected_item()
                    .map(|item| {
                        let age = format_relative_time(item.submitted_at, Utc::now());
                        match domain(&item.url) {
                            Some(host) => format!("{} · {}", host, age),
                            None => age,
                        }
                    })
                    .unwrap_or_default();
                (
                    Cow::Owned(format!("{}/{} stories  {}{}", shown, total, detail, help)),
                    "status_bar",
                )
            }
        }
    };

    let line = fit_to_width(&text, area.width as usize);
    f.render_widget(Paragraph::new(line).style(app.style(role)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_strips_www() {
        assert_eq!(
            domain("https://www.example.com/a/b").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            domain("https://news.ycombinator.com/item?id=1").as_deref(),
            Some("news.ycombinator.com")
        );
        assert_eq!(domain("not a url"), None);
    }
}
