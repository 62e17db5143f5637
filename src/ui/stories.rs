use crate::app::App;
use crate::keybindings::Action as KbAction;
use crate::nav::DayStatus;
use crate::util::{format_clock, truncate_to_width};
use crate::view::{ColorBand, DisplayRow};
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph, Row, Table},
    Frame,
};

/// Braille spinner shown while a day is loading.
pub(super) const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Width of the points · comments · time column.
const META_WIDTH: u16 = 27;

/// Style role for a row: its band, except that band D stories which still
/// reached the homepage stay readable.
fn row_role(row: &DisplayRow<'_>) -> &'static str {
    if row.band == ColorBand::D && row.item.homepage == Some(true) {
        "band_homepage"
    } else {
        row.band.role()
    }
}

fn meta_text(row: &DisplayRow<'_>, app: &App) -> String {
    format!(
        "{:>5} pts · {:>4} cmt  {}",
        row.item.points,
        row.item.comments,
        format_clock(row.item.submitted_at, app.sources.timezone)
    )
}

fn story_rows(app: &App, title_width: usize) -> Vec<Row<'static>> {
    app.nav
        .current_display_list()
        .iter()
        .map(|row| {
            let title = truncate_to_width(&row.item.title, title_width).into_owned();
            Row::new(vec![title, meta_text(row, app)]).style(app.style(row_role(row)))
        })
        .collect()
}

/// Render the story list for the current day.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border"));

    let message = match app.nav.status() {
        DayStatus::Loading => Some(format!(
            "{} Loading {}...",
            SPINNER[app.spinner_frame % SPINNER.len()],
            app.nav.current_date().format("%Y-%m-%d")
        )),
        DayStatus::Failed(reason) => {
            let retry = app
                .keybindings
                .keys_for(KbAction::Refresh)
                .into_iter()
                .next()
                .map(|k| format!(" (press {} to retry)", k))
                .unwrap_or_default();
            Some(format!("{}{}", reason.describe(), retry))
        }
        DayStatus::Ready { .. } if app.nav.current_display_list().is_empty() => {
            Some("No stories match this filter".to_string())
        }
        DayStatus::Ready { .. } => None,
    };

    if let Some(text) = message {
        let paragraph = Paragraph::new(Line::from(text))
            .style(app.style("list_message"))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
        app.table_state.select(None);
        return;
    }

    // Borders plus the one-column gap between cells
    let title_width = area.width.saturating_sub(META_WIDTH + 3) as usize;
    let rows = story_rows(app, title_width);

    let table = Table::new(
        rows,
        [Constraint::Min(10), Constraint::Length(META_WIDTH)],
    )
    .block(block)
    .row_highlight_style(app.style("row_selected"));

    app.table_state.select(Some(app.nav.selected_index()));
    f.render_stateful_widget(table, area, &mut app.table_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;
    use chrono::{TimeZone, Utc};

    fn item(homepage: Option<bool>) -> Item {
        let item = Item::new(
            "1",
            "Title",
            "https://example.com",
            10,
            2,
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        );
        match homepage {
            Some(flag) => item.with_homepage(flag),
            None => item,
        }
    }

    #[test]
    fn test_row_role_uses_band() {
        let it = item(None);
        let row = DisplayRow {
            item: &it,
            rank: 1,
            band: ColorBand::A,
        };
        assert_eq!(row_role(&row), "band_a");
    }

    #[test]
    fn test_row_role_homepage_band_d() {
        let it = item(Some(true));
        let row = DisplayRow {
            item: &it,
            rank: 90,
            band: ColorBand::D,
        };
        assert_eq!(row_role(&row), "band_homepage");

        let it = item(Some(false));
        let row = DisplayRow {
            item: &it,
            rank: 90,
            band: ColorBand::D,
        };
        assert_eq!(row_role(&row), "band_d");
    }

    #[test]
    fn test_meta_fits_column() {
        // widest realistic values still fit the fixed column
        let width = format!("{:>5} pts · {:>4} cmt  {}", 99999, 9999, "23:59").chars().count();
        assert!(width <= META_WIDTH as usize);
    }
}
