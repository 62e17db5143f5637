//! Top-level layout: header, story list, status bar, help overlay.

use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{help, status, stories};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 8;

pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    stories::render(f, app, chunks[1]);
    status::render(f, app, chunks[2]);

    if app.show_help {
        help::render(f, app);
    }
}

/// Date on the left, filter and sort on the right.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let date = app.nav.current_date();
    let mut left = vec![
        Span::styled(" hckr  ", app.style("header")),
        Span::styled(date.format("%a %Y-%m-%d").to_string(), app.style("header")),
    ];
    if !app.nav.can_go_forward() {
        left.push(Span::styled("  (latest)", app.style("row_meta")));
    }

    let right = Line::from(vec![
        Span::styled("Filter: ", app.style("row_meta")),
        Span::styled(app.nav.filter_mode().label(), app.style("header_mode")),
        Span::styled("  Sort: ", app.style("row_meta")),
        Span::styled(app.nav.sort_mode().label(), app.style("header_mode")),
        Span::raw(" "),
    ])
    .alignment(Alignment::Right);

    f.render_widget(Paragraph::new(Line::from(left)), area);
    f.render_widget(Paragraph::new(right), area);
}
