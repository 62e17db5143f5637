//! Help overlay: scrollable keybinding table.
//!
//! Bindings are grouped by [`Group`] and reflect any user overrides from
//! the config file.

use crate::app::App;
use crate::keybindings::Group;
use ratatui::{
    layout::{Constraint, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

/// Build the help rows: a heading per group followed by its bindings.
fn help_rows(app: &App) -> Vec<Row<'static>> {
    let bindings = app.keybindings.all_bindings();
    let mut rows: Vec<Row> = Vec::new();

    for group in Group::ALL {
        let in_group: Vec<_> = bindings
            .iter()
            .filter(|(_, action, _)| action.group() == group)
            .collect();
        if in_group.is_empty() {
            continue;
        }

        rows.push(
            Row::new(vec![
                Line::from(Span::styled(
                    format!("-- {} --", group.title()),
                    app.style("help_heading"),
                )),
                Line::from(""),
            ]),
        );

        for (key_str, _action, description) in in_group {
            rows.push(Row::new(vec![
                Line::from(Span::styled(format!("  {}", key_str), app.style("help_key"))),
                Line::from(description.to_string()),
            ]));
        }

        rows.push(Row::new(vec![String::new(), String::new()]));
    }

    // Trailing separator
    rows.pop();
    rows
}

/// Render the help overlay on top of the story list.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(70, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let rows = help_rows(app);
    let total_rows = rows.len();

    let visible_height = overlay.height.saturating_sub(3) as usize; // -2 border -1 header
    let max_scroll = total_rows.saturating_sub(visible_height);
    let scroll = app.help_scroll_offset.min(max_scroll);
    let visible_rows: Vec<Row> = rows.into_iter().skip(scroll).take(visible_height).collect();

    let title = if max_scroll > 0 {
        format!(
            " Help ({}/{}) ",
            scroll.saturating_add(1),
            max_scroll.saturating_add(1)
        )
    } else {
        " Help (? to close) ".to_string()
    };

    let table = Table::new(visible_rows, [Constraint::Length(20), Constraint::Min(20)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border"))
                .title(title),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    app.style("header")
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        );

    f.render_widget(table, overlay);

    if max_scroll > 0 && scroll < max_scroll {
        let hint = Line::from(vec![Span::styled(
            " Up/Down to scroll, ? or Esc to close ",
            app.style("row_meta"),
        )]);
        let hint_area = Rect {
            x: overlay.x + 1,
            y: overlay.y + overlay.height.saturating_sub(1),
            width: overlay.width.saturating_sub(2),
            height: 1,
        };
        f.render_widget(Paragraph::new(hint), hint_area);
    }
}

/// Create a centered rectangle with the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
