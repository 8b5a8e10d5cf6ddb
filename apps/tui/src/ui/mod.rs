pub mod map;
pub mod panels;
pub mod widgets;

use geosafe_core::LoadState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
    Frame,
};

use crate::app::App;

pub fn ui(app: &mut App, f: &mut Frame<'_>) {
    let area = f.area();
    let block = Block::default()
        .title(" GeoSafe ")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(2),
        ])
        .split(inner);

    panels::render_header(f, rows[0]);

    if let LoadState::Failed(message) = &app.session.state {
        app.map_area = Rect::default();
        panels::render_error(message, app.base_url(), f, rows[2]);
        panels::render_footer(app, f, rows[3]);
        return;
    }

    panels::render_summary(app, f, rows[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(34)])
        .split(rows[2]);

    map::render_map(app, f, body[0]);
    panels::render_click_panel(app, f, body[1]);
    panels::render_footer(app, f, rows[3]);

    if app.session.show_help {
        panels::render_help(f, body[0]);
    }
}
