use geosafe_core::load::backend_hint;
use geosafe_core::viewport::TILE_ATTRIBUTION;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::widgets::popup::centered_rect;

const KEY_HINTS: &str =
    "click map · arrows pan · +/- zoom · 0 reset · tab features · c copy · r reload · ? help · q quit";

pub fn render_header(f: &mut Frame<'_>, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            "GeoSafe ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("Neighborhood-based Disaster Safety & Logistics Management"),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

pub fn render_summary(app: &App, f: &mut Frame<'_>, area: Rect) {
    f.render_widget(
        Paragraph::new(app.session.state.summary()).style(Style::default().fg(Color::Gray)),
        area,
    );
}

pub fn render_error(message: &str, base_url: &str, f: &mut Frame<'_>, area: Rect) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(backend_hint(base_url)),
        Line::from(Span::styled(
            "Press r to retry or q to quit.",
            Style::default().fg(Color::Gray),
        )),
    ]);
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

pub fn render_click_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let label = Style::default().fg(Color::Gray);
    let mut lines = match &app.session.last_click {
        Some(click) => vec![
            Line::from(vec![
                Span::styled("Latitude:  ", label),
                Span::raw(click.latitude_text()),
            ]),
            Line::from(vec![
                Span::styled("Longitude: ", label),
                Span::raw(click.longitude_text()),
            ]),
            Line::from(vec![
                Span::styled("Time:      ", label),
                Span::raw(click.time_text()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                click.copy_text(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
        ],
        None => vec![Line::from(Span::styled(
            "Click on map to get coordinates.",
            label,
        ))],
    };

    if !app.status_message.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            app.status_message.as_str(),
            Style::default().fg(Color::Green),
        )));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(" Last Clicked Location ")
                .borders(Borders::ALL),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

pub fn render_footer(app: &App, f: &mut Frame<'_>, area: Rect) {
    let health = match app.healthy {
        Some(true) => Span::styled("healthy", Style::default().fg(Color::Green)),
        Some(false) => Span::styled("unreachable", Style::default().fg(Color::Red)),
        None => Span::styled("checking", Style::default().fg(Color::Gray)),
    };

    let text = Text::from(vec![
        Line::from(vec![
            Span::styled("Backend: ", Style::default().fg(Color::Gray)),
            Span::raw(app.base_url()),
            Span::raw(" ("),
            health,
            Span::raw(")  "),
            Span::styled(
                format!("Map data {TILE_ATTRIBUTION}"),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::styled(KEY_HINTS, Style::default().fg(Color::Gray))),
    ]);
    f.render_widget(Paragraph::new(text), area);
}

pub fn render_help(f: &mut Frame<'_>, area: Rect) {
    let rows = [
        ("Mouse click", "Report coordinates or open a popup"),
        ("Enter", "Click the map centre"),
        ("Arrows/hjkl", "Pan"),
        ("+ / -", "Zoom in / out (or scroll)"),
        ("0", "Back to the start view"),
        ("Tab / n, p", "Next / previous feature"),
        ("Esc", "Close popup or help"),
        ("c", "Show the copy string"),
        ("r", "Reload map data"),
        ("q", "Quit"),
    ];
    let lines = rows
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(
                    format!("{key:<13}"),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(*action),
            ])
        })
        .collect::<Vec<_>>();

    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup,
    );
}
