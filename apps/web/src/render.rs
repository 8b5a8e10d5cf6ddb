use geosafe_core::load::{backend_hint, LoadState};
use geosafe_core::popup::PopupContent;
use geosafe_core::session::{MapGlyph, SAFE_ZONE_RGB};
use geosafe_core::viewport::{TILE_ATTRIBUTION, TILE_URL_TEMPLATE};
use geosafe_core::MapSession;
use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line as TextLine, Span, Text},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Map, MapResolution},
        Block, Borders, Clear, Paragraph, Wrap,
    },
    Frame,
};

use crate::state::WebState;

const ACCENT: Color = Color::Rgb(0, 0, 238);
const WAREHOUSE_COLOR: Color = Color::Rgb(0, 120, 255);
const CLICK_COLOR: Color = Color::Red;

fn zone_color() -> Color {
    let (r, g, b) = SAFE_ZONE_RGB;
    Color::Rgb(r, g, b)
}

pub fn render(state: &mut WebState, f: &mut Frame<'_>) {
    let area = f.area();
    state.screen = area;

    let block = Block::default()
        .title("GeoSafe")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area).inner(Margin::new(1, 0));
    f.render_widget(block, area);

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(2),
        ])
        .split(inner);

    render_header(f, main_layout[0]);

    if let LoadState::Failed(message) = &state.session.state {
        state.map_area = Rect::default();
        render_error(message, state.config.base_url(), f, main_layout[2]);
        render_footer(state, f, main_layout[3]);
        return;
    }

    render_summary(&state.session, f, main_layout[1]);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(main_layout[2]);

    render_map(state, f, content[0]);
    render_side_panel(state, f, content[1]);
    render_footer(state, f, main_layout[3]);

    if state.session.show_help {
        render_help(f, content[0]);
    }
}

fn render_header(f: &mut Frame<'_>, area: Rect) {
    let line = TextLine::from(vec![
        Span::styled(
            "GeoSafe ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Neighborhood-based Disaster Safety & Logistics Management",
            Style::default().fg(Color::White),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_summary(session: &MapSession, f: &mut Frame<'_>, area: Rect) {
    let paragraph = Paragraph::new(session.state.summary())
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

fn render_error(message: &str, base_url: &str, f: &mut Frame<'_>, area: Rect) {
    let text = Text::from(vec![
        TextLine::from(Span::styled(message.to_string(), Style::default().fg(Color::Red))),
        TextLine::from(""),
        TextLine::from(Span::styled(
            backend_hint(base_url),
            Style::default().fg(Color::Gray),
        )),
        TextLine::from(Span::styled(
            "Press r to retry.",
            Style::default().fg(Color::Gray),
        )),
    ]);
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_map(state: &mut WebState, f: &mut Frame<'_>, area: Rect) {
    let zoom = state.session.viewport.zoom();
    let block = Block::default()
        .title(format!("Map (zoom {zoom})"))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    state.map_area = inner;
    let session = &mut state.session;
    session.set_grid(inner.width, inner.height);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let bounds = session.bounds();
    let rings = session.zone_outlines();

    f.render_widget(
        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([bounds.west, bounds.east])
            .y_bounds([bounds.south, bounds.north])
            .paint(|ctx| {
                ctx.draw(&Map {
                    color: Color::DarkGray,
                    resolution: MapResolution::High,
                });
                ctx.layer();

                for ring in &rings {
                    for edge in ring.windows(2) {
                        ctx.draw(&CanvasLine {
                            x1: edge[0].lng,
                            y1: edge[0].lat,
                            x2: edge[1].lng,
                            y2: edge[1].lat,
                            color: zone_color(),
                        });
                    }
                }
            }),
        inner,
    );

    // Markers go straight into the buffer so they land on the same cell a click resolves to.
    let buffer = f.buffer_mut();
    for (col, row, glyph) in session.glyphs() {
        let color = match glyph {
            MapGlyph::Warehouse => WAREHOUSE_COLOR,
            MapGlyph::LastClick => CLICK_COLOR,
        };
        if let Some(cell) = buffer.cell_mut((inner.x + col, inner.y + row)) {
            cell.set_symbol(glyph.symbol()).set_fg(color);
        }
    }

    if let Some((popup, placed)) = session.popup_layout() {
        let area = Rect::new(
            inner.x + placed.x,
            inner.y + placed.y,
            placed.width,
            placed.height,
        )
        .intersection(inner);
        render_popup(&popup, area, f);
    }
}

fn render_popup(popup: &PopupContent, area: Rect, f: &mut Frame<'_>) {
    let lines = popup
        .lines
        .iter()
        .map(|line| {
            TextLine::from(vec![
                Span::styled(
                    format!("{}: ", line.label),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(line.value.clone()),
            ])
        })
        .collect::<Vec<_>>();

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(Span::styled(
                    popup.title.clone(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT)),
        )
        .style(Style::default().fg(Color::White).bg(Color::Black));

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn render_side_panel(state: &WebState, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("Last Clicked Location")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let label = Style::default().fg(Color::Gray);
    let mut lines = match &state.session.last_click {
        Some(click) => vec![
            TextLine::from(vec![
                Span::styled("Latitude:  ", label),
                Span::raw(click.latitude_text()),
            ]),
            TextLine::from(vec![
                Span::styled("Longitude: ", label),
                Span::raw(click.longitude_text()),
            ]),
            TextLine::from(vec![
                Span::styled("Time:      ", label),
                Span::raw(click.time_text()),
            ]),
            TextLine::from(""),
            TextLine::from(Span::styled(
                click.copy_text(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            TextLine::from(Span::styled("[c] Copy", Style::default().fg(Color::Cyan))),
        ],
        None => vec![TextLine::from(Span::styled(
            "Click on map to get coordinates.",
            label,
        ))],
    };

    if let Some(status) = &state.status {
        lines.push(TextLine::from(""));
        lines.push(TextLine::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Green),
        )));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_footer(state: &WebState, f: &mut Frame<'_>, area: Rect) {
    let health = match state.healthy {
        Some(true) => Span::styled("online", Style::default().fg(Color::Green)),
        Some(false) => Span::styled("offline", Style::default().fg(Color::Red)),
        None => Span::styled("checking", Style::default().fg(Color::Gray)),
    };
    let tile = state.session.viewport.center_tile();

    let lines = vec![
        TextLine::from(vec![
            Span::styled("Backend API: ", Style::default().fg(Color::Gray)),
            Span::raw(state.config.base_url().to_string()),
            Span::raw(" ("),
            health,
            Span::raw(")  "),
            Span::styled(
                format!("Tiles {TILE_ATTRIBUTION} · {}", tile.url(TILE_URL_TEMPLATE)),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        TextLine::from(Span::styled(
            "Click map · Arrows pan · +/- zoom · 0 reset · n/p features · Esc close · c copy · r reload · ? help",
            Style::default().fg(Color::Gray),
        )),
    ];

    f.render_widget(Paragraph::new(Text::from(lines)), area);
}

fn render_help(f: &mut Frame<'_>, area: Rect) {
    let rows = [
        ("Click", "Report coordinates / open popup"),
        ("Enter", "Click the map centre"),
        ("Arrows", "Pan"),
        ("+ / -", "Zoom in / out"),
        ("0", "Back to start view"),
        ("n / p", "Next / previous feature"),
        ("Esc", "Close popup or help"),
        ("c", "Copy last coordinates"),
        ("r", "Reload map data"),
        ("?", "Toggle this help"),
    ];
    let lines = rows
        .iter()
        .map(|(key, action)| {
            TextLine::from(vec![
                Span::styled(
                    format!("{key:<8}"),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(*action),
            ])
        })
        .collect::<Vec<_>>();

    let width = 44.min(area.width);
    let height = (rows.len() as u16 + 2).min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use geosafe_core::load::MapData;
    use geosafe_core::{ApiConfig, ApiError, Endpoint, MapCommand};
    use ratzilla::ratatui::{backend::TestBackend, Terminal};

    fn state() -> WebState {
        WebState::new(ApiConfig::new("http://backend.test:8000"))
    }

    fn screen_text(state: &mut WebState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 36)).unwrap();
        terminal.draw(|f| render(state, f)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn loaded() -> MapData {
        MapData {
            warehouses: serde_json::from_str(
                r#"[{"id": 1, "name": "Fatih Depot", "location": {"type": "Point", "coordinates": [28.9784, 41.0082]}, "capacity": 250, "address": "Fatih, Istanbul"}]"#,
            )
            .unwrap(),
            safe_zones: Vec::new(),
        }
    }

    fn load(state: &mut WebState, outcome: Result<MapData, ApiError>, healthy: bool) {
        let generation = state.begin_load();
        assert!(state.finish_load(generation, outcome, healthy));
    }

    #[test]
    fn shows_loading_summary_first() {
        let mut state = state();
        let text = screen_text(&mut state);

        assert!(text.contains("Loading map data..."));
        assert!(text.contains("checking"));
        assert_eq!(state.screen, Rect::new(0, 0, 140, 36));
    }

    #[test]
    fn failure_replaces_the_map_and_clears_the_click_area() {
        let mut state = state();
        load(&mut state, Ok(loaded()), true);
        screen_text(&mut state);
        assert!(state.map_area.width > 0);

        load(
            &mut state,
            Err(ApiError::status(Endpoint::SafeZones, 503)),
            false,
        );
        let text = screen_text(&mut state);

        assert!(text.contains("Failed to load map data. Check backend connection."));
        assert!(text.contains("Make sure backend is running on http://backend.test:8000"));
        assert!(text.contains("offline"));
        assert!(!text.contains("Last Clicked Location"));
        assert_eq!(state.map_area, Rect::default());
    }

    #[test]
    fn side_panel_echoes_the_last_click() {
        let mut state = state();
        load(&mut state, Ok(loaded()), true);
        let text = screen_text(&mut state);
        assert!(text.contains("Showing 1 warehouses and 0 safe zones."));
        assert!(text.contains("Last Clicked Location"));

        state.session.click(1, 1, Local::now());
        let copy = state.session.last_click.as_ref().unwrap().copy_text();
        let text = screen_text(&mut state);

        assert!(text.contains("Latitude:"));
        assert!(text.contains(&copy));
        assert!(text.contains("[c] Copy"));
        assert!(text.contains("×"));
    }

    #[test]
    fn selected_marker_shows_its_popup() {
        let mut state = state();
        load(&mut state, Ok(loaded()), true);
        screen_text(&mut state);

        state.session.apply(MapCommand::NextFeature, Local::now());
        let text = screen_text(&mut state);

        assert!(text.contains("Fatih Depot"));
        assert!(text.contains("Status: active"));
        assert!(text.contains("Capacity: 250"));
        assert!(text.contains("Address: Fatih, Istanbul"));
    }
}
