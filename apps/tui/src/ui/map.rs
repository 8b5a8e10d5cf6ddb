use geosafe_core::popup::PopupContent;
use geosafe_core::session::{MapGlyph, SAFE_ZONE_RGB};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line as TextLine, Span, Text},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Map, MapResolution},
        Block, Borders, Clear, Paragraph,
    },
    Frame,
};

use crate::app::App;
use crate::ui::widgets::popup::map_rect;

const fn zone_color() -> Color {
    let (r, g, b) = SAFE_ZONE_RGB;
    Color::Rgb(r, g, b)
}

pub fn render_map(app: &mut App, f: &mut Frame<'_>, area: Rect) {
    let zoom = app.session.viewport.zoom();
    let center = app.session.viewport.center();
    let title = if app.is_loading() {
        format!(" Map (zoom {zoom}) · loading ")
    } else {
        format!(" Map (zoom {zoom}) · {:.4}, {:.4} ", center.lat, center.lng)
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    app.map_area = inner;
    let session = &mut app.session;
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

    // Point symbols are written per cell so they match what a click resolves to.
    let buffer = f.buffer_mut();
    for (col, row, glyph) in session.glyphs() {
        let color = match glyph {
            MapGlyph::Warehouse => Color::LightBlue,
            MapGlyph::LastClick => Color::LightRed,
        };
        if let Some(cell) = buffer.cell_mut((inner.x + col, inner.y + row)) {
            cell.set_symbol(glyph.symbol())
                .set_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
        }
    }

    if let Some((popup, placed)) = session.popup_layout() {
        render_popup(&popup, map_rect(placed, inner), f);
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
                Span::raw(line.value.as_str()),
            ])
        })
        .collect::<Vec<_>>();

    let paragraph = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .title(Span::styled(
                popup.title.as_str(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}
