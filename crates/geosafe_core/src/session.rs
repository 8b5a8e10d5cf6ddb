//! The map view state shared by the terminal and browser front-ends.

use crate::api::ApiError;
use crate::click::MapClickEvent;
use crate::domain::{LatLng, SafeZone, Warehouse};
use crate::load::{settle, LoadState, MapData};
use crate::popup::{place_popup, CellBox, PopupContent};
use crate::viewport::{GeoBounds, Viewport};
use chrono::{DateTime, Local};

/// Stroke colour of safe zone outlines (`#ff7800`).
pub const SAFE_ZONE_RGB: (u8, u8, u8) = (0xff, 0x78, 0x00);

/// Cells moved by one pan step.
const PAN_STEP: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Warehouse(usize),
    SafeZone(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapCommand {
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    ZoomIn,
    ZoomOut,
    Recenter,
    ClickCenter,
    NextFeature,
    PreviousFeature,
    ClosePopup,
    Reload,
    Copy,
    ToggleHelp,
    Quit,
}

/// A point feature drawn into a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapGlyph {
    Warehouse,
    LastClick,
}

impl MapGlyph {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Warehouse => "●",
            Self::LastClick => "×",
        }
    }
}

/// What a click landed on.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// A marker was hit: its popup opens and the coordinates are left alone.
    Marker(usize),
    /// Inside a zone: its popup opens and the click is recorded.
    Zone(usize, MapClickEvent),
    Map(MapClickEvent),
    /// Outside the map grid, or the error view is showing.
    Missed,
}

impl ClickOutcome {
    pub const fn event(&self) -> Option<&MapClickEvent> {
        match self {
            Self::Zone(_, event) | Self::Map(event) => Some(event),
            Self::Marker(_) | Self::Missed => None,
        }
    }
}

/// Follow-up work a command hands back to the front-end.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Redraw,
    Clicked(ClickOutcome),
    ReloadRequested,
    CopyRequested(String),
    NothingToCopy,
    Quit,
}

#[derive(Debug, Clone)]
pub struct MapSession {
    pub state: LoadState,
    pub viewport: Viewport,
    pub last_click: Option<MapClickEvent>,
    pub selection: Option<Selection>,
    pub show_help: bool,
    grid: (u16, u16),
}

impl Default for MapSession {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl MapSession {
    pub const fn new(viewport: Viewport) -> Self {
        Self {
            state: LoadState::Loading,
            viewport,
            last_click: None,
            selection: None,
            show_help: false,
            grid: (0, 0),
        }
    }

    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
        self.selection = None;
    }

    pub fn finish_load(&mut self, outcome: Result<MapData, ApiError>) -> &LoadState {
        self.state = settle(outcome);
        self.selection = None;
        &self.state
    }

    /// Record the size of the map grid last drawn; clicks are resolved against it.
    pub fn set_grid(&mut self, cols: u16, rows: u16) {
        self.grid = (cols, rows);
    }

    pub const fn grid(&self) -> (u16, u16) {
        self.grid
    }

    pub fn bounds(&self) -> GeoBounds {
        self.viewport.bounds(self.grid.0, self.grid.1)
    }

    pub fn warehouses(&self) -> &[Warehouse] {
        self.state
            .data()
            .map_or(&[][..], |data| data.warehouses.as_slice())
    }

    pub fn safe_zones(&self) -> &[SafeZone] {
        self.state
            .data()
            .map_or(&[][..], |data| data.safe_zones.as_slice())
    }

    /// Warehouses that can be drawn, with their index and position.
    pub fn markers(&self) -> impl Iterator<Item = (usize, &Warehouse, LatLng)> + '_ {
        self.warehouses()
            .iter()
            .enumerate()
            .filter_map(|(index, warehouse)| Some((index, warehouse, warehouse.position()?)))
    }

    /// Ids of warehouses with no usable coordinates.
    pub fn unplaced_warehouses(&self) -> Vec<i64> {
        self.warehouses()
            .iter()
            .filter(|warehouse| warehouse.position().is_none())
            .map(|warehouse| warehouse.id)
            .collect()
    }

    const fn is_failed(&self) -> bool {
        matches!(self.state, LoadState::Failed(_))
    }

    /// Resolve a click on grid cell (`col`, `row`). Nothing is recorded while
    /// the error view replaces the map.
    pub fn click(&mut self, col: u16, row: u16, now: DateTime<Local>) -> ClickOutcome {
        let (cols, rows) = self.grid;
        if self.is_failed() || col >= cols || row >= rows {
            return ClickOutcome::Missed;
        }

        let bounds = self.bounds();
        if let Some(index) = self.marker_at(&bounds, col, row) {
            self.selection = Some(Selection::Warehouse(index));
            return ClickOutcome::Marker(index);
        }

        let position = bounds.position_at(col, row, cols, rows);
        let event = MapClickEvent::new(position, now);
        self.last_click = Some(event.clone());

        match self.zone_at(position) {
            Some(index) => {
                self.selection = Some(Selection::SafeZone(index));
                ClickOutcome::Zone(index, event)
            }
            None => {
                self.selection = None;
                ClickOutcome::Map(event)
            }
        }
    }

    fn marker_at(&self, bounds: &GeoBounds, col: u16, row: u16) -> Option<usize> {
        let (cols, rows) = self.grid;
        self.markers()
            .find(|(_, _, position)| bounds.cell_of(*position, cols, rows) == Some((col, row)))
            .map(|(index, _, _)| index)
    }

    fn zone_at(&self, position: LatLng) -> Option<usize> {
        self.safe_zones()
            .iter()
            .position(|zone| zone.contains(position))
    }

    pub fn popup(&self) -> Option<PopupContent> {
        match self.selection? {
            Selection::Warehouse(index) => self
                .warehouses()
                .get(index)
                .map(PopupContent::for_warehouse),
            Selection::SafeZone(index) => self
                .safe_zones()
                .get(index)
                .map(PopupContent::for_safe_zone),
        }
    }

    /// Anchor of the open popup: the marker, or the middle of the zone's outline.
    pub fn selection_position(&self) -> Option<LatLng> {
        match self.selection? {
            Selection::Warehouse(index) => self.warehouses().get(index)?.position(),
            Selection::SafeZone(index) => {
                let rings = self.safe_zones().get(index)?.rings();
                let outer = rings.first()?;
                let (mut south, mut west) = (f64::MAX, f64::MAX);
                let (mut north, mut east) = (f64::MIN, f64::MIN);
                for point in outer {
                    south = south.min(point.lat);
                    north = north.max(point.lat);
                    west = west.min(point.lng);
                    east = east.max(point.lng);
                }
                Some(LatLng::new((south + north) / 2.0, (west + east) / 2.0))
            }
        }
    }

    /// Grid cell the open popup points at.
    pub fn popup_anchor(&self) -> Option<(u16, u16)> {
        let (cols, rows) = self.grid;
        self.bounds().cell_of(self.selection_position()?, cols, rows)
    }

    /// The open popup and where it sits, relative to the map grid.
    pub fn popup_layout(&self) -> Option<(PopupContent, CellBox)> {
        let popup = self.popup()?;
        let (width, height) = popup.size();
        let (cols, rows) = self.grid;
        let placed = place_popup(self.popup_anchor(), width, height, cols, rows);
        Some((popup, placed))
    }

    /// Point features that land on the grid, in draw order with the last click on top.
    pub fn glyphs(&self) -> Vec<(u16, u16, MapGlyph)> {
        let (cols, rows) = self.grid;
        let bounds = self.bounds();
        let clicked = self
            .last_click
            .as_ref()
            .map(|click| (click.position(), MapGlyph::LastClick));

        self.markers()
            .map(|(_, _, position)| (position, MapGlyph::Warehouse))
            .chain(clicked)
            .filter_map(|(position, glyph)| {
                let (col, row) = bounds.cell_of(position, cols, rows)?;
                Some((col, row, glyph))
            })
            .collect()
    }

    /// Outlines of every drawable zone ring, as lat/lng polylines.
    pub fn zone_outlines(&self) -> Vec<Vec<LatLng>> {
        self.safe_zones()
            .iter()
            .flat_map(|zone| zone.rings())
            .collect()
    }

    /// Every selectable feature in display order: placed warehouses, then drawable zones.
    fn features(&self) -> Vec<Selection> {
        let markers = self.markers().map(|(index, _, _)| Selection::Warehouse(index));
        let zones = self
            .safe_zones()
            .iter()
            .enumerate()
            .filter(|(_, zone)| !zone.rings().is_empty())
            .map(|(index, _)| Selection::SafeZone(index));
        markers.chain(zones).collect()
    }

    fn cycle(&mut self, forward: bool) {
        let features = self.features();
        if features.is_empty() {
            return;
        }

        let current = self
            .selection
            .and_then(|selected| features.iter().position(|feature| *feature == selected));
        let len = features.len();
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(index), true) => (index + 1) % len,
            (Some(index), false) => (index + len - 1) % len,
        };

        self.selection = Some(features[next]);
        if let Some(position) = self.selection_position() {
            self.viewport.center_on(position);
        }
    }

    pub fn apply(&mut self, command: MapCommand, now: DateTime<Local>) -> SessionEvent {
        match command {
            MapCommand::PanLeft => self.viewport.pan(-PAN_STEP, 0),
            MapCommand::PanRight => self.viewport.pan(PAN_STEP, 0),
            MapCommand::PanUp => self.viewport.pan(0, -PAN_STEP),
            MapCommand::PanDown => self.viewport.pan(0, PAN_STEP),
            MapCommand::ZoomIn => {
                self.viewport.zoom_in();
            }
            MapCommand::ZoomOut => {
                self.viewport.zoom_out();
            }
            MapCommand::Recenter => self.viewport.recenter(),
            MapCommand::ClickCenter => {
                let (cols, rows) = self.grid;
                let outcome = self.click(cols / 2, rows / 2, now);
                return SessionEvent::Clicked(outcome);
            }
            MapCommand::NextFeature | MapCommand::PreviousFeature if self.is_failed() => {}
            MapCommand::NextFeature => self.cycle(true),
            MapCommand::PreviousFeature => self.cycle(false),
            MapCommand::ClosePopup => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.selection = None;
                }
            }
            MapCommand::Reload => {
                self.begin_load();
                return SessionEvent::ReloadRequested;
            }
            MapCommand::Copy if self.is_failed() => {}
            MapCommand::Copy => {
                return self
                    .last_click
                    .as_ref()
                    .map_or(SessionEvent::NothingToCopy, |click| {
                        SessionEvent::CopyRequested(click.copy_text())
                    });
            }
            MapCommand::ToggleHelp => self.show_help = !self.show_help,
            MapCommand::Quit => return SessionEvent::Quit,
        }
        SessionEvent::Redraw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoint;
    use crate::viewport::DEFAULT_CENTER;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 12, 24, 12, 0, 0).unwrap()
    }

    fn loaded_session() -> MapSession {
        let warehouses = vec![
            serde_json::from_value(json!({
                "id": 1,
                "name": "Centre Depot",
                "location": {"type": "Point", "coordinates": [DEFAULT_CENTER.lng, DEFAULT_CENTER.lat]},
                "capacity": 500
            }))
            .unwrap(),
            serde_json::from_value(json!({"id": 2, "name": "Lost Depot"})).unwrap(),
        ];
        let safe_zones = vec![serde_json::from_value(json!({
            "id": 9,
            "name": "Harbour Zone",
            "capacity": 2000,
            "capacity_type": "persons",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[28.99, 41.00], [29.01, 41.00], [29.01, 41.02], [28.99, 41.02], [28.99, 41.00]]]
            }
        }))
        .unwrap()];

        let mut session = MapSession::default();
        session.set_grid(80, 24);
        session.finish_load(Ok(MapData {
            warehouses,
            safe_zones,
        }));
        session
    }

    fn cell_of(session: &MapSession, position: LatLng) -> (u16, u16) {
        let (cols, rows) = session.grid();
        session.bounds().cell_of(position, cols, rows).unwrap()
    }

    #[test]
    fn clicking_open_map_records_coordinates_and_closes_popup() {
        let mut session = loaded_session();
        session.selection = Some(Selection::Warehouse(0));

        let event = match session.click(2, 2, now()) {
            ClickOutcome::Map(event) => event,
            other => panic!("expected a map click, got {other:?}"),
        };
        assert_eq!(session.last_click.as_ref(), Some(&event));
        assert_eq!(session.selection, None);
        assert!(session.bounds().contains(event.position()));
    }

    #[test]
    fn clicking_a_marker_opens_its_popup_without_recording() {
        let mut session = loaded_session();
        let (col, row) = cell_of(&session, DEFAULT_CENTER);

        assert_eq!(session.click(col, row, now()), ClickOutcome::Marker(0));
        assert_eq!(session.last_click, None);
        assert_eq!(
            session.popup().map(|popup| popup.title),
            Some("Centre Depot".to_string())
        );
    }

    #[test]
    fn clicking_inside_a_zone_opens_popup_and_records() {
        let mut session = loaded_session();
        let (col, row) = cell_of(&session, LatLng::new(41.01, 29.0));

        let outcome = session.click(col, row, now());
        assert!(matches!(outcome, ClickOutcome::Zone(0, _)));
        assert!(session.last_click.is_some());
        let popup = session.popup().unwrap();
        assert_eq!(popup.lines[1].value, "2000 persons");
    }

    #[test]
    fn clicks_outside_the_grid_are_ignored() {
        let mut session = loaded_session();
        assert_eq!(session.click(80, 0, now()), ClickOutcome::Missed);
        assert_eq!(session.last_click, None);
    }

    #[test]
    fn unplaced_warehouses_are_reported_and_not_drawn() {
        let session = loaded_session();
        assert_eq!(session.unplaced_warehouses(), vec![2]);
        assert_eq!(session.markers().count(), 1);
    }

    #[test]
    fn cycling_visits_markers_then_zones_and_centres_on_them() {
        let mut session = loaded_session();

        session.apply(MapCommand::NextFeature, now());
        assert_eq!(session.selection, Some(Selection::Warehouse(0)));

        session.apply(MapCommand::NextFeature, now());
        assert_eq!(session.selection, Some(Selection::SafeZone(0)));
        let centre = session.viewport.center();
        assert!((centre.lat - 41.01).abs() < 1e-9);
        assert!((centre.lng - 29.0).abs() < 1e-9);

        session.apply(MapCommand::NextFeature, now());
        assert_eq!(session.selection, Some(Selection::Warehouse(0)));

        session.apply(MapCommand::PreviousFeature, now());
        assert_eq!(session.selection, Some(Selection::SafeZone(0)));
    }

    #[test]
    fn copy_needs_a_previous_click() {
        let mut session = loaded_session();
        assert_eq!(
            session.apply(MapCommand::Copy, now()),
            SessionEvent::NothingToCopy
        );

        session.click(2, 2, now());
        let expected = session.last_click.as_ref().map(MapClickEvent::copy_text);
        match session.apply(MapCommand::Copy, now()) {
            SessionEvent::CopyRequested(text) => assert_eq!(Some(text), expected),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn reload_returns_to_loading_and_failure_clears_layers() {
        let mut session = loaded_session();
        session.selection = Some(Selection::SafeZone(0));

        assert_eq!(
            session.apply(MapCommand::Reload, now()),
            SessionEvent::ReloadRequested
        );
        assert!(session.state.is_loading());
        assert_eq!(session.selection, None);

        session.finish_load(Err(ApiError::status(Endpoint::Warehouses, 502)));
        assert!(matches!(session.state, LoadState::Failed(_)));
        assert!(session.warehouses().is_empty());
        assert!(session.safe_zones().is_empty());
    }

    #[test]
    fn failed_load_ignores_clicks_copy_and_cycling() {
        let mut session = loaded_session();
        session.click(2, 2, now());
        let earlier = session.last_click.clone();

        session.finish_load(Err(ApiError::status(Endpoint::SafeZones, 503)));
        assert_eq!(
            session.apply(MapCommand::ClickCenter, now()),
            SessionEvent::Clicked(ClickOutcome::Missed)
        );
        assert_eq!(session.click(2, 2, now()), ClickOutcome::Missed);
        assert_eq!(session.last_click, earlier);

        assert_eq!(session.apply(MapCommand::Copy, now()), SessionEvent::Redraw);
        assert_eq!(
            session.apply(MapCommand::NextFeature, now()),
            SessionEvent::Redraw
        );
        assert_eq!(session.selection, None);
    }

    #[test]
    fn failed_first_load_leaves_nothing_to_print() {
        let mut session = MapSession::default();
        session.set_grid(80, 24);
        session.finish_load(Err(ApiError::status(Endpoint::Warehouses, 503)));

        session.apply(MapCommand::ClickCenter, now());
        assert_eq!(session.last_click, None);
    }

    #[test]
    fn glyphs_put_the_last_click_after_markers() {
        let mut session = loaded_session();
        assert_eq!(
            session.glyphs(),
            vec![{
                let (col, row) = cell_of(&session, DEFAULT_CENTER);
                (col, row, MapGlyph::Warehouse)
            }]
        );

        session.click(2, 2, now());
        let glyphs = session.glyphs();
        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[1], (2, 2, MapGlyph::LastClick));
        assert_eq!(MapGlyph::LastClick.symbol(), "×");
    }

    #[test]
    fn popup_layout_anchors_above_the_selected_marker() {
        let mut session = loaded_session();
        assert!(session.popup_layout().is_none());

        let (col, row) = cell_of(&session, DEFAULT_CENTER);
        session.click(col, row, now());
        let (popup, placed) = session.popup_layout().unwrap();
        assert_eq!(popup.title, "Centre Depot");
        assert_eq!(session.popup_anchor(), Some((col, row)));
        assert_eq!((placed.width, placed.height), popup.size());
        assert_eq!(placed.y + placed.height, row);
        assert!(placed.x <= col && col < placed.x + placed.width);
    }

    #[test]
    fn escape_closes_help_before_popup() {
        let mut session = loaded_session();
        session.selection = Some(Selection::Warehouse(0));
        session.apply(MapCommand::ToggleHelp, now());

        session.apply(MapCommand::ClosePopup, now());
        assert!(!session.show_help);
        assert!(session.selection.is_some());

        session.apply(MapCommand::ClosePopup, now());
        assert!(session.selection.is_none());
    }
}
