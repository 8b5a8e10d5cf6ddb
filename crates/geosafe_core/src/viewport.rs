//! Web-Mercator viewport over a grid of character cells.
//!
//! Positions are projected into "slippy map" world pixels (256 px tiles). A cell
//! covers 8x16 world pixels, which keeps its footprint roughly square on a
//! terminal or a DOM grid. Within the visible window positions are interpolated
//! linearly between the corners, so drawing and click lookup agree exactly.

use crate::domain::LatLng;
use std::f64::consts::PI;

pub const DEFAULT_CENTER: LatLng = LatLng::new(41.0082, 28.9784);
pub const DEFAULT_ZOOM: u8 = 12;
pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 18;

pub const TILE_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";

const TILE_SIZE: f64 = 256.0;
const CELL_WIDTH_PX: f64 = 8.0;
const CELL_HEIGHT_PX: f64 = 16.0;
const MAX_LATITUDE: f64 = 85.051_128_78;

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * f64::from(1_u32 << zoom.clamp(MIN_ZOOM, MAX_ZOOM))
}

fn project(position: LatLng, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let lat_rad = position.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (position.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

fn unproject(x: f64, y: f64, zoom: u8) -> LatLng {
    let size = world_size(zoom);
    let y = y.clamp(0.0, size);
    let lng = x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / size;
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    center: LatLng,
    zoom: u8,
    home_center: LatLng,
    home_zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_ZOOM)
    }
}

impl Viewport {
    pub fn new(center: LatLng, zoom: u8) -> Self {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        Self {
            center,
            zoom,
            home_center: center,
            home_zoom: zoom,
        }
    }

    pub const fn center(&self) -> LatLng {
        self.center
    }

    pub const fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Geographic window shown by a `cols` x `rows` grid.
    pub fn bounds(&self, cols: u16, rows: u16) -> GeoBounds {
        let (cx, cy) = project(self.center, self.zoom);
        let half_width = f64::from(cols) * CELL_WIDTH_PX / 2.0;
        let half_height = f64::from(rows) * CELL_HEIGHT_PX / 2.0;

        let north_west = unproject(cx - half_width, cy - half_height, self.zoom);
        let south_east = unproject(cx + half_width, cy + half_height, self.zoom);

        GeoBounds {
            south: south_east.lat,
            west: north_west.lng,
            north: north_west.lat,
            east: south_east.lng,
        }
    }

    /// Move the centre by whole cells; positive `dy` moves south.
    pub fn pan(&mut self, dx_cells: i32, dy_cells: i32) {
        let (cx, cy) = project(self.center, self.zoom);
        let x = f64::from(dx_cells).mul_add(CELL_WIDTH_PX, cx);
        let y = f64::from(dy_cells).mul_add(CELL_HEIGHT_PX, cy);
        let mut center = unproject(x, y, self.zoom);
        center.lng = (center.lng + 180.0).rem_euclid(360.0) - 180.0;
        self.center = center;
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom.saturating_add(1))
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom.saturating_sub(1))
    }

    fn set_zoom(&mut self, zoom: u8) -> bool {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let changed = zoom != self.zoom;
        self.zoom = zoom;
        changed
    }

    pub fn center_on(&mut self, position: LatLng) {
        self.center = position;
    }

    /// Back to the centre and zoom the viewport was created with.
    pub fn recenter(&mut self) {
        self.center = self.home_center;
        self.zoom = self.home_zoom;
    }

    pub fn center_tile(&self) -> TileCoord {
        TileCoord::containing(self.center, self.zoom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn contains(&self, position: LatLng) -> bool {
        (self.south..=self.north).contains(&position.lat)
            && (self.west..=self.east).contains(&position.lng)
    }

    /// Position at the centre of cell (`col`, `row`), row 0 being the top.
    pub fn position_at(&self, col: u16, row: u16, cols: u16, rows: u16) -> LatLng {
        let fx = (f64::from(col) + 0.5) / f64::from(cols.max(1));
        let fy = (f64::from(row) + 0.5) / f64::from(rows.max(1));
        LatLng::new(
            fy.mul_add(-(self.north - self.south), self.north),
            fx.mul_add(self.east - self.west, self.west),
        )
    }

    /// Cell holding `position`, or `None` when it is off screen.
    pub fn cell_of(&self, position: LatLng, cols: u16, rows: u16) -> Option<(u16, u16)> {
        let width = self.east - self.west;
        let height = self.north - self.south;
        if cols == 0 || rows == 0 || width <= 0.0 || height <= 0.0 {
            return None;
        }

        let fx = (position.lng - self.west) / width * f64::from(cols);
        let fy = (self.north - position.lat) / height * f64::from(rows);
        if !(0.0..f64::from(cols)).contains(&fx) || !(0.0..f64::from(rows)).contains(&fy) {
            return None;
        }

        Some((fx.floor() as u16, fy.floor() as u16))
    }
}

/// A tile of the raster tile layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileCoord {
    pub fn containing(position: LatLng, zoom: u8) -> Self {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let n = i64::from(1_u32 << zoom);
        let (px, py) = project(position, zoom);
        let x_raw = (px / TILE_SIZE).floor() as i64;
        let y_raw = (py / TILE_SIZE).floor() as i64;

        Self {
            x: x_raw.rem_euclid(n) as u32,
            y: y_raw.clamp(0, n - 1) as u32,
            zoom,
        }
    }

    pub fn url(&self, template: &str) -> String {
        template
            .replace("{s}", "a")
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
            .replace("{r}", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < tolerance,
            "expected {expected}, got {actual}, diff {diff}"
        );
    }

    #[test]
    fn projection_round_trips_through_world_pixels() {
        let (x, y) = project(DEFAULT_CENTER, DEFAULT_ZOOM);
        let back = unproject(x, y, DEFAULT_ZOOM);
        assert_close(back.lat, DEFAULT_CENTER.lat, 1e-9);
        assert_close(back.lng, DEFAULT_CENTER.lng, 1e-9);
    }

    #[test]
    fn bounds_are_centred_on_viewport() {
        let viewport = Viewport::default();
        let bounds = viewport.bounds(80, 24);

        assert!(bounds.contains(DEFAULT_CENTER));
        assert_close((bounds.west + bounds.east) / 2.0, DEFAULT_CENTER.lng, 1e-9);
        // 80 cells * 8 px = 640 px = 2.5 tiles at zoom 12
        assert_close(bounds.east - bounds.west, 2.5 * 360.0 / 4096.0, 1e-9);
        assert!(bounds.north > DEFAULT_CENTER.lat && bounds.south < DEFAULT_CENTER.lat);
    }

    #[test]
    fn cell_lookup_inverts_position_at() {
        let bounds = Viewport::default().bounds(60, 20);
        for (col, row) in [(0, 0), (59, 19), (30, 10), (12, 17)] {
            let position = bounds.position_at(col, row, 60, 20);
            assert_eq!(bounds.cell_of(position, 60, 20), Some((col, row)));
        }
    }

    #[test]
    fn positions_outside_the_window_have_no_cell() {
        let bounds = Viewport::default().bounds(60, 20);
        assert_eq!(bounds.cell_of(LatLng::new(0.0, 0.0), 60, 20), None);
        assert_eq!(bounds.cell_of(DEFAULT_CENTER, 0, 20), None);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut viewport = Viewport::new(DEFAULT_CENTER, 40);
        assert_eq!(viewport.zoom(), MAX_ZOOM);
        assert!(!viewport.zoom_in());
        assert!(viewport.zoom_out());
        assert_eq!(viewport.zoom(), MAX_ZOOM - 1);

        let mut world = Viewport::new(DEFAULT_CENTER, 0);
        assert_eq!(world.zoom(), MIN_ZOOM);
        assert!(!world.zoom_out());
    }

    #[test]
    fn panning_moves_by_whole_cells_and_recenter_restores() {
        let mut viewport = Viewport::default();
        let before = viewport.bounds(40, 20);
        let step = (before.east - before.west) / 40.0;

        viewport.pan(4, 0);
        assert_close(viewport.center().lng, DEFAULT_CENTER.lng + 4.0 * step, 1e-9);
        assert_close(viewport.center().lat, DEFAULT_CENTER.lat, 1e-9);

        viewport.pan(0, 3);
        assert!(viewport.center().lat < DEFAULT_CENTER.lat);

        viewport.zoom_in();
        viewport.recenter();
        assert_eq!(viewport, Viewport::default());
    }

    #[test]
    fn panning_wraps_across_the_antimeridian() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 179.99), 3);
        viewport.pan(10, 0);
        let lng = viewport.center().lng;
        assert!((-180.0..-160.0).contains(&lng), "unexpected longitude {lng}");
    }

    #[test]
    fn tile_zoom_is_clamped_to_the_layer_range() {
        let deep = TileCoord::containing(DEFAULT_CENTER, 40);
        assert_eq!(deep, TileCoord::containing(DEFAULT_CENTER, MAX_ZOOM));
        assert_eq!(deep.zoom, MAX_ZOOM);
        assert_eq!(TileCoord::containing(DEFAULT_CENTER, 0).zoom, MIN_ZOOM);
    }

    #[test]
    fn tile_for_istanbul_matches_slippy_formula() {
        let tile = TileCoord::containing(DEFAULT_CENTER, 12);
        assert_eq!(tile, TileCoord { x: 2377, y: 1535, zoom: 12 });
        assert_eq!(
            tile.url(TILE_URL_TEMPLATE),
            "https://a.tile.openstreetmap.org/12/2377/1535.png"
        );
    }
}
