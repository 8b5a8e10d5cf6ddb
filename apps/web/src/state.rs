use geosafe_core::load::MapData;
use geosafe_core::{ApiConfig, ApiError, MapSession};
use ratzilla::ratatui::layout::Rect;

/// A click resolved against the DOM grid: the cell's index in its row, the
/// row's index in the grid, and the grid's size as laid out in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub col: u32,
    pub row: u32,
    pub cols: u32,
    pub rows: u32,
}

/// Everything the draw loop and the event handlers share.
pub struct WebState {
    pub session: MapSession,
    pub config: ApiConfig,
    pub status: Option<String>,
    pub healthy: Option<bool>,
    /// Whole terminal grid as of the last frame.
    pub screen: Rect,
    /// Map canvas inside `screen` as of the last frame.
    pub map_area: Rect,
    load_generation: u64,
}

impl WebState {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            session: MapSession::default(),
            config,
            status: None,
            healthy: None,
            screen: Rect::default(),
            map_area: Rect::default(),
            load_generation: 0,
        }
    }

    /// Mark a new load as current and return its generation.
    pub fn begin_load(&mut self) -> u64 {
        self.load_generation += 1;
        self.healthy = None;
        self.session.begin_load();
        self.load_generation
    }

    /// Apply a finished load unless a newer one has started since.
    /// Returns false when the result was stale and dropped.
    pub fn finish_load(
        &mut self,
        generation: u64,
        outcome: Result<MapData, ApiError>,
        healthy: bool,
    ) -> bool {
        if generation != self.load_generation {
            return false;
        }
        self.healthy = Some(healthy);
        self.session.finish_load(outcome);
        true
    }

    /// Map a clicked DOM cell to a cell of the map canvas.
    ///
    /// A grid whose size differs from the last frame is not ours (or is
    /// mid-resize), so the click is dropped rather than guessed.
    pub fn map_cell_at(&self, cell: GridCell) -> Option<(u16, u16)> {
        let screen = self.screen;
        if cell.cols != u32::from(screen.width) || cell.rows != u32::from(screen.height) {
            return None;
        }

        let col = u16::try_from(cell.col).ok()?.checked_add(screen.x)?;
        let row = u16::try_from(cell.row).ok()?.checked_add(screen.y)?;
        let map = self.map_area;
        let inside = col >= map.x && col < map.right() && row >= map.y && row < map.bottom();
        inside.then(|| (col - map.x, row - map.y))
    }
}
