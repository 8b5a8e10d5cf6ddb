use crate::domain::{SafeZone, Warehouse};

/// A rectangle of grid cells, relative to the map's top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBox {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Place a `width` x `height` box just above `anchor` inside a `cols` x `rows`
/// grid. Without an anchor the box sits in the top-left corner.
pub fn place_popup(
    anchor: Option<(u16, u16)>,
    width: u16,
    height: u16,
    cols: u16,
    rows: u16,
) -> CellBox {
    let width = width.min(cols);
    let height = height.min(rows);

    let (x, y) = anchor.map_or((0, 0), |(col, row)| {
        (
            col.saturating_sub(width / 2).min(cols - width),
            row.saturating_sub(height),
        )
    });
    CellBox {
        x,
        y,
        width,
        height,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupLine {
    pub label: &'static str,
    pub value: String,
}

/// Text shown when a marker or zone is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
    pub title: String,
    pub lines: Vec<PopupLine>,
}

impl PopupContent {
    fn new(title: &str, status: &str) -> Self {
        Self {
            title: title.to_string(),
            lines: vec![PopupLine {
                label: "Status",
                value: status.to_string(),
            }],
        }
    }

    fn push(&mut self, label: &'static str, value: String) {
        self.lines.push(PopupLine { label, value });
    }

    pub fn for_warehouse(warehouse: &Warehouse) -> Self {
        let mut content = Self::new(&warehouse.name, &warehouse.status);
        // Zero capacity is hidden, same as an absent one.
        if let Some(capacity) = warehouse.capacity.filter(|capacity| *capacity != 0) {
            content.push("Capacity", capacity.to_string());
        }
        if let Some(address) = warehouse
            .address
            .as_deref()
            .filter(|address| !address.is_empty())
        {
            content.push("Address", address.to_string());
        }
        content
    }

    pub fn for_safe_zone(zone: &SafeZone) -> Self {
        let mut content = Self::new(&zone.name, &zone.status);
        if let Some(capacity) = zone.capacity.filter(|capacity| *capacity != 0) {
            let value = match zone.capacity_type.as_deref() {
                Some(unit) if !unit.is_empty() => format!("{capacity} {unit}"),
                _ => capacity.to_string(),
            };
            content.push("Capacity", value);
        }
        content
    }

    /// Bordered size in cells: the widest line or title plus border and padding.
    pub fn size(&self) -> (u16, u16) {
        let widest = self
            .lines
            .iter()
            .map(|line| line.label.chars().count() + 2 + line.value.chars().count())
            .chain(std::iter::once(self.title.chars().count()))
            .max()
            .unwrap_or(0);
        let width = u16::try_from(widest + 4).unwrap_or(u16::MAX);
        let height = u16::try_from(self.lines.len() + 2).unwrap_or(u16::MAX);
        (width, height)
    }
}
