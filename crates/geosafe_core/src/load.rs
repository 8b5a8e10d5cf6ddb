use crate::api::ApiError;
use crate::domain::{SafeZone, Warehouse};
use serde::Serialize;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load map data. Check backend connection.";
pub const LOADING_MESSAGE: &str = "Loading map data...";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapData {
    pub warehouses: Vec<Warehouse>,
    pub safe_zones: Vec<SafeZone>,
}

impl MapData {
    pub fn summary(&self) -> String {
        format!(
            "Showing {} warehouses and {} safe zones. Click on map to get coordinates.",
            self.warehouses.len(),
            self.safe_zones.len()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded(MapData),
    Failed(String),
}

impl LoadState {
    pub const fn data(&self) -> Option<&MapData> {
        match self {
            Self::Loaded(data) => Some(data),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Loading => LOADING_MESSAGE.to_string(),
            Self::Loaded(data) => data.summary(),
            Self::Failed(message) => message.clone(),
        }
    }
}

/// Both collections or nothing: a single failure fails the whole load.
pub fn combine(
    warehouses: Result<Vec<Warehouse>, ApiError>,
    safe_zones: Result<Vec<SafeZone>, ApiError>,
) -> Result<MapData, ApiError> {
    Ok(MapData {
        warehouses: warehouses?,
        safe_zones: safe_zones?,
    })
}

/// Turn a finished load into display state. The cause goes to the caller's log,
/// the user sees the generic message.
pub fn settle(outcome: Result<MapData, ApiError>) -> LoadState {
    match outcome {
        Ok(data) => LoadState::Loaded(data),
        Err(_) => LoadState::Failed(LOAD_FAILED_MESSAGE.to_string()),
    }
}

pub fn backend_hint(base_url: &str) -> String {
    format!("Make sure backend is running on {base_url}")
}
