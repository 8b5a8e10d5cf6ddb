use crate::domain::LatLng;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Where and when the user last clicked the map surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapClickEvent {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Local>,
}

impl MapClickEvent {
    pub const fn new(position: LatLng, timestamp: DateTime<Local>) -> Self {
        Self {
            lat: position.lat,
            lng: position.lng,
            timestamp,
        }
    }

    pub const fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn latitude_text(&self) -> String {
        format!("{:.6}°", self.lat)
    }

    pub fn longitude_text(&self) -> String {
        format!("{:.6}°", self.lng)
    }

    pub fn time_text(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    /// `lat,lng` with six decimals, the form placed on the clipboard.
    pub fn copy_text(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }

    pub fn log_line(&self) -> String {
        format!("Map clicked: Lat {:.4}, Lng {:.4}", self.lat, self.lng)
    }
}

pub const COPIED_MESSAGE: &str = "Coordinates copied to clipboard!";
