use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// A WGS84 position in display order (latitude first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from a GeoJSON position, which is `[lng, lat, ...]`.
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Some(Self::new(*lat, *lng)),
            _ => None,
        }
    }
}

/// GeoJSON Point used for warehouse locations. Coordinates are `[lng, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    pub coordinates: Vec<f64>,
}

/// GeoJSON Polygon used for safe zone boundaries. Each ring holds `[lng, lat]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonGeometry {
    pub coordinates: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point(PointGeometry),
    Polygon(PolygonGeometry),
}

impl Geometry {
    /// Geometries the backend could not serialise (`raw`, `unknown`) decode to `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub created_at: String,
}

impl Warehouse {
    /// Marker position: the GeoJSON location first, then `data.location.{lat,lon}`.
    pub fn position(&self) -> Option<LatLng> {
        if let Some(Geometry::Point(point)) = self.location.as_ref().and_then(Geometry::from_value)
        {
            if let Some(position) = LatLng::from_position(&point.coordinates) {
                return Some(position);
            }
        }

        let meta = self.data.as_ref().and_then(decode_metadata)?;
        let location = meta.get("location")?;
        let lat = location.get("lat")?.as_f64()?;
        let lng = location.get("lon")?.as_f64()?;
        (lat.is_finite() && lng.is_finite()).then_some(LatLng::new(lat, lng))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub capacity_type: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub created_at: String,
}

impl SafeZone {
    /// Polygon rings in display order. Falls back to the rectangle in `data.bounds`.
    pub fn rings(&self) -> Vec<Vec<LatLng>> {
        if let Some(Geometry::Polygon(polygon)) =
            self.geometry.as_ref().and_then(Geometry::from_value)
        {
            return polygon
                .coordinates
                .iter()
                .map(|ring| {
                    ring.iter()
                        .filter_map(|position| LatLng::from_position(position))
                        .collect::<Vec<_>>()
                })
                .filter(|ring| !ring.is_empty())
                .collect();
        }

        self.data
            .as_ref()
            .and_then(decode_metadata)
            .and_then(|meta| bounds_ring(&meta))
            .map(|ring| vec![ring])
            .unwrap_or_default()
    }

    /// Even-odd across every ring, so holes are outside the zone.
    pub fn contains(&self, position: LatLng) -> bool {
        self.rings()
            .iter()
            .filter(|ring| ring_contains(ring, position))
            .count()
            % 2
            == 1
    }
}

fn default_status() -> String {
    "active".to_string()
}

/// `data` arrives either as a JSON object or as a string holding JSON.
fn decode_metadata(data: &Value) -> Option<Cow<'_, Value>> {
    match data {
        Value::Object(_) => Some(Cow::Borrowed(data)),
        Value::String(text) => serde_json::from_str::<Value>(text)
            .ok()
            .filter(Value::is_object)
            .map(Cow::Owned),
        _ => None,
    }
}

fn bounds_ring(meta: &Value) -> Option<Vec<LatLng>> {
    let bounds = meta.get("bounds")?.as_object()?;
    if bounds.is_empty() {
        return None;
    }

    // Missing edges read as 0, matching how the API synthesises the polygon.
    let edge = |key: &str| bounds.get(key).and_then(Value::as_f64).unwrap_or(0.0);
    let (min_lon, max_lon) = (edge("minLon"), edge("maxLon"));
    let (min_lat, max_lat) = (edge("minLat"), edge("maxLat"));

    Some(vec![
        LatLng::new(min_lat, min_lon),
        LatLng::new(min_lat, max_lon),
        LatLng::new(max_lat, max_lon),
        LatLng::new(max_lat, min_lon),
        LatLng::new(min_lat, min_lon),
    ])
}

/// Even-odd ray casting test.
pub fn ring_contains(ring: &[LatLng], position: LatLng) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut previous = ring[ring.len() - 1];
    for &current in ring {
        let crosses = (current.lat > position.lat) != (previous.lat > position.lat);
        if crosses {
            let lng_at_lat = (previous.lng - current.lng) * (position.lat - current.lat)
                / (previous.lat - current.lat)
                + current.lng;
            if position.lng < lng_at_lat {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}
