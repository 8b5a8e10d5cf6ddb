use std::fmt::Write as _;

use color_eyre::eyre::Report;
use color_eyre::Result;
use geosafe_core::load::{backend_hint, MapData, LOAD_FAILED_MESSAGE};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::api::GeoSafeClient;

/// Load everything once and print a report instead of drawing the map.
pub async fn run_headless(client: &GeoSafeClient, json: bool) -> Result<()> {
    let base_url = client.config().base_url();
    info!(base_url, "Running headless");

    let (outcome, healthy) = tokio::join!(client.load_map_data(), client.health_check());
    let data = outcome.map_err(|e| {
        error!(error = %e, "Map data unavailable");
        Report::new(e).wrap_err(format!("{LOAD_FAILED_MESSAGE} {}", backend_hint(base_url)))
    })?;

    let report = HeadlessReport::build(base_url, healthy, &data);
    for warehouse in report.warehouses.iter().filter(|w| w.lat.is_none()) {
        warn!(warehouse_id = warehouse.id, "Warehouse has no usable coordinates");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct HeadlessReport {
    pub backend: String,
    pub healthy: bool,
    pub summary: String,
    pub warehouses: Vec<HeadlessWarehouse>,
    pub safe_zones: Vec<HeadlessSafeZone>,
}

#[derive(Debug, Serialize)]
pub struct HeadlessWarehouse {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub capacity: Option<i64>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HeadlessSafeZone {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub vertices: usize,
    pub capacity: Option<i64>,
    pub capacity_type: Option<String>,
}

impl HeadlessReport {
    pub fn build(base_url: &str, healthy: bool, data: &MapData) -> Self {
        let warehouses = data
            .warehouses
            .iter()
            .map(|warehouse| {
                let position = warehouse.position();
                HeadlessWarehouse {
                    id: warehouse.id,
                    name: warehouse.name.clone(),
                    status: warehouse.status.clone(),
                    lat: position.map(|p| p.lat),
                    lng: position.map(|p| p.lng),
                    capacity: warehouse.capacity,
                    address: warehouse.address.clone().filter(|a| !a.is_empty()),
                }
            })
            .collect();

        let safe_zones = data
            .safe_zones
            .iter()
            .map(|zone| HeadlessSafeZone {
                id: zone.id,
                name: zone.name.clone(),
                status: zone.status.clone(),
                vertices: zone.rings().first().map_or(0, Vec::len),
                capacity: zone.capacity,
                capacity_type: zone.capacity_type.clone(),
            })
            .collect();

        Self {
            backend: base_url.to_string(),
            healthy,
            summary: data.summary(),
            warehouses,
            safe_zones,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let health = if self.healthy { "healthy" } else { "unhealthy" };

        let _ = writeln!(out, "GeoSafe Map Report");
        let _ = writeln!(out, "==================");
        let _ = writeln!(out, "Backend: {} ({health})", self.backend);
        let _ = writeln!(out, "{}", self.summary);

        let _ = writeln!(out, "\nWarehouses:");
        for w in &self.warehouses {
            let place = match (w.lat, w.lng) {
                (Some(lat), Some(lng)) => format!("{lat:.6}, {lng:.6}"),
                _ => "no coordinates".to_string(),
            };
            let _ = write!(out, "- #{} {} | {} | {place}", w.id, w.name, w.status);
            if let Some(capacity) = w.capacity.filter(|c| *c != 0) {
                let _ = write!(out, " | capacity {capacity}");
            }
            if let Some(address) = &w.address {
                let _ = write!(out, " | {address}");
            }
            out.push('\n');
        }

        let _ = writeln!(out, "\nSafe zones:");
        for z in &self.safe_zones {
            let shape = if z.vertices == 0 {
                "no geometry".to_string()
            } else {
                format!("{} vertices", z.vertices)
            };
            let _ = write!(out, "- #{} {} | {} | {shape}", z.id, z.name, z.status);
            if let Some(capacity) = z.capacity.filter(|c| *c != 0) {
                let _ = write!(out, " | capacity {capacity}");
                if let Some(unit) = z.capacity_type.as_deref().filter(|u| !u.is_empty()) {
                    let _ = write!(out, " {unit}");
                }
            }
            out.push('\n');
        }

        out
    }
}
