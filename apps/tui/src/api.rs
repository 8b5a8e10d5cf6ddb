use std::time::Duration;

use geosafe_core::api::{decode_safe_zones, decode_warehouses, is_healthy_status};
use geosafe_core::load::{combine, MapData};
use geosafe_core::{ApiConfig, ApiError, Endpoint, SafeZone, Warehouse};
use reqwest::header::ACCEPT;
use tracing::{debug, error, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the GeoSafe backend.
#[derive(Debug, Clone)]
pub struct GeoSafeClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl GeoSafeClient {
    pub fn new(config: ApiConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, config })
    }

    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_text(&self, endpoint: Endpoint) -> Result<String, ApiError> {
        let url = self.config.url(endpoint);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::transport(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::status(endpoint, status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| ApiError::transport(endpoint, e))
    }

    pub async fn fetch_warehouses(&self) -> Result<Vec<Warehouse>, ApiError> {
        let body = self.get_text(Endpoint::Warehouses).await?;
        let warehouses = decode_warehouses(&body)?;
        info!(count = warehouses.len(), "Fetched warehouses");
        Ok(warehouses)
    }

    pub async fn fetch_safe_zones(&self) -> Result<Vec<SafeZone>, ApiError> {
        let body = self.get_text(Endpoint::SafeZones).await?;
        let zones = decode_safe_zones(&body)?;
        info!(count = zones.len(), "Fetched safe zones");
        Ok(zones)
    }

    /// Any failure reads as unhealthy.
    pub async fn health_check(&self) -> bool {
        let url = self.config.url(Endpoint::Health);
        match self.http.get(&url).send().await {
            Ok(response) => is_healthy_status(response.status().as_u16()),
            Err(e) => {
                debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    /// Fetch both collections concurrently. Either failure fails the whole load.
    pub async fn load_map_data(&self) -> Result<MapData, ApiError> {
        let (warehouses, safe_zones) =
            tokio::join!(self.fetch_warehouses(), self.fetch_safe_zones());

        for failure in [warehouses.as_ref().err(), safe_zones.as_ref().err()]
            .into_iter()
            .flatten()
        {
            error!(error = %failure, "Error loading map data");
        }

        combine(warehouses, safe_zones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Route = (&'static str, u16, &'static str);

    /// Minimal HTTP/1.1 responder on a loopback port.
    async fn serve(routes: Vec<Route>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]);
                    let path = request.split_whitespace().nth(1).unwrap_or("/");
                    let (status, body) = routes
                        .iter()
                        .find(|(route, ..)| *route == path)
                        .map_or((404, "{}"), |(_, status, body)| (*status, *body));
                    let response = format!(
                        "HTTP/1.1 {status} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{addr}")
    }

    fn client(base_url: &str) -> GeoSafeClient {
        GeoSafeClient::new(ApiConfig::new(base_url)).unwrap()
    }

    const WAREHOUSES: &str = r#"[
        {"id": 1, "name": "Kadikoy Depot", "location": {"type": "Point", "coordinates": [29.03, 40.99]}, "capacity": 500, "status": "active"},
        {"id": 2, "name": "Besiktas Depot", "location": null, "data": {"location": {"lat": 41.04, "lon": 29.0}}}
    ]"#;

    const SAFE_ZONES: &str = r#"{"data": [
        {"id": 7, "name": "Macka Park", "geometry": {"type": "Polygon", "coordinates": [[[28.99, 41.04], [29.0, 41.04], [29.0, 41.05], [28.99, 41.04]]]}, "capacity": 3000, "capacity_type": "persons"}
    ], "total": 1}"#;

    #[tokio::test]
    async fn loads_both_collections() {
        let base = serve(vec![
            ("/api/warehouses", 200, WAREHOUSES),
            ("/api/safe-zones", 200, SAFE_ZONES),
            ("/health", 200, r#"{"status": "healthy"}"#),
        ])
        .await;
        let client = client(&base);

        let data = client.load_map_data().await.unwrap();
        assert_eq!(data.warehouses.len(), 2);
        assert_eq!(data.safe_zones.len(), 1);
        assert_eq!(data.safe_zones[0].name, "Macka Park");
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn one_failing_endpoint_fails_the_load() {
        let base = serve(vec![
            ("/api/warehouses", 200, WAREHOUSES),
            ("/api/safe-zones", 500, r#"{"detail": "boom"}"#),
        ])
        .await;

        let err = client(&base).load_map_data().await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Status {
                endpoint: "safe zones",
                status: 500
            }
        ));
    }

    #[tokio::test]
    async fn undecodable_body_is_a_decode_error() {
        let base = serve(vec![("/api/warehouses", 200, "<html>oops</html>")]).await;

        let err = client(&base).fetch_warehouses().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { endpoint: "warehouses", .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_is_unhealthy_and_fails_to_load() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(&format!("http://{addr}"));
        assert!(!client.health_check().await);
        assert!(matches!(
            client.load_map_data().await,
            Err(ApiError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn health_requires_ok_status() {
        let base = serve(vec![("/health", 204, "")]).await;
        assert!(!client(&base).health_check().await);
    }
}
