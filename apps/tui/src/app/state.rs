use chrono::{DateTime, Local};
use geosafe_core::load::MapData;
use geosafe_core::session::{ClickOutcome, SessionEvent};
use geosafe_core::{ApiError, Endpoint, MapCommand, MapSession, Viewport};
use ratatui::layout::Rect;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::GeoSafeClient;

type LoadResult = (Result<MapData, ApiError>, bool);

pub struct App {
    pub running: bool,
    pub session: MapSession,
    pub status_message: String,
    pub healthy: Option<bool>,
    /// Map canvas as of the last frame; mouse clicks are resolved against it.
    pub map_area: Rect,
    client: GeoSafeClient,
    pending: Option<oneshot::Receiver<LoadResult>>,
    task: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(client: GeoSafeClient, viewport: Viewport) -> Self {
        Self {
            running: true,
            session: MapSession::new(viewport),
            status_message: String::new(),
            healthy: None,
            map_area: Rect::default(),
            client,
            pending: None,
            task: None,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.config().base_url()
    }

    pub const fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Start the health check and both fetches in the background.
    /// A load already in flight is aborted in favour of the new one.
    pub fn start_load(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                debug!("Aborting the previous load");
            }
            task.abort();
        }
        self.session.begin_load();
        self.healthy = None;

        let (tx, rx) = oneshot::channel();
        let client = self.client.clone();
        self.task = Some(tokio::spawn(async move {
            let result = tokio::join!(client.load_map_data(), client.health_check());
            let _ = tx.send(result);
        }));
        self.pending = Some(rx);
        info!(base_url = self.base_url(), "Loading map data");
    }

    /// Pick up a finished background load, if any.
    pub fn poll_load(&mut self) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };

        match rx.try_recv() {
            Ok((outcome, healthy)) => {
                self.pending = None;
                self.task = None;
                self.finish_load(outcome, healthy);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => {
                self.pending = None;
                self.task = None;
                self.finish_load(
                    Err(ApiError::transport(
                        Endpoint::Warehouses,
                        "load task ended without a result",
                    )),
                    false,
                );
            }
        }
    }

    pub fn finish_load(&mut self, outcome: Result<MapData, ApiError>, healthy: bool) {
        self.healthy = Some(healthy);
        if let Err(e) = &outcome {
            error!(error = %e, "Map data unavailable");
        }

        self.session.finish_load(outcome);
        for id in self.session.unplaced_warehouses() {
            warn!(warehouse_id = id, "Warehouse has no usable coordinates, not drawn");
        }
        info!("{}", self.session.state.summary());
    }

    pub fn handle_command(&mut self, command: MapCommand, now: DateTime<Local>) {
        match self.session.apply(command, now) {
            SessionEvent::Redraw => {}
            SessionEvent::Clicked(outcome) => self.report_click(&outcome),
            SessionEvent::ReloadRequested => {
                self.status_message.clear();
                self.start_load();
            }
            SessionEvent::CopyRequested(text) => {
                self.status_message = format!("Copy: {text}");
            }
            SessionEvent::NothingToCopy => {
                self.status_message = "Click on the map first.".to_string();
            }
            SessionEvent::Quit => self.running = false,
        }
    }

    /// Handle a mouse click at an absolute terminal cell.
    pub fn handle_click(&mut self, column: u16, row: u16, now: DateTime<Local>) {
        let map = self.map_area;
        let inside =
            column >= map.x && column < map.right() && row >= map.y && row < map.bottom();
        if !inside {
            return;
        }

        let outcome = self.session.click(column - map.x, row - map.y, now);
        self.report_click(&outcome);
    }

    fn report_click(&mut self, outcome: &ClickOutcome) {
        if let ClickOutcome::Marker(index) = outcome {
            debug!(index, "Warehouse marker selected");
        }
        if let Some(event) = outcome.event() {
            info!("{}", event.log_line());
            self.status_message.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosafe_core::load::{LoadState, LOAD_FAILED_MESSAGE};
    use geosafe_core::ApiConfig;
    use std::time::Duration;

    fn app() -> App {
        let client = GeoSafeClient::new(ApiConfig::default()).unwrap();
        App::new(client, Viewport::default())
    }

    fn data() -> MapData {
        let warehouses = serde_json::from_str(
            r#"[{"id": 3, "name": "Orphan"}, {"id": 4, "name": "Placed", "location": {"type": "Point", "coordinates": [28.9784, 41.0082]}}]"#,
        )
        .unwrap();
        MapData {
            warehouses,
            safe_zones: Vec::new(),
        }
    }

    #[test]
    fn finish_load_records_health_and_data() {
        let mut app = app();
        app.finish_load(Ok(data()), true);

        assert_eq!(app.healthy, Some(true));
        assert_eq!(
            app.session.state.summary(),
            "Showing 2 warehouses and 0 safe zones. Click on map to get coordinates."
        );
    }

    #[test]
    fn failed_load_shows_generic_message() {
        let mut app = app();
        app.finish_load(Err(ApiError::status(Endpoint::SafeZones, 502)), false);
        assert_eq!(
            app.session.state,
            LoadState::Failed(LOAD_FAILED_MESSAGE.to_string())
        );
    }

    #[test]
    fn clicks_outside_the_map_are_ignored() {
        let mut app = app();
        app.finish_load(Ok(data()), true);
        app.map_area = Rect::new(2, 3, 40, 20);
        app.session.set_grid(40, 20);

        app.handle_click(1, 10, Local::now());
        app.handle_click(10, 23, Local::now());
        assert!(app.session.last_click.is_none());

        app.handle_click(3, 4, Local::now());
        assert!(app.session.last_click.is_some());
    }

    #[test]
    fn copy_echoes_coordinates_in_status() {
        let mut app = app();
        app.finish_load(Ok(data()), true);
        app.map_area = Rect::new(0, 0, 40, 20);
        app.session.set_grid(40, 20);

        app.handle_command(MapCommand::Copy, Local::now());
        assert_eq!(app.status_message, "Click on the map first.");

        app.handle_click(1, 1, Local::now());
        let copy = app.session.last_click.as_ref().unwrap().copy_text();
        app.handle_command(MapCommand::Copy, Local::now());
        assert_eq!(app.status_message, format!("Copy: {copy}"));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut app = app();
        app.handle_command(MapCommand::Quit, Local::now());
        assert!(!app.running);
    }

    #[tokio::test]
    async fn background_load_settles_when_backend_is_down() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeoSafeClient::new(ApiConfig::new(format!("http://{addr}"))).unwrap();
        let mut app = App::new(client, Viewport::default());
        app.start_load();
        assert!(app.session.state.is_loading());

        tokio::time::timeout(Duration::from_secs(5), async {
            while app.is_loading() {
                app.poll_load();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(app.healthy, Some(false));
        assert!(matches!(app.session.state, LoadState::Failed(_)));
    }

    #[tokio::test]
    async fn reload_aborts_the_load_in_flight() {
        // Connections are queued but never answered, so the first load hangs.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = GeoSafeClient::new(ApiConfig::new(format!("http://{addr}"))).unwrap();
        let mut app = App::new(client, Viewport::default());
        app.start_load();
        let first = app.pending.take().unwrap();

        app.handle_command(MapCommand::Reload, Local::now());
        assert!(app.is_loading());

        let settled = tokio::time::timeout(Duration::from_secs(2), first)
            .await
            .expect("aborted load should drop its sender");
        assert!(settled.is_err());
        drop(listener);
    }
}
