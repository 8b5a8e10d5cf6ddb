pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod event;
pub mod logging;
pub mod terminal;
pub mod ui;

pub use api::GeoSafeClient;
pub use app::App;
pub use config::{AppConfig, ConfigError};
