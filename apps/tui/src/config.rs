use std::env;
use std::path::PathBuf;

use dotenv::dotenv;
use geosafe_core::viewport::{DEFAULT_CENTER, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
use geosafe_core::{ApiConfig, LatLng};
use thiserror::Error;

use crate::cli::CliArgs;

const DEFAULT_LOG_FILE: &str = "geosafe.log";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Resolved settings for one run of the terminal map.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub center: LatLng,
    pub zoom: u8,
    pub log_file: PathBuf,
    pub debug: bool,
}

impl AppConfig {
    /// Build the configuration from a variable lookup.
    ///
    /// `GEOSAFE_API_BASE_URL` wins over the shorter `API_BASE_URL`. Numbers that
    /// fail to parse are errors rather than silent defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("GEOSAFE_API_BASE_URL")
            .or_else(|| lookup("API_BASE_URL"))
            .unwrap_or_default();

        let lat = parse_number(&lookup, "GEOSAFE_CENTER_LAT", DEFAULT_CENTER.lat)?;
        let lng = parse_number(&lookup, "GEOSAFE_CENTER_LNG", DEFAULT_CENTER.lng)?;
        check_range("GEOSAFE_CENTER_LAT", lat, 90.0)?;
        check_range("GEOSAFE_CENTER_LNG", lng, 180.0)?;

        let zoom = match lookup("GEOSAFE_ZOOM") {
            None => DEFAULT_ZOOM,
            Some(raw) => {
                let zoom = raw
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| ConfigError::InvalidNumber {
                        name: "GEOSAFE_ZOOM",
                        value: raw.clone(),
                    })?;
                if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
                    return Err(ConfigError::OutOfRange {
                        name: "GEOSAFE_ZOOM",
                        value: f64::from(zoom),
                        min: f64::from(MIN_ZOOM),
                        max: f64::from(MAX_ZOOM),
                    });
                }
                zoom
            }
        };

        let log_file = lookup("GEOSAFE_LOG_FILE")
            .filter(|path| !path.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from);

        let debug = lookup("DEBUG").is_some_and(|value| is_truthy(&value));

        Ok(Self {
            api: ApiConfig::new(base_url),
            center: LatLng::new(lat, lng),
            zoom,
            log_file,
            debug,
        })
    }
}

/// Initializes the application configuration from `.env`, the process
/// environment and command-line flags, in increasing priority.
pub fn init_app_config(args: &CliArgs) -> Result<AppConfig, ConfigError> {
    dotenv().ok();

    let overrides = args.overrides();
    let mut config = AppConfig::from_lookup(|name| {
        overrides
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.clone())
            .or_else(|| env::var(name).ok())
    })?;
    config.debug |= args.debug;
    Ok(config)
}

fn parse_number<F>(lookup: &F, name: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ConfigError::InvalidNumber { name, value: raw }),
    }
}

fn check_range(name: &'static str, value: f64, limit: f64) -> Result<(), ConfigError> {
    if (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min: -limit,
            max: limit,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
