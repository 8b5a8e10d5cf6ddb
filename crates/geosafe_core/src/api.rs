use crate::domain::{SafeZone, Warehouse};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Read-only endpoints the map consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Warehouses,
    SafeZones,
    Health,
}

impl Endpoint {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Warehouses => "/api/warehouses",
            Self::SafeZones => "/api/safe-zones",
            Self::Health => "/health",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Warehouses => "warehouses",
            Self::SafeZones => "safe zones",
            Self::Health => "health",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request for {endpoint} failed: {message}")]
    Transport { endpoint: &'static str, message: String },

    #[error("{endpoint} responded with HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("could not decode {endpoint} response: {message}")]
    Decode { endpoint: &'static str, message: String },

    #[error("{endpoint} response reported an error: {message}")]
    Remote { endpoint: &'static str, message: String },
}

impl ApiError {
    pub fn transport(endpoint: Endpoint, message: impl ToString) -> Self {
        Self::Transport {
            endpoint: endpoint.label(),
            message: message.to_string(),
        }
    }

    pub const fn status(endpoint: Endpoint, status: u16) -> Self {
        Self::Status {
            endpoint: endpoint.label(),
            status,
        }
    }

    pub fn decode(endpoint: Endpoint, message: impl ToString) -> Self {
        Self::Decode {
            endpoint: endpoint.label(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl ApiConfig {
    /// Blank values fall back to the local development backend.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = if trimmed.is_empty() {
            DEFAULT_API_BASE_URL.to_string()
        } else {
            trimmed.to_string()
        };
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

/// Envelope some deployments wrap list responses in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped(ApiListResponse<T>),
}

fn decode_list<T: DeserializeOwned>(endpoint: Endpoint, body: &str) -> Result<Vec<T>, ApiError> {
    match serde_json::from_str::<ListBody<T>>(body) {
        Ok(ListBody::Bare(items)) => Ok(items),
        Ok(ListBody::Wrapped(response)) => match response.error {
            Some(message) if !message.is_empty() => Err(ApiError::Remote {
                endpoint: endpoint.label(),
                message,
            }),
            _ => Ok(response.data),
        },
        Err(error) => Err(ApiError::decode(endpoint, error)),
    }
}

pub fn decode_warehouses(body: &str) -> Result<Vec<Warehouse>, ApiError> {
    decode_list(Endpoint::Warehouses, body)
}

pub fn decode_safe_zones(body: &str) -> Result<Vec<SafeZone>, ApiError> {
    decode_list(Endpoint::SafeZones, body)
}

/// The backend is healthy only on a plain 200.
pub const fn is_healthy_status(status: u16) -> bool {
    status == 200
}
