use std::cell::RefCell;
use std::rc::Rc;

use geosafe_core::api::{decode_safe_zones, decode_warehouses, is_healthy_status};
use geosafe_core::load::{combine, MapData};
use geosafe_core::{ApiConfig, ApiError, Endpoint, SafeZone, Warehouse};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::state::WebState;

/// Base URL baked in at build time, e.g. `GEOSAFE_API_BASE_URL=https://api.example.org trunk build`.
pub fn api_config() -> ApiConfig {
    option_env!("GEOSAFE_API_BASE_URL").map_or_else(ApiConfig::default, ApiConfig::new)
}

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

async fn fetch_response(config: &ApiConfig, endpoint: Endpoint) -> Result<Response, ApiError> {
    let Some(window) = web_sys::window() else {
        return Err(ApiError::transport(endpoint, "window unavailable"));
    };

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(&config.url(endpoint), &opts)
        .map_err(|error| ApiError::transport(endpoint, js_message(&error)))?;
    request
        .headers()
        .set("Accept", "application/json")
        .map_err(|error| ApiError::transport(endpoint, js_message(&error)))?;

    let response_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|error| ApiError::transport(endpoint, js_message(&error)))?;

    response_value
        .dyn_into::<Response>()
        .map_err(|_| ApiError::transport(endpoint, "fetch did not yield a Response"))
}

async fn fetch_text(config: &ApiConfig, endpoint: Endpoint) -> Result<String, ApiError> {
    let response = fetch_response(config, endpoint).await?;
    if !response.ok() {
        return Err(ApiError::status(endpoint, response.status()));
    }

    let body = response
        .text()
        .map_err(|error| ApiError::decode(endpoint, js_message(&error)))?;
    let text = JsFuture::from(body)
        .await
        .map_err(|error| ApiError::decode(endpoint, js_message(&error)))?;

    text.as_string()
        .ok_or_else(|| ApiError::decode(endpoint, "body is not text"))
}

async fn fetch_warehouses(config: &ApiConfig) -> Result<Vec<Warehouse>, ApiError> {
    let body = fetch_text(config, Endpoint::Warehouses).await?;
    let warehouses = decode_warehouses(&body)?;
    web_sys::console::log_1(&format!("Warehouses fetched: {}", warehouses.len()).into());
    Ok(warehouses)
}

async fn fetch_safe_zones(config: &ApiConfig) -> Result<Vec<SafeZone>, ApiError> {
    let body = fetch_text(config, Endpoint::SafeZones).await?;
    let safe_zones = decode_safe_zones(&body)?;
    web_sys::console::log_1(&format!("Safe zones fetched: {}", safe_zones.len()).into());
    Ok(safe_zones)
}

/// Issue both list requests at once; either failure fails the load.
pub async fn load_map_data(config: &ApiConfig) -> Result<MapData, ApiError> {
    let (warehouses, safe_zones) =
        futures::future::join(fetch_warehouses(config), fetch_safe_zones(config)).await;

    for error in [warehouses.as_ref().err(), safe_zones.as_ref().err()]
        .into_iter()
        .flatten()
    {
        web_sys::console::error_1(&format!("Error fetching map data: {error}").into());
    }

    combine(warehouses, safe_zones)
}

pub async fn health_check(config: &ApiConfig) -> bool {
    match fetch_response(config, Endpoint::Health).await {
        Ok(response) => is_healthy_status(response.status()),
        Err(error) => {
            web_sys::console::error_1(&format!("Health check failed: {error}").into());
            false
        }
    }
}

/// Start a load in the background; the session shows "Loading" until it settles.
/// A load started later supersedes this one, whose result is then dropped.
pub fn spawn_load(store: Rc<RefCell<WebState>>) {
    let config = store.borrow().config.clone();
    let generation = store.borrow_mut().begin_load();

    spawn_local(async move {
        let (outcome, healthy) =
            futures::future::join(load_map_data(&config), health_check(&config)).await;

        if outcome.is_err() {
            web_sys::console::error_1(&"Failed to load map data".into());
        }

        let mut state = store.borrow_mut();
        if !state.finish_load(generation, outcome, healthy) {
            web_sys::console::log_1(&"Dropping a superseded map load".into());
            return;
        }
        for id in state.session.unplaced_warehouses() {
            web_sys::console::warn_1(&format!("Warehouse {id} has no valid coordinates").into());
        }
    });
}
