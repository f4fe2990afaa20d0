//! JSON REST handlers for device listings and autocomplete.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use afterglow_app::ports::{Countdown, DeviceActuator, DeviceDirectory, EventNotifier};
use afterglow_domain::capability::Capability;
use afterglow_domain::device::Device;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the autocomplete endpoint.
#[derive(Deserialize)]
pub struct SearchQuery {
    /// Substring matched against device and zone names; empty matches all.
    #[serde(default)]
    pub q: String,
    /// Restrict results to devices exposing this capability.
    pub capability: Option<String>,
}

/// Possible responses from the list and search endpoints.
pub enum ListResponse {
    Ok(Json<Vec<Device>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list<A, N, C, D>(
    State(state): State<AppState<A, N, C, D>>,
) -> Result<ListResponse, ApiError>
where
    A: DeviceActuator + 'static,
    N: EventNotifier + 'static,
    C: Countdown + 'static,
    D: DeviceDirectory + 'static,
{
    let devices = state.directory.all_devices().await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `GET /api/devices/search?q=…&capability=…`
pub async fn search<A, N, C, D>(
    State(state): State<AppState<A, N, C, D>>,
    Query(query): Query<SearchQuery>,
) -> Result<ListResponse, ApiError>
where
    A: DeviceActuator + 'static,
    N: EventNotifier + 'static,
    C: Countdown + 'static,
    D: DeviceDirectory + 'static,
{
    let capability = query.capability.map(Capability::from);
    let devices = state
        .directory
        .search(&query.q, capability.as_ref())
        .await?;
    Ok(ListResponse::Ok(Json(devices)))
}
