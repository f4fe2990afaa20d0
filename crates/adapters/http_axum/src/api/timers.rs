//! JSON REST handlers for timers.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use afterglow_app::ports::{Countdown, DeviceActuator, DeviceDirectory, EventNotifier};
use afterglow_app::scheduler::{TriggerOutcome, TriggerRequest};
use afterglow_domain::capability::{Capability, CapabilityValue};
use afterglow_domain::error::ValidationError;
use afterglow_domain::id::DeviceId;
use afterglow_domain::time::Timestamp;
use afterglow_domain::timer::TimerExport;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for triggering the deferred action.
///
/// Mirrors the flow-card argument schema: `brightness_level` present means a
/// `dim` action at that level, otherwise the device is switched on.
#[derive(Deserialize)]
pub struct TriggerTimerRequest {
    /// Countdown length in seconds.
    pub time_on: i64,
    /// Act even when the device is already on.
    #[serde(default)]
    pub ignore_when_on: bool,
    /// Replace a running timer even when it would fire later.
    #[serde(default)]
    pub overrule_longer_timeouts: bool,
    /// Dim level in `0.0..=1.0`; switches the action from `onoff` to `dim`.
    #[serde(default)]
    pub brightness_level: Option<f64>,
    /// Restore the pre-action value at expiry instead of turning off.
    #[serde(default)]
    pub restore: bool,
}

/// Response body for the trigger endpoint.
#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TriggerBody {
    Armed { expires_at: Timestamp },
    Skipped,
}

/// Response body for the running-condition endpoint.
#[derive(Serialize)]
pub struct RunningBody {
    pub running: bool,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<TimerExport>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the trigger endpoint.
pub enum TriggerResponse {
    Ok(Json<TriggerBody>),
}

impl IntoResponse for TriggerResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the running-condition endpoint.
pub enum RunningResponse {
    Ok(Json<RunningBody>),
}

impl IntoResponse for RunningResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the cancel endpoint.
pub enum CancelResponse {
    /// Returned whether or not a timer was running; cancellation is
    /// idempotent.
    NoContent,
}

impl IntoResponse for CancelResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_device(raw: &str) -> Result<DeviceId, ApiError> {
    DeviceId::from_str(raw).map_err(|_| {
        ApiError::from(afterglow_domain::error::AfterglowError::Validation(
            ValidationError::InvalidDeviceId {
                value: raw.to_string(),
            },
        ))
    })
}

/// `GET /api/timers`
pub async fn list<A, N, C, D>(
    State(state): State<AppState<A, N, C, D>>,
) -> Result<ListResponse, ApiError>
where
    A: DeviceActuator + 'static,
    N: EventNotifier + 'static,
    C: Countdown + 'static,
    D: DeviceDirectory + 'static,
{
    Ok(ListResponse::Ok(Json(state.scheduler.export().await)))
}

/// `POST /api/timers/:device`
pub async fn trigger<A, N, C, D>(
    State(state): State<AppState<A, N, C, D>>,
    Path(device): Path<String>,
    Json(body): Json<TriggerTimerRequest>,
) -> Result<TriggerResponse, ApiError>
where
    A: DeviceActuator + 'static,
    N: EventNotifier + 'static,
    C: Countdown + 'static,
    D: DeviceDirectory + 'static,
{
    let device = parse_device(&device)?;
    let (capability, value) = match body.brightness_level {
        Some(level) => (Capability::Dim, CapabilityValue::Number(level)),
        None => (Capability::OnOff, CapabilityValue::Bool(true)),
    };
    let request = TriggerRequest::new(device, capability, value, body.time_on)
        .ignore_when_on(body.ignore_when_on)
        .overrule_longer(body.overrule_longer_timeouts)
        .restore(body.restore);

    let outcome = state.scheduler.trigger(request).await?;
    let body = match outcome {
        TriggerOutcome::Armed { expires_at } => TriggerBody::Armed { expires_at },
        TriggerOutcome::Skipped => TriggerBody::Skipped,
    };
    Ok(TriggerResponse::Ok(Json(body)))
}

/// `GET /api/timers/:device/running`
pub async fn running<A, N, C, D>(
    State(state): State<AppState<A, N, C, D>>,
    Path(device): Path<String>,
) -> Result<RunningResponse, ApiError>
where
    A: DeviceActuator + 'static,
    N: EventNotifier + 'static,
    C: Countdown + 'static,
    D: DeviceDirectory + 'static,
{
    let device = parse_device(&device)?;
    let running = state.scheduler.is_timer_running(device).await;
    Ok(RunningResponse::Ok(Json(RunningBody { running })))
}

/// `DELETE /api/timers/:device`
pub async fn cancel<A, N, C, D>(
    State(state): State<AppState<A, N, C, D>>,
    Path(device): Path<String>,
) -> Result<CancelResponse, ApiError>
where
    A: DeviceActuator + 'static,
    N: EventNotifier + 'static,
    C: Countdown + 'static,
    D: DeviceDirectory + 'static,
{
    let device = parse_device(&device)?;
    state.scheduler.cancel_timer(device).await?;
    Ok(CancelResponse::NoContent)
}
