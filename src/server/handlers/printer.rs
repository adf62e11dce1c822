//! Wireless printer session handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, api_error};
use crate::coordinator::PrintMode;
use crate::error::SessionError;
use crate::server::state::AppState;
use crate::transport::{PeripheralAdapter, SessionState};

#[derive(Debug, Serialize)]
pub struct PrinterStatus {
    pub state: SessionState,
    pub connected: bool,
    pub device_name: Option<String>,
    pub mode: PrintMode,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConnectRequest {
    /// Exact device name to prefer; falls back to the saved one
    pub device_name: Option<String>,
}

async fn status_of<A: PeripheralAdapter>(state: &AppState<A>) -> PrinterStatus {
    let status = state.session.status();
    let connected = state.session.is_connected().await;
    let mode = state.station.lock().await.coordinator.mode();
    PrinterStatus {
        state: status.state,
        connected,
        device_name: status.device_name,
        mode,
    }
}

/// GET /api/printer/status - Session state.
pub async fn status<A: PeripheralAdapter>(
    State(state): State<Arc<AppState<A>>>,
) -> Json<PrinterStatus> {
    Json(status_of(&state).await)
}

/// POST /api/printer/connect - Discover and connect.
pub async fn connect<A: PeripheralAdapter>(
    State(state): State<Arc<AppState<A>>>,
    request: Option<Json<ConnectRequest>>,
) -> Result<Json<PrinterStatus>, ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let preferred = match request.device_name {
        Some(name) => Some(name),
        None => state.settings.read().await.preferred_device_name.clone(),
    };

    state
        .session
        .connect(preferred.as_deref())
        .await
        .map_err(|e| {
            let status = match e {
                SessionError::Busy
                | SessionError::AlreadyConnected
                | SessionError::Cancelled => StatusCode::CONFLICT,
                SessionError::Unsupported(_) => StatusCode::SERVICE_UNAVAILABLE,
                SessionError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };
            api_error(status, &e, Some(e.operator_message()))
        })?;

    Ok(Json(status_of(&state).await))
}

/// POST /api/printer/disconnect - Close the session.
pub async fn disconnect<A: PeripheralAdapter>(
    State(state): State<Arc<AppState<A>>>,
) -> Json<PrinterStatus> {
    state.session.disconnect().await;
    Json(status_of(&state).await)
}
