//! Label preview, markup and print handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, api_error};
use crate::coordinator::PrintOutcome;
use crate::error::OutputError;
use crate::protocol::markup;
use crate::server::state::AppState;
use crate::transport::PeripheralAdapter;

/// GET /api/label/preview - Rasterized label as PNG.
pub async fn preview<A: PeripheralAdapter>(
    State(state): State<Arc<AppState<A>>>,
) -> Result<impl IntoResponse, ApiError> {
    let (data, document) = {
        let station = state.station.lock().await;
        (station.form.snapshot(), station.coordinator.document().clone())
    };

    let png = document.render_png(&data).await.map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Preview render failed: {}", e),
            None,
        )
    })?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// GET /api/label/zpl - Markup for the current form.
pub async fn zpl<A: PeripheralAdapter>(State(state): State<Arc<AppState<A>>>) -> impl IntoResponse {
    let data = state.station.lock().await.form.snapshot();
    let disposition = format!("inline; filename=\"{}\"", markup::artifact_name(&data));
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        markup::encode(&data),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct PrintRequest {
    /// Save the markup file when no printer is connected
    #[serde(default)]
    pub confirm_download: bool,
}

#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: PrintOutcome,
    /// Sequence number the form moved on to
    pub next_sequence: u32,
}

/// POST /api/label/print - Print the current form.
pub async fn print<A: PeripheralAdapter>(
    State(state): State<Arc<AppState<A>>>,
    request: Option<Json<PrintRequest>>,
) -> Result<Json<PrintResponse>, ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let mut station = state.station.lock().await;
    if !station.form.ready_to_print() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Weight is empty",
            Some("Введіть вагу."),
        ));
    }

    let printed_sequence = station.form.sequence();
    let mut prompt = move |_: &str| request.confirm_download;
    let station = &mut *station;
    let outcome = station
        .coordinator
        .print(&mut station.form, &mut prompt)
        .await
        .map_err(|e| {
            let status = match &e {
                OutputError::Transport(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::error!(error = %e, "print failed");
            api_error(status, &e, Some(e.operator_message()))
        })?;

    if outcome != PrintOutcome::Declined {
        state.settings.write().await.last_sequence = printed_sequence;
        if let Err(e) = state.save_settings().await {
            tracing::warn!(error = %e, "failed to persist sequence number");
        }
    }

    Ok(Json(PrintResponse {
        success: true,
        outcome,
        next_sequence: station.form.sequence(),
    }))
}
