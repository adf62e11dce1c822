//! Settings handlers.

use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::{ApiError, api_error};
use crate::server::state::AppState;
use crate::settings::Settings;
use crate::transport::PeripheralAdapter;

/// GET /api/settings - Current settings.
pub async fn get<A: PeripheralAdapter>(State(state): State<Arc<AppState<A>>>) -> Json<Settings> {
    Json(state.settings.read().await.clone())
}

/// PUT /api/settings - Replace and persist settings.
///
/// Print mode and label size apply immediately; font, dispatch, output
/// directory and timeouts take effect on the next start.
pub async fn put<A: PeripheralAdapter>(
    State(state): State<Arc<AppState<A>>>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    {
        let mut station = state.station.lock().await;
        station.coordinator.set_mode(settings.print_mode);
        station.form.size = settings.label_size;
        *state.settings.write().await = settings.clone();
    }

    state.save_settings().await.map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            e,
            Some("Не вдалося зберегти налаштування."),
        )
    })?;
    tracing::info!(device = ?settings.preferred_device_name, "settings updated");
    Ok(Json(settings))
}
