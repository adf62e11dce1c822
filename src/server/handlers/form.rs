//! Operator form handlers.

use axum::{Json, extract::State, http::StatusCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, api_error};
use crate::coordinator::PrintMode;
use crate::label::{LabelForm, ProductCode};
use crate::printer::LabelSize;
use crate::server::state::AppState;
use crate::transport::PeripheralAdapter;

/// Everything the operator screen shows.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub date: NaiveDate,
    pub display_date: String,
    pub product: ProductCode,
    pub product_name: &'static str,
    pub sequence: u32,
    pub weight: String,
    pub size: LabelSize,
    pub ready_to_print: bool,
    pub article: String,
    pub barcode: String,
    pub mode: PrintMode,
}

impl FormView {
    pub fn new(form: &LabelForm, mode: PrintMode) -> Self {
        let data = form.snapshot();
        Self {
            date: data.date(),
            display_date: data.display_date(),
            product: data.product(),
            product_name: data.product().display_name(),
            sequence: data.sequence(),
            weight: form.weight().as_str().to_string(),
            size: data.size(),
            ready_to_print: form.ready_to_print(),
            article: data.article(),
            barcode: data.barcode_value(),
            mode,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceStep {
    Increment,
    Decrement,
}

/// Body of POST /api/form. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct FormUpdate {
    pub product: Option<String>,
    pub size: Option<String>,
    /// Manual entry, validated as a positive integer
    pub sequence: Option<String>,
    pub step: Option<SequenceStep>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum KeypadRequest {
    Press { key: char },
    Delete,
    Clear,
}

/// GET /api/form - Current form state.
pub async fn get<A: PeripheralAdapter>(State(state): State<Arc<AppState<A>>>) -> Json<FormView> {
    let mut station = state.station.lock().await;
    let mode = station.coordinator.mode();
    Json(FormView::new(&station.form, mode))
}

/// POST /api/form - Edit product, size or sequence.
///
/// The update is validated as a whole before anything is applied.
pub async fn update<A: PeripheralAdapter>(
    State(state): State<Arc<AppState<A>>>,
    Json(update): Json<FormUpdate>,
) -> Result<Json<FormView>, ApiError> {
    let product = update
        .product
        .as_deref()
        .map(str::parse::<ProductCode>)
        .transpose()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e, None))?;
    let size = update
        .size
        .as_deref()
        .map(str::parse::<LabelSize>)
        .transpose()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e, None))?;

    let mut station = state.station.lock().await;
    let mut form = station.form.clone();
    if let Some(product) = product {
        form.product = product;
    }
    if let Some(size) = size {
        form.size = size;
    }
    if let Some(sequence) = &update.sequence {
        form.set_sequence(sequence).map_err(|e| {
            api_error(
                StatusCode::BAD_REQUEST,
                e,
                Some("Введіть коректний номер партії."),
            )
        })?;
    }
    match update.step {
        Some(SequenceStep::Increment) => form.increment(),
        Some(SequenceStep::Decrement) => form.decrement(),
        None => {}
    }

    station.form = form;
    let mode = station.coordinator.mode();
    Ok(Json(FormView::new(&station.form, mode)))
}

/// POST /api/form/keypad - Weight keypad input.
pub async fn keypad<A: PeripheralAdapter>(
    State(state): State<Arc<AppState<A>>>,
    Json(request): Json<KeypadRequest>,
) -> Result<Json<FormView>, ApiError> {
    let mut station = state.station.lock().await;
    match request {
        KeypadRequest::Press { key } => {
            if !key.is_ascii_digit() && key != '.' {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    format!("Unsupported key: {:?}", key),
                    None,
                ));
            }
            station.form.press_key(key);
        }
        KeypadRequest::Delete => station.form.delete_key(),
        KeypadRequest::Clear => station.form.set_weight(Default::default()),
    }
    let mode = station.coordinator.mode();
    Ok(Json(FormView::new(&station.form, mode)))
}
