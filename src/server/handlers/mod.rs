//! HTTP handlers for the server.

pub mod form;
pub mod label;
pub mod printer;
pub mod settings;

use axum::{Json, http::StatusCode};
use serde::Serialize;

use crate::label::ProductCode;

/// JSON error body: `{"success": false, "error": ..., "message": ...}`.
pub type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    /// Operator-facing text, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

pub fn api_error(
    status: StatusCode,
    error: impl ToString,
    message: Option<&'static str>,
) -> ApiError {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: error.to_string(),
            message,
        }),
    )
}

#[derive(Debug, Serialize)]
pub struct ProductInfo {
    pub code: &'static str,
    pub name: &'static str,
}

/// GET /api/products - The product catalog.
pub async fn products() -> Json<Vec<ProductInfo>> {
    Json(
        ProductCode::ALL
            .iter()
            .map(|p| ProductInfo {
                code: p.code(),
                name: p.display_name(),
            })
            .collect(),
    )
}
