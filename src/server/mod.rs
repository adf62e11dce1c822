//! # HTTP Server for Label Printing
//!
//! JSON API for the operator station: form editing, previews, printing and
//! the wireless printer session.
//!
//! ## Usage
//!
//! ```bash
//! etiketka serve --listen 0.0.0.0:8080
//! etiketka serve --simulate      # in-memory printer
//! ```
//!
//! ## Routes
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET | `/api/products` | Product catalog |
//! | GET, PUT | `/api/settings` | Persisted settings |
//! | GET, POST | `/api/form` | Form state / edit product, size, sequence |
//! | POST | `/api/form/keypad` | Weight keypad |
//! | GET | `/api/label/preview` | PNG preview |
//! | GET | `/api/label/zpl` | ZPL markup |
//! | POST | `/api/label/print` | Print via the coordinator |
//! | POST | `/api/printer/connect` | Open the BLE session |
//! | POST | `/api/printer/disconnect` | Close it |
//! | GET | `/api/printer/status` | Session state |

mod handlers;
mod state;

pub use state::{AppState, ServerConfig, Station};

use axum::{
    Router,
    routing::{get, post},
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::LabelError;
use crate::settings::Settings;
use crate::transport::PeripheralAdapter;

/// Build the API router over shared state.
pub fn router<A: PeripheralAdapter>(state: Arc<AppState<A>>) -> Router {
    Router::new()
        .route("/api/products", get(handlers::products))
        .route(
            "/api/settings",
            get(handlers::settings::get::<A>).put(handlers::settings::put::<A>),
        )
        .route(
            "/api/form",
            get(handlers::form::get::<A>).post(handlers::form::update::<A>),
        )
        .route("/api/form/keypad", post(handlers::form::keypad::<A>))
        .route("/api/label/preview", get(handlers::label::preview::<A>))
        .route("/api/label/zpl", get(handlers::label::zpl::<A>))
        .route("/api/label/print", post(handlers::label::print::<A>))
        .route("/api/printer/status", get(handlers::printer::status::<A>))
        .route("/api/printer/connect", post(handlers::printer::connect::<A>))
        .route(
            "/api/printer/disconnect",
            post(handlers::printer::disconnect::<A>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve<A: PeripheralAdapter>(
    config: ServerConfig,
    adapter: A,
    settings: Settings,
    settings_path: Option<PathBuf>,
) -> Result<(), LabelError> {
    let listen_addr = config.listen_addr.clone();
    let simulate = config.simulate;
    let state = Arc::new(AppState::new(config, adapter, settings, settings_path)?);
    let app = router(state);

    println!("Etiketka HTTP server starting...");
    println!("Listening on: {}", listen_addr);
    if simulate {
        println!("Printer: simulated");
    }
    println!();

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| LabelError::Server(format!("Failed to bind to {}: {}", listen_addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| LabelError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
