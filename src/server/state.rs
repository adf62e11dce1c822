//! Server state and configuration.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::coordinator::OutputCoordinator;
use crate::document::DocumentOutput;
use crate::error::LabelError;
use crate::label::LabelForm;
use crate::settings::Settings;
use crate::transport::{PeripheralAdapter, PeripheralSession};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Use the in-memory printer instead of Bluetooth
    pub simulate: bool,
}

/// Operator form plus the coordinator that prints it.
///
/// Kept behind one lock so a print and a form edit never interleave.
pub struct Station<A: PeripheralAdapter> {
    pub form: LabelForm,
    pub coordinator: OutputCoordinator<A>,
}

/// Application state shared across handlers.
pub struct AppState<A: PeripheralAdapter> {
    pub config: ServerConfig,
    pub session: Arc<PeripheralSession<A>>,
    pub station: Mutex<Station<A>>,
    pub settings: RwLock<Settings>,
    /// Where settings are persisted; `None` keeps them in memory
    pub settings_path: Option<PathBuf>,
}

impl<A: PeripheralAdapter> AppState<A> {
    pub fn new(
        config: ServerConfig,
        adapter: A,
        settings: Settings,
        settings_path: Option<PathBuf>,
    ) -> Result<Self, LabelError> {
        let session = Arc::new(PeripheralSession::with_config(
            adapter,
            settings.session_config(),
        ));
        let document = DocumentOutput::from_settings(&settings)?;
        let coordinator =
            OutputCoordinator::new(Arc::clone(&session), document).with_mode(settings.print_mode);

        let mut form = LabelForm::today().with_sequence(settings.next_sequence());
        form.size = settings.label_size;

        Ok(Self {
            config,
            session,
            station: Mutex::new(Station { form, coordinator }),
            settings: RwLock::new(settings),
            settings_path,
        })
    }

    /// Persist the current settings if a path is configured.
    pub async fn save_settings(&self) -> Result<(), LabelError> {
        if let Some(path) = &self.settings_path {
            self.settings.read().await.save(path)?;
        }
        Ok(())
    }
}
