//! # Output Coordinator
//!
//! Routes a print request to one of the two output paths and advances the
//! operator form only when the label actually left the building.
//!
//! ## Routing
//!
//! | Mode | Session | Action |
//! |------|---------|--------|
//! | Document | any | rasterize → PDF → dispatch |
//! | DirectMarkup | connected | encode ZPL → chunked BLE writes |
//! | DirectMarkup | not connected | encode ZPL → ask to save `label-{article}.zpl` |
//!
//! A [`SessionEvent::Connected`] observed before an operation switches the
//! mode to DirectMarkup. Nothing switches it back automatically.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::document::DocumentOutput;
use crate::error::OutputError;
use crate::label::LabelForm;
use crate::protocol::markup;
use crate::transport::{PeripheralAdapter, PeripheralSession, SessionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrintMode {
    /// Rasterized PDF through the platform print pipeline
    #[default]
    Document,
    /// ZPL straight to a wireless printer
    DirectMarkup,
}

impl std::fmt::Display for PrintMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrintMode::Document => write!(f, "document"),
            PrintMode::DirectMarkup => write!(f, "direct-markup"),
        }
    }
}

impl std::str::FromStr for PrintMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "document" | "pdf" => Ok(PrintMode::Document),
            "direct-markup" | "direct" | "zpl" => Ok(PrintMode::DirectMarkup),
            _ => Err(format!("Unknown print mode: {}", s)),
        }
    }
}

/// What happened to a print request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PrintOutcome {
    /// PDF written and dispatched
    Printed { path: PathBuf },
    /// ZPL sent to the connected printer
    Transmitted { bytes: usize, chunks: usize },
    /// ZPL saved for manual transfer
    Downloaded { path: PathBuf },
    /// Operator refused the download; nothing changed
    Declined,
}

/// Operator confirmation for saving markup when no printer is connected.
pub trait DownloadPrompt {
    fn confirm_download(&mut self, file_name: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> DownloadPrompt for F {
    fn confirm_download(&mut self, file_name: &str) -> bool {
        self(file_name)
    }
}

pub struct OutputCoordinator<A: PeripheralAdapter> {
    session: Arc<PeripheralSession<A>>,
    events: broadcast::Receiver<SessionEvent>,
    document: DocumentOutput,
    artifact_dir: PathBuf,
    mode: PrintMode,
}

impl<A: PeripheralAdapter> OutputCoordinator<A> {
    /// Markup downloads go to the document output directory.
    pub fn new(session: Arc<PeripheralSession<A>>, document: DocumentOutput) -> Self {
        let events = session.subscribe();
        let artifact_dir = document.output_dir().to_path_buf();
        Self {
            session,
            events,
            document,
            artifact_dir,
            mode: PrintMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: PrintMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    pub fn session(&self) -> &Arc<PeripheralSession<A>> {
        &self.session
    }

    pub fn document(&self) -> &DocumentOutput {
        &self.document
    }

    /// Current mode, after applying pending session events.
    pub fn mode(&mut self) -> PrintMode {
        self.sync_events();
        self.mode
    }

    pub fn set_mode(&mut self, mode: PrintMode) {
        self.sync_events();
        self.mode = mode;
    }

    /// Apply queued session events.
    fn sync_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(SessionEvent::Connected { device_name }) => {
                    if self.mode != PrintMode::DirectMarkup {
                        tracing::info!(
                            device = %device_name,
                            "printer connected, switching to direct markup"
                        );
                    }
                    self.mode = PrintMode::DirectMarkup;
                }
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "session events lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    /// Print the form's current snapshot.
    ///
    /// On success the form advances (next sequence, empty weight). On error
    /// or a declined download it is left as it was.
    pub async fn print(
        &mut self,
        form: &mut LabelForm,
        prompt: &mut (dyn DownloadPrompt + Send),
    ) -> Result<PrintOutcome, OutputError> {
        self.sync_events();
        let data = form.snapshot();
        tracing::debug!(article = %data.article(), mode = %self.mode, "print requested");

        let outcome = match self.mode {
            PrintMode::Document => {
                let path = self
                    .document
                    .print(&data)
                    .await
                    .map_err(OutputError::Document)?;
                PrintOutcome::Printed { path }
            }
            PrintMode::DirectMarkup => {
                let zpl = markup::encode(&data);
                if self.session.is_connected().await {
                    let chunks = self
                        .session
                        .print(&zpl)
                        .await
                        .map_err(OutputError::Transport)?;
                    PrintOutcome::Transmitted {
                        bytes: zpl.len(),
                        chunks,
                    }
                } else {
                    let name = markup::artifact_name(&data);
                    if !prompt.confirm_download(&name) {
                        tracing::info!(file = %name, "markup download declined");
                        return Ok(PrintOutcome::Declined);
                    }
                    let path = self.artifact_dir.join(&name);
                    tokio::fs::create_dir_all(&self.artifact_dir)
                        .await
                        .map_err(OutputError::Artifact)?;
                    tokio::fs::write(&path, zpl.as_bytes())
                        .await
                        .map_err(OutputError::Artifact)?;
                    PrintOutcome::Downloaded { path }
                }
            }
        };

        tracing::info!(?outcome, "label printed");
        form.advance();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("document".parse::<PrintMode>().unwrap(), PrintMode::Document);
        assert_eq!("ZPL".parse::<PrintMode>().unwrap(), PrintMode::DirectMarkup);
        assert!("fax".parse::<PrintMode>().is_err());
        assert_eq!(PrintMode::DirectMarkup.to_string(), "direct-markup");
    }

    #[test]
    fn test_closure_prompt() {
        let mut asked = Vec::new();
        let mut prompt = |name: &str| {
            asked.push(name.to_string());
            true
        };
        assert!(prompt.confirm_download("label-LF-20231025-001.zpl"));
        assert_eq!(asked, vec!["label-LF-20231025-001.zpl"]);
    }
}
