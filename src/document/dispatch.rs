//! Hand-off of finished label documents to the platform.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;

use crate::error::LabelError;

/// How a generated PDF reaches paper.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum PrintDispatch {
    /// Submit to the system spooler with `lp`
    SystemPrint {
        /// Destination queue; the default printer when absent
        #[serde(default)]
        printer: Option<String>,
    },
    /// Open in the platform viewer so the operator prints manually
    #[default]
    OpenViewer,
    /// Only write the file
    SaveOnly,
}

impl PrintDispatch {
    /// Submit the document at `path`.
    pub async fn submit(&self, path: &Path) -> Result<(), LabelError> {
        match self {
            PrintDispatch::SystemPrint { printer } => {
                let mut command = Command::new("lp");
                if let Some(printer) = printer {
                    command.arg("-d").arg(printer);
                }
                command.arg(path);

                let output = command
                    .output()
                    .await
                    .map_err(|e| LabelError::Dispatch(format!("Failed to run lp: {}", e)))?;

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(LabelError::Dispatch(format!(
                        "lp exited with {}: {}",
                        output.status,
                        stderr.trim()
                    )));
                }
                tracing::info!(
                    path = %path.display(),
                    job = %String::from_utf8_lossy(&output.stdout).trim(),
                    "submitted to print spooler"
                );
                Ok(())
            }
            PrintDispatch::OpenViewer => {
                open::that(path).map_err(|e| {
                    LabelError::Dispatch(format!("Failed to open {}: {}", path.display(), e))
                })?;
                tracing::info!(path = %path.display(), "opened in viewer");
                Ok(())
            }
            PrintDispatch::SaveOnly => {
                tracing::info!(path = %path.display(), "saved");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_only_is_noop() {
        let result = PrintDispatch::SaveOnly
            .submit(Path::new("/nonexistent/label.pdf"))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_settings_form() {
        let json = serde_json::to_string(&PrintDispatch::SystemPrint {
            printer: Some("zebra".to_string()),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"system-print","printer":"zebra"}"#);

        let parsed: PrintDispatch = serde_json::from_str(r#"{"kind":"save-only"}"#).unwrap();
        assert_eq!(parsed, PrintDispatch::SaveOnly);
    }
}
