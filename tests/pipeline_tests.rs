//! # Pipeline Tests
//!
//! End-to-end print requests through the output coordinator, with the
//! scripted BLE adapter standing in for the printer and `SaveOnly` dispatch
//! standing in for the platform print dialog.

use chrono::NaiveDate;
use etiketka::coordinator::{OutputCoordinator, PrintMode, PrintOutcome};
use etiketka::document::{DocumentOutput, PrintDispatch};
use etiketka::error::{OutputError, SessionError};
use etiketka::label::{LabelForm, ProductCode};
use etiketka::protocol::markup;
use etiketka::render::{LabelFont, RasterConfig};
use etiketka::transport::mock::MockAdapter;
use etiketka::transport::{PeripheralSession, SessionState};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;

struct TempDir(PathBuf);

impl TempDir {
    fn new() -> Self {
        Self(std::env::temp_dir().join(format!("etiketka-pipeline-{}", uuid::Uuid::new_v4())))
    }

    fn path(&self) -> &PathBuf {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.0).ok();
    }
}

fn form(weight: &str) -> LabelForm {
    let mut form = LabelForm::new(NaiveDate::from_ymd_opt(2023, 10, 25).unwrap());
    form.product = ProductCode::LF;
    for key in weight.chars() {
        form.press_key(key);
    }
    form
}

fn document(dir: &TempDir) -> DocumentOutput {
    DocumentOutput::new(LabelFont::Builtin, PrintDispatch::SaveOnly, dir.path())
        .with_raster(RasterConfig { px_per_mm: 6.0 })
}

fn coordinator(mock: &MockAdapter, dir: &TempDir) -> OutputCoordinator<MockAdapter> {
    let session = Arc::new(PeripheralSession::new(mock.clone()));
    OutputCoordinator::new(session, document(dir))
}

fn never(_: &str) -> bool {
    panic!("download prompt must not be shown")
}

#[tokio::test]
async fn test_document_mode_prints_pdf_and_advances() {
    let dir = TempDir::new();
    let mock = MockAdapter::new().with_printer("ZD421");
    let mut coordinator = coordinator(&mock, &dir);
    let mut form = form("15.5");

    let outcome = coordinator.print(&mut form, &mut never).await.unwrap();

    let expected = dir.path().join("label-LF-20231025-001.pdf");
    assert_eq!(outcome, PrintOutcome::Printed { path: expected.clone() });
    assert!(std::fs::read(&expected).unwrap().starts_with(b"%PDF"));
    assert_eq!(form.sequence(), 2);
    assert!(form.weight().is_empty());
    assert!(mock.writes().is_empty());
}

#[tokio::test]
async fn test_document_failure_leaves_form() {
    let dir = TempDir::new();
    // A file where the output directory should be
    std::fs::write(dir.path(), b"").unwrap();
    let blocked = DocumentOutput::new(
        LabelFont::Builtin,
        PrintDispatch::SaveOnly,
        dir.path().join("labels"),
    )
    .with_raster(RasterConfig { px_per_mm: 6.0 });
    let session = Arc::new(PeripheralSession::new(MockAdapter::new()));
    let mut coordinator = OutputCoordinator::new(session, blocked);
    let mut form = form("15.5");
    let before = form.clone();

    let err = coordinator.print(&mut form, &mut never).await.unwrap_err();
    assert!(matches!(err, OutputError::Document(_)));
    assert_eq!(err.operator_message(), "Помилка при створенні PDF файлу.");
    assert_eq!(form, before);

    std::fs::remove_file(dir.path()).ok();
}

#[tokio::test]
async fn test_connect_switches_to_direct_markup() {
    let dir = TempDir::new();
    let mock = MockAdapter::new().with_printer("ZD421");
    let mut coordinator = coordinator(&mock, &dir);
    assert_eq!(coordinator.mode(), PrintMode::Document);

    coordinator.session().connect(None).await.unwrap();
    let mut form = form("15.5");
    let expected = markup::encode(&form.snapshot());

    let outcome = coordinator.print(&mut form, &mut never).await.unwrap();

    assert_eq!(coordinator.mode(), PrintMode::DirectMarkup);
    assert_eq!(
        outcome,
        PrintOutcome::Transmitted {
            bytes: expected.len(),
            chunks: 1,
        }
    );
    assert_eq!(String::from_utf8(mock.written_bytes()).unwrap(), expected);
    assert_eq!(form.sequence(), 2);
    // No PDF on the direct path
    assert!(!dir.path().join("label-LF-20231025-001.pdf").exists());
}

#[tokio::test]
async fn test_large_payload_is_chunked() {
    let dir = TempDir::new();
    let mock = MockAdapter::new().with_printer("ZD421");
    let mut coordinator = coordinator(&mock, &dir);
    coordinator.session().connect(None).await.unwrap();

    let mut form = form("99.99");
    form.size = etiketka::LabelSize::Large;
    let expected = markup::encode(&form.snapshot());

    let outcome = coordinator.print(&mut form, &mut never).await.unwrap();
    let PrintOutcome::Transmitted { bytes, chunks } = outcome else {
        panic!("expected transmission, got {:?}", outcome);
    };
    assert_eq!(bytes, expected.len());
    assert_eq!(chunks, expected.len().div_ceil(512));
    assert!(mock.writes().iter().all(|w| w.len() <= 512));
    assert_eq!(mock.written_bytes(), expected.as_bytes());
}

#[tokio::test]
async fn test_write_failure_keeps_form_and_connection() {
    let dir = TempDir::new();
    let mock = MockAdapter::new().with_printer("ZD421").fail_write_at(0);
    let mut coordinator = coordinator(&mock, &dir);
    coordinator.session().connect(None).await.unwrap();
    let mut form = form("15.5");
    let before = form.clone();

    let err = coordinator.print(&mut form, &mut never).await.unwrap_err();

    assert!(matches!(
        err,
        OutputError::Transport(SessionError::Write { chunk: 0, .. })
    ));
    assert_eq!(form, before);
    assert_eq!(coordinator.session().state(), SessionState::Connected);
    assert_eq!(coordinator.mode(), PrintMode::DirectMarkup);
}

#[tokio::test]
async fn test_direct_mode_without_printer_declined() {
    let dir = TempDir::new();
    let mock = MockAdapter::new();
    let mut coordinator = coordinator(&mock, &dir).with_mode(PrintMode::DirectMarkup);
    let mut form = form("15.5");
    let before = form.clone();

    let mut asked = Vec::new();
    let mut decline = |name: &str| {
        asked.push(name.to_string());
        false
    };
    let outcome = coordinator.print(&mut form, &mut decline).await.unwrap();

    assert_eq!(outcome, PrintOutcome::Declined);
    assert_eq!(asked, vec!["label-LF-20231025-001.zpl".to_string()]);
    assert_eq!(form, before);
    assert!(!dir.path().exists());
}

#[tokio::test]
async fn test_direct_mode_without_printer_downloads() {
    let dir = TempDir::new();
    let mock = MockAdapter::new();
    let mut coordinator = coordinator(&mock, &dir).with_mode(PrintMode::DirectMarkup);
    let mut form = form("15.5");
    let expected = markup::encode(&form.snapshot());

    let outcome = coordinator
        .print(&mut form, &mut |_: &str| true)
        .await
        .unwrap();

    let path = dir.path().join("label-LF-20231025-001.zpl");
    assert_eq!(outcome, PrintOutcome::Downloaded { path: path.clone() });
    assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
    assert_eq!(form.sequence(), 2);
    assert!(mock.writes().is_empty());
}

#[tokio::test]
async fn test_disconnect_does_not_switch_back() {
    let dir = TempDir::new();
    let mock = MockAdapter::new().with_printer("ZD421");
    let mut coordinator = coordinator(&mock, &dir);

    coordinator.session().connect(None).await.unwrap();
    assert_eq!(coordinator.mode(), PrintMode::DirectMarkup);
    coordinator.session().disconnect().await;
    assert_eq!(coordinator.mode(), PrintMode::DirectMarkup);

    // Not connected any more: the download prompt takes over
    let mut form = form("1");
    let outcome = coordinator
        .print(&mut form, &mut |_: &str| false)
        .await
        .unwrap();
    assert_eq!(outcome, PrintOutcome::Declined);
}

#[tokio::test]
async fn test_failed_connect_keeps_document_mode() {
    let dir = TempDir::new();
    let mock = MockAdapter::new();
    let mut coordinator = coordinator(&mock, &dir);

    assert_eq!(
        coordinator.session().connect(None).await,
        Err(SessionError::NoDevice)
    );
    assert_eq!(coordinator.mode(), PrintMode::Document);
}

#[tokio::test]
async fn test_consecutive_prints_number_sequentially() {
    let dir = TempDir::new();
    let mock = MockAdapter::new().with_printer("ZD421");
    let mut coordinator = coordinator(&mock, &dir);
    coordinator.session().connect(None).await.unwrap();

    let mut form = form("2");
    for expected in 1..=3u32 {
        assert_eq!(form.sequence(), expected);
        form.press_key('5');
        coordinator.print(&mut form, &mut never).await.unwrap();
    }
    assert_eq!(form.sequence(), 4);
    let sent = String::from_utf8(mock.written_bytes()).unwrap();
    for n in ["001", "002", "003"] {
        assert!(sent.contains(&format!("-LF-{}-", n)), "missing batch {}", n);
    }
}
