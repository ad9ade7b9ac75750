use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use shapmi::core::{Contribution, DatasetRef, FiveNumSummary, FiveNumTable};
use shapmi::services::{
    AnalysisService, ApiError, FileSessionStorage, ResultSource, ResultStore, ServiceEvent,
};
use shapmi::{AnalysisResult, App, View};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};
use tokio::sync::mpsc::{self, UnboundedReceiver};

struct StubService;

impl AnalysisService for StubService {
    async fn probe_columns(&self, dataset: &DatasetRef) -> Result<Vec<String>, ApiError> {
        let header = std::fs::read_to_string(&dataset.path)?;
        Ok(header
            .lines()
            .next()
            .unwrap_or_default()
            .split(',')
            .map(str::to_string)
            .collect())
    }

    async fn analyze(&self, _dataset: &DatasetRef, target: &str) -> Result<AnalysisResult, ApiError> {
        let mut result = AnalysisResult::new(
            target,
            0.6,
            vec![Contribution::new("region", 0.2), Contribution::new("tenure", 0.4)],
        );
        result.entropy = 0.9;
        result.entropy_max = 1.0;
        result.entropy_pct = 66.7;
        result.five_num = FiveNumTable::from_iter([(
            "tenure".to_string(),
            FiveNumSummary::numeric(1.0, 6.0, 12.0, 24.0, 60.0, 0),
        )]);
        Ok(result)
    }

    async fn health(&self) -> Result<String, ApiError> {
        Ok("ok".to_string())
    }
}

fn dataset() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "region,tenure,churn").unwrap();
    writeln!(file, "north,12,1").unwrap();
    file
}

fn app_in(session_dir: &Path) -> (App<StubService>, UnboundedReceiver<ServiceEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let store = ResultStore::new(FileSessionStorage::new(session_dir));
    (App::new(Arc::new(StubService), store, tx), rx)
}

fn press(app: &mut App<StubService>, code: KeyCode) {
    app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
        .unwrap();
}

async fn next_event(app: &mut App<StubService>, rx: &mut UnboundedReceiver<ServiceEvent>) {
    let event = rx.recv().await.unwrap();
    app.handle_service_event(event);
}

#[tokio::test]
async fn test_upload_analyze_and_reload_in_new_process() {
    let session = TempDir::new().unwrap();
    let file = dataset();

    let (mut app, mut rx) = app_in(session.path());
    app.open_path(file.path());
    next_event(&mut app, &mut rx).await;
    assert_eq!(app.upload_page().columns(), &["region", "tenure", "churn"]);

    // First press selects the first column
    for _ in 0..3 {
        press(&mut app, KeyCode::Down);
    }
    assert_eq!(app.upload_page().target(), Some("churn"));
    press(&mut app, KeyCode::Enter);
    next_event(&mut app, &mut rx).await;

    assert_eq!(app.view(), View::Results);
    let page = app.results_page().unwrap();
    assert_eq!(page.source(), Some(ResultSource::Handoff));
    assert_eq!(
        page.header().unwrap(),
        "Target: churn · Total MI: 0.600 · Entropy: 0.900 bits"
    );

    // A fresh app on the same session directory recovers the last result
    let (mut reloaded, _rx) = app_in(session.path());
    reloaded.show_results(None);
    let page = reloaded.results_page().unwrap();
    assert_eq!(page.source(), Some(ResultSource::Session));
    assert_eq!(page.result().unwrap().target, "churn");
    assert_eq!(page.five_num_rows().len(), 1);
}

#[tokio::test]
async fn test_results_without_any_analysis_show_placeholder() {
    let session = TempDir::new().unwrap();
    let (mut app, _rx) = app_in(session.path());
    app.show_results(None);
    assert_eq!(app.view(), View::Results);
    assert!(app.results_page().unwrap().result().is_none());

    press(&mut app, KeyCode::Char('b'));
    assert_eq!(app.view(), View::Upload);
}

#[tokio::test]
async fn test_back_from_results_keeps_selection() {
    let session = TempDir::new().unwrap();
    let file = dataset();
    let (mut app, mut rx) = app_in(session.path());

    app.handle_event(Event::Paste(file.path().display().to_string()))
        .unwrap();
    app.update().unwrap();
    next_event(&mut app, &mut rx).await;
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    next_event(&mut app, &mut rx).await;
    assert_eq!(app.view(), View::Results);

    press(&mut app, KeyCode::Char('b'));
    assert_eq!(app.view(), View::Upload);
    assert_eq!(app.upload_page().target(), Some("region"));
    assert!(app.upload_page().dataset().is_some());
    assert!(!app.upload_page().is_loading());
}
