use crate::core::{AnalysisResult, DatasetRef, DragPayload, SUPPORTED_EXTENSIONS};
use crate::services::analysis_controller::AnalysisController;
use crate::services::result_store::ResultStore;
use crate::services::target_selector::TargetSelector;
use crate::services::tasks::{AnalyzeOutcome, AnalyzeRequest, ProbeOutcome, ProbeRequest};
use crate::services::upload_controller::UploadController;
use serde::Serialize;
use std::path::PathBuf;

/// What the single primary button currently does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimaryAction {
    /// No dataset yet: open the file prompt
    SelectFile,
    /// Dataset but no target; disabled
    SelectTarget,
    /// Ready to analyze
    Decompose,
    /// Analyze call running; disabled
    Analyzing,
}

impl PrimaryAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SelectFile => "select file",
            Self::SelectTarget => "select target",
            Self::Decompose => "decompose",
            Self::Analyzing => "Analyzing…",
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::SelectFile | Self::Decompose)
    }
}

/// Complete state of the upload view
///
/// Every change goes through one of the named transitions below, and the
/// whole record serializes for inspection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UploadPage {
    upload: UploadController,
    target: TargetSelector,
    analysis: AnalysisController,
}

impl UploadPage {
    pub fn dataset(&self) -> Option<&DatasetRef> {
        self.upload.dataset()
    }

    pub fn columns(&self) -> &[String] {
        self.upload.columns()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.selected()
    }

    pub fn target_cursor(&self) -> usize {
        self.target.cursor()
    }

    pub fn is_loading(&self) -> bool {
        self.analysis.is_loading()
    }

    pub fn is_probing(&self) -> bool {
        self.upload.is_probing()
    }

    pub fn is_receiving_file(&self) -> bool {
        self.upload.drop_zone().is_receiving()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.analysis.result()
    }

    /// The error to show; an analyze failure is newer than any probe failure
    pub fn error(&self) -> Option<&str> {
        self.analysis.error().or(self.upload.error())
    }

    pub fn primary_action(&self) -> PrimaryAction {
        if self.analysis.is_loading() {
            PrimaryAction::Analyzing
        } else if self.dataset().is_none() {
            PrimaryAction::SelectFile
        } else if self.target().is_none() {
            PrimaryAction::SelectTarget
        } else {
            PrimaryAction::Decompose
        }
    }

    /// `Selected: name (1.5 KB)`
    pub fn selected_label(&self) -> Option<String> {
        self.dataset()
            .map(|d| format!("Selected: {} ({})", d.file_name, d.size_label()))
    }

    /// Advisory note for files outside the expected types
    pub fn extension_hint(&self) -> Option<String> {
        let dataset = self.dataset()?;
        if dataset.has_supported_extension() {
            return None;
        }
        Some(format!(
            "Expected {}; the service will decide",
            SUPPORTED_EXTENSIONS
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    /// Take a new dataset: clears error, result, target and columns
    pub fn accept_file(&mut self, dataset: DatasetRef) -> ProbeRequest {
        self.target.clear();
        self.analysis.reset();
        self.upload.accept(dataset)
    }

    /// A chosen file could not be used
    pub fn reject_file(&mut self, message: impl Into<String>) {
        self.target.clear();
        self.analysis.reset();
        self.upload.reject(message);
    }

    pub fn apply_probe(&mut self, outcome: ProbeOutcome) {
        self.upload.apply_probe(outcome);
        self.target.retain_valid(self.upload.columns());
    }

    /// Returns whether the target changed
    pub fn set_target(&mut self, value: &str) -> bool {
        self.target.select(self.upload.columns(), value)
    }

    pub fn select_next_target(&mut self) {
        self.target.select_next(self.upload.columns());
    }

    pub fn select_prev_target(&mut self) {
        self.target.select_prev(self.upload.columns());
    }

    /// Start an analysis if the page is ready for one
    pub fn analyze(&mut self) -> Option<AnalyzeRequest> {
        let request = self
            .analysis
            .start(self.upload.dataset(), self.target.selected())?;
        self.upload.clear_error();
        Some(request)
    }

    /// Apply the analyze response; a returned result means "navigate to results"
    pub fn apply_analysis(
        &mut self,
        outcome: AnalyzeOutcome,
        store: &mut ResultStore,
    ) -> Option<AnalysisResult> {
        self.analysis.apply(outcome, self.upload.columns(), store)
    }

    pub fn drag_enter(&mut self, payload: &DragPayload) {
        self.upload.drag_enter(payload);
    }

    pub fn drag_over(&mut self, payload: &DragPayload) {
        self.upload.drag_over(payload);
    }

    pub fn drag_leave(&mut self, payload: &DragPayload) {
        self.upload.drag_leave(payload);
    }

    pub fn drop_payload(&mut self, payload: &DragPayload) -> Option<PathBuf> {
        self.upload.drop_payload(payload)
    }

    /// JSON snapshot of the whole page
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Contribution;
    use crate::services::api_client::ApiError;

    fn dataset(name: &str, size: u64) -> DatasetRef {
        DatasetRef::new(format!("/data/{name}"), size)
    }

    fn probe_ok(page: &mut UploadPage, req: &ProbeRequest, columns: &[&str]) {
        page.apply_probe(ProbeOutcome {
            id: req.id,
            dataset: req.dataset.clone(),
            result: Ok(columns.iter().map(|s| s.to_string()).collect()),
        });
    }

    #[test]
    fn test_primary_action_progression() {
        let mut page = UploadPage::default();
        assert_eq!(page.primary_action(), PrimaryAction::SelectFile);
        assert!(page.primary_action().is_enabled());

        let req = page.accept_file(dataset("a.csv", 1536));
        assert_eq!(page.primary_action(), PrimaryAction::SelectTarget);
        assert!(!page.primary_action().is_enabled());

        probe_ok(&mut page, &req, &["age", "churn"]);
        page.set_target("churn");
        assert_eq!(page.primary_action(), PrimaryAction::Decompose);
        assert_eq!(page.primary_action().label(), "decompose");

        page.analyze().unwrap();
        assert_eq!(page.primary_action(), PrimaryAction::Analyzing);
        assert_eq!(page.primary_action().label(), "Analyzing…");
        assert!(!page.primary_action().is_enabled());
    }

    #[test]
    fn test_selected_label() {
        let mut page = UploadPage::default();
        assert_eq!(page.selected_label(), None);
        page.accept_file(dataset("sales.csv", 1536));
        assert_eq!(page.selected_label().as_deref(), Some("Selected: sales.csv (1.5 KB)"));
    }

    #[test]
    fn test_extension_hint_is_advisory() {
        let mut page = UploadPage::default();
        let req = page.accept_file(dataset("notes.txt", 10));
        assert!(page.extension_hint().unwrap().contains(".csv"));
        // The probe still goes out
        assert_eq!(req.dataset.file_name, "notes.txt");

        page.accept_file(dataset("book.XLSX", 10));
        assert!(page.extension_hint().is_none());
    }

    #[test]
    fn test_accept_clears_target_and_result() {
        let mut page = UploadPage::default();
        let mut store = ResultStore::in_memory();
        let req = page.accept_file(dataset("a.csv", 10));
        probe_ok(&mut page, &req, &["age", "churn"]);
        page.set_target("churn");
        let analyze = page.analyze().unwrap();
        page.apply_analysis(
            AnalyzeOutcome {
                id: analyze.id,
                target: analyze.target,
                result: Ok(AnalysisResult::new("churn", 0.2, vec![Contribution::new("age", 0.2)])),
            },
            &mut store,
        );
        assert!(page.result().is_some());

        page.accept_file(dataset("b.csv", 10));
        assert!(page.result().is_none());
        assert!(page.target().is_none());
        assert!(page.columns().is_empty());
        assert!(page.error().is_none());
    }

    #[test]
    fn test_set_target_outside_columns_is_ignored() {
        let mut page = UploadPage::default();
        let req = page.accept_file(dataset("a.csv", 10));
        probe_ok(&mut page, &req, &["age", "churn"]);

        assert!(!page.set_target("zip"));
        assert!(page.target().is_none());
        assert!(page.analyze().is_none());
    }

    #[test]
    fn test_stale_probe_drops_missing_target() {
        let mut page = UploadPage::default();
        let older = page.accept_file(dataset("old.csv", 10));
        let newer = page.accept_file(dataset("new.csv", 10));

        probe_ok(&mut page, &newer, &["n1", "n2"]);
        page.set_target("n2");

        probe_ok(&mut page, &older, &["o1", "o2"]);
        assert_eq!(page.dataset().unwrap().file_name, "old.csv");
        assert_eq!(page.columns(), &["o1", "o2"]);
        assert!(page.target().is_none());
    }

    #[test]
    fn test_analyze_failure_keeps_page() {
        let mut page = UploadPage::default();
        let mut store = ResultStore::in_memory();
        let req = page.accept_file(dataset("a.csv", 10));
        probe_ok(&mut page, &req, &["age", "churn"]);
        page.set_target("churn");

        let analyze = page.analyze().unwrap();
        let navigate = page.apply_analysis(
            AnalyzeOutcome {
                id: analyze.id,
                target: analyze.target,
                result: Err(ApiError::Service {
                    status: 500,
                    message: None,
                }),
            },
            &mut store,
        );

        assert!(navigate.is_none());
        assert!(!page.is_loading());
        assert_eq!(page.error(), Some("Failed to analyze"));
        assert_eq!(page.target(), Some("churn"));
        assert_eq!(page.primary_action(), PrimaryAction::Decompose);
    }

    #[test]
    fn test_snapshot_is_complete() {
        let mut page = UploadPage::default();
        page.accept_file(dataset("a.csv", 10));
        let snap = page.snapshot();

        assert_eq!(snap["upload"]["dataset"]["file_name"], "a.csv");
        assert_eq!(snap["analysis"]["loading"], false);
        assert_eq!(snap["upload"]["drop_zone"]["receiving"], false);
        assert!(snap["target"]["selected"].is_null());
    }
}
