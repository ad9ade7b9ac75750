use crate::core::{DatasetRef, DragPayload, DropZone, RequestId};
use crate::services::api_client::PROBE_FALLBACK_MESSAGE;
use crate::services::tasks::{ProbeOutcome, ProbeRequest};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Dataset selection and the column list probed from it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UploadController {
    dataset: Option<DatasetRef>,
    columns: Vec<String>,
    error: Option<String>,
    drop_zone: DropZone,
    probing: Option<RequestId>,
}

impl UploadController {
    pub fn dataset(&self) -> Option<&DatasetRef> {
        self.dataset.as_ref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn drop_zone(&self) -> &DropZone {
        &self.drop_zone
    }

    /// Whether the most recently issued probe has not answered yet
    pub fn is_probing(&self) -> bool {
        self.probing.is_some()
    }

    /// Take `dataset` as the current file and build the probe to issue for it
    pub fn accept(&mut self, dataset: DatasetRef) -> ProbeRequest {
        debug!("Accepted {} ({} bytes)", dataset.file_name, dataset.size);
        if !dataset.has_supported_extension() {
            debug!("{} has an unexpected extension; sending anyway", dataset.file_name);
        }
        let request = ProbeRequest::new(dataset.clone());
        self.dataset = Some(dataset);
        self.columns.clear();
        self.error = None;
        self.probing = Some(request.id);
        request
    }

    /// Report a file that could not be used without contacting the service
    pub fn reject(&mut self, message: impl Into<String>) {
        self.dataset = None;
        self.columns.clear();
        self.error = Some(message.into());
        self.probing = None;
    }

    /// Apply a probe response in full
    ///
    /// The dataset, column list and error are replaced together from the
    /// outcome, so a late response for an older file never leaves columns
    /// paired with the wrong dataset.
    pub fn apply_probe(&mut self, outcome: ProbeOutcome) {
        if self.probing == Some(outcome.id) {
            self.probing = None;
        } else {
            debug!("Applying probe {} that is not the latest issued", outcome.id);
        }

        self.dataset = Some(outcome.dataset);
        match outcome.result {
            Ok(columns) => {
                self.columns = dedupe(columns);
                self.error = None;
            }
            Err(e) => {
                warn!("Column probe failed: {e}");
                self.columns.clear();
                self.error = Some(e.user_message(PROBE_FALLBACK_MESSAGE));
            }
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn drag_enter(&mut self, payload: &DragPayload) {
        self.drop_zone.enter(payload);
    }

    pub fn drag_over(&mut self, payload: &DragPayload) {
        self.drop_zone.over(payload);
    }

    pub fn drag_leave(&mut self, payload: &DragPayload) {
        self.drop_zone.leave(payload);
    }

    /// Finish a drop, returning the file to accept if the payload carried one
    pub fn drop_payload(&mut self, payload: &DragPayload) -> Option<PathBuf> {
        self.drop_zone.drop_payload(payload)
    }
}

/// Drop repeated column names, keeping the first occurrence
fn dedupe(columns: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let total = columns.len();
    let out: Vec<String> = columns
        .into_iter()
        .filter(|c| seen.insert(c.clone()))
        .collect();
    if out.len() != total {
        warn!("Dropped {} duplicate column name(s)", total - out.len());
    }
    out
}
