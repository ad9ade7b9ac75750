use crate::core::{AnalysisResult, View};
use tracing::debug;

/// Which view is showing, plus the one-shot hand-off for the results view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Navigator {
    view: View,
    handoff: Option<AnalysisResult>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Go to the results view, optionally carrying a fresh result
    pub fn to_results(&mut self, handoff: Option<AnalysisResult>) {
        debug!(
            "Navigating to results (hand-off: {})",
            handoff.as_ref().map(|r| r.target.as_str()).unwrap_or("none")
        );
        self.view = View::Results;
        self.handoff = handoff;
    }

    pub fn to_upload(&mut self) {
        debug!("Navigating to upload");
        self.view = View::Upload;
        self.handoff = None;
    }

    /// The hand-off is consumed by the first mount that asks for it
    pub fn take_handoff(&mut self) -> Option<AnalysisResult> {
        self.handoff.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Contribution;

    fn result() -> AnalysisResult {
        AnalysisResult::new("churn", 0.4, vec![Contribution::new("age", 0.4)])
    }

    #[test]
    fn test_starts_on_upload() {
        let nav = Navigator::new();
        assert_eq!(nav.view(), View::Upload);
    }

    #[test]
    fn test_handoff_is_taken_once() {
        let mut nav = Navigator::new();
        nav.to_results(Some(result()));
        assert_eq!(nav.view(), View::Results);
        assert_eq!(nav.take_handoff(), Some(result()));
        assert_eq!(nav.take_handoff(), None);
    }

    #[test]
    fn test_back_drops_pending_handoff() {
        let mut nav = Navigator::new();
        nav.to_results(Some(result()));
        nav.to_upload();
        assert_eq!(nav.view(), View::Upload);
        assert_eq!(nav.take_handoff(), None);
    }
}
