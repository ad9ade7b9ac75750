use crate::core::{AnalysisResult, DatasetRef, RequestId};
use crate::services::api_client::ANALYZE_FALLBACK_MESSAGE;
use crate::services::result_store::ResultStore;
use crate::services::tasks::{AnalyzeOutcome, AnalyzeRequest};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Analyze call lifecycle: loading flag, error and last result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisController {
    loading: bool,
    error: Option<String>,
    result: Option<AnalysisResult>,
    pending: Option<RequestId>,
}

impl AnalysisController {
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Begin an analysis. Nothing happens without a dataset and a non-empty
    /// target, or while a previous call is still running.
    pub fn start(
        &mut self,
        dataset: Option<&DatasetRef>,
        target: Option<&str>,
    ) -> Option<AnalyzeRequest> {
        if self.loading {
            debug!("Analyze ignored: already loading");
            return None;
        }
        let dataset = dataset?;
        let target = target.filter(|t| !t.is_empty())?;

        let request = AnalyzeRequest::new(dataset.clone(), target);
        self.loading = true;
        self.error = None;
        self.result = None;
        self.pending = Some(request.id);
        debug!("Analyze {} for target '{}'", request.id, target);
        Some(request)
    }

    /// Apply the analyze response
    ///
    /// On success the result is persisted through `store` and returned so the
    /// caller can navigate with it. On failure the error is set and `None`
    /// returned. The loading flag is cleared either way.
    pub fn apply(
        &mut self,
        outcome: AnalyzeOutcome,
        columns: &[String],
        store: &mut ResultStore,
    ) -> Option<AnalysisResult> {
        if self.pending != Some(outcome.id) {
            debug!("Applying analyze response {} that is not the latest issued", outcome.id);
        }
        self.pending = None;
        self.loading = false;

        match outcome.result {
            Ok(result) => {
                if let Err(e) = result.validate() {
                    warn!("Analysis result for '{}' is inconsistent: {e}", outcome.target);
                }
                if !columns.is_empty()
                    && let Err(e) = result.check_features(columns)
                {
                    warn!("Analysis result does not match the probed columns: {e}");
                }
                info!(
                    "Analysis of '{}' done: total MI {:.3}",
                    result.target, result.total_mi
                );
                store.set(&result);
                self.result = Some(result.clone());
                Some(result)
            }
            Err(e) => {
                warn!("Analysis of '{}' failed: {e}", outcome.target);
                self.error = Some(e.user_message(ANALYZE_FALLBACK_MESSAGE));
                None
            }
        }
    }

    /// Forget the previous error and result; a running call keeps its loading flag
    pub fn reset(&mut self) {
        self.error = None;
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Contribution;
    use crate::services::api_client::ApiError;
    use crate::services::result_store::ResultSource;

    fn dataset() -> DatasetRef {
        DatasetRef::new("/data/a.csv", 100)
    }

    fn result(target: &str) -> AnalysisResult {
        AnalysisResult::new(target, 0.4, vec![Contribution::new("age", 0.4)])
    }

    #[test]
    fn test_start_requires_dataset_and_target() {
        let mut analysis = AnalysisController::default();
        assert!(analysis.start(None, Some("churn")).is_none());
        assert!(analysis.start(Some(&dataset()), None).is_none());
        assert!(analysis.start(Some(&dataset()), Some("")).is_none());
        assert!(!analysis.is_loading());

        let req = analysis.start(Some(&dataset()), Some("churn")).unwrap();
        assert_eq!(req.target, "churn");
        assert!(analysis.is_loading());
    }

    #[test]
    fn test_start_while_loading_is_noop() {
        let mut analysis = AnalysisController::default();
        analysis.start(Some(&dataset()), Some("churn")).unwrap();
        assert!(analysis.start(Some(&dataset()), Some("churn")).is_none());
    }

    #[test]
    fn test_success_persists_and_returns_result() {
        let mut analysis = AnalysisController::default();
        let mut store = ResultStore::in_memory();
        let req = analysis.start(Some(&dataset()), Some("churn")).unwrap();

        let returned = analysis.apply(
            AnalyzeOutcome {
                id: req.id,
                target: req.target.clone(),
                result: Ok(result("churn")),
            },
            &["age".to_string(), "churn".to_string()],
            &mut store,
        );

        assert_eq!(returned.unwrap().target, "churn");
        assert!(!analysis.is_loading());
        assert!(analysis.error().is_none());
        let resolved = store.get(None).unwrap();
        assert_eq!(resolved.source, ResultSource::Session);
        assert_eq!(resolved.result.target, "churn");
    }

    #[test]
    fn test_failure_sets_error_and_clears_loading() {
        let mut analysis = AnalysisController::default();
        let mut store = ResultStore::in_memory();
        let req = analysis.start(Some(&dataset()), Some("churn")).unwrap();

        let returned = analysis.apply(
            AnalyzeOutcome {
                id: req.id,
                target: req.target.clone(),
                result: Err(ApiError::Service {
                    status: 422,
                    message: Some("Target column not found".to_string()),
                }),
            },
            &[],
            &mut store,
        );

        assert!(returned.is_none());
        assert!(!analysis.is_loading());
        assert_eq!(analysis.error(), Some("Target column not found"));
        assert!(store.get(None).is_none());
    }

    #[test]
    fn test_failure_without_message_uses_fallback() {
        let mut analysis = AnalysisController::default();
        let mut store = ResultStore::in_memory();
        let req = analysis.start(Some(&dataset()), Some("churn")).unwrap();

        analysis.apply(
            AnalyzeOutcome {
                id: req.id,
                target: req.target,
                result: Err(ApiError::Service {
                    status: 500,
                    message: None,
                }),
            },
            &[],
            &mut store,
        );
        assert_eq!(analysis.error(), Some("Failed to analyze"));
    }

    #[test]
    fn test_inconsistent_result_is_still_accepted() {
        let mut analysis = AnalysisController::default();
        let mut store = ResultStore::in_memory();
        let req = analysis.start(Some(&dataset()), Some("churn")).unwrap();

        // The target shows up among its own contributions
        let bad = AnalysisResult::new("churn", 0.1, vec![Contribution::new("churn", 0.1)]);
        let returned = analysis.apply(
            AnalyzeOutcome {
                id: req.id,
                target: req.target,
                result: Ok(bad),
            },
            &["churn".to_string()],
            &mut store,
        );
        assert!(returned.is_some());
    }
}
