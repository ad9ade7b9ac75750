use crate::core::AnalysisResult;
use crate::services::session_storage::{MemorySessionStorage, SessionStorage};
use serde::Serialize;
use tracing::{debug, warn};

/// Fixed key the last successful result is stored under
pub const LAST_RESULT_KEY: &str = "shapmi:lastResult";

/// Where a resolved result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultSource {
    /// Carried directly by the navigation transition
    Handoff,
    /// Recovered from session storage
    Session,
}

/// A result together with the layer that supplied it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedResult {
    pub result: AnalysisResult,
    pub source: ResultSource,
}

/// Session-scoped holder of the most recent successful analysis
///
/// Storage failures never reach callers: a failed write is logged and a
/// failed or corrupt read counts as "nothing persisted".
pub struct ResultStore {
    storage: Box<dyn SessionStorage>,
}

impl ResultStore {
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(MemorySessionStorage::new())
    }

    /// Persist `result` for the rest of the session, replacing any earlier one
    pub fn set(&mut self, result: &AnalysisResult) {
        let json = match serde_json::to_string(result) {
            Ok(json) => json,
            Err(e) => {
                warn!("Could not serialize analysis result: {e}");
                return;
            }
        };
        match self.storage.set_item(LAST_RESULT_KEY, &json) {
            Ok(()) => debug!("Persisted result for target '{}'", result.target),
            Err(e) => warn!("Could not persist analysis result: {e}"),
        }
    }

    /// Last persisted result, if one exists and parses
    pub fn persisted(&self) -> Option<AnalysisResult> {
        let raw = match self.storage.get_item(LAST_RESULT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read persisted analysis result: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("Ignoring corrupt persisted analysis result: {e}");
                None
            }
        }
    }

    /// Resolve the result to show: the hand-off first, then session storage
    pub fn get(&self, handoff: Option<AnalysisResult>) -> Option<ResolvedResult> {
        if let Some(result) = handoff {
            return Some(ResolvedResult {
                result,
                source: ResultSource::Handoff,
            });
        }
        self.persisted().map(|result| ResolvedResult {
            result,
            source: ResultSource::Session,
        })
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for ResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Contribution, FiveNumSummary, FiveNumTable, SpearmanMatrix};
    use crate::services::session_storage::{FileSessionStorage, StorageError};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    fn sample_result(target: &str) -> AnalysisResult {
        let mut result = AnalysisResult::new(
            target,
            0.5,
            vec![Contribution::new("a", 0.3), Contribution::new("b", 0.2)],
        );
        result.entropy = 1.0;
        result.entropy_max = 2.0;
        result.entropy_pct = 50.0;
        result.five_num = FiveNumTable::from_iter([
            ("b".to_string(), FiveNumSummary::numeric(0.0, 1.0, 2.0, 3.0, 4.0, 0)),
            ("a".to_string(), FiveNumSummary::non_numeric(3)),
        ]);
        result.spearman = Some(SpearmanMatrix::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 0.1], vec![0.1, 1.0]],
        ));
        result
    }

    #[test]
    fn test_get_prefers_handoff() {
        let mut store = ResultStore::in_memory();
        store.set(&sample_result("persisted"));

        let resolved = store.get(Some(sample_result("handoff"))).unwrap();
        assert_eq!(resolved.source, ResultSource::Handoff);
        assert_eq!(resolved.result.target, "handoff");
    }

    #[test]
    fn test_get_falls_back_to_session() {
        let mut store = ResultStore::in_memory();
        store.set(&sample_result("persisted"));

        let resolved = store.get(None).unwrap();
        assert_eq!(resolved.source, ResultSource::Session);
        assert_eq!(resolved.result.target, "persisted");
    }

    #[test]
    fn test_get_empty_store() {
        let store = ResultStore::in_memory();
        assert!(store.get(None).is_none());
    }

    #[test]
    fn test_set_overwrites_previous_result() {
        let mut store = ResultStore::in_memory();
        store.set(&sample_result("first"));
        store.set(&sample_result("second"));
        assert_eq!(store.persisted().unwrap().target, "second");
    }

    #[test]
    fn test_reload_recovers_equal_result() {
        let temp_dir = TempDir::new().unwrap();
        let result = sample_result("churn");

        {
            let mut store = ResultStore::new(FileSessionStorage::new(temp_dir.path()));
            store.set(&result);
        }

        // A fresh store over the same session directory simulates a reload
        let reloaded = ResultStore::new(FileSessionStorage::new(temp_dir.path()));
        let resolved = reloaded.get(None).unwrap();
        assert_eq!(resolved.source, ResultSource::Session);
        assert_eq!(resolved.result, result);
    }

    #[test]
    fn test_broken_storage_is_silent() {
        let mut store = ResultStore::new(BrokenStorage);
        store.set(&sample_result("x"));
        assert!(store.get(None).is_none());

        // The hand-off still works without storage
        assert!(store.get(Some(sample_result("y"))).is_some());
    }

    #[test]
    fn test_corrupt_persisted_value_is_ignored() {
        let mut storage = MemorySessionStorage::new();
        storage.set_item(LAST_RESULT_KEY, "{not json").unwrap();
        let store = ResultStore::new(storage);
        assert!(store.get(None).is_none());
    }
}
