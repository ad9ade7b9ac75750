use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Tolerance used when checking `entropy_pct` against `entropy / entropy_max`
const ENTROPY_PCT_TOLERANCE: f64 = 0.05;

/// Treat a JSON `null` number as zero
fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Undefined coefficients (a constant column) arrive as `null`; keep them as NaN
fn coefficients_or_nan<'de, D>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Option::<Vec<Vec<Option<f64>>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(|c| c.unwrap_or(f64::NAN)).collect())
        .collect())
}

/// Missing counts may arrive as floats or `null`
fn count_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(if value.is_finite() && value > 0.0 { value.round() as u64 } else { 0 })
}

/// One feature's share of the target's mutual information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub feature: String,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub value: f64,
}

impl Contribution {
    pub fn new(feature: impl Into<String>, value: f64) -> Self {
        Self {
            feature: feature.into(),
            value,
        }
    }
}

/// Five-number summary of a single column
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FiveNumSummary {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub q1: Option<f64>,
    #[serde(default)]
    pub median: Option<f64>,
    #[serde(default)]
    pub q3: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub missing: u64,
    #[serde(default)]
    pub numeric: bool,
}

impl FiveNumSummary {
    pub fn numeric(min: f64, q1: f64, median: f64, q3: f64, max: f64, missing: u64) -> Self {
        Self {
            min: Some(min),
            q1: Some(q1),
            median: Some(median),
            q3: Some(q3),
            max: Some(max),
            missing,
            numeric: true,
        }
    }

    pub fn non_numeric(missing: u64) -> Self {
        Self {
            missing,
            ..Default::default()
        }
    }

    /// The five statistics in column order
    pub fn stats(&self) -> [Option<f64>; 5] {
        [self.min, self.q1, self.median, self.q3, self.max]
    }
}

/// Column → summary mapping that keeps the payload's key order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FiveNumTable {
    entries: Vec<(String, FiveNumSummary)>,
}

impl FiveNumTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced key keeps its original position
    pub fn insert(&mut self, column: impl Into<String>, summary: FiveNumSummary) {
        let column = column.into();
        if let Some(slot) = self.entries.iter_mut().find(|(c, _)| *c == column) {
            slot.1 = summary;
        } else {
            self.entries.push((column, summary));
        }
    }

    pub fn get(&self, column: &str) -> Option<&FiveNumSummary> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FiveNumSummary)> {
        self.entries.iter().map(|(c, s)| (c.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, FiveNumSummary)> for FiveNumTable {
    fn from_iter<I: IntoIterator<Item = (String, FiveNumSummary)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (column, summary) in iter {
            table.insert(column, summary);
        }
        table
    }
}

impl Serialize for FiveNumTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (column, summary) in &self.entries {
            map.serialize_entry(column, summary)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FiveNumTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = FiveNumTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column name to five-number summary")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(FiveNumTable::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = FiveNumTable::new();
                while let Some((column, summary)) =
                    access.next_entry::<String, FiveNumSummary>()?
                {
                    table.insert(column, summary);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_any(TableVisitor)
    }
}

/// Pairwise Spearman coefficients over `order`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpearmanMatrix {
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default, deserialize_with = "coefficients_or_nan")]
    pub matrix: Vec<Vec<f64>>,
}

impl SpearmanMatrix {
    pub fn new(order: Vec<String>, matrix: Vec<Vec<f64>>) -> Self {
        Self { order, matrix }
    }

    pub fn side(&self) -> usize {
        self.order.len()
    }

    /// Non-empty, with `matrix` square and matching `order`
    pub fn is_well_formed(&self) -> bool {
        let side = self.side();
        side > 0 && self.matrix.len() == side && self.matrix.iter().all(|row| row.len() == side)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.matrix.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// Payload returned by a successful analyze call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub target: String,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub total_mi: f64,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub entropy: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub entropy_pct: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub entropy_max: f64,
    #[serde(default)]
    pub five_num: FiveNumTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spearman: Option<SpearmanMatrix>,
}

/// Invariant violations in an analysis payload
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("target '{0}' appears among its own contributions")]
    TargetInContributions(String),

    #[error("contribution feature '{0}' is not a dataset column")]
    UnknownFeature(String),

    #[error("spearman matrix is not {side}x{side}")]
    MalformedMatrix { side: usize },

    #[error("entropy must be non-negative, got {0}")]
    NegativeEntropy(f64),

    #[error("entropy_pct {actual} does not match 100*entropy/entropy_max = {expected}")]
    EntropyPercentMismatch { expected: f64, actual: f64 },
}

impl AnalysisResult {
    /// A result with contributions only, as older services return
    pub fn new(target: impl Into<String>, total_mi: f64, contributions: Vec<Contribution>) -> Self {
        Self {
            target: target.into(),
            total_mi,
            contributions,
            entropy: 0.0,
            entropy_pct: 0.0,
            entropy_max: 0.0,
            five_num: FiveNumTable::new(),
            spearman: None,
        }
    }

    /// Entropy gauge value, clamped to [0, 100]
    pub fn entropy_gauge_pct(&self) -> f64 {
        if self.entropy_pct.is_finite() {
            self.entropy_pct.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// Check the payload's internal invariants
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.entropy < 0.0 {
            return Err(ModelError::NegativeEntropy(self.entropy));
        }
        if let Some(c) = self.contributions.iter().find(|c| c.feature == self.target) {
            return Err(ModelError::TargetInContributions(c.feature.clone()));
        }
        if let Some(spearman) = &self.spearman {
            if !spearman.order.is_empty() && !spearman.is_well_formed() {
                return Err(ModelError::MalformedMatrix {
                    side: spearman.side(),
                });
            }
        }
        if self.entropy_max > 0.0 {
            let expected = 100.0 * self.entropy / self.entropy_max;
            if (expected - self.entropy_pct).abs() > ENTROPY_PCT_TOLERANCE {
                return Err(ModelError::EntropyPercentMismatch {
                    expected,
                    actual: self.entropy_pct,
                });
            }
        }
        Ok(())
    }

    /// Check that every contribution names one of `columns`
    pub fn check_features(&self, columns: &[String]) -> Result<(), ModelError> {
        match self
            .contributions
            .iter()
            .find(|c| !columns.iter().any(|col| *col == c.feature))
        {
            Some(c) => Err(ModelError::UnknownFeature(c.feature.clone())),
            None => Ok(()),
        }
    }
}

/// Success body of the column probe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnsResponse {
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Failure body shared by both endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of the health endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FULL_PAYLOAD: &str = r#"{
        "target": "churn",
        "total_mi": 0.42,
        "contributions": [{"feature": "tenure", "value": 0.3}, {"feature": "plan", "value": 0.12}],
        "entropy": 0.9,
        "entropy_pct": 90.0,
        "entropy_max": 1.0,
        "five_num": {
            "zeta": {"min": 1, "q1": 2, "median": 3, "q3": 4, "max": 5, "missing": 0, "numeric": true},
            "alpha": {"missing": 2, "numeric": false},
            "churn": {"min": 0, "q1": 0, "median": 0, "q3": 1, "max": 1, "missing": 0, "numeric": true}
        },
        "spearman": {"order": ["churn", "tenure"], "matrix": [[1, -0.5], [-0.5, 1]]}
    }"#;

    #[test]
    fn test_full_payload_deserializes() {
        let result: AnalysisResult = serde_json::from_str(FULL_PAYLOAD).unwrap();

        assert_eq!(result.target, "churn");
        assert_eq!(result.contributions.len(), 2);
        assert_eq!(result.five_num.len(), 3);
        assert!(result.five_num.get("zeta").unwrap().numeric);
        assert!(!result.five_num.get("alpha").unwrap().numeric);
        assert!(result.spearman.as_ref().unwrap().is_well_formed());
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_null_coefficient_keeps_payload() {
        let json = FULL_PAYLOAD.replace("[[1, -0.5], [-0.5, 1]]", "[[1.0, null], [null, 1.0]]");
        let result: AnalysisResult = serde_json::from_str(&json).unwrap();

        assert_eq!(result.contributions.len(), 2);
        let spearman = result.spearman.as_ref().unwrap();
        assert!(spearman.is_well_formed());
        assert_eq!(spearman.get(0, 0), Some(1.0));
        assert!(spearman.get(0, 1).unwrap().is_nan());
        assert!(result.validate().is_ok());

        // NaN is written back as null, so a stored result reloads
        let stored = serde_json::to_string(&result).unwrap();
        let restored: AnalysisResult = serde_json::from_str(&stored).unwrap();
        assert!(restored.spearman.unwrap().get(1, 0).unwrap().is_nan());
    }

    #[test]
    fn test_five_num_preserves_payload_order() {
        let result: AnalysisResult = serde_json::from_str(FULL_PAYLOAD).unwrap();
        let keys: Vec<&str> = result.five_num.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "churn"]);

        // Order survives a serialize/deserialize cycle
        let json = serde_json::to_string(&result).unwrap();
        let restored: AnalysisResult = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = restored.five_num.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "churn"]);
        assert_eq!(restored, result);
    }

    #[test]
    fn test_minimal_payload_uses_defaults() {
        let json = r#"{"target": "y", "total_mi": 0.1, "contributions": [], "entropy": null}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.entropy, 0.0);
        assert_eq!(result.entropy_max, 0.0);
        assert!(result.five_num.is_empty());
        assert!(result.spearman.is_none());
    }

    #[test]
    fn test_null_five_num_is_empty() {
        let json = r#"{"target": "y", "five_num": null}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert!(result.five_num.is_empty());
    }

    #[test]
    fn test_duplicate_five_num_key_keeps_first_position() {
        let mut table = FiveNumTable::new();
        table.insert("a", FiveNumSummary::non_numeric(1));
        table.insert("b", FiveNumSummary::non_numeric(2));
        table.insert("a", FiveNumSummary::non_numeric(3));

        let entries: Vec<(&str, u64)> = table.iter().map(|(k, s)| (k, s.missing)).collect();
        assert_eq!(entries, vec![("a", 3), ("b", 2)]);
    }

    #[test]
    fn test_validate_flags_target_in_contributions() {
        let result = AnalysisResult::new("y", 1.0, vec![Contribution::new("y", 0.5)]);
        assert_eq!(
            result.validate(),
            Err(ModelError::TargetInContributions("y".to_string()))
        );
    }

    #[test]
    fn test_validate_flags_non_square_matrix() {
        let mut result = AnalysisResult::new("y", 1.0, vec![]);
        result.spearman = Some(SpearmanMatrix::new(
            vec!["y".into(), "x".into()],
            vec![vec![1.0, 0.2]],
        ));
        assert_eq!(
            result.validate(),
            Err(ModelError::MalformedMatrix { side: 2 })
        );
    }

    #[test]
    fn test_validate_checks_entropy_percentage() {
        let mut result = AnalysisResult::new("y", 1.0, vec![]);
        result.entropy = 0.5;
        result.entropy_max = 2.0;
        result.entropy_pct = 25.0;
        assert!(result.validate().is_ok());

        result.entropy_pct = 60.0;
        assert!(matches!(
            result.validate(),
            Err(ModelError::EntropyPercentMismatch { .. })
        ));
    }

    #[test]
    fn test_check_features_against_columns() {
        let result = AnalysisResult::new(
            "y",
            1.0,
            vec![Contribution::new("a", 0.5), Contribution::new("b", 0.1)],
        );
        let columns = vec!["a".to_string(), "b".to_string(), "y".to_string()];
        assert!(result.check_features(&columns).is_ok());
        assert_eq!(
            result.check_features(&columns[..1]),
            Err(ModelError::UnknownFeature("b".to_string()))
        );
    }

    #[test]
    fn test_entropy_gauge_is_clamped() {
        let mut result = AnalysisResult::new("y", 1.0, vec![]);
        result.entropy_pct = 140.0;
        assert_eq!(result.entropy_gauge_pct(), 100.0);
        result.entropy_pct = -3.0;
        assert_eq!(result.entropy_gauge_pct(), 0.0);
    }

    #[test]
    fn test_missing_count_accepts_floats_and_null() {
        let s: FiveNumSummary = serde_json::from_str(r#"{"missing": 3.0}"#).unwrap();
        assert_eq!(s.missing, 3);
        let s: FiveNumSummary = serde_json::from_str(r#"{"missing": null}"#).unwrap();
        assert_eq!(s.missing, 0);
    }

    #[test]
    fn test_error_body_tolerates_missing_field() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.error.is_none());
        let body: ErrorBody = serde_json::from_str(r#"{"error": "bad header"}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("bad header"));
    }
}
