use serde::Serialize;
use tracing::debug;

/// Selection of the target column among the probed columns
///
/// The selection is only ever a member of the column list it was checked
/// against; values outside the list are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetSelector {
    selected: Option<String>,
    cursor: usize,
}

impl TargetSelector {
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Index of the keyboard cursor in the column list
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Select `value` if it is one of `columns`. Returns whether the selection changed.
    pub fn select(&mut self, columns: &[String], value: &str) -> bool {
        let Some(idx) = columns.iter().position(|c| c == value) else {
            debug!("Ignoring target '{value}': not a column");
            return false;
        };
        self.cursor = idx;
        if self.selected.as_deref() == Some(value) {
            return false;
        }
        self.selected = Some(value.to_string());
        true
    }

    /// Move the cursor down and select the column under it
    pub fn select_next(&mut self, columns: &[String]) {
        if columns.is_empty() {
            return;
        }
        let next = match self.selected {
            Some(_) => (self.cursor + 1).min(columns.len() - 1),
            None => self.cursor.min(columns.len() - 1),
        };
        self.select(columns, &columns[next]);
    }

    /// Move the cursor up and select the column under it
    pub fn select_prev(&mut self, columns: &[String]) {
        if columns.is_empty() {
            return;
        }
        let prev = self.cursor.saturating_sub(1).min(columns.len() - 1);
        self.select(columns, &columns[prev]);
    }

    /// Keep the selection only while it is still a member of `columns`
    pub fn retain_valid(&mut self, columns: &[String]) {
        match self
            .selected
            .as_ref()
            .and_then(|s| columns.iter().position(|c| c == s))
        {
            Some(idx) => self.cursor = idx,
            None => self.clear(),
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.cursor = 0;
    }
}
