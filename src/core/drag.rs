//! Drag-and-drop payloads and the page-wide drop zone.
//!
//! Terminals deliver a dropped file as pasted path text, so a paste is
//! classified into a [`DragPayload`] that advertises either file content or
//! plain text. The [`DropZone`] only reacts to payloads advertising files.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Content type advertised by a drag that carries files
pub const FILES_TYPE: &str = "Files";

/// Content type advertised by a plain-text drag
pub const TEXT_TYPE: &str = "text/plain";

/// What a drag operation carries
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DragPayload {
    types: Vec<String>,
    files: Vec<PathBuf>,
}

impl DragPayload {
    pub fn new(types: Vec<String>, files: Vec<PathBuf>) -> Self {
        Self { types, files }
    }

    /// A file drag; `paths` may be empty
    pub fn files(paths: Vec<PathBuf>) -> Self {
        Self::new(vec![FILES_TYPE.to_string()], paths)
    }

    pub fn text() -> Self {
        Self::new(vec![TEXT_TYPE.to_string()], Vec::new())
    }

    /// Classify pasted text: it is a file drop only when every path it names is an existing file
    pub fn from_pasted_text(text: &str, is_file: impl Fn(&Path) -> bool) -> Self {
        let candidates = candidate_paths(text, &is_file);
        if !candidates.is_empty() && candidates.iter().all(|p| is_file(p.as_path())) {
            Self::files(candidates)
        } else {
            Self::text()
        }
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn file_paths(&self) -> &[PathBuf] {
        &self.files
    }

    /// Whether file content is advertised
    pub fn has_files(&self) -> bool {
        self.types.iter().any(|t| t == FILES_TYPE)
    }
}

/// Page-wide drop target holding the "receiving file" visual state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropZone {
    receiving: bool,
}

impl DropZone {
    pub fn is_receiving(&self) -> bool {
        self.receiving
    }

    pub fn enter(&mut self, payload: &DragPayload) {
        if payload.has_files() {
            self.receiving = true;
        }
    }

    pub fn over(&mut self, payload: &DragPayload) {
        if payload.has_files() {
            self.receiving = true;
        }
    }

    pub fn leave(&mut self, payload: &DragPayload) {
        if payload.has_files() {
            self.receiving = false;
        }
    }

    /// Finish a drop. Returns the first file; any others are discarded.
    pub fn drop_payload(&mut self, payload: &DragPayload) -> Option<PathBuf> {
        if !payload.has_files() {
            return None;
        }
        self.receiving = false;
        payload.file_paths().first().cloned()
    }
}

fn candidate_paths(text: &str, is_file: &impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let whole = PathBuf::from(strip_file_uri(unquote(line)));
        if is_file(whole.as_path()) {
            out.push(whole);
            continue;
        }
        out.extend(
            split_words(line)
                .iter()
                .map(|word| PathBuf::from(strip_file_uri(word))),
        );
    }
    out
}

fn unquote(s: &str) -> &str {
    for quote in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn strip_file_uri(s: &str) -> String {
    match s.strip_prefix("file://") {
        Some(rest) => percent_decode(rest).unwrap_or_else(|| rest.to_string()),
        None => s.to_string(),
    }
}

/// Decode every `%XX` escape; `None` if the bytes are not UTF-8
fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = match bytes.get(i + 1..i + 3) {
            Some(&[hi, lo]) if bytes[i] == b'%' => hex_value(hi).zip(hex_value(lo)),
            _ => None,
        };
        match escaped {
            Some((hi, lo)) => {
                out.push(hi << 4 | lo);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Split on unquoted, unescaped whitespace the way a shell would
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => quote = Some(c),
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn fs_with(paths: &[&str]) -> impl Fn(&Path) -> bool {
        let set: HashSet<PathBuf> = paths.iter().map(PathBuf::from).collect();
        move |p: &Path| set.contains(p)
    }

    #[test]
    fn test_text_drag_never_activates_receiving() {
        let mut zone = DropZone::default();
        let payload = DragPayload::text();

        zone.enter(&payload);
        zone.over(&payload);
        assert!(!zone.is_receiving());
        assert_eq!(zone.drop_payload(&payload), None);
        assert!(!zone.is_receiving());
    }

    #[test]
    fn test_file_drag_enter_leave_cycle() {
        let mut zone = DropZone::default();
        let payload = DragPayload::files(vec![PathBuf::from("/data/a.csv")]);

        zone.enter(&payload);
        assert!(zone.is_receiving());
        zone.leave(&payload);
        assert!(!zone.is_receiving());
    }

    #[test]
    fn test_leave_with_text_payload_keeps_state() {
        let mut zone = DropZone::default();
        zone.enter(&DragPayload::files(vec![]));
        zone.leave(&DragPayload::text());
        assert!(zone.is_receiving());
    }

    #[test]
    fn test_drop_with_zero_files_is_noop() {
        let mut zone = DropZone::default();
        let payload = DragPayload::files(vec![]);
        zone.enter(&payload);

        assert_eq!(zone.drop_payload(&payload), None);
        assert!(!zone.is_receiving());
    }

    #[test]
    fn test_drop_uses_first_file_only() {
        let mut zone = DropZone::default();
        let payload = DragPayload::files(vec![
            PathBuf::from("/data/first.csv"),
            PathBuf::from("/data/second.csv"),
        ]);

        zone.enter(&payload);
        assert_eq!(
            zone.drop_payload(&payload),
            Some(PathBuf::from("/data/first.csv"))
        );
        assert!(!zone.is_receiving());
    }

    #[test]
    fn test_paste_of_existing_path_is_file_payload() {
        let is_file = fs_with(&["/data/sales.csv"]);
        let payload = DragPayload::from_pasted_text("/data/sales.csv\n", &is_file);

        assert!(payload.has_files());
        assert_eq!(payload.file_paths(), &[PathBuf::from("/data/sales.csv")]);
    }

    #[test]
    fn test_paste_handles_quotes_escapes_and_uris() {
        let is_file = fs_with(&["/data/my sales.csv", "/data/other.xlsx"]);

        let quoted = DragPayload::from_pasted_text("'/data/my sales.csv'", &is_file);
        assert_eq!(quoted.file_paths(), &[PathBuf::from("/data/my sales.csv")]);

        let escaped =
            DragPayload::from_pasted_text(r"/data/my\ sales.csv /data/other.xlsx", &is_file);
        assert_eq!(
            escaped.file_paths(),
            &[
                PathBuf::from("/data/my sales.csv"),
                PathBuf::from("/data/other.xlsx")
            ]
        );

        let uri = DragPayload::from_pasted_text("file:///data/my%20sales.csv", &is_file);
        assert!(uri.has_files());
    }

    #[test]
    fn test_file_uri_decodes_every_escape() {
        let is_file = fs_with(&["/data/q#1 café.csv"]);

        let uri = DragPayload::from_pasted_text("file:///data/q%231%20caf%C3%A9.csv", &is_file);
        assert_eq!(uri.file_paths(), &[PathBuf::from("/data/q#1 café.csv")]);

        // A stray '%' is kept as written; invalid UTF-8 leaves the escapes alone
        assert_eq!(strip_file_uri("file:///a/100%.csv"), "/a/100%.csv");
        assert_eq!(strip_file_uri("file:///a/%zz.csv"), "/a/%zz.csv");
        assert_eq!(strip_file_uri("file:///a/%FF.csv"), "/a/%FF.csv");
        assert_eq!(strip_file_uri("/plain/%20.csv"), "/plain/%20.csv");
    }

    #[test]
    fn test_paste_of_plain_text_is_text_payload() {
        let is_file = fs_with(&["/data/sales.csv"]);

        let payload = DragPayload::from_pasted_text("hello world", &is_file);
        assert!(!payload.has_files());
        assert_eq!(payload.types(), &[TEXT_TYPE.to_string()]);

        // One real file mixed with text is still text
        let mixed = DragPayload::from_pasted_text("/data/sales.csv\nnot a file", &is_file);
        assert!(!mixed.has_files());

        let empty = DragPayload::from_pasted_text("   \n", &is_file);
        assert!(!empty.has_files());
    }
}
