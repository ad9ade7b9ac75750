use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Extensions advertised by the file picker. Advisory only, the service validates uploads.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

/// Unique identifier attached to every service request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Create a new unique request ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s).map_err(|e| e.to_string())?))
    }
}

/// Handle to a dataset chosen for upload
///
/// The bytes stay on disk; they are read when a request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRef {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

impl DatasetRef {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();
        Self {
            path,
            file_name,
            size,
        }
    }

    /// Build a reference from a local file, failing when it is missing or not a regular file
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(Self::new(path, meta.len()))
    }

    /// Lowercased file extension, if any
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    pub fn has_supported_extension(&self) -> bool {
        self.extension()
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Size label shown next to the selected file, e.g. `1.5 KB`
    pub fn size_label(&self) -> String {
        format!("{:.1} KB", self.size as f64 / 1024.0)
    }

    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("csv") => "text/csv",
            Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Some("xls") => "application/vnd.ms-excel",
            _ => "application/octet-stream",
        }
    }
}

/// How contribution bars are scaled
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DisplayMode {
    Absolute,
    #[default]
    Percent,
}

impl DisplayMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Absolute => Self::Percent,
            Self::Percent => Self::Absolute,
        }
    }

    /// Label used on the mode toggle
    pub fn label(&self) -> &'static str {
        match self {
            Self::Absolute => "abs",
            Self::Percent => "% of entropy",
        }
    }
}

/// Top-level screens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum View {
    #[default]
    Upload,
    Results,
}

/// Sections of the results view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum ResultsSection {
    Overview,
    #[default]
    InfoDecomp,
}

impl ResultsSection {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::InfoDecomp => "Info Decomp",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Overview => Self::InfoDecomp,
            Self::InfoDecomp => Self::Overview,
        }
    }
}
