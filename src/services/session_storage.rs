use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by a session storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage unavailable: {0}")]
    Unavailable(String),

    #[error("session storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Key/value storage scoped to one user session
pub trait SessionStorage: Send {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Identifier of the current session
///
/// `SHAPMI_SESSION` wins when set. Otherwise the parent process (the
/// launching shell) defines the session, so relaunching from the same shell
/// sees the same storage and a new terminal does not.
pub fn current_session_id() -> String {
    if let Ok(id) = std::env::var("SHAPMI_SESSION") {
        let id = id.trim();
        if !id.is_empty() {
            return sanitize(id);
        }
    }
    parent_session_id()
}

const SESSION_DIR_PREFIX: &str = "session-";
const PID_SESSION_PREFIX: &str = "ppid-";

#[cfg(unix)]
fn parent_session_id() -> String {
    format!("{PID_SESSION_PREFIX}{}", std::os::unix::process::parent_id())
}

#[cfg(not(unix))]
fn parent_session_id() -> String {
    "default".to_string()
}

fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// One JSON file per key inside a per-session directory
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage for the current session below `base_dir`
    pub fn for_current_session(base_dir: &Path) -> Self {
        Self::new(base_dir.join(format!("{SESSION_DIR_PREFIX}{}", current_session_id())))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(key)))
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.item_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        create_private_dir(&self.dir)?;
        // Write then rename so a reader never sees a half-written value
        let path = self.item_path(key);
        let tmp = path.with_extension("json.tmp");
        write_private_file(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Results describe the user's data; keep them owner-only
#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, value: &str) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(value.as_bytes())
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, value: &str) -> io::Result<()> {
    std::fs::write(path, value)
}

/// Remove pid-keyed session directories whose shell has exited
///
/// Returns how many were removed. Directories named through
/// `SHAPMI_SESSION` are left alone; their owner decides their lifetime.
pub fn prune_stale_sessions(base_dir: &Path) -> usize {
    prune_sessions_where(base_dir, |pid| !process_alive(pid))
}

fn prune_sessions_where(base_dir: &Path, is_stale: impl Fn(u32) -> bool) -> usize {
    let entries = match std::fs::read_dir(base_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return 0,
        Err(e) => {
            warn!("Cannot list session directories in {}: {e}", base_dir.display());
            return 0;
        }
    };

    let current = format!("{SESSION_DIR_PREFIX}{}", current_session_id());
    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name == current {
            continue;
        }
        let Some(pid) = name
            .strip_prefix(SESSION_DIR_PREFIX)
            .and_then(|rest| rest.strip_prefix(PID_SESSION_PREFIX))
            .and_then(|pid| pid.parse::<u32>().ok())
        else {
            continue;
        };
        if !is_stale(pid) {
            continue;
        }
        match std::fs::remove_dir_all(entry.path()) {
            Ok(()) => {
                debug!("Pruned stale session {name}");
                removed += 1;
            }
            Err(e) => warn!("Cannot prune stale session {name}: {e}"),
        }
    }
    removed
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid <= 0 {
        return false;
    }
    // SAFETY: signal 0 performs the permission and existence checks only
    if unsafe { libc::kill(pid, 0) } == 0 {
        return true;
    }
    // Exists but belongs to someone else
    io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Process-local storage, used when no session directory is available and in tests
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    items: HashMap<String, String>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
