use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::config::Config;
use crate::model::user::{Session, Users};

const USERS_FILE: &str = "users.json";
const SESSION_FILE: &str = "session.json";
const CONFIG_FILE: &str = "config.toml";

/// Error type for store I/O operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not determine a data directory (set --data-dir or TALLY_DATA_DIR)")]
    NoDataDir,
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize store data: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result of reading the users file. Missing and unparsable data are
/// outcomes, not errors: the caller always gets a usable (possibly empty)
/// mapping.
#[derive(Debug)]
pub enum ReadOutcome {
    /// No users file yet
    Missing,
    Loaded(Users),
    /// The file exists but could not be read or parsed
    Corrupt,
}

impl ReadOutcome {
    /// The mapping, empty for Missing/Corrupt.
    pub fn into_users(self) -> Users {
        match self {
            ReadOutcome::Loaded(users) => users,
            ReadOutcome::Missing | ReadOutcome::Corrupt => Users::default(),
        }
    }
}

/// Resolve the store directory: explicit override, then TALLY_DATA_DIR,
/// then the platform data dir, then ~/.tally.
pub fn resolve_data_dir(override_dir: Option<&str>) -> Result<PathBuf, StoreError> {
    if let Some(dir) = override_dir {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = std::env::var_os("TALLY_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dirs) = directories::ProjectDirs::from("", "", "tally") {
        return Ok(dirs.data_dir().to_path_buf());
    }
    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".tally"));
    }
    Err(StoreError::NoDataDir)
}

/// Read the users mapping from users.json.
pub fn read_users(dir: &Path) -> ReadOutcome {
    let path = dir.join(USERS_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ReadOutcome::Missing,
        Err(_) => return ReadOutcome::Corrupt,
    };
    match serde_json::from_str(&content) {
        Ok(users) => ReadOutcome::Loaded(users),
        Err(_) => ReadOutcome::Corrupt,
    }
}

/// Write the complete users mapping to users.json (full overwrite).
pub fn write_users(dir: &Path, users: &Users) -> Result<(), StoreError> {
    fs::create_dir_all(dir)?;
    let content = serde_json::to_string_pretty(users)?;
    let path = dir.join(USERS_FILE);
    atomic_write(&path, content.as_bytes()).map_err(|e| StoreError::WriteError { path, source: e })
}

/// Read the active session from session.json. A missing or corrupt
/// session reads as logged-out.
pub fn read_session(dir: &Path) -> Option<Session> {
    let content = fs::read_to_string(dir.join(SESSION_FILE)).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn write_session(dir: &Path, session: &Session) -> Result<(), StoreError> {
    fs::create_dir_all(dir)?;
    let content = serde_json::to_string_pretty(session)?;
    let path = dir.join(SESSION_FILE);
    atomic_write(&path, content.as_bytes()).map_err(|e| StoreError::WriteError { path, source: e })
}

pub fn clear_session(dir: &Path) -> Result<(), StoreError> {
    match fs::remove_file(dir.join(SESSION_FILE)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::IoError(e)),
    }
}

/// Read config.toml, defaulting on absence or parse failure.
pub fn read_config(dir: &Path) -> Config {
    let content = match fs::read_to_string(dir.join(CONFIG_FILE)) {
        Ok(c) => c,
        Err(_) => return Config::default(),
    };
    toml::from_str(&content).unwrap_or_default()
}

/// Write atomically: write to a temp file in the same directory, then
/// rename over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
