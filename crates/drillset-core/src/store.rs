//! Session persistence.
//!
//! The whole session state is written as one pretty-printed JSON record
//! after every processed turn. A record that cannot be read counts as "no
//! prior session"; one that can be read but not parsed is fatal.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::model::SessionState;

/// A session record on disk.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session, or `None` if there is no readable record.
    pub fn load(&self) -> Result<Option<SessionState>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no session record at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(
                    "can't read session record {}: {e}, starting a new session",
                    self.path.display()
                );
                return Ok(None);
            }
        };
        let state: SessionState = serde_json::from_str(&content).with_context(|| {
            format!("failed to parse session record {}", self.path.display())
        })?;
        state
            .validate()
            .with_context(|| format!("session record {} is unusable", self.path.display()))?;
        Ok(Some(state))
    }

    /// Overwrite the record with a full snapshot of `state`.
    ///
    /// The snapshot is written to a temporary file next to the record and
    /// renamed over it, so an interrupted save leaves the previous record.
    pub fn save(&self, state: &SessionState) -> Result<()> {
        let tmp = self.write_snapshot(state)?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to write session to {}", self.path.display()))?;
        Ok(())
    }

    fn write_snapshot(&self, state: &SessionState) -> Result<NamedTempFile> {
        let json =
            serde_json::to_string_pretty(state).context("failed to serialize session state")?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create state directory {}", dir.display()))?;
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }
}
