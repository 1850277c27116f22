use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Overwrites one backing file with the full document after every accepted edit.
/// No write-ahead log and no atomic rename: a crash mid-write can leave a torn file.
pub struct PersistenceWriter {
    path: PathBuf,
}

impl PersistenceWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the backing file, `None` when it does not exist yet
    pub async fn load(&self) -> Result<Option<String>, PersistenceError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                info!("Loaded {} characters from {}", content.chars().count(), self.path.display());
                Ok(Some(content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No backing file at {}, starting with an empty document", self.path.display());
                Ok(None)
            }
            Err(e) => Err(PersistenceError::Read { path: self.path.clone(), source: e }),
        }
    }

    /// Replace the file contents with `content`
    pub async fn flush(&self, content: &str) -> Result<(), PersistenceError> {
        tokio::fs::write(&self.path, content.as_bytes())
            .await
            .map_err(|e| PersistenceError::Write { path: self.path.clone(), source: e })?;
        debug!("Flushed {} bytes to {}", content.len(), self.path.display());
        Ok(())
    }
}

#[derive(Debug)]
pub enum PersistenceError {
    Read { path: PathBuf, source: std::io::Error },
    Write { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Read { path, source } => write!(f, "Failed to read {}: {}", path.display(), source),
            PersistenceError::Write { path, source } => write!(f, "Failed to write {}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Read { source, .. } | PersistenceError::Write { source, .. } => Some(source),
        }
    }
}
