//! Artifact writer implementation

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::Artifact;

/// Writes rendered artifacts to the host filesystem
pub struct ArtifactWriter;

impl ArtifactWriter {
    /// Write an artifact atomically.
    ///
    /// Bytes go to a temporary file next to `path`, which is then renamed
    /// into place. An existing `path` is only replaced when `overwrite` is set.
    pub fn write(artifact: &Artifact, path: impl AsRef<Path>, overwrite: bool) -> Result<PathBuf, DomainError> {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            return Err(DomainError::Io(format!(
                "Output file already exists: {} (use --overwrite to replace it)",
                path.display()
            )));
        }

        let dir = Self::ensure_output_directory(path)?;
        let mut temp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| DomainError::Io(format!("Failed to create temporary file in {}: {}", dir.display(), e)))?;
        debug!("Writing to temporary file: {}", temp.path().display());

        temp.write_all(&artifact.data)
            .and_then(|_| temp.flush())
            .map_err(|e| DomainError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

        let persisted = if overwrite {
            temp.persist(path)
        } else {
            temp.persist_noclobber(path)
        };
        persisted.map_err(|e| DomainError::Io(format!("Failed to persist {}: {}", path.display(), e.error)))?;

        info!(
            path = %path.display(),
            bytes = artifact.len(),
            mime = %artifact.mime_type,
            "Artifact written"
        );
        Ok(path.to_path_buf())
    }

    fn ensure_output_directory(path: &Path) -> Result<PathBuf, DomainError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .map_err(|e| DomainError::Io(format!("Failed to create output directory {}: {}", dir.display(), e)))?;
        Ok(dir)
    }
}
