use crate::error::AppError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("unsupported output destination: {0}")]
    UnsupportedDestination(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<OutputError> for AppError {
    fn from(err: OutputError) -> Self {
        AppError::Output(err.to_string())
    }
}

/// Destination for the final combined audio buffer.
#[async_trait]
pub trait OutputWriter: Send + Sync {
    async fn write(&self, destination: &str, bytes: &[u8]) -> Result<(), OutputError>;
}

/// Writes to the local filesystem, creating missing parent directories.
#[derive(Debug, Clone, Default)]
pub struct LocalFileWriter;

impl LocalFileWriter {
    pub fn new() -> Self {
        Self
    }

    fn local_path(destination: &str) -> Result<&Path, OutputError> {
        if destination.trim().is_empty() || destination.contains("://") {
            return Err(OutputError::UnsupportedDestination(destination.to_string()));
        }
        Ok(Path::new(destination))
    }

    /// Hidden sibling of `path` that receives the bytes before the rename.
    fn staging_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map_or_else(|| "output".into(), |name| name.to_string_lossy());
        path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
    }
}

#[async_trait]
impl OutputWriter for LocalFileWriter {
    async fn write(&self, destination: &str, bytes: &[u8]) -> Result<(), OutputError> {
        let path = Self::local_path(destination)?;
        let io_error = |source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        // Stage next to the target so the rename stays on one filesystem and
        // the destination never holds a truncated file.
        let staging = Self::staging_path(path);
        let staged = match tokio::fs::write(&staging, bytes).await {
            Ok(()) => tokio::fs::rename(&staging, path).await,
            Err(err) => Err(err),
        };
        if let Err(err) = staged {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                tracing::debug!(
                    path = %staging.display(),
                    error = %cleanup,
                    "Staging file not removed"
                );
            }
            return Err(io_error(err));
        }

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Audio written");
        Ok(())
    }
}
