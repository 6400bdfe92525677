//! Builder for creating and configuring RunArchive instances.

use std::path::{Path, PathBuf};

use tokio::task;

use super::RunArchive;
use crate::{
    db::Database,
    error::{MeridianError, Result},
};

/// Builder for creating and configuring [`RunArchive`] instances.
#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder {
    database_path: Option<PathBuf>,
}

impl ArchiveBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses the XDG Base Directory specification:
    /// `$XDG_DATA_HOME/meridian/runs.db` or `~/.local/share/meridian/runs.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the archive, creating the database file and schema if needed.
    ///
    /// # Errors
    ///
    /// Returns `MeridianError::XdgDirectory` if no default path can be placed,
    /// `MeridianError::FileSystem` if the parent directory cannot be created,
    /// and `MeridianError::Database` if schema initialization fails.
    pub async fn build(self) -> Result<RunArchive> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| MeridianError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let init_path = db_path.clone();
        task::spawn_blocking(move || Database::new(&init_path).map(drop))
            .await
            .map_err(MeridianError::join)??;

        Ok(RunArchive::new(db_path))
    }

    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("meridian")
            .place_data_file("runs.db")
            .map_err(|e| MeridianError::XdgDirectory(e.to_string()))
    }
}
