//! Async access to the run archive.
//!
//! Each call opens its own connection on a blocking task, so a
//! [`RunArchive`] is cheap to clone and safe to share between the CLI and
//! the MCP server.

use std::path::{Path, PathBuf};

use log::info;
use tokio::task;

pub mod builder;

pub use builder::ArchiveBuilder;

use crate::{
    db::Database,
    error::{MeridianError, Result},
    models::{RunRecord, RunReport, RunSummary},
    params::{Id, ListRuns},
};

/// Handle to the SQLite file holding finished runs.
#[derive(Debug, Clone)]
pub struct RunArchive {
    db_path: PathBuf,
}

impl RunArchive {
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Stores a finished run.
    pub async fn save(&self, report: &RunReport) -> Result<RunRecord> {
        let db_path = self.db_path.clone();
        let report = report.clone();

        let record = task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.insert_run(&report)
        })
        .await
        .map_err(MeridianError::join)??;

        info!("Archived run {}", record.id);
        Ok(record)
    }

    /// Retrieves a run by its ID.
    pub async fn get(&self, params: &Id) -> Result<Option<RunRecord>> {
        let db_path = self.db_path.clone();
        let id = params.id;

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_run(id)
        })
        .await
        .map_err(MeridianError::join)?
    }

    /// Lists archived runs, most recent first.
    pub async fn list(&self, params: &ListRuns) -> Result<Vec<RunSummary>> {
        let db_path = self.db_path.clone();
        let limit = params.limit;

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.list_runs(limit)
        })
        .await
        .map_err(MeridianError::join)?
    }

    /// Deletes a run and returns the record that was removed.
    ///
    /// # Errors
    ///
    /// Returns `MeridianError::RunNotFound` when no run has the given ID.
    pub async fn delete(&self, params: &Id) -> Result<RunRecord> {
        let db_path = self.db_path.clone();
        let id = params.id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            let record = db.get_run(id)?.ok_or(MeridianError::RunNotFound { id })?;
            db.delete_run(id)?;
            Ok::<_, MeridianError>(record)
        })
        .await
        .map_err(MeridianError::join)?
    }
}
