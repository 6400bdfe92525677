//! Run archive queries.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension, Row};

use crate::{
    error::{DatabaseResultExt, MeridianError, Result},
    models::{RunRecord, RunReport, RunSummary, Termination},
};

const INSERT_RUN_SQL: &str = "INSERT INTO runs (question, final_answer, termination, step_count, report, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_RUN_SQL: &str = "SELECT id, report, created_at FROM runs WHERE id = ?1";
const LIST_RUNS_SQL: &str = "SELECT id, question, final_answer, termination, step_count, created_at FROM runs ORDER BY id DESC LIMIT ?1";
const DELETE_RUN_SQL: &str = "DELETE FROM runs WHERE id = ?1";

fn conversion_error(
    column: usize,
    error: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(error))
}

fn timestamp_column(row: &Row<'_>, column: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(column)?
        .parse::<Timestamp>()
        .map_err(|e| conversion_error(column, e))
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<RunSummary> {
    let termination_str: String = row.get(3)?;
    let termination = termination_str.parse::<Termination>().map_err(|reason| {
        conversion_error(
            3,
            std::io::Error::new(std::io::ErrorKind::InvalidData, reason),
        )
    })?;

    Ok(RunSummary {
        id: row.get::<_, i64>(0)? as u64,
        question: row.get(1)?,
        final_answer: row.get(2)?,
        termination,
        step_count: row.get(4)?,
        created_at: timestamp_column(row, 5)?,
    })
}

impl super::Database {
    /// Stores a finished run and returns it with its new ID.
    pub fn insert_run(&mut self, report: &RunReport) -> Result<RunRecord> {
        let report_json = serde_json::to_string(report)?;
        let created_at = Timestamp::now();
        let step_count = u32::try_from(report.steps.len()).unwrap_or(u32::MAX);

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        tx.execute(
            INSERT_RUN_SQL,
            params![
                report.question,
                report.final_answer,
                report.termination.as_str(),
                step_count,
                report_json,
                created_at.to_string(),
            ],
        )
        .db_context("Failed to insert run")?;

        let id = tx.last_insert_rowid() as u64;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(RunRecord {
            id,
            created_at,
            report: report.clone(),
        })
    }

    /// Retrieves a stored run by its ID.
    pub fn get_run(&self, id: u64) -> Result<Option<RunRecord>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_RUN_SQL)
            .db_context("Failed to prepare query")?;

        stmt.query_row(params![id as i64], |row| {
            let report_json: String = row.get(1)?;
            let report: RunReport =
                serde_json::from_str(&report_json).map_err(|e| conversion_error(1, e))?;
            Ok(RunRecord {
                id: row.get::<_, i64>(0)? as u64,
                created_at: timestamp_column(row, 2)?,
                report,
            })
        })
        .optional()
        .db_context("Failed to query run")
    }

    /// Lists run summaries, most recent first.
    pub fn list_runs(&self, limit: Option<u32>) -> Result<Vec<RunSummary>> {
        // SQLite treats a negative LIMIT as no limit
        let limit = limit.map_or(-1, i64::from);

        let mut stmt = self
            .connection
            .prepare(LIST_RUNS_SQL)
            .db_context("Failed to prepare query")?;

        let rows = stmt
            .query_map(params![limit], summary_from_row)
            .db_context("Failed to query runs")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read run summaries")
    }

    /// Deletes a stored run.
    ///
    /// # Errors
    ///
    /// Returns `MeridianError::RunNotFound` when no run has the given ID.
    pub fn delete_run(&mut self, id: u64) -> Result<()> {
        let deleted = self
            .connection
            .execute(DELETE_RUN_SQL, params![id as i64])
            .db_context("Failed to delete run")?;

        if deleted == 0 {
            return Err(MeridianError::RunNotFound { id });
        }
        Ok(())
    }
}
