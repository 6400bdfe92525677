use std::sync::Arc;

use meridian_core::{
    oracle::Collaborators,
    script::{Script, ScriptedCollaborator},
    ArchiveBuilder, RunArchive,
};
use serde_json::Value;
use tempfile::TempDir;

/// Helper function to create a test archive
pub async fn create_test_archive() -> (TempDir, RunArchive) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("runs.db");
    let archive = ArchiveBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create archive");
    (temp_dir, archive)
}

/// Collaborators replaying the given JSON script for every role
#[allow(dead_code)]
pub fn scripted(script: Value) -> Collaborators {
    let script: Script = serde_json::from_value(script).expect("Invalid script");
    Collaborators::uniform(Arc::new(ScriptedCollaborator::new(script)))
}
