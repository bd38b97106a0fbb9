use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::TestSettings;
use crate::error::ExportError;
use crate::metrics::TestResults;
use crate::session::RunRecord;

#[derive(Serialize)]
struct RunInfo {
    id: u64,
    started_at: DateTime<Local>,
    finished_at: DateTime<Local>,
}

#[derive(Serialize)]
struct Document<'record> {
    run: RunInfo,
    settings: &'record TestSettings,
    results: &'record TestResults,
}

/// Pretty JSON with `run`, `settings` and `results` sections.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn render_json(record: &RunRecord) -> Result<Vec<u8>, ExportError> {
    let document = Document {
        run: RunInfo {
            id: record.id,
            started_at: record.started_at,
            finished_at: record.finished_at,
        },
        settings: &record.settings,
        results: &record.results,
    };
    let mut bytes = serde_json::to_vec_pretty(&document)
        .map_err(|err| ExportError::Serialize { source: err })?;
    bytes.push(b'\n');
    Ok(bytes)
}
