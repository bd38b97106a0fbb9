//! Writes a recorded run to JSON, CSV or HTML.
mod csv;
mod html;
mod json;


use std::path::{Path, PathBuf};

use tokio::io::{AsyncWriteExt, BufWriter};

use crate::args::ExportFormat;
use crate::error::{AppError, AppResult, ExportError};
use crate::session::RunRecord;
use crate::ui::Theme;

pub use csv::render_csv;
pub use html::render_html;
pub use json::render_json;

/// `chakload_<id>_<YYYYmmdd_HHMMSS>.<ext>`, stamped with the finish time.
#[must_use]
pub fn default_file_name(record: &RunRecord, format: ExportFormat) -> String {
    format!(
        "chakload_{}_{}.{}",
        record.id,
        record.finished_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Target path: `requested` with the format extension appended when it has
/// none, or the default name inside `output_dir`.
#[must_use]
pub fn resolve_path(
    record: &RunRecord,
    format: ExportFormat,
    requested: Option<&Path>,
    output_dir: &Path,
) -> PathBuf {
    match requested {
        Some(path) if path.extension().is_some() => path.to_path_buf(),
        Some(path) => path.with_extension(format.extension()),
        None => output_dir.join(default_file_name(record, format)),
    }
}

/// Renders `record` and writes it, creating parent directories.
///
/// # Errors
///
/// Returns an error when rendering fails or the file cannot be written.
pub async fn export_record(
    record: &RunRecord,
    format: ExportFormat,
    requested: Option<&Path>,
    output_dir: &Path,
    theme: Theme,
) -> AppResult<PathBuf> {
    let path = resolve_path(record, format, requested, output_dir);
    let contents = match format {
        ExportFormat::Json => render_json(record).map_err(AppError::export)?,
        ExportFormat::Csv => render_csv(record).into_bytes(),
        ExportFormat::Html => render_html(record, theme)
            .map_err(AppError::export)?
            .into_bytes(),
    };
    write_file(&path, &contents)
        .await
        .map_err(|err| AppError::export(ExportError::Write {
            path: path.clone(),
            source: err,
        }))?;
    tracing::info!("Exported run #{} to {}", record.id, path.display());
    Ok(path)
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(contents).await?;
    writer.flush().await?;
    Ok(())
}
