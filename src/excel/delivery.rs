//! Writes the composed workbook to disk under a timestamped name

use super::composer::OutputWorkbook;
use crate::error::FdmResult;
use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `<prefix>_<YYYYMMDD_HHMMSS>.xlsx`
pub fn output_file_name(prefix: &str, now: DateTime<Local>) -> String {
    format!("{}_{}.xlsx", prefix, now.format(TIMESTAMP_FORMAT))
}

/// Whether `name` is a workbook this tool delivered under `prefix`
pub fn is_output_file_name(prefix: &str, name: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(".xlsx"))
        .map(|stamp| NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok())
        .unwrap_or(false)
}

/// Serialize `output` and write it into `dir`, returning the written path.
///
/// The workbook is serialized in memory first, then written to a temporary
/// file in `dir` and renamed into place. A failed write leaves no file under
/// the final name.
pub fn deliver(
    output: OutputWorkbook,
    dir: &Path,
    prefix: &str,
    now: DateTime<Local>,
) -> FdmResult<PathBuf> {
    let rows = output.row_count();
    let bytes = output.into_bytes()?;

    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(output_file_name(prefix, now));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| e.error)?;

    info!(path = %path.display(), rows, bytes = bytes.len(), "wrote output workbook");
    Ok(path)
}
