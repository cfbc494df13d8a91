// CSV import/export

use std::path::Path;

use log::debug;
use regmerge_recon::model::{MATCHES_HEADER, MERGED_HEADER, NORMALIZED_HEADER};
use regmerge_recon::{CompanyRow, MatchRecord, RawTable, UnifiedRecord};

use crate::{ensure_parent, IoError};

/// Load a source table. Every cell is kept as a string; empty cells stay empty.
pub fn read_csv(path: &Path) -> Result<RawTable, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        return Err(IoError::Extension(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|e| IoError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let content = String::from_utf8(bytes).map_err(|_| IoError::Encoding(path.to_path_buf()))?;

    let table = read_csv_str(&content).map_err(|message| IoError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    debug!(
        "read {}: {} columns, {} rows",
        path.display(),
        table.headers.len(),
        table.len()
    );
    Ok(table)
}

/// Parse CSV text with a header row. A leading UTF-8 BOM is ignored.
///
/// Rows shorter than the header are kept (missing cells read as empty); rows longer
/// than the header are rejected.
pub fn read_csv_str(content: &str) -> Result<RawTable, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() {
        return Err("no header row".to_string());
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        if record.len() > headers.len() {
            return Err(format!(
                "row {} has {} fields, header has {}",
                idx + 2,
                record.len(),
                headers.len()
            ));
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Merged company rows, one per DS1 company.
pub fn write_merged_csv(path: &Path, rows: &[CompanyRow]) -> Result<(), IoError> {
    write_rows(path, &MERGED_HEADER, rows.iter().map(CompanyRow::to_cells))
}

/// Address-level match records.
pub fn write_matches_csv(path: &Path, matches: &[MatchRecord]) -> Result<(), IoError> {
    write_rows(path, &MATCHES_HEADER, matches.iter().map(MatchRecord::to_cells))
}

/// Unified records with their derived fields, readable back for matching.
pub fn write_normalized_csv(path: &Path, records: &[UnifiedRecord]) -> Result<(), IoError> {
    write_rows(path, &NORMALIZED_HEADER, records.iter().map(UnifiedRecord::to_cells))
}

fn write_rows<I>(path: &Path, header: &[&str], rows: I) -> Result<(), IoError>
where
    I: Iterator<Item = Vec<String>>,
{
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(|e| IoError::write(path, e))?;

    writer.write_record(header).map_err(|e| IoError::write(path, e))?;
    let mut count = 0usize;
    for row in rows {
        writer.write_record(&row).map_err(|e| IoError::write(path, e))?;
        count += 1;
    }
    writer.flush().map_err(|e| IoError::write(path, e))?;

    debug!("wrote {} rows to {}", count, path.display());
    Ok(())
}
