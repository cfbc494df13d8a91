// File I/O: source CSV loading, merged/match/normalized CSV export, metrics JSON

pub mod csv;
pub mod json;

use std::fmt;
use std::path::{Path, PathBuf};

pub use crate::csv::{read_csv, read_csv_str, write_matches_csv, write_merged_csv, write_normalized_csv};
pub use crate::json::write_metrics_json;

#[derive(Debug)]
pub enum IoError {
    /// Input file does not exist.
    NotFound(PathBuf),
    /// Input file is not a `.csv`.
    Extension(PathBuf),
    /// Input is not valid UTF-8.
    Encoding(PathBuf),
    /// Malformed CSV (ragged row, bad quoting, unreadable file).
    Parse { path: PathBuf, message: String },
    /// Output could not be written.
    Write { path: PathBuf, message: String },
}

impl IoError {
    /// Output-side failure, as opposed to a problem with an input file.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }

    pub(crate) fn write(path: &Path, err: impl fmt::Display) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(
                f,
                "missing input file: {}. Place the source CSVs there (or pass --ds1/--ds2) and rerun",
                path.display()
            ),
            Self::Extension(path) => write!(f, "expected a .csv input file, got: {}", path.display()),
            Self::Encoding(path) => write!(
                f,
                "failed to decode CSV as UTF-8: {}. Re-save the file as UTF-8 and retry",
                path.display()
            ),
            Self::Parse { path, message } => write!(
                f,
                "failed to parse CSV: {}: {message}. Check that it is comma-separated with a header row",
                path.display()
            ),
            Self::Write { path, message } => write!(f, "cannot write {}: {message}", path.display()),
        }
    }
}

impl std::error::Error for IoError {}

/// Create the parent directory of an output path if it is missing.
pub(crate) fn ensure_parent(path: &Path) -> Result<(), IoError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| IoError::write(path, e))
        }
        _ => Ok(()),
    }
}
