//! CLI Exit Code Registry
//!
//! Single source of truth for `regmerge` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 2    | Usage error (bad arguments)                          |
//! | 3    | Input file missing, unreadable or malformed          |
//! | 4    | Dataset is missing mandatory source columns          |
//! | 5    | Matching precondition (derived columns, thresholds)  |
//! | 6    | Invalid or unreadable config                         |
//! | 7    | Output could not be written                          |
//!
//! Input, schema and matching errors are raised before any output file is written.

use regmerge_io::IoError;
use regmerge_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options. Also used by clap.
pub const EXIT_USAGE: u8 = 2;

/// Input file missing, wrong extension, not UTF-8, or not parseable as CSV.
pub const EXIT_INPUT: u8 = 3;

/// A mandatory unified field has no source column.
pub const EXIT_SCHEMA: u8 = 4;

/// Pre-normalized input lacks derived columns, or thresholds are unusable.
pub const EXIT_MATCHING: u8 = 5;

/// Config file unreadable, not valid TOML, or failing validation.
pub const EXIT_CONFIG: u8 = 6;

/// Output file or directory could not be written.
pub const EXIT_OUTPUT: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::Schema { .. } => EXIT_SCHEMA,
        ReconError::MatchingPrecondition(_) => EXIT_MATCHING,
    }
}

/// Map a file I/O error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    if err.is_write() {
        EXIT_OUTPUT
    } else {
        EXIT_INPUT
    }
}
