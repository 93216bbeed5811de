//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage error (bad arguments, unknown care type)           |
//! | 3    | Required column or sheet absent from an input            |
//! | 4    | Input file cannot be parsed as tabular data              |
//! | 5    | Settings file unreadable, unparsable or invalid          |
//! | 6    | Filesystem error reading inputs or writing the workbook  |
//!
//! Unmatched postcodes are warnings and never change the exit code.

use digimv_engine::MasterError;
use digimv_io::IoError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// A required column (or the base sheet) is missing.
pub const EXIT_MISSING_COLUMN: u8 = 3;

/// A file could not be parsed as a workbook or CSV.
pub const EXIT_MALFORMED_FILE: u8 = 4;

/// Settings could not be loaded or failed validation.
pub const EXIT_CONFIG: u8 = 5;

/// Reading an input or writing the output failed.
pub const EXIT_IO: u8 = 6;

/// Map an engine error to its exit code.
pub fn master_exit_code(err: &MasterError) -> u8 {
    match err {
        MasterError::MissingColumn { .. } | MasterError::MissingSheet { .. } => EXIT_MISSING_COLUMN,
        MasterError::InvalidConfig(_) => EXIT_CONFIG,
        MasterError::NoSources => EXIT_USAGE,
    }
}

/// Map an IO error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::MalformedFile { .. } => EXIT_MALFORMED_FILE,
        IoError::Read { .. } | IoError::Write(_) => EXIT_IO,
        IoError::Master(inner) => master_exit_code(inner),
    }
}
