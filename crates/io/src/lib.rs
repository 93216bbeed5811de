// File I/O: uploads in, Master workbook out

pub mod csv;
pub mod error;
pub mod upload;
pub mod xlsx;

pub use error::IoError;
pub use upload::Upload;

/// Sheet name used for exported Master workbooks.
pub const MASTER_SHEET_NAME: &str = "Master";
