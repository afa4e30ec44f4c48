//! Canonical default values shared by the store, the sinks and the CLI.

/// Charset used when neither the demand nor the configuration names one.
pub const DEFAULT_CHARSET: &str = "iso-8859-1";
/// File stem used when the demand carries no file name hint.
pub const DEFAULT_EXPORT_STEM: &str = "export";
pub const DEFAULT_SHEET_NAME: &str = "Export";
pub const DEFAULT_CSV_DELIMITER: char = ',';
