use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the ledger crates.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A dump file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report artefact could not be written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A date header could not be turned into a calendar date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The directory holding the wallet dumps does not exist.
    #[error("Input directory not found: {0}")]
    InputDirNotFound(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// YAML serialisation failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// CSV serialisation failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the ledger crates.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = LedgerError::FileRead {
            path: PathBuf::from("/dumps/TON_wallet.txt"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/dumps/TON_wallet.txt"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_file_write() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = LedgerError::FileWrite {
            path: PathBuf::from("/out/report.csv"),
            source: io_err,
        };
        assert_eq!(err.to_string(), "Failed to write file /out/report.csv: denied");
    }

    #[test]
    fn test_error_display_invalid_date() {
        let err = LedgerError::InvalidDate("31 Feb 2024".to_string());
        assert_eq!(err.to_string(), "Invalid date: 31 Feb 2024");
    }

    #[test]
    fn test_error_display_input_dir_not_found() {
        let err = LedgerError::InputDirNotFound(PathBuf::from("/missing/dir"));
        assert_eq!(err.to_string(), "Input directory not found: /missing/dir");
    }

    #[test]
    fn test_error_display_config() {
        let err = LedgerError::Config("threshold must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: threshold must be at least 1"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: LedgerError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: LedgerError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
