use std::path::Path;

use ledger_core::settings::OutputLayout;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Output bootstrap ───────────────────────────────────────────────────────────

/// Create the output tree under `output_dir` and return its layout.
///
/// Creates the following directories if absent (including any missing parents):
/// - `<output_dir>/CSVs/`
/// - `<output_dir>/YAML/`
/// - `<output_dir>/Reports/`
pub fn prepare_output(output_dir: &Path) -> anyhow::Result<OutputLayout> {
    let layout = OutputLayout::under(output_dir);
    layout.ensure()?;
    Ok(layout)
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name to an [`EnvFilter`] directive.
fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber on stderr.
///
/// Falls back to `"info"` if the level string is not a valid filter.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry().with(filter).with(layer).init();

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── test_prepare_output ───────────────────────────────────────────────────

    #[test]
    fn test_prepare_output_creates_tree() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("TON_Viewer_Reports");

        let layout = prepare_output(&root).expect("prepare_output should succeed");

        assert!(layout.csv_dir.is_dir(), "CSVs dir must exist");
        assert!(layout.yaml_dir.is_dir(), "YAML dir must exist");
        assert!(layout.reports_dir.is_dir(), "Reports dir must exist");
        assert_eq!(layout.reports_dir, root.join("Reports"));
    }

    #[test]
    fn test_prepare_output_is_idempotent() {
        let tmp = TempDir::new().expect("tempdir");
        prepare_output(tmp.path()).expect("first call");
        prepare_output(tmp.path()).expect("second call");
    }

    #[test]
    fn test_prepare_output_fails_under_file() {
        let tmp = TempDir::new().expect("tempdir");
        let file = tmp.path().join("occupied");
        std::fs::write(&file, b"x").expect("write file");

        assert!(prepare_output(&file).is_err());
    }

    // ── test_level_directive ──────────────────────────────────────────────────

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("info"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("ERROR"), "error");
        assert_eq!(level_directive("ledger_data=trace"), "ledger_data=trace");
    }
}
