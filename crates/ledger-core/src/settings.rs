use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::dates::DateResolver;
use crate::error::{LedgerError, Result};

/// Default minimum occurrence count for an address to be reported.
pub const DEFAULT_THRESHOLD: u32 = 5;
/// Default number of addresses listed in the activity digest.
pub const DEFAULT_TOP_N: usize = 5;
/// Default native token symbol of the ledger.
pub const DEFAULT_NATIVE_TOKEN: &str = "TON";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Parse wallet-activity dumps into transaction exports and tax reports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ton-ledger",
    about = "Parse wallet-activity dumps into transaction exports and tax reports",
    version
)]
pub struct Settings {
    /// Directory containing one `.txt` dump per wallet
    #[arg(long, default_value = "TON_Viewer_Dumps")]
    pub input_dir: PathBuf,

    /// Root directory for CSVs, YAML exports and reports
    #[arg(long, default_value = "TON_Viewer_Reports")]
    pub output_dir: PathBuf,

    /// Minimum occurrences for an address to appear in the frequency report
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub threshold: Option<u32>,

    /// Number of addresses listed in the activity digest
    #[arg(long)]
    pub top: Option<usize>,

    /// Native token symbol used for movement totals
    #[arg(long)]
    pub native_token: Option<String>,

    /// Address to exclude from address statistics (repeatable)
    #[arg(long = "exclude", value_name = "ADDRESS")]
    pub exclusions: Vec<String>,

    /// JSON config file (defaults to ~/.ton-ledger/config.json when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// What to do with transactions whose date header cannot be resolved
    #[arg(long, value_enum, default_value_t = UnknownDatePolicy::Today)]
    pub unknown_dates: UnknownDatePolicy,

    /// Skip the per-wallet YAML exports
    #[arg(long)]
    pub no_yaml: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Log level after applying `--debug`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            self.log_level.as_str()
        }
    }
}

// ── UnknownDatePolicy ──────────────────────────────────────────────────────────

/// Handling of date headers that match the header shape but name no real day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownDatePolicy {
    /// Date the transaction with the reference day and flag it.
    #[default]
    Today,
    /// Keep the record open/close cycle but leave it out of all outputs.
    Skip,
}

// ── LedgerConfig (file) ────────────────────────────────────────────────────────

/// Optional JSON configuration file.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Self-owned addresses that never count as counterparties.
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_token: Option<String>,
}

impl LedgerConfig {
    /// `~/.ton-ledger/config.json`.
    pub fn default_path() -> PathBuf {
        Self::default_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn default_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".ton-ledger").join("config.json")
    }

    /// Load the config at `path`.
    ///
    /// A missing file is an error only when `required` is set; a present but
    /// malformed file is always an error.
    pub fn load_from(path: &Path, required: bool) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(LedgerError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = serde_json::from_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

// ── OutputLayout ───────────────────────────────────────────────────────────────

/// Where each family of artefacts is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub csv_dir: PathBuf,
    pub yaml_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl OutputLayout {
    pub fn under(root: &Path) -> Self {
        Self {
            csv_dir: root.join("CSVs"),
            yaml_dir: root.join("YAML"),
            reports_dir: root.join("Reports"),
        }
    }

    /// Create every output directory (including missing parents).
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.csv_dir, &self.yaml_dir, &self.reports_dir] {
            std::fs::create_dir_all(dir).map_err(|source| LedgerError::FileWrite {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

// ── RunConfig ──────────────────────────────────────────────────────────────────

/// Fully resolved parameters handed to the parsing and reporting core.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub exclusions: BTreeSet<String>,
    pub threshold: u32,
    pub top_n: usize,
    pub native_token: String,
    pub unknown_dates: UnknownDatePolicy,
    pub resolver: DateResolver,
    pub write_yaml: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            exclusions: BTreeSet::new(),
            threshold: DEFAULT_THRESHOLD,
            top_n: DEFAULT_TOP_N,
            native_token: DEFAULT_NATIVE_TOKEN.to_string(),
            unknown_dates: UnknownDatePolicy::Today,
            resolver: DateResolver::today(),
            write_yaml: true,
        }
    }
}

impl RunConfig {
    /// Merge CLI settings over the file config. CLI scalars win; exclusion
    /// lists are unioned.
    pub fn resolve(
        settings: &Settings,
        file: LedgerConfig,
        resolver: DateResolver,
    ) -> Result<Self> {
        let threshold = settings
            .threshold
            .or(file.threshold)
            .unwrap_or(DEFAULT_THRESHOLD);
        if threshold == 0 {
            return Err(LedgerError::Config(
                "threshold must be at least 1".to_string(),
            ));
        }

        let native_token = settings
            .native_token
            .clone()
            .or(file.native_token)
            .unwrap_or_else(|| DEFAULT_NATIVE_TOKEN.to_string());
        if native_token.trim().is_empty() {
            return Err(LedgerError::Config(
                "native token symbol must not be empty".to_string(),
            ));
        }

        let exclusions = file
            .exclusions
            .into_iter()
            .chain(settings.exclusions.iter().cloned())
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        Ok(Self {
            exclusions,
            threshold,
            top_n: settings.top.or(file.top_n).unwrap_or(DEFAULT_TOP_N),
            native_token,
            unknown_dates: settings.unknown_dates,
            resolver,
            write_yaml: !settings.no_yaml,
        })
    }

    /// Load the file config named by `settings` (or the default path) and
    /// resolve against today's date.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let file = match &settings.config {
            Some(path) => LedgerConfig::load_from(path, true)?,
            None => LedgerConfig::load_from(&LedgerConfig::default_path(), false)?,
        };
        Self::resolve(settings, file, DateResolver::today())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
