//! Tunable ingestion and reporting settings.
//!
//! Stored as a JSON object on disk; every field is optional:
//! ```json
//! {
//!   "ingest": { "trailing_rows": "always", "repeater_markers": ["نعم"] },
//!   "optional_subjects": ["اللغة الأمازيغية"],
//!   "top_students": 5
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "CLASS_GRADES_CONFIG";

/// What to do with the last row left after trimming empty trailing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingRowPolicy {
    /// Always drop it, whatever it holds.
    Always,
    /// Drop it only when it looks like a totals/summary row.
    SummaryOnly,
    /// Keep every row.
    Never,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// How many leading rows are searched for the header.
    pub header_scan_rows: usize,
    /// Lower-case keywords marking the name column of the header row.
    pub header_keywords: Vec<String>,
    /// Values of the repeater column meaning "yes".
    pub repeater_markers: Vec<String>,
    pub default_gender: String,
    pub trailing_rows: TrailingRowPolicy,
    /// Lower-case keywords identifying a summary row.
    pub summary_keywords: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: 20,
            header_keywords: ["الاسم", "اللقب", "name", "nom", "prénom"]
                .map(String::from)
                .to_vec(),
            repeater_markers: ["نعم", "yes"].map(String::from).to_vec(),
            default_gender: "unspecified".to_string(),
            trailing_rows: TrailingRowPolicy::SummaryOnly,
            summary_keywords: ["المجموع", "المعدل", "total", "moyenne", "average"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub ingest: IngestConfig,
    /// Subjects reported by the optional-subject view.
    pub optional_subjects: Vec<String>,
    /// Size of the top-students ranking in reports.
    pub top_students: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            optional_subjects: ["اللغة الأمازيغية"].map(String::from).to_vec(),
            top_students: 10,
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid config file '{path}'"))?;
        debug!(path, "Loaded analysis config");
        Ok(config)
    }

    /// Loads from `path`, else from the file named by [`CONFIG_ENV`], else defaults.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match std::env::var(CONFIG_ENV) {
                Ok(p) if !p.is_empty() => Self::load(&p),
                _ => Ok(Self::default()),
            },
        }
    }
}
