//! Session reports with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::TrialResult;
use crate::scoring::{summarize, Summary};

/// A snapshot of one session's results and aggregate scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// Session the results came from.
    pub session_id: String,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Section the session was restricted to, if any.
    #[serde(default)]
    pub section_filter: Option<String>,
    pub results: Vec<TrialResult>,
    pub summary: Summary,
}

impl SessionReport {
    /// Build a report, computing the summary from `results`.
    pub fn new(
        session_id: impl Into<String>,
        section_filter: Option<String>,
        results: Vec<TrialResult>,
    ) -> Self {
        let summary = summarize(&results);
        Self {
            id: Uuid::new_v4(),
            session_id: session_id.into(),
            created_at: Utc::now(),
            section_filter,
            results,
            summary,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
