//! Typed view of the index document produced by the external reporting step.
//!
//! Only the fields the bundle engine needs are modeled. Unknown fields are
//! ignored; missing required fields are a parse error.

use crate::error::{BundleError, BundleResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Ok,
    Skipped,
    Error,
}

impl ReportStatus {
    /// `ok` and `skipped` reports are promised to exist by the reporting step.
    pub fn is_required(self) -> bool {
        matches!(self, ReportStatus::Ok | ReportStatus::Skipped)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportEntry {
    pub outdir: String,
    pub report_html: String,
    pub status: ReportStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BundleIndex {
    pub dashboard_html: String,
    pub reports: Vec<ReportEntry>,
}

impl BundleIndex {
    pub fn from_slice(bytes: &[u8]) -> BundleResult<Self> {
        let idx: BundleIndex = serde_json::from_slice(bytes)?;
        if idx.dashboard_html.trim().is_empty() {
            return Err(BundleError::InvalidInput(
                "index dashboard_html must not be empty".to_string(),
            ));
        }
        Ok(idx)
    }

    pub fn load(path: &Path) -> BundleResult<Self> {
        let bytes = fs::read(path)?;
        Self::from_slice(&bytes)
    }

    /// Reports the archive must carry.
    pub fn required_reports(&self) -> impl Iterator<Item = &ReportEntry> {
        self.reports.iter().filter(|r| r.status.is_required())
    }
}
