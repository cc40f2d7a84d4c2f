//! Zip-Slip hardened extraction.
//!
//! Every entry name is re-validated before anything is written, and each
//! destination is checked against the output root again right before the
//! write.

use crate::archive::{list_entries, open_archive};
use crate::error::{BundleError, BundleResult};
use crate::manifest::digest::CHUNK_SIZE;
use crate::safety::resolve_within;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractOptions {
    /// Allow extracting into a directory that already has content.
    pub overwrite: bool,
}

impl ExtractOptions {
    pub fn with_overwrite(mut self, on: bool) -> Self {
        self.overwrite = on;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractOutcome {
    pub files_written: usize,
    pub dirs_created: usize,
    pub bytes_written: u64,
}

/// Extracts every entry of `bundle_zip` under `out_dir`.
///
/// An unsafe name or an escaping destination aborts the whole extraction.
pub fn safe_extract(bundle_zip: &Path, out_dir: &Path) -> BundleResult<ExtractOutcome> {
    let mut zip = open_archive(bundle_zip)?;
    let entries = list_entries(&mut zip)?;

    fs::create_dir_all(out_dir)?;
    let mut outcome = ExtractOutcome::default();

    for entry in &entries {
        let dest = resolve_within(&out_dir.join(entry.name.trimmed()), out_dir)?;

        if entry.is_dir() {
            fs::create_dir_all(&dest)?;
            outcome.dirs_created += 1;
            continue;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut src = zip
            .by_index(entry.index)
            .map_err(|e| BundleError::Zip(e.to_string()))?;
        let mut out = BufWriter::with_capacity(CHUNK_SIZE, File::create(&dest)?);
        outcome.bytes_written += std::io::copy(&mut src, &mut out)?;
        out.flush()?;
        outcome.files_written += 1;
        tracing::debug!(entry = %entry.name, dest = %dest.display(), "extracted");
    }

    tracing::info!(
        files = outcome.files_written,
        dirs = outcome.dirs_created,
        "extracted {}",
        bundle_zip.display()
    );
    Ok(outcome)
}

/// Like [`safe_extract`], refusing a non-empty destination unless allowed.
pub fn extract_with_options(
    bundle_zip: &Path,
    out_dir: &Path,
    opts: &ExtractOptions,
) -> BundleResult<ExtractOutcome> {
    if !opts.overwrite && out_dir.exists() && fs::read_dir(out_dir)?.next().is_some() {
        return Err(BundleError::InvalidInput(format!(
            "destination {} is not empty",
            out_dir.display()
        )));
    }
    safe_extract(bundle_zip, out_dir)
}
