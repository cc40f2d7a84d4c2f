//! Bundle assembly: index, dashboard, reports and optional extras into one ZIP.

pub mod file_set;
pub mod plan;
pub mod schema;

use crate::archive::BundleWriter;
use crate::diagnostics::DiagnosticLog;
use crate::error::{BundleError, BundleResult};
use crate::manifest::digest::HashingReader;
use crate::manifest::{Manifest, ManifestBuilder, DEFAULT_MANIFEST_NAME};
use crate::safety::resolve_path;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub use file_set::{EntrySource, ResolvedEntry, ResolvedFileSet};
pub use plan::{plan_bundle, BundlePlan};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PackOptions {
    pub include_assets: bool,
    pub include_manifest: bool,
    pub include_schema: bool,
    pub manifest_name: String,
    /// Schema file to copy instead of the one shipped with the library.
    pub schema_source: Option<PathBuf>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            include_assets: true,
            include_manifest: true,
            include_schema: false,
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            schema_source: None,
        }
    }
}

impl PackOptions {
    pub fn with_assets(mut self, on: bool) -> Self {
        self.include_assets = on;
        self
    }

    pub fn with_manifest(mut self, on: bool) -> Self {
        self.include_manifest = on;
        self
    }

    pub fn with_schema(mut self, on: bool) -> Self {
        self.include_schema = on;
        self
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn with_schema_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_source = Some(path.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct PackOutcome {
    /// File entries written, manifest included.
    pub file_count: usize,
    pub dir_count: usize,
    pub manifest: Option<Manifest>,
    pub log: Vec<String>,
}

/// Builds `out_zip` from the index at `index_path`.
///
/// The archive is assembled in a temporary file beside `out_zip` and only
/// moved into place once complete; on any error nothing is left behind.
pub fn create_bundle(
    index_path: &Path,
    out_zip: &Path,
    opts: &PackOptions,
) -> BundleResult<PackOutcome> {
    let mut log = DiagnosticLog::new();
    let plan = plan_bundle(index_path, opts, &mut log)?;

    let out_resolved = resolve_path(out_zip)?;
    if plan
        .files
        .iter()
        .any(|e| matches!(&e.source, EntrySource::File(p) if *p == out_resolved))
    {
        return Err(BundleError::InvalidInput(format!(
            "output {} would be bundled into itself",
            out_zip.display()
        )));
    }

    let out_parent = match out_resolved.parent() {
        Some(p) => p.to_path_buf(),
        None => {
            return Err(BundleError::InvalidInput(format!(
                "output {} has no parent directory",
                out_zip.display()
            )))
        }
    };
    fs::create_dir_all(&out_parent)?;
    let tmp = NamedTempFile::new_in(&out_parent)?;

    let written = write_plan(&plan, tmp.as_file(), &mut log)?;
    tmp.persist(&out_resolved)
        .map_err(|e| BundleError::Io(e.error))?;

    let file_count = written.files + usize::from(written.manifest.is_some());
    log.info(format!(
        "wrote {} files and {} directories from {} to {}",
        file_count,
        plan.dirs.len(),
        plan.base_dir.display(),
        out_zip.display()
    ));

    Ok(PackOutcome {
        file_count,
        dir_count: plan.dirs.len(),
        manifest: written.manifest,
        log: log.into_lines(),
    })
}

#[derive(Debug)]
struct Written {
    files: usize,
    manifest: Option<Manifest>,
}

/// Writes directories, files, then the manifest last.
///
/// Each file is hashed as it streams into the archive, so manifest records
/// always describe the bytes actually stored. An optional entry whose source
/// cannot be opened is skipped with a warning and left out of the manifest.
fn write_plan(
    plan: &BundlePlan,
    out: &fs::File,
    log: &mut DiagnosticLog,
) -> BundleResult<Written> {
    let mut writer = BundleWriter::new(out)?;
    for d in &plan.dirs {
        writer.add_directory(d)?;
    }

    let mut builder = plan
        .manifest_name
        .as_ref()
        .map(|_| ManifestBuilder::new(&plan.index_name, &plan.dashboard_name));

    let mut files = 0usize;
    for entry in plan.files.iter() {
        let source = match entry.source.open() {
            Ok(s) => s,
            Err(e) if entry.optional => {
                log.warn(format!(
                    "{} not added: cannot read {}: {}",
                    entry.name,
                    entry.source.describe(),
                    e
                ));
                continue;
            }
            Err(e) => {
                return Err(BundleError::Io(std::io::Error::new(
                    e.kind(),
                    format!("{}: {}", entry.source.describe(), e),
                )))
            }
        };
        let mut reader = HashingReader::new(source);
        writer.add_stream(&entry.name, &mut reader)?;
        let (sha256, bytes) = reader.finish();
        if let Some(b) = builder.as_mut() {
            b.record_written(entry, sha256, bytes);
        }
        files += 1;
    }

    let manifest = match (builder, &plan.manifest_name) {
        (Some(b), Some(name)) => {
            let manifest = b.finish();
            writer.add_bytes(name, &manifest.to_json_bytes()?)?;
            Some(manifest)
        }
        _ => None,
    };

    writer.finish()?;
    Ok(Written { files, manifest })
}
