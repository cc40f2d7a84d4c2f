use crate::error::BundleResult;
use crate::manifest::digest::sha256_reader;
use crate::manifest::{Manifest, ManifestFile, MANIFEST_VERSION};
use crate::packager::file_set::{EntrySource, ResolvedEntry, ResolvedFileSet};
use crate::safety::ArcName;
use std::fs;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Accumulates manifest records in archive order.
pub struct ManifestBuilder {
    index_path: String,
    dashboard_html: String,
    files: Vec<ManifestFile>,
}

impl ManifestBuilder {
    pub fn new(index_path: &ArcName, dashboard_html: &ArcName) -> Self {
        Self {
            index_path: index_path.to_string(),
            dashboard_html: dashboard_html.to_string(),
            files: Vec::new(),
        }
    }

    /// Hashes every entry of `set` from its source and returns the manifest.
    pub fn build(
        index_path: &ArcName,
        dashboard_html: &ArcName,
        set: &ResolvedFileSet,
    ) -> BundleResult<Manifest> {
        let mut b = Self::new(index_path, dashboard_html);
        for entry in set.iter() {
            b.add_entry(entry)?;
        }
        Ok(b.finish())
    }

    /// Hashes one entry from its source. Size and mtime come from metadata.
    pub fn add_entry(&mut self, entry: &ResolvedEntry) -> BundleResult<()> {
        let mut reader = entry.source.open()?;
        let (sha256, streamed) = sha256_reader(&mut reader)?;
        let (size, mtime) = match &entry.source {
            EntrySource::File(p) => file_stat(p),
            EntrySource::Embedded { .. } => (streamed, String::new()),
        };
        self.files.push(ManifestFile {
            path: entry.name.to_string(),
            size_bytes: Some(size),
            mtime_utc: mtime,
            sha256,
        });
        Ok(())
    }

    /// Records a digest taken while the entry was streamed into the archive.
    pub fn record_written(
        &mut self,
        entry: &ResolvedEntry,
        sha256: String,
        bytes_written: u64,
    ) {
        let mtime = match &entry.source {
            EntrySource::File(p) => file_stat(p).1,
            EntrySource::Embedded { .. } => String::new(),
        };
        self.files.push(ManifestFile {
            path: entry.name.to_string(),
            size_bytes: Some(bytes_written),
            mtime_utc: mtime,
            sha256,
        });
    }

    pub fn finish(self) -> Manifest {
        let total_bytes = self.files.iter().map(|f| f.size_bytes.unwrap_or(0)).sum();
        Manifest {
            manifest_version: MANIFEST_VERSION,
            generated_utc: now_rfc3339_utc(),
            index_path: self.index_path,
            dashboard_html: self.dashboard_html,
            file_count: self.files.len() as u64,
            total_bytes,
            files: self.files,
        }
    }
}

/// Best effort: unreadable metadata yields (0, "").
fn file_stat(path: &Path) -> (u64, String) {
    match fs::metadata(path) {
        Ok(md) => {
            let mtime = md
                .modified()
                .ok()
                .and_then(|t| OffsetDateTime::from(t).format(&Rfc3339).ok())
                .unwrap_or_default();
            (md.len(), mtime)
        }
        Err(_) => (0, String::new()),
    }
}

pub(crate) fn now_rfc3339_utc() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
