//! Bundle verification: entry-name safety, manifest hashes, index references.
//!
//! Findings are accumulated in the diagnostic log so one pass reports every
//! mismatch. Only a container that cannot be opened at all is an `Err`.

pub mod locate;

use crate::archive::{list_entries, open_archive};
use crate::diagnostics::DiagnosticLog;
use crate::error::{BundleError, BundleResult, ErrorKind};
use crate::index::BundleIndex;
use crate::manifest::digest::sha256_reader;
use crate::manifest::{Manifest, DEFAULT_MANIFEST_NAME};
use crate::safety::{normalize, resolve_in_archive, ArcName};
use locate::{locate_index, locate_manifest, EntryMap};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerifyOptions {
    pub check_hashes: bool,
    pub check_index: bool,
    pub manifest_name: String,
    pub index_name: Option<String>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            check_hashes: true,
            check_index: true,
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            index_name: None,
        }
    }
}

impl VerifyOptions {
    pub fn with_hashes(mut self, on: bool) -> Self {
        self.check_hashes = on;
        self
    }

    pub fn with_index(mut self, on: bool) -> Self {
        self.check_index = on;
        self
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyReport {
    pub ok: bool,
    pub log: Vec<String>,
    /// Manifest records whose bytes were hashed.
    pub entries_checked: usize,
    /// Entry names that failed a size or hash comparison, or are missing.
    pub mismatches: Vec<String>,
}

struct Session {
    zip: ZipArchive<File>,
    entries: EntryMap,
    log: DiagnosticLog,
    entries_checked: usize,
    mismatches: Vec<String>,
}

pub fn verify_bundle(bundle_zip: &Path, opts: &VerifyOptions) -> BundleResult<VerifyReport> {
    let manifest_name = normalize(&opts.manifest_name)?;
    let mut zip = open_archive(bundle_zip)?;
    let mut log = DiagnosticLog::new();
    log.info(format!("verifying {}", bundle_zip.display()));

    let listed = match list_entries(&mut zip) {
        Ok(l) => l,
        Err(e) if e.kind() == ErrorKind::UnsafeName => {
            log.error(format!("archive rejected: {}", e));
            return Ok(VerifyReport {
                ok: false,
                log: log.into_lines(),
                entries_checked: 0,
                mismatches: Vec::new(),
            });
        }
        Err(e) => return Err(e),
    };

    let mut entries = EntryMap::new();
    for e in &listed {
        if entries.insert(e.name.clone(), e.index).is_some() {
            log.error(format!("duplicate entry name {} (stored as {:?})", e.name, e.raw_name));
        }
    }
    log.info(format!("{} entries, all names safe", listed.len()));

    let mut s = Session {
        zip,
        entries,
        log,
        entries_checked: 0,
        mismatches: Vec::new(),
    };

    let manifest_entry = locate_manifest(&s.entries, &manifest_name, opts.index_name.as_deref());
    let manifest = match &manifest_entry {
        Some(name) => s.load_manifest(name, opts.check_hashes),
        None => None,
    };

    if opts.check_hashes {
        match (&manifest_entry, &manifest) {
            (None, _) => s.log.error(format!(
                "hash check requested but no manifest {} in archive",
                manifest_name
            )),
            (Some(_), None) => {}
            (Some(name), Some(m)) => s.check_hashes(name, m),
        }
    }

    if opts.check_index {
        match locate_index(
            &s.entries,
            opts.index_name.as_deref(),
            manifest.as_ref(),
            manifest_entry.as_ref(),
        ) {
            Some(name) => s.check_index(&name),
            None => s
                .log
                .error("index check requested but no index document found in archive"),
        }
    }

    let ok = !s.log.has_errors();
    if ok {
        s.log.info("bundle verified");
    } else {
        let n = s.log.error_count();
        s.log.info(format!("bundle failed verification with {} errors", n));
    }
    Ok(VerifyReport {
        ok,
        log: s.log.into_lines(),
        entries_checked: s.entries_checked,
        mismatches: s.mismatches,
    })
}

impl Session {
    fn read_entry(&mut self, name: &ArcName) -> BundleResult<Vec<u8>> {
        let idx = *self
            .entries
            .get(name)
            .ok_or_else(|| BundleError::MissingRequiredFile(name.to_string()))?;
        let mut f = self
            .zip
            .by_index(idx)
            .map_err(|e| BundleError::Zip(e.to_string()))?;
        let mut out = Vec::new();
        f.read_to_end(&mut out)?;
        Ok(out)
    }

    /// Parses the manifest; a bad one is only an error when hashes depend on it.
    fn load_manifest(&mut self, name: &ArcName, required: bool) -> Option<Manifest> {
        let parsed = self
            .read_entry(name)
            .and_then(|bytes| Manifest::from_slice(&bytes));
        match parsed {
            Ok(m) => {
                self.log.info(format!("manifest {} lists {} files", name, m.files.len()));
                Some(m)
            }
            Err(e) => {
                let msg = format!("manifest {} unreadable: {}", name, e);
                if required {
                    self.log.error(msg);
                } else {
                    self.log.warn(msg);
                }
                None
            }
        }
    }

    fn mismatch(&mut self, name: &str, msg: String) {
        self.log.error(msg);
        if !self.mismatches.iter().any(|m| m == name) {
            self.mismatches.push(name.to_string());
        }
    }

    fn check_hashes(&mut self, manifest_name: &ArcName, m: &Manifest) {
        if m.file_count != m.files.len() as u64 {
            self.log.error(format!(
                "manifest file_count {} disagrees with {} records",
                m.file_count,
                m.files.len()
            ));
        }
        if m.total_bytes != m.recorded_total() {
            self.log.warn(format!(
                "manifest total_bytes {} disagrees with record sum {}",
                m.total_bytes,
                m.recorded_total()
            ));
        }

        let mut covered: Vec<ArcName> = vec![manifest_name.clone()];
        for rec in &m.files {
            let name = match normalize(&rec.path) {
                Ok(n) => n,
                Err(e) => {
                    self.mismatch(&rec.path, format!("manifest record rejected: {}", e));
                    continue;
                }
            };
            covered.push(name.clone());
            let Some(&idx) = self.entries.get(&name) else {
                let err = BundleError::MissingRequiredFile(name.to_string());
                self.mismatch(name.as_str(), format!("manifest entry: {}", err));
                continue;
            };

            let opened = self.zip.by_index(idx).map(|mut f| {
                let size = f.size();
                (size, sha256_reader(&mut f))
            });
            let (actual_size, digest) = match opened {
                Ok(v) => v,
                Err(e) => {
                    self.mismatch(name.as_str(), format!("cannot open {}: {}", name, e));
                    continue;
                }
            };
            self.entries_checked += 1;

            if let Some(expected) = rec.size_bytes {
                if expected != actual_size {
                    let err = BundleError::SizeMismatch {
                        name: name.to_string(),
                        expected,
                        actual: actual_size,
                    };
                    self.mismatch(name.as_str(), err.to_string());
                }
            }
            match digest {
                Ok((actual, _)) if actual.eq_ignore_ascii_case(rec.sha256.trim()) => {}
                Ok((actual, _)) => {
                    let err = BundleError::HashMismatch {
                        name: name.to_string(),
                        expected: rec.sha256.clone(),
                        actual,
                    };
                    self.mismatch(name.as_str(), err.to_string());
                }
                Err(e) => {
                    self.mismatch(name.as_str(), format!("cannot read {}: {}", name, e));
                }
            }
        }

        let uncovered: Vec<String> = self
            .entries
            .keys()
            .filter(|n| !n.is_dir() && !covered.contains(n))
            .map(|n| n.to_string())
            .collect();
        for n in uncovered {
            self.log.warn(format!("{} is not listed in the manifest", n));
        }
        self.log.info(format!("{} manifest records hashed", self.entries_checked));
    }

    fn check_index(&mut self, index_name: &ArcName) {
        let index = match self
            .read_entry(index_name)
            .and_then(|bytes| BundleIndex::from_slice(&bytes))
        {
            Ok(i) => i,
            Err(e) => {
                self.log.error(format!("index {} unreadable: {}", index_name, e));
                return;
            }
        };
        let base = index_name.parent_dir().to_string();
        self.log.info(format!("checking references of {}", index_name));

        self.require_reference(&base, &index.dashboard_html, "dashboard");
        for report in &index.reports {
            if report.status.is_required() {
                self.require_reference(&base, &report.report_html, "report");
            } else if self.lookup_reference(&base, &report.report_html).is_none() {
                self.log.info(format!(
                    "failed report {} not in archive (not required)",
                    report.report_html
                ));
            }
        }
    }

    fn lookup_reference(&self, base: &str, rel: &str) -> Option<ArcName> {
        let name = resolve_in_archive(base, rel).ok()?;
        self.entries.contains_key(&name).then_some(name)
    }

    fn require_reference(&mut self, base: &str, rel: &str, what: &str) {
        match resolve_in_archive(base, rel) {
            Ok(name) if self.entries.contains_key(&name) => {}
            Ok(name) => {
                let err = BundleError::IndexReference(format!("{} {} missing", what, name));
                self.log.error(err.to_string());
            }
            Err(e) => self.log.error(format!("{} {}: {}", what, rel, e)),
        }
    }
}
