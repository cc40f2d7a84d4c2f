//! Discovery of local files referenced from generated HTML.
//!
//! Discovered assets are best effort. A reference that is missing, not a
//! regular file, or resolves outside the base directory is dropped without
//! failing the bundle.

pub mod scan;

use crate::error::BundleResult;
use crate::safety::{resolve_path, resolve_within};
use scan::CandidateScanner;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Returns the resolved paths of local files referenced by `html_files`.
pub fn discover(html_files: &[PathBuf], base_dir: &Path) -> BundleResult<BTreeSet<PathBuf>> {
    let scanner = CandidateScanner::new()?;
    let mut found = BTreeSet::new();

    for html in html_files {
        let bytes = match fs::read(html) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(
                    file = %html.display(),
                    error = %e,
                    "cannot read html for asset scan"
                );
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        let html_dir = match resolve_path(html)
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
        {
            Some(d) => d,
            None => continue,
        };

        for reference in scanner.local_references(&text) {
            let Some(candidate) = resolve_reference(&html_dir, &reference) else {
                tracing::debug!(reference = %reference, "reference does not map to a local path");
                continue;
            };
            if !candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "referenced asset not found");
                continue;
            }
            match resolve_within(&candidate, base_dir) {
                Ok(resolved) => {
                    found.insert(resolved);
                }
                Err(_) => {
                    tracing::debug!(
                        path = %candidate.display(),
                        "asset outside base directory dropped"
                    );
                }
            }
        }
    }
    Ok(found)
}

/// Resolves `reference` against the referencing file's directory.
///
/// Percent-escapes are decoded; references that turn into non-file URLs
/// yield `None`.
fn resolve_reference(html_dir: &Path, reference: &str) -> Option<PathBuf> {
    let base = Url::from_directory_path(html_dir).ok()?;
    let joined = base.join(reference).ok()?;
    if joined.scheme() != "file" {
        return None;
    }
    joined.to_file_path().ok()
}
