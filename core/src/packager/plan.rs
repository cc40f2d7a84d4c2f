use crate::assets;
use crate::diagnostics::DiagnosticLog;
use crate::error::{BundleError, BundleResult};
use crate::index::{BundleIndex, ReportStatus};
use crate::packager::file_set::{EntrySource, ResolvedFileSet};
use crate::packager::schema::{schema_source, SCHEMA_DIR};
use crate::packager::PackOptions;
use crate::safety::{normalize, resolve_path, resolve_within, ArcName};
use std::path::{Path, PathBuf};

/// Everything the packager will write, decided before the archive is opened.
#[derive(Debug)]
pub struct BundlePlan {
    pub base_dir: PathBuf,
    pub index_name: ArcName,
    pub dashboard_name: ArcName,
    pub dirs: Vec<ArcName>,
    pub files: ResolvedFileSet,
    pub manifest_name: Option<ArcName>,
}

pub fn plan_bundle(
    index_path: &Path,
    opts: &PackOptions,
    log: &mut DiagnosticLog,
) -> BundleResult<BundlePlan> {
    if !index_path.is_file() {
        return Err(BundleError::MissingRequiredFile(
            index_path.display().to_string(),
        ));
    }
    let index_abs = resolve_path(index_path)?;
    let base_dir = index_abs
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| BundleError::InvalidInput("index has no parent directory".to_string()))?;
    let index = BundleIndex::load(&index_abs)?;
    log.info(format!("index {} (base {})", index_abs.display(), base_dir.display()));

    let mut files = ResolvedFileSet::new();
    let index_name = arcname_under(&base_dir, &index_abs, false)?;
    files.insert(index_name.clone(), EntrySource::File(index_abs.clone()));

    let dashboard = resolve_required(&base_dir, &index.dashboard_html, log)?;
    if !dashboard.is_file() {
        return Err(BundleError::MissingRequiredFile(index.dashboard_html.clone()));
    }
    let dashboard_name = arcname_under(&base_dir, &dashboard, false)?;
    insert_logged(&mut files, dashboard_name.clone(), &dashboard, false, log);

    let mut dirs: Vec<ArcName> = Vec::new();
    let mut html_files = vec![index_abs.clone(), dashboard.clone()];
    for report in &index.reports {
        let outdir = resolve_required(&base_dir, &report.outdir, log)?;
        if outdir != base_dir {
            let d = arcname_under(&base_dir, &outdir, true)?;
            if !dirs.contains(&d) {
                dirs.push(d);
            }
        }

        let Some(html) = report_source(&base_dir, &report.report_html, report.status, log)? else {
            continue;
        };
        let name = arcname_under(&base_dir, &html, false)?;
        // Partial output of a failed report is best effort, like assets.
        let optional = !report.status.is_required();
        insert_logged(&mut files, name, &html, optional, log);
        html_files.push(html);
    }

    if opts.include_assets {
        match assets::discover(&html_files, &base_dir) {
            Ok(found) => {
                let mut added = 0usize;
                for asset in found {
                    match arcname_under(&base_dir, &asset, false) {
                        Ok(name) => {
                            if files.insert_optional(name, EntrySource::File(asset)) {
                                added += 1;
                            }
                        }
                        Err(e) => log.warn(format!("asset skipped: {}", e)),
                    }
                }
                log.info(format!("{} local assets added", added));
            }
            Err(e) => log.warn(format!("asset discovery skipped: {}", e)),
        }
    }

    if opts.include_schema {
        match schema_source(opts.schema_source.as_ref()) {
            Ok((file_name, source)) => {
                match normalize(&format!("{}/{}", SCHEMA_DIR, file_name)) {
                    Ok(name) => {
                        if files.insert_optional(name.clone(), source) {
                            log.info(format!("schema added as {}", name));
                        } else {
                            log.warn(format!("schema not added: {} already in bundle", name));
                        }
                    }
                    Err(e) => log.warn(format!("schema not added: {}", e)),
                }
            }
            Err(msg) => log.warn(format!("schema not added: {}", msg)),
        }
    }

    let manifest_name = if opts.include_manifest {
        let name = normalize(&opts.manifest_name)?;
        if name.is_dir() {
            return Err(BundleError::InvalidInput(format!(
                "manifest name {} names a directory",
                name
            )));
        }
        if files.contains(&name) {
            return Err(BundleError::NameCollision(name.to_string()));
        }
        Some(name)
    } else {
        None
    };

    Ok(BundlePlan {
        base_dir,
        index_name,
        dashboard_name,
        dirs,
        files,
        manifest_name,
    })
}

/// Resolves an index path field against the base directory; escaping it is fatal.
fn resolve_required(base_dir: &Path, rel: &str, log: &mut DiagnosticLog) -> BundleResult<PathBuf> {
    if Path::new(rel).is_absolute() {
        log.warn(format!(
            "{} is absolute; the bundle will not resolve it after extraction",
            rel
        ));
    }
    resolve_within(&base_dir.join(rel), base_dir)
}

/// Picks the report file to bundle, if any.
///
/// `ok`/`skipped` reports must exist and stay inside the base directory.
/// `error` reports are included only when a contained file is present.
fn report_source(
    base_dir: &Path,
    rel: &str,
    status: ReportStatus,
    log: &mut DiagnosticLog,
) -> BundleResult<Option<PathBuf>> {
    if status.is_required() {
        let html = resolve_required(base_dir, rel, log)?;
        if !html.is_file() {
            return Err(BundleError::MissingRequiredFile(rel.to_string()));
        }
        return Ok(Some(html));
    }

    if rel.trim().is_empty() {
        return Ok(None);
    }
    let candidate = base_dir.join(rel);
    if !candidate.is_file() {
        return Ok(None);
    }
    match resolve_within(&candidate, base_dir) {
        Ok(html) => {
            log.info(format!("including partial output of failed report {}", rel));
            Ok(Some(html))
        }
        Err(_) => {
            log.warn(format!("failed report {} lies outside the base directory", rel));
            Ok(None)
        }
    }
}

fn arcname_under(base_dir: &Path, resolved: &Path, is_dir: bool) -> BundleResult<ArcName> {
    let rel = resolved
        .strip_prefix(base_dir)
        .map_err(|_| BundleError::Containment {
            candidate: resolved.to_path_buf(),
            root: base_dir.to_path_buf(),
        })?;
    ArcName::from_relative_path(rel, is_dir)
}

fn insert_logged(
    files: &mut ResolvedFileSet,
    name: ArcName,
    src: &Path,
    optional: bool,
    log: &mut DiagnosticLog,
) {
    let source = EntrySource::File(src.to_path_buf());
    let inserted = if optional {
        files.insert_optional(name.clone(), source)
    } else {
        files.insert(name.clone(), source)
    };
    if !inserted {
        log.info(format!("{} already bundled; keeping first occurrence", name));
    }
}
