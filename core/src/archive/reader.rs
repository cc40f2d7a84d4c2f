use crate::error::{BundleError, BundleResult};
use crate::safety::{normalize, ArcName};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Central-directory facts about one entry, with its name re-validated.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub index: usize,
    pub raw_name: String,
    pub name: ArcName,
    pub size: u64,
}

impl EntryInfo {
    pub fn is_dir(&self) -> bool {
        self.name.is_dir()
    }
}

pub fn open_archive(path: &Path) -> BundleResult<ZipArchive<File>> {
    let file = File::open(path)?;
    ZipArchive::new(file).map_err(|e| BundleError::Zip(e.to_string()))
}

/// Lists every entry, failing on the first name that does not normalize.
///
/// Names stored in an archive are untrusted regardless of who wrote it.
pub fn list_entries<R: Read + Seek>(zip: &mut ZipArchive<R>) -> BundleResult<Vec<EntryInfo>> {
    let mut out = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let f = zip
            .by_index_raw(i)
            .map_err(|e| BundleError::Zip(e.to_string()))?;
        let raw_name = f.name().to_string();
        let name = normalize(&raw_name)?;
        out.push(EntryInfo {
            index: i,
            raw_name,
            name,
            size: f.size(),
        });
    }
    Ok(out)
}
