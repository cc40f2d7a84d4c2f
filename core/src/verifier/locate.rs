use crate::manifest::Manifest;
use crate::safety::{normalize, resolve_in_archive, ArcName};
use std::collections::BTreeMap;

/// Conventional index name when nothing else points at one.
pub const CONVENTIONAL_INDEX_NAME: &str = "index.json";

pub type EntryMap = BTreeMap<ArcName, usize>;

/// Manifest by exact name, else next to a caller-supplied index hint.
pub fn locate_manifest(
    entries: &EntryMap,
    manifest_name: &ArcName,
    index_hint: Option<&str>,
) -> Option<ArcName> {
    if entries.contains_key(manifest_name) {
        return Some(manifest_name.clone());
    }
    let hint = normalize(index_hint?).ok()?;
    let candidate = resolve_in_archive(hint.parent_dir(), manifest_name.file_name()).ok()?;
    entries.contains_key(&candidate).then_some(candidate)
}

/// Index by caller hint, then manifest `index_path`, then `index.json`,
/// then the only top-level JSON entry other than the manifest.
pub fn locate_index(
    entries: &EntryMap,
    index_hint: Option<&str>,
    manifest: Option<&Manifest>,
    manifest_name: Option<&ArcName>,
) -> Option<ArcName> {
    let hinted = [
        index_hint,
        manifest.map(|m| m.index_path.as_str()),
        Some(CONVENTIONAL_INDEX_NAME),
    ];
    for raw in hinted.into_iter().flatten() {
        if let Ok(name) = normalize(raw) {
            if entries.contains_key(&name) {
                return Some(name);
            }
        }
    }

    let mut top_level_json = entries.keys().filter(|n| {
        !n.is_dir()
            && n.is_top_level()
            && n.as_str().to_ascii_lowercase().ends_with(".json")
            && Some(*n) != manifest_name
    });
    match (top_level_json.next(), top_level_json.next()) {
        (Some(only), None) => Some(only.clone()),
        _ => None,
    }
}
