use crate::packager::file_set::EntrySource;
use std::path::PathBuf;

pub const INDEX_SCHEMA_FILE_NAME: &str = "report_index.schema.json";
pub const INDEX_SCHEMA_JSON: &str = include_str!("../../schemas/report_index.schema.json");

/// Archive directory that holds the schema copy.
pub const SCHEMA_DIR: &str = "schemas";

/// Picks the schema bytes shipped with the tool, or an explicit override.
///
/// `Err` carries a message for the diagnostic log; schema inclusion never
/// fails a bundle.
pub fn schema_source(override_path: Option<&PathBuf>) -> Result<(String, EntrySource), String> {
    match override_path {
        None => Ok((
            INDEX_SCHEMA_FILE_NAME.to_string(),
            EntrySource::Embedded {
                label: INDEX_SCHEMA_FILE_NAME,
                bytes: INDEX_SCHEMA_JSON.as_bytes(),
            },
        )),
        Some(p) if p.is_file() => {
            let file_name = p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| format!("schema path {} has no file name", p.display()))?;
            Ok((file_name, EntrySource::File(p.clone())))
        }
        Some(p) => Err(format!("schema file {} not found", p.display())),
    }
}
