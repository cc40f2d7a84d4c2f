pub mod builder;
pub mod digest;

use crate::error::{BundleError, BundleResult};
use serde::{Deserialize, Serialize};

pub use builder::ManifestBuilder;

pub const MANIFEST_VERSION: u32 = 1;
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    pub manifest_version: u32,
    pub generated_utc: String,
    pub index_path: String,
    pub dashboard_html: String,
    pub file_count: u64,
    pub total_bytes: u64,
    pub files: Vec<ManifestFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestFile {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub mtime_utc: String,
    pub sha256: String,
}

impl Manifest {
    pub fn from_slice(bytes: &[u8]) -> BundleResult<Self> {
        let m: Manifest = serde_json::from_slice(bytes)?;
        if m.manifest_version != MANIFEST_VERSION {
            return Err(BundleError::InvalidInput(format!(
                "unsupported manifest_version {}",
                m.manifest_version
            )));
        }
        Ok(m)
    }

    pub fn to_json_bytes(&self) -> BundleResult<Vec<u8>> {
        let mut out = serde_json::to_vec_pretty(self)?;
        out.push(b'\n');
        Ok(out)
    }

    pub fn recorded_total(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes.unwrap_or(0)).sum()
    }
}
