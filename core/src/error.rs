use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsafeName,
    Containment,
    NameCollision,
    MissingRequiredFile,
    HashMismatch,
    SizeMismatch,
    IndexReference,
    InvalidInput,
    Io,
    Json,
    Zip,
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("unsafe entry name {name:?}: {reason}")]
    UnsafeName { name: String, reason: String },

    #[error("{} escapes {}", candidate.display(), root.display())]
    Containment { candidate: PathBuf, root: PathBuf },

    #[error("entry name {0} is already used by another file")]
    NameCollision(String),

    #[error("required file missing: {0}")]
    MissingRequiredFile(String),

    #[error("sha256 mismatch for {name} (expected {expected}, got {actual})")]
    HashMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("size mismatch for {name} (expected {expected}, got {actual})")]
    SizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    #[error("index reference {0}")]
    IndexReference(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("zip error: {0}")]
    Zip(String),
}

impl BundleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BundleError::UnsafeName { .. } => ErrorKind::UnsafeName,
            BundleError::Containment { .. } => ErrorKind::Containment,
            BundleError::NameCollision(_) => ErrorKind::NameCollision,
            BundleError::MissingRequiredFile(_) => ErrorKind::MissingRequiredFile,
            BundleError::HashMismatch { .. } => ErrorKind::HashMismatch,
            BundleError::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            BundleError::IndexReference(_) => ErrorKind::IndexReference,
            BundleError::InvalidInput(_) => ErrorKind::InvalidInput,
            BundleError::Io(_) => ErrorKind::Io,
            BundleError::Json(_) => ErrorKind::Json,
            BundleError::Zip(_) => ErrorKind::Zip,
        }
    }

    pub(crate) fn unsafe_name(name: &str, reason: &str) -> Self {
        BundleError::UnsafeName {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for BundleError {
    fn from(e: zip::result::ZipError) -> Self {
        BundleError::Zip(e.to_string())
    }
}

pub type BundleResult<T> = Result<T, BundleError>;
