pub mod archive;
pub mod assets;
pub mod diagnostics;
pub mod extractor;
pub mod index;
pub mod manifest;
pub mod packager;
pub mod safety;
pub mod verifier;

pub mod error;

pub use error::{BundleError, BundleResult, ErrorKind};
pub use extractor::{extract_with_options, safe_extract, ExtractOptions, ExtractOutcome};
pub use packager::{create_bundle, PackOptions, PackOutcome};
pub use verifier::{verify_bundle, VerifyOptions, VerifyReport};
