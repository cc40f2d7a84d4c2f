//! Path safety for archive entry names and filesystem destinations.
//!
//! Every name written into a bundle and every name read back from one goes
//! through [`normalize`]. Filesystem paths are checked against their root
//! with [`containment_check`].

pub mod arcname;
pub mod containment;

pub use arcname::{normalize, resolve_in_archive, ArcName};
pub use containment::{containment_check, resolve_path, resolve_within};
