pub mod reader;
pub mod writer;

pub use reader::{list_entries, open_archive, EntryInfo};
pub use writer::BundleWriter;
