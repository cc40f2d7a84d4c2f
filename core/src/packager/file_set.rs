use crate::safety::ArcName;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

/// Where the bytes of an archive entry come from.
#[derive(Debug, Clone)]
pub enum EntrySource {
    File(PathBuf),
    Embedded {
        label: &'static str,
        bytes: &'static [u8],
    },
}

impl EntrySource {
    pub fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        match self {
            EntrySource::File(p) => Ok(Box::new(File::open(p)?)),
            EntrySource::Embedded { bytes, .. } => Ok(Box::new(*bytes)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            EntrySource::File(p) => p.display().to_string(),
            EntrySource::Embedded { label, .. } => format!("<embedded {}>", label),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    pub name: ArcName,
    pub source: EntrySource,
    /// Discovered assets and schema copies; dropped with a warning if unreadable.
    pub optional: bool,
}

/// Ordered, de-duplicated mapping of entry name to source.
///
/// The first insertion of a name wins; later ones are reported as duplicates.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFileSet {
    entries: Vec<ResolvedEntry>,
    names: HashSet<ArcName>,
}

impl ResolvedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when `name` was already present.
    pub fn insert(&mut self, name: ArcName, source: EntrySource) -> bool {
        self.push(name, source, false)
    }

    /// Like [`insert`](Self::insert) for entries the bundle can do without.
    pub fn insert_optional(&mut self, name: ArcName, source: EntrySource) -> bool {
        self.push(name, source, true)
    }

    fn push(&mut self, name: ArcName, source: EntrySource, optional: bool) -> bool {
        if !self.names.insert(name.clone()) {
            return false;
        }
        self.entries.push(ResolvedEntry {
            name,
            source,
            optional,
        });
        true
    }

    pub fn contains(&self, name: &ArcName) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
