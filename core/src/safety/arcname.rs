use crate::error::{BundleError, BundleResult};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path};

/// A normalized archive entry name.
///
/// Forward slashes only, relative, no empty, `.` or `..` segments and no
/// drive-letter prefix. Directory names keep a single trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArcName(String);

impl ArcName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_dir(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Name with any directory marker removed.
    pub fn trimmed(&self) -> &str {
        self.0.trim_end_matches('/')
    }

    pub fn file_name(&self) -> &str {
        let t = self.trimmed();
        t.rsplit('/').next().unwrap_or(t)
    }

    /// Containing directory inside the archive namespace, `""` at top level.
    pub fn parent_dir(&self) -> &str {
        let t = self.trimmed();
        match t.rfind('/') {
            Some(i) => &t[..i],
            None => "",
        }
    }

    pub fn as_dir(&self) -> ArcName {
        if self.is_dir() {
            self.clone()
        } else {
            ArcName(format!("{}/", self.0))
        }
    }

    pub fn is_top_level(&self) -> bool {
        !self.trimmed().contains('/')
    }

    /// Builds an entry name from a filesystem path relative to a bundle root.
    pub fn from_relative_path(rel: &Path, is_dir: bool) -> BundleResult<ArcName> {
        let mut parts: Vec<String> = Vec::new();
        for c in rel.components() {
            match c {
                Component::Normal(p) => parts.push(p.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => {
                    return Err(BundleError::unsafe_name(
                        &rel.to_string_lossy(),
                        "path is not relative to the bundle root",
                    ))
                }
            }
        }
        let mut raw = parts.join("/");
        if is_dir {
            raw.push('/');
        }
        normalize(&raw)
    }
}

impl fmt::Display for ArcName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArcName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ArcName {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

fn is_drive_prefix(segment: &str) -> bool {
    let b = segment.as_bytes();
    b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}

/// Normalizes a raw entry name, rejecting traversal, absolute and drive forms.
///
/// Pure; performs no filesystem access.
pub fn normalize(raw: &str) -> BundleResult<ArcName> {
    if raw.is_empty() {
        return Err(BundleError::unsafe_name(raw, "empty name"));
    }
    if raw.contains('\0') {
        return Err(BundleError::unsafe_name(raw, "contains NUL byte"));
    }

    let is_dir = raw.ends_with('/') || raw.ends_with('\\');
    let body = raw.trim_end_matches(['/', '\\']);
    if body.is_empty() {
        return Err(BundleError::unsafe_name(raw, "absolute path"));
    }

    let mut out: Vec<&str> = Vec::new();
    for (i, seg) in body.split(['/', '\\']).enumerate() {
        if i == 0 && is_drive_prefix(seg) {
            return Err(BundleError::unsafe_name(raw, "drive-letter prefix"));
        }
        if seg.trim().is_empty() {
            let reason = if i == 0 { "absolute path" } else { "empty segment" };
            return Err(BundleError::unsafe_name(raw, reason));
        }
        match seg {
            ".." => return Err(BundleError::unsafe_name(raw, "parent traversal")),
            "." => continue,
            s => out.push(s),
        }
    }
    if out.is_empty() {
        return Err(BundleError::unsafe_name(raw, "name has no segments"));
    }

    let mut name = out.join("/");
    if is_dir {
        name.push('/');
    }
    Ok(ArcName(name))
}

/// Resolves a POSIX path from a document stored at `base_dir` inside the
/// archive namespace. `..` may climb toward the archive root but never past it.
pub fn resolve_in_archive(base_dir: &str, rel: &str) -> BundleResult<ArcName> {
    if rel.starts_with('/') || rel.starts_with('\\') {
        return Err(BundleError::IndexReference(format!(
            "{} is absolute and cannot be resolved inside the archive",
            rel
        )));
    }
    let mut stack: Vec<&str> = base_dir
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    for seg in rel.split(['/', '\\']) {
        match seg {
            "" | "." => {}
            ".." => {
                if stack.pop().is_none() {
                    return Err(BundleError::IndexReference(format!(
                        "{} climbs above the archive root",
                        rel
                    )));
                }
            }
            s => stack.push(s),
        }
    }
    normalize(&stack.join("/"))
}
