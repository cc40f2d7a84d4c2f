use crate::error::{BundleError, BundleResult};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

const MAX_SYMLINK_HOPS: usize = 40;

enum Step {
    Root(OsString),
    Parent,
    Name(OsString),
}

fn steps_of(p: &Path) -> Vec<Step> {
    p.components()
        .filter_map(|c| match c {
            Component::Prefix(_) | Component::RootDir => Some(Step::Root(c.as_os_str().into())),
            Component::CurDir => None,
            Component::ParentDir => Some(Step::Parent),
            Component::Normal(n) => Some(Step::Name(n.into())),
        })
        .collect()
}

/// Resolves symlinks and `..` for a path that may not exist yet.
///
/// Components are walked left to right like `realpath -m`: each existing
/// symlink is replaced by its target before the next component is applied,
/// and `..` pops the already-resolved prefix. Missing components are taken
/// as plain names.
pub fn resolve_path(p: &Path) -> BundleResult<PathBuf> {
    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    let mut pending: Vec<Step> = steps_of(&abs);
    pending.reverse();
    let mut resolved = PathBuf::new();
    let mut hops = 0usize;

    while let Some(step) = pending.pop() {
        match step {
            Step::Root(r) => resolved.push(r),
            Step::Parent => {
                resolved.pop();
            }
            Step::Name(name) => {
                let next = resolved.join(&name);
                let is_link = fs::symlink_metadata(&next)
                    .map(|md| md.file_type().is_symlink())
                    .unwrap_or(false);
                if !is_link {
                    resolved = next;
                    continue;
                }
                hops += 1;
                if hops > MAX_SYMLINK_HOPS {
                    return Err(BundleError::Io(io::Error::new(
                        io::ErrorKind::Other,
                        format!("too many symlinks resolving {}", p.display()),
                    )));
                }
                let target = fs::read_link(&next)?;
                if target.is_absolute() {
                    resolved = PathBuf::new();
                }
                pending.extend(steps_of(&target).into_iter().rev());
            }
        }
    }
    Ok(resolved)
}

/// Fails unless `candidate` lies at or below `root` once both are resolved.
pub fn containment_check(candidate: &Path, root: &Path) -> BundleResult<()> {
    resolve_within(candidate, root).map(|_| ())
}

/// Like [`containment_check`] but returns the resolved candidate path.
pub fn resolve_within(candidate: &Path, root: &Path) -> BundleResult<PathBuf> {
    let root_resolved = resolve_path(root)?;
    let resolved = resolve_path(candidate)?;
    if resolved.starts_with(&root_resolved) {
        Ok(resolved)
    } else {
        Err(BundleError::Containment {
            candidate: candidate.to_path_buf(),
            root: root.to_path_buf(),
        })
    }
}
