//! Lexical path normalization.
//!
//! Dashboard UIDs and published URLs are derived from the path a file was
//! given on the command line, so `./a//b/../b/x.json` and `a/b/x.json` must
//! collapse to the same string. Nothing here touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Collapses `.` segments, repeated separators and `name/..` pairs.
///
/// Leading `..` segments of a relative path are kept, `..` directly under
/// the root is dropped, and an empty result becomes `.`.
pub fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();

    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Normalized path rendered with `/` separators, for use inside URLs.
pub fn url_path(path: impl AsRef<Path>) -> String {
    normalize_path(path)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
