//! Store-path utilities.
//!
//! All locations inside the core are plain `/`-separated strings relative to
//! the backing store's root. Keeping them as strings (rather than
//! `std::path::PathBuf`) keeps the core portable across stores that are not
//! filesystems.

use std::{
    borrow::Cow,
    path::{Component, Path},
};

/// Replace OS separators and convert to unicode (via `to_string_lossy`) on an
/// OS path, producing a store location string.
pub fn os_path_to_string<P: AsRef<Path>>(os_path_ref: P) -> String {
    os_path_ref
        .as_ref()
        .components()
        .map(|c| match c {
            Component::RootDir => Cow::from("".to_string()),
            _ => c.as_os_str().to_string_lossy(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// The directory portion of a location, without a trailing slash. Empty for
/// top-level locations.
pub fn dir_of(location: &str) -> &str {
    match location.rfind('/') {
        Some(idx) => &location[..idx],
        None => "",
    }
}

/// Join a locator onto a base directory and normalize away `.` and `..`
/// segments. A locator with a leading `/` is anchored at the store root and
/// ignores `base_dir` entirely.
pub fn join_relative(base_dir: &str, locator: &str) -> String {
    let raw = if let Some(rooted) = locator.strip_prefix('/') {
        rooted.to_string()
    } else if base_dir.is_empty() {
        locator.to_string()
    } else {
        format!("{base_dir}/{locator}")
    };
    normalize(&raw)
}

/// Collapse `.` and `..` segments. `..` past the root is dropped rather than
/// preserved; stores have no parent above their root.
pub fn normalize(location: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in location.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Extension of a location, lowercased, without the dot. `None` when the
/// filename has no extension (hidden files do not count as extensions).
pub fn extension(location: &str) -> Option<String> {
    let filename = match location.rfind('/') {
        Some(idx) => &location[idx + 1..],
        None => location,
    };
    match filename.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(filename[idx + 1..].to_lowercase()),
    }
}
