// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path manipulation utilities.
//!
//! Pure, lexical helpers for turning generator output file names into nested
//! paths. Nothing in here touches the file system.
//!
//! # Dotted File Names
//!
//! The documentation generator names each page after the fully qualified
//! module it documents, e.g., `pkg.sub.mod.rst`. A __nested path__ expresses
//! that same identity as a directory hierarchy, e.g., `pkg/sub/mod.rst`.

use std::path::{Component, Path, PathBuf};

/// Sanitize arbitrary path into a relative path free of traversal.
///
/// Treats `path` as if it were rooted at a synthetic root directory, and
/// computes its relative form from there. Double separators, `.` components,
/// and `..` components are resolved lexically. A `..` can never climb above
/// the synthetic root. Absolute paths are simply re-rooted.
///
/// Returns an empty path if the input resolves to the root itself, or if it
/// carries a platform prefix (drive letter) that cannot be expressed relative
/// to the synthetic root.
pub fn sanitize_path(path: impl AsRef<Path>) -> PathBuf {
    let mut sanitized = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::Prefix(_) => return PathBuf::new(),
            Component::RootDir => sanitized.clear(),
            Component::CurDir => continue,
            Component::ParentDir => {
                sanitized.pop();
            }
            Component::Normal(name) => sanitized.push(name),
        }
    }

    sanitized
}

/// Convert dotted generator file name into a nested path.
///
/// Only the base name of `source` is used. Every `.` in the file stem becomes
/// a path separator, and the original extension is attached to the leaf
/// unchanged. Empty dot segments are dropped.
///
/// Does not decide whether the result should be an index page. See
/// [`DestinationResolver`](crate::resolve::DestinationResolver) for that.
pub fn nested_file_name(source: impl AsRef<Path>) -> PathBuf {
    let source = source.as_ref();
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = source
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned());

    let mut segments = stem.split('.').filter(|segment| !segment.is_empty()).collect::<Vec<_>>();
    let leaf = segments.pop().unwrap_or_default();

    let mut nested = segments.into_iter().collect::<PathBuf>();
    match extension {
        Some(extension) => nested.push(format!("{leaf}.{extension}")),
        None => nested.push(leaf),
    }

    nested
}

/// Strip the extension from the leaf of a nested path.
///
/// Since nested paths never contain `.` outside of the extension separator,
/// this yields the directory path that the page would belong to if it were a
/// package index.
pub fn strip_extension(nested: impl AsRef<Path>) -> PathBuf {
    let nested = nested.as_ref();
    match nested.file_stem() {
        Some(stem) => nested.with_file_name(stem),
        None => nested.to_path_buf(),
    }
}

/// Replace top-level component of a nested path.
///
/// Turns `pkg/a/b.rst` into `<name>/a/b.rst`. A single-component path is kept
/// whole and placed under `name`.
pub fn replace_top_level(nested: impl AsRef<Path>, name: impl AsRef<Path>) -> PathBuf {
    let mut components = nested.as_ref().components();
    let rest = match components.clone().count() {
        0 | 1 => nested.as_ref().to_path_buf(),
        _ => {
            components.next();
            components.as_path().to_path_buf()
        }
    };

    name.as_ref().join(rest)
}
