// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Destination resolution.
//!
//! Decide where a flat generator page should live inside the nested
//! documentation tree.
//!
//! # Package Roots
//!
//! The package root is the source directory being documented. If it is a
//! package itself, i.e., it holds an `__init__` marker, or the caller asked to
//! treat it as an implicit namespace, then the generator names its pages
//! starting with the root's own name. In that case pages are compared against
//! the parent of the package root. Otherwise they are compared against the
//! package root directly.
//!
//! # Index Pages
//!
//! A page whose nested path (minus extension) names an existing directory
//! under the comparison base documents a package, not a leaf module. Such a
//! page becomes `index.<ext>` inside that directory. This only holds when the
//! generator emits one page per package, which is why the rule lives in its
//! own function: [`landing_page`].

use crate::path::{nested_file_name, replace_top_level, strip_extension};

use std::{
    collections::HashMap,
    fs::read_dir,
    path::{Component, Path, PathBuf},
};
use tracing::debug;

/// Resolve nested destinations for generator pages.
///
/// Caches package directory checks for its own lifetime. Create one resolver
/// per run so that stale checks never leak across runs.
#[derive(Debug, Default)]
pub struct DestinationResolver {
    packages: HashMap<PathBuf, bool>,
}

impl DestinationResolver {
    /// Construct new resolver with an empty check cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve nested destination path of generator page.
    ///
    /// The returned path is relative to the directory holding the generator
    /// pages. Does not special-case the generator's own aggregate pages such
    /// as `modules.rst`. Excluding those is left to the caller.
    ///
    /// # Errors
    ///
    /// - Return [`ResolveError::ReadPackageDir`] if the package root cannot
    ///   be listed.
    pub fn resolve(
        &mut self,
        source: impl AsRef<Path>,
        package_root: impl AsRef<Path>,
        extension: &str,
        implicit_namespaces: bool,
        package_name: Option<&Path>,
    ) -> Result<PathBuf> {
        let package_root = normalize(package_root.as_ref());
        let base = if implicit_namespaces || self.is_package_dir(&package_root)? {
            comparison_parent(&package_root)
        } else {
            package_root
        };

        let nested = nested_file_name(source);
        let destination = landing_page(&base, &nested, extension).unwrap_or(nested);

        Ok(match package_name {
            Some(name) => replace_top_level(destination, name),
            None => destination,
        })
    }

    /// Check if directory is a package.
    ///
    /// A package directory holds at least one entry whose name starts with
    /// `__init__`. Checks are memoized by normalized path.
    ///
    /// # Errors
    ///
    /// - Return [`ResolveError::ReadPackageDir`] if the directory cannot be
    ///   listed.
    pub fn is_package_dir(&mut self, directory: impl AsRef<Path>) -> Result<bool> {
        let directory = normalize(directory.as_ref());
        if let Some(is_package) = self.packages.get(&directory) {
            return Ok(*is_package);
        }

        let listing = if directory.as_os_str().is_empty() {
            Path::new(".")
        } else {
            directory.as_path()
        };
        let entries = read_dir(listing).map_err(|err| ResolveError::ReadPackageDir {
            source: err,
            package_dir: directory.clone(),
        })?;

        let mut is_package = false;
        for entry in entries {
            let entry = entry.map_err(|err| ResolveError::ReadPackageDir {
                source: err,
                package_dir: directory.clone(),
            })?;
            if entry.file_name().to_string_lossy().starts_with("__init__") {
                is_package = true;
                break;
            }
        }

        debug!("{:?} is package: {is_package}", directory.display());
        self.packages.insert(directory, is_package);

        Ok(is_package)
    }
}

/// Determine landing page of package directory.
///
/// Given the nested path of a generator page, return `<dir>/index.<ext>` if
/// `<dir>`, the nested path minus its extension, is an existing directory
/// under `base`. Return [`None`] if the page documents a leaf module.
pub fn landing_page(
    base: impl AsRef<Path>,
    nested: impl AsRef<Path>,
    extension: &str,
) -> Option<PathBuf> {
    let package_dir = strip_extension(nested);
    base.as_ref()
        .join(&package_dir)
        .is_dir()
        .then(|| package_dir.join(format!("index.{extension}")))
}

// INVARIANT: Lexical only, the package root may not exist yet in dry runs.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => continue,
                _ => normalized.push(".."),
            },
            other => normalized.push(other),
        }
    }

    normalized
}

fn comparison_parent(package_root: &Path) -> PathBuf {
    match package_root.file_name() {
        Some(_) => package_root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
        None => package_root.to_path_buf(),
    }
}

/// Destination resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Package root cannot be listed.
    #[error("failed to read package directory {:?}", package_dir.display())]
    ReadPackageDir {
        #[source]
        source: std::io::Error,
        package_dir: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ResolveError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use simple_test_case::test_case;
    use std::fs::{create_dir_all, write};

    fn package_fixture() -> anyhow::Result<()> {
        create_dir_all("src/mypkg/sub")?;
        write("src/mypkg/__init__.py", "")?;
        write("src/mypkg/sub/__init__.py", "")?;
        write("src/mypkg/sub/leaf.py", "")?;
        Ok(())
    }

    #[sealed_test]
    fn resolve_against_package() -> anyhow::Result<()> {
        package_fixture()?;
        let cases = [
            ("mypkg.rst", "mypkg/index.rst"),
            ("mypkg.sub.rst", "mypkg/sub/index.rst"),
            ("mypkg.sub.leaf.rst", "mypkg/sub/leaf.rst"),
            ("docs/mypkg.sub.leaf.rst", "mypkg/sub/leaf.rst"),
        ];

        let mut resolver = DestinationResolver::new();
        for (source, expect) in cases {
            let result = resolver.resolve(source, "src/mypkg", "rst", false, None)?;
            assert_eq!(result, PathBuf::from(expect), "resolving {source:?}");
        }

        Ok(())
    }

    #[sealed_test]
    fn resolve_non_package_root_compares_against_root() -> anyhow::Result<()> {
        create_dir_all("project/tools/extra")?;
        write("project/tools/run.py", "")?;

        let mut resolver = DestinationResolver::new();
        let result = resolver.resolve("tools.rst", "project", "rst", false, None)?;
        assert_eq!(result, PathBuf::from("tools/index.rst"));

        let result = resolver.resolve("tools.run.rst", "project", "rst", false, None)?;
        assert_eq!(result, PathBuf::from("tools/run.rst"));

        Ok(())
    }

    #[sealed_test]
    fn resolve_implicit_namespace_uses_parent() -> anyhow::Result<()> {
        create_dir_all("src/nspkg/inner")?;

        let mut resolver = DestinationResolver::new();
        let result = resolver.resolve("nspkg.inner.rst", "src/nspkg/", "rst", true, None)?;
        assert_eq!(result, PathBuf::from("nspkg/inner/index.rst"));

        let result = resolver.resolve("nspkg.inner.rst", "src/nspkg/", "rst", false, None)?;
        assert_eq!(result, PathBuf::from("nspkg/inner.rst"));

        Ok(())
    }

    #[sealed_test]
    fn resolve_with_package_name() -> anyhow::Result<()> {
        package_fixture()?;
        let mut resolver = DestinationResolver::new();
        let name = Path::new("api");

        let result = resolver.resolve("mypkg.sub.leaf.rst", "src/mypkg", "rst", false, Some(name))?;
        assert_eq!(result, PathBuf::from("api/sub/leaf.rst"));

        let result = resolver.resolve("mypkg.rst", "src/mypkg", "rst", false, Some(name))?;
        assert_eq!(result, PathBuf::from("api/index.rst"));

        Ok(())
    }

    #[sealed_test]
    fn resolve_missing_package_root() {
        let mut resolver = DestinationResolver::new();
        let result = resolver.resolve("ghost.rst", "ghost", "rst", false, None);
        assert!(matches!(result, Err(ResolveError::ReadPackageDir { .. })));
    }

    #[sealed_test]
    fn package_check_is_memoized() -> anyhow::Result<()> {
        create_dir_all("pkg")?;
        let mut resolver = DestinationResolver::new();
        assert!(!resolver.is_package_dir("pkg")?);

        // Cache hit hides the new marker for the lifetime of this resolver.
        write("pkg/__init__.py", "")?;
        assert!(!resolver.is_package_dir("./pkg/")?);
        assert!(DestinationResolver::new().is_package_dir("pkg")?);

        Ok(())
    }

    #[sealed_test]
    fn landing_page_requires_directory() -> anyhow::Result<()> {
        create_dir_all("base/pkg/sub")?;
        write("base/pkg/mod", "")?;

        assert_eq!(
            landing_page("base", "pkg/sub.md", "md"),
            Some(PathBuf::from("pkg/sub/index.md"))
        );
        assert_eq!(landing_page("base", "pkg/mod.md", "md"), None);
        assert_eq!(landing_page("base", "pkg/missing.md", "md"), None);

        Ok(())
    }

    #[test_case("a/./b/", "a/b"; "current dir")]
    #[test_case("a/b/../c", "a/c"; "parent")]
    #[test_case("../a", "../a"; "leading parent kept")]
    #[test_case("/../a", "/a"; "parent of root")]
    #[test]
    fn normalize_cases(input: &str, expect: &str) {
        pretty_assertions::assert_eq!(normalize(Path::new(input)), PathBuf::from(expect));
    }
}
