// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Batch renaming of generator pages.
//!
//! Walks the flat pages that the documentation generator left in its output
//! directory, and moves each one into its nested destination.
//!
//! # Collision Policy
//!
//! A destination that already exists is never clobbered unless forcing is
//! enabled. Without forcing, the freshly generated page is removed instead,
//! so no flat copies are left lying around next to the nested tree. This is
//! the expected outcome of a rerun, not an error.
//!
//! # Dry Runs
//!
//! In dry run mode every planned move is reported, and the file system is not
//! modified at all.

use crate::resolve::{DestinationResolver, ResolveError};

use glob::Pattern;
use std::{
    collections::BTreeSet,
    fs::{remove_file, rename},
    path::{Path, PathBuf},
};
use tracing::{debug, info, info_span, warn, Span};

/// Options for batch renaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOptions {
    /// Name of top-level directory to put package pages in.
    ///
    /// Derived from the package root and page names if [`None`].
    pub package_name: Option<PathBuf>,

    /// Extension of generator pages, without leading ".".
    pub extension: String,

    /// Treat package root as a package even without an `__init__` marker.
    pub implicit_namespaces: bool,

    /// Report planned moves without touching the file system.
    pub dry_run: bool,

    /// Replace existing destinations.
    pub force: bool,

    /// Page stems that must never be moved.
    pub excluded_files: BTreeSet<String>,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            package_name: None,
            extension: "rst".into(),
            implicit_namespaces: false,
            dry_run: false,
            force: false,
            excluded_files: default_excluded_files(),
        }
    }
}

/// Default set of generator aggregate pages.
pub fn default_excluded_files() -> BTreeSet<String> {
    ["index", "modules"].into_iter().map(String::from).collect()
}

/// Outcome of processing one generator page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Page stem is excluded, page left alone.
    Excluded(PathBuf),

    /// Page would be moved, but this is a dry run.
    Planned { source: PathBuf, destination: PathBuf },

    /// Page was moved to its destination.
    Moved { source: PathBuf, destination: PathBuf },

    /// Destination already existed, so the page was removed instead.
    Collided { source: PathBuf, destination: PathBuf },

    /// Page already sits at its destination.
    InPlace(PathBuf),
}

/// Report of a batch rename.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenameReport {
    pub outcomes: Vec<Outcome>,
}

impl RenameReport {
    /// Number of pages moved into place.
    pub fn moved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, Outcome::Moved { .. }))
            .count()
    }

    /// Number of pages dropped because their destination already existed.
    pub fn collided(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, Outcome::Collided { .. }))
            .count()
    }
}

/// Batch renamer of generator pages.
///
/// Moves flat pages from `source_dir` into a nested tree inside `source_dir`,
/// using `package_root` to figure out which pages document packages.
#[derive(Debug)]
pub struct Renamer {
    source_dir: PathBuf,
    package_root: PathBuf,
    options: RenameOptions,
    span: Span,
}

impl Renamer {
    /// Construct new renamer with default options.
    pub fn new(source_dir: impl Into<PathBuf>, package_root: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            package_root: package_root.into(),
            options: RenameOptions::default(),
            span: info_span!("rename"),
        }
    }

    /// Use given options.
    pub fn with_options(mut self, options: RenameOptions) -> Self {
        self.options = options;
        self
    }

    /// Parent every log event to given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Rename all generator pages.
    ///
    /// Every page is handled on its own. Order does not matter, because no
    /// page depends on the destination of another.
    ///
    /// # Errors
    ///
    /// - Return [`RenameError::DottedExtension`] if the configured extension
    ///   starts with ".".
    /// - Return [`RenameError::Pattern`] or [`RenameError::Glob`] if the
    ///   output directory cannot be scanned.
    /// - Return [`RenameError::Resolve`] if the package root cannot be read.
    /// - Return [`RenameError::CreateDir`], [`RenameError::RemoveFile`], or
    ///   [`RenameError::MoveFile`] if the file system refuses a change.
    pub fn rename(&self) -> Result<RenameReport> {
        let mut resolver = DestinationResolver::new();
        let mut report = RenameReport::default();

        for source in self.source_files()? {
            let outcome = self.rename_one(&mut resolver, source)?;
            report.outcomes.push(outcome);
        }

        debug!(
            parent: &self.span,
            "moved {} pages, dropped {} duplicates",
            report.moved(),
            report.collided()
        );

        Ok(report)
    }

    /// List generator pages directly inside the output directory.
    ///
    /// # Errors
    ///
    /// - Return [`RenameError::DottedExtension`] if the configured extension
    ///   starts with ".".
    /// - Return [`RenameError::Pattern`] or [`RenameError::Glob`] if the
    ///   output directory cannot be scanned.
    pub fn source_files(&self) -> Result<Vec<PathBuf>> {
        let extension = &self.options.extension;
        if extension.starts_with('.') {
            return Err(RenameError::DottedExtension(extension.clone()));
        }

        // INVARIANT: Glob root must not be empty or carry trailing separators.
        let root = match self.source_dir.components().collect::<PathBuf>() {
            root if root.as_os_str().is_empty() => PathBuf::from("."),
            root => root,
        };
        let pattern = format!(
            "{}/*.{}",
            Pattern::escape(&root.to_string_lossy()),
            Pattern::escape(extension)
        );

        let mut files = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = entry?;
            if path.is_file() {
                files.push(path);
            }
        }

        Ok(files)
    }

    fn rename_one(&self, resolver: &mut DestinationResolver, source: PathBuf) -> Result<Outcome> {
        let stem = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.options.excluded_files.contains(&stem) {
            debug!(parent: &self.span, "skipping excluded file {:?}", source.display());
            return Ok(Outcome::Excluded(source));
        }

        let nested = resolver.resolve(
            &source,
            &self.package_root,
            &self.options.extension,
            self.options.implicit_namespaces,
            self.options.package_name.as_deref(),
        )?;
        // INVARIANT: Join onto the glob's own root, since glob drops leading "./".
        let destination = source
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf)
            .join(nested);

        if destination == source {
            debug!(parent: &self.span, "{:?} already in place", source.display());
            return Ok(Outcome::InPlace(source));
        }

        if self.options.dry_run {
            info!(
                parent: &self.span,
                "{:?} would be changed to {:?}",
                source.display(),
                destination.display()
            );
            return Ok(Outcome::Planned {
                source,
                destination,
            });
        }

        if let Some(dest_dir) = destination.parent() {
            self.create_dirs(dest_dir)?;
        }

        if destination.exists() && !self.options.force {
            remove_file(&source).map_err(|err| RenameError::RemoveFile {
                source: err,
                path: source.clone(),
            })?;
            warn!(
                parent: &self.span,
                "{:?} already exists, skipping",
                destination.display()
            );
            return Ok(Outcome::Collided {
                source,
                destination,
            });
        }

        rename(&source, &destination).map_err(|err| RenameError::MoveFile {
            source: err,
            from: source.clone(),
            to: destination.clone(),
        })?;
        info!(
            parent: &self.span,
            "{:?} -> {:?}",
            source.display(),
            destination.display()
        );

        Ok(Outcome::Moved {
            source,
            destination,
        })
    }

    fn create_dirs(&self, dir: &Path) -> Result<()> {
        if dir.as_os_str().is_empty() {
            return Ok(());
        }

        match mkdirp::mkdirp(dir).map_err(|err| RenameError::CreateDir {
            source: err,
            path: dir.to_path_buf(),
        })? {
            Some(created) => debug!(parent: &self.span, "created directory {:?}", created.display()),
            None => debug!(parent: &self.span, "{:?} already exists", dir.display()),
        }

        Ok(())
    }
}

/// Batch rename error types.
#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    /// Extension was given with a leading ".".
    #[error("extension {0:?} must not start with '.'")]
    DottedExtension(String),

    /// Output directory could not be turned into a glob pattern.
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    /// Output directory entry could not be read.
    #[error(transparent)]
    Glob(#[from] glob::GlobError),

    /// Destination of page could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Destination directory could not be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Stale generator page could not be removed.
    #[error("failed to remove {:?}", path.display())]
    RemoveFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Page could not be moved to its destination.
    #[error("failed to move {:?} to {:?}", from.display(), to.display())]
    MoveFile {
        #[source]
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = RenameError> = std::result::Result<T, E>;
