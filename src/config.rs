// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Build hook configuration.
//!
//! Nestdoc can run as part of a documentation build instead of as a one-off
//! command. The host build reads a small TOML file, and calls
//! [`BuildHook::builder_inited`] once after its own initialization phase.
//!
//! # General Layout
//!
//! ```toml
//! package_dir = "$PROJECT/src/mypkg"
//! srcdir = "docs/source"
//! package_name = "api"
//! suffix = "rst"
//! excluded_files = ["index", "modules"]
//! module_first = true
//! implicit_namespaces = false
//! generator = "sphinx-apidoc"
//! ```
//!
//! Only `package_dir` is required. Paths go through shell expansion.

use crate::{
    apidoc::{feed_generator, ApidocRequest, Generator, SphinxApidoc, DEFAULT_GENERATOR},
    path::sanitize_path,
    rename::{default_excluded_files, RenameOptions, RenameReport, Renamer},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{info, info_span};

/// Build hook configuration layout.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HookConfig {
    /// Directory of package to document.
    pub package_dir: PathBuf,

    /// Directory where generator pages are written and nested.
    #[serde(default = "default_srcdir")]
    pub srcdir: PathBuf,

    /// Name of top-level directory to put package pages in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,

    /// Suffix of generated pages.
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Page stems that must never be moved.
    #[serde(default = "default_excluded_files")]
    pub excluded_files: BTreeSet<String>,

    /// Put module documentation before submodule documentation.
    #[serde(default)]
    pub module_first: bool,

    /// Interpret module paths as implicit namespaces.
    #[serde(default)]
    pub implicit_namespaces: bool,

    /// Documentation generator program.
    #[serde(default = "default_generator")]
    pub generator: String,
}

impl HookConfig {
    /// Construct new configuration with defaults for target package.
    pub fn new(package_dir: impl Into<PathBuf>) -> Self {
        Self {
            package_dir: package_dir.into(),
            srcdir: default_srcdir(),
            package_name: None,
            suffix: default_suffix(),
            excluded_files: default_excluded_files(),
            module_first: false,
            implicit_namespaces: false,
            generator: default_generator(),
        }
    }

    /// Load configuration from file.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if the file cannot be read.
    /// - Return any error from parsing the contents.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref()).map_err(|err| ConfigError::Read {
            source: err,
            path: path.as_ref().to_path_buf(),
        })?;
        data.parse()
    }

    /// Sanitized package rename target.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::InvalidPackageName`] if nothing is left of the
    ///   name after sanitization.
    pub fn sanitized_package_name(&self) -> Result<Option<PathBuf>> {
        self.package_name
            .as_deref()
            .map(sanitize_package_name)
            .transpose()
    }
}

impl FromStr for HookConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: HookConfig = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on directory fields.
        config.package_dir = expand(&config.package_dir)?;
        config.srcdir = expand(&config.srcdir)?;

        if config.suffix.starts_with('.') {
            return Err(ConfigError::DottedSuffix(config.suffix));
        }

        Ok(config)
    }
}

impl Display for HookConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Sanitize package rename target.
///
/// # Errors
///
/// - Return [`ConfigError::InvalidPackageName`] if nothing is left of the
///   name after sanitization.
pub fn sanitize_package_name(name: &str) -> Result<PathBuf> {
    let sanitized = sanitize_path(name);
    if sanitized.as_os_str().is_empty() {
        return Err(ConfigError::InvalidPackageName(name.into()));
    }

    Ok(sanitized)
}

/// Two stage build pipeline driven by a host documentation build.
#[derive(Debug)]
pub struct BuildHook<G = SphinxApidoc>
where
    G: Generator,
{
    config: HookConfig,
    generator: G,
}

impl BuildHook {
    /// Construct new build hook running the configured generator program.
    pub fn new(config: HookConfig) -> Self {
        let generator = SphinxApidoc::new(&config.generator);
        Self { config, generator }
    }
}

impl<G> BuildHook<G>
where
    G: Generator,
{
    /// Construct new build hook with custom generator.
    pub fn with_generator(config: HookConfig, generator: G) -> Self {
        Self { config, generator }
    }

    /// Run generator, then nest its pages.
    ///
    /// Meant to be called once per build, after the host build finished
    /// initializing. Returns [`None`] if the generator only printed help.
    ///
    /// # Errors
    ///
    /// - Return error if the package name is invalid, the generator fails,
    ///   or the pages cannot be renamed.
    pub fn builder_inited(&self) -> anyhow::Result<Option<RenameReport>> {
        let span = info_span!("build_hook", package = %self.config.package_dir.display());
        let package_name = self.config.sanitized_package_name()?;

        // INVARIANT: Build needs the generator's own index page to find the API tree.
        let mut extra_args = vec!["--full".into()];
        if self.config.module_first {
            extra_args.push("--module-first".into());
        }

        let request = ApidocRequest {
            output_dir: self.config.srcdir.clone(),
            module_path: self.config.package_dir.clone(),
            suffix: self.config.suffix.clone(),
            implicit_namespaces: self.config.implicit_namespaces,
            force: false,
            extra_args,
        };

        let is_help = span.in_scope(|| feed_generator(&self.generator, &request))?;
        if is_help {
            return Ok(None);
        }

        let options = RenameOptions {
            package_name,
            extension: self.config.suffix.clone(),
            implicit_namespaces: self.config.implicit_namespaces,
            dry_run: false,
            force: false,
            excluded_files: self.config.excluded_files.clone(),
        };
        let report = Renamer::new(&self.config.srcdir, &self.config.package_dir)
            .with_options(options)
            .with_span(span.clone())
            .rename()
            .with_context(|| format!("failed to nest pages in {:?}", self.config.srcdir.display()))?;

        info!(parent: &span, "nested {} pages", report.moved());

        Ok(Some(report))
    }
}

fn expand(path: &Path) -> Result<PathBuf> {
    Ok(PathBuf::from(
        shellexpand::full(path.to_string_lossy().as_ref())
            .map_err(ConfigError::ShellExpansion)?
            .into_owned(),
    ))
}

fn default_srcdir() -> PathBuf {
    PathBuf::from(".")
}

fn default_suffix() -> String {
    "rst".into()
}

fn default_generator() -> String {
    DEFAULT_GENERATOR.into()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read configuration file {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Package name sanitizes down to nothing.
    #[error("invalid package name {0:?}")]
    InvalidPackageName(String),

    /// Suffix was given with a leading ".".
    #[error("suffix {0:?} must not start with '.'")]
    DottedSuffix(String),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
