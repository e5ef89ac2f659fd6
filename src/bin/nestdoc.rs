// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use nestdoc::{
    apidoc::{feed_generator, ApidocRequest, SphinxApidoc, DEFAULT_GENERATOR},
    config::{sanitize_package_name, BuildHook, HookConfig},
    rename::{RenameOptions, Renamer},
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::{ffi::OsString, path::PathBuf, process::exit};
use tracing::{error, info_span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Generate nested directory from sphinx-apidoc's flattened files.
///
/// Wraps sphinx-apidoc. Extra arguments after the module path are passed
/// through to it. Use "--" before flags that nestdoc also knows, e.g., "-h".
/// Dry run flags meant for sphinx-apidoc are ignored.
#[derive(Debug, Clone, Parser)]
#[command(
    about,
    long_about,
    override_usage = "\n  nestdoc [options] -o <output_dir> <module_path> [<apidoc_args>...]\n  nestdoc [options] --config <file>",
    version
)]
struct Cli {
    /// Path to package to document.
    #[arg(value_name = "module_path", required_unless_present = "config")]
    pub module_path: Option<PathBuf>,

    /// Directory to place all output.
    #[arg(short, long, value_name = "output_dir", required_unless_present = "config")]
    pub output_dir: Option<PathBuf>,

    /// Replace existing files.
    #[arg(short, long)]
    pub force: bool,

    /// Run without creating or moving files.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Name of directory to put the package documentation in.
    #[arg(long, value_name = "name")]
    pub package_name: Option<String>,

    /// File suffix of generated pages.
    #[arg(short, long, value_name = "suffix", default_value = "rst")]
    pub suffix: String,

    /// Interpret module paths as PEP 420 implicit namespaces.
    #[arg(long)]
    pub implicit_namespaces: bool,

    /// Documentation generator program to run.
    #[arg(long, value_name = "program", env = "NESTDOC_GENERATOR", default_value = DEFAULT_GENERATOR)]
    pub generator: OsString,

    /// Run build hook described by configuration file instead.
    #[arg(
        short,
        long,
        value_name = "file",
        conflicts_with_all = ["module_path", "output_dir", "apidoc_args"]
    )]
    pub config: Option<PathBuf>,

    /// Increase verbosity, repeatable.
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Arguments passed through to the documentation generator.
    #[arg(value_name = "apidoc_args", trailing_var_arg = true, allow_hyphen_values = true)]
    pub apidoc_args: Vec<OsString>,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }

        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    fn run(self) -> Result<()> {
        if let Some(path) = self.config {
            let config = HookConfig::load(&path)?;
            BuildHook::new(config).builder_inited()?;
            return Ok(());
        }

        // INVARIANT: clap enforces both unless a configuration file is given.
        let (Some(module_path), Some(output_dir)) = (self.module_path, self.output_dir) else {
            anyhow::bail!("module path and output directory are required");
        };

        let package_name = self
            .package_name
            .as_deref()
            .map(sanitize_package_name)
            .transpose()?;

        let request = ApidocRequest {
            output_dir: output_dir.clone(),
            module_path: module_path.clone(),
            suffix: self.suffix.clone(),
            implicit_namespaces: self.implicit_namespaces,
            force: self.force,
            extra_args: self.apidoc_args,
        };
        let generator = SphinxApidoc::new(self.generator);
        if feed_generator(&generator, &request)? {
            return Ok(());
        }

        let options = RenameOptions {
            package_name,
            extension: self.suffix,
            implicit_namespaces: self.implicit_namespaces,
            dry_run: self.dry_run,
            force: self.force,
            ..Default::default()
        };
        Renamer::new(&output_dir, &module_path)
            .with_options(options)
            .with_span(info_span!("rename", output = %output_dir.display()))
            .rename()
            .with_context(|| format!("failed to nest pages in {:?}", output_dir.display()))?;

        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();

    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cli.log_level()))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = cli.run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}
