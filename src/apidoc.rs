// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Documentation generator invocation.
//!
//! Nestdoc does not generate any documentation itself. It drives
//! `sphinx-apidoc` with a fixed set of flags, and rewrites the flat pages it
//! leaves behind.
//!
//! # Fixed Flags
//!
//! The generator is always told to give each module its own page through
//! `--separate`, and to use the requested suffix. The rewrite stage needs real
//! files to work on, so any dry run flag meant for the generator is dropped.
//!
//! # Help Output
//!
//! If the caller passes `-h` or `--help` through to the generator, its output
//! is streamed straight to stdout, and the caller is expected to skip the
//! rewrite stage.

use std::{
    ffi::{OsStr, OsString},
    path::PathBuf,
    process::Command,
};
use tracing::{debug, instrument};

const HELP_FLAGS: [&str; 2] = ["-h", "--help"];
const DRY_RUN_FLAGS: [&str; 2] = ["-n", "--dry-run"];

/// Default documentation generator program.
pub const DEFAULT_GENERATOR: &str = "sphinx-apidoc";

/// Layer of indirection for running the documentation generator.
pub trait Generator {
    /// Run generator with fully assembled command line.
    ///
    /// Output goes straight to stdout when `stream` is set. Otherwise it is
    /// captured and returned.
    fn generate(&self, args: &[OsString], stream: bool) -> Result<String>;
}

/// Generator ran as an external `sphinx-apidoc` compatible program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SphinxApidoc {
    program: OsString,
}

impl SphinxApidoc {
    /// Construct new generator for target program.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SphinxApidoc {
    fn default() -> Self {
        Self::new(DEFAULT_GENERATOR)
    }
}

impl Generator for SphinxApidoc {
    fn generate(&self, args: &[OsString], stream: bool) -> Result<String> {
        if stream {
            syscall_interactive(&self.program, args)?;
            return Ok(String::new());
        }

        syscall_non_interactive(&self.program, args)
    }
}

/// Request to run the documentation generator.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApidocRequest {
    /// Directory to place generated pages in.
    pub output_dir: PathBuf,

    /// Path to package to document.
    pub module_path: PathBuf,

    /// Suffix of generated pages.
    pub suffix: String,

    /// Interpret module paths as implicit namespaces.
    pub implicit_namespaces: bool,

    /// Replace existing pages.
    pub force: bool,

    /// Extra arguments passed through to the generator as-is.
    pub extra_args: Vec<OsString>,
}

impl ApidocRequest {
    /// Construct new request with default suffix.
    pub fn new(output_dir: impl Into<PathBuf>, module_path: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            module_path: module_path.into(),
            suffix: "rst".into(),
            ..Default::default()
        }
    }

    /// Check if caller asked the generator for help.
    pub fn is_help(&self) -> bool {
        self.extra_args
            .iter()
            .any(|arg| HELP_FLAGS.iter().any(|flag| arg == OsStr::new(flag)))
    }

    /// Assemble full command line of generator.
    ///
    /// Help requests are passed along untouched.
    pub fn arguments(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--output-dir".into(),
            self.output_dir.clone().into_os_string(),
            self.module_path.clone().into_os_string(),
            "--separate".into(),
            "--suffix".into(),
            self.suffix.clone().into(),
        ];
        args.extend(self.extra_args.iter().cloned());

        if self.is_help() {
            return args;
        }

        add_flag_if_missing(&mut args, self.implicit_namespaces, None, "--implicit-namespaces");
        add_flag_if_missing(&mut args, self.force, Some("-f"), "--force");

        // INVARIANT: Generator must write real files for the rewrite stage.
        args.retain(|arg| !DRY_RUN_FLAGS.iter().any(|flag| arg == OsStr::new(flag)));

        args
    }
}

/// Feed request to documentation generator.
///
/// Returns `true` if the caller asked for help, in which case the generator
/// output was streamed to stdout, and nothing was generated.
///
/// # Errors
///
/// - Return [`ApidocError::Spawn`] if the generator cannot be started.
/// - Return [`ApidocError::Failed`] if the generator exits abnormally.
#[instrument(skip(generator, request), level = "debug")]
pub fn feed_generator(generator: &impl Generator, request: &ApidocRequest) -> Result<bool> {
    let is_help = request.is_help();
    let args = request.arguments();
    debug!("arguments: {args:?}");
    debug!("stream to stdout: {is_help}");

    let output = generator.generate(&args, is_help)?;
    if !output.is_empty() {
        debug!("{output}");
    }

    Ok(is_help)
}

fn add_flag_if_missing(
    args: &mut Vec<OsString>,
    cond: bool,
    short_flag: Option<&str>,
    flag: &str,
) {
    let present = args
        .iter()
        .any(|arg| arg == OsStr::new(flag) || short_flag.is_some_and(|short| arg == OsStr::new(short)));
    if cond && !present {
        args.push(flag.into());
    }
}

fn syscall_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<()> {
    let status = Command::new(cmd.as_ref())
        .args(args)
        .status()
        .map_err(|err| ApidocError::Spawn {
            source: err,
            program: cmd.as_ref().to_os_string(),
        })?;

    if !status.success() {
        return Err(ApidocError::Failed {
            program: cmd.as_ref().to_os_string(),
            message: format!("exited with {status}"),
        });
    }

    Ok(())
}

fn syscall_non_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<String> {
    let output = Command::new(cmd.as_ref())
        .args(args)
        .output()
        .map_err(|err| ApidocError::Spawn {
            source: err,
            program: cmd.as_ref().to_os_string(),
        })?;
    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();
    let mut message = String::new();

    if !stdout.is_empty() {
        message.push_str(format!("stdout: {stdout}").as_str());
    }

    if !stderr.is_empty() {
        message.push_str(format!("stderr: {stderr}").as_str());
    }

    // INVARIANT: Chomp trailing newlines.
    let message = message
        .strip_suffix("\r\n")
        .or(message.strip_suffix('\n'))
        .map(ToString::to_string)
        .unwrap_or(message);

    if !output.status.success() {
        return Err(ApidocError::Failed {
            program: cmd.as_ref().to_os_string(),
            message,
        });
    }

    Ok(message)
}

/// Documentation generator error types.
#[derive(Debug, thiserror::Error)]
pub enum ApidocError {
    /// Generator program could not be started.
    #[error("failed to run {program:?}")]
    Spawn {
        #[source]
        source: std::io::Error,
        program: OsString,
    },

    /// Generator program exited abnormally.
    #[error("command {program:?} failed:\n{message}")]
    Failed { program: OsString, message: String },
}

/// Friendly result alias :3
pub type Result<T, E = ApidocError> = std::result::Result<T, E>;
