// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Nest flat documentation generator output.
//!
//! `sphinx-apidoc` writes one page per module into a single flat directory,
//! naming each page after the dotted module path, e.g., `pkg.sub.mod.rst`.
//! Nestdoc moves those pages into a directory tree that mirrors the package
//! itself, e.g., `pkg/sub/mod.rst`, turning pages of packages into
//! `index.rst` landing pages along the way.
//!
//! # Stages
//!
//! 1. [`apidoc`] runs the generator with a fixed set of flags.
//! 2. [`rename`] moves every generated page into place, using [`resolve`] and
//!    [`path`] to figure out where each page goes.
//!
//! The [`config`] module ties both stages together for host documentation
//! builds.

pub mod apidoc;
pub mod config;
pub mod path;
pub mod rename;
pub mod resolve;

pub use apidoc::{feed_generator, ApidocRequest, Generator, SphinxApidoc};
pub use config::{BuildHook, HookConfig};
pub use path::{nested_file_name, sanitize_path};
pub use rename::{Outcome, RenameOptions, RenameReport, Renamer};
pub use resolve::{landing_page, DestinationResolver};
