// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

#![cfg(unix)]

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::{
    fs::{create_dir_all, read_to_string, write},
    path::Path,
};
use tempfile::{tempdir, TempDir};

const PAGES: [&str; 5] = [
    "index.rst",
    "modules.rst",
    "mypkg.rst",
    "mypkg.sub.rst",
    "mypkg.sub.leaf.rst",
];

/// Lay out package and the flat pages a generator run would have produced.
fn fixture() -> Result<TempDir> {
    let dir = tempdir()?;
    let root = dir.path();

    create_dir_all(root.join("src/mypkg/sub"))?;
    write(root.join("src/mypkg/__init__.py"), "")?;
    write(root.join("src/mypkg/sub/__init__.py"), "")?;
    write(root.join("src/mypkg/sub/leaf.py"), "")?;

    create_dir_all(root.join("docs"))?;
    for page in PAGES {
        write(root.join("docs").join(page), page)?;
    }

    Ok(dir)
}

fn nestdoc(dir: &Path, generator: &str) -> Command {
    let mut cmd = Command::cargo_bin("nestdoc").expect("nestdoc binary is built");
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env("NESTDOC_GENERATOR", generator);
    cmd
}

fn read(dir: &Path, path: &str) -> String {
    read_to_string(dir.join(path)).unwrap_or_default()
}

#[test]
fn nests_generated_pages() -> Result<()> {
    let dir = fixture()?;

    nestdoc(dir.path(), "true")
        .args(["src/mypkg", "-o", "docs"])
        .assert()
        .success();

    assert_eq!(read(dir.path(), "docs/index.rst"), "index.rst");
    assert_eq!(read(dir.path(), "docs/modules.rst"), "modules.rst");
    assert_eq!(read(dir.path(), "docs/mypkg/index.rst"), "mypkg.rst");
    assert_eq!(read(dir.path(), "docs/mypkg/sub/index.rst"), "mypkg.sub.rst");
    assert_eq!(read(dir.path(), "docs/mypkg/sub/leaf.rst"), "mypkg.sub.leaf.rst");
    assert!(!dir.path().join("docs/mypkg.sub.leaf.rst").exists());

    Ok(())
}

#[test]
fn dry_run_only_reports() -> Result<()> {
    let dir = fixture()?;

    nestdoc(dir.path(), "true")
        .args(["-v", "-n", "src/mypkg", "-o", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would be changed to"));

    for page in PAGES {
        assert_eq!(read(dir.path(), &format!("docs/{page}")), page);
    }
    assert!(!dir.path().join("docs/mypkg").exists());

    Ok(())
}

#[test]
fn package_name_renames_top_level() -> Result<()> {
    let dir = fixture()?;

    nestdoc(dir.path(), "true")
        .args(["--package-name", "/../api", "src/mypkg", "-o", "docs"])
        .assert()
        .success();

    assert_eq!(read(dir.path(), "docs/api/index.rst"), "mypkg.rst");
    assert_eq!(read(dir.path(), "docs/api/sub/leaf.rst"), "mypkg.sub.leaf.rst");

    Ok(())
}

#[test]
fn collision_respects_force() -> Result<()> {
    let dir = fixture()?;
    create_dir_all(dir.path().join("docs/mypkg/sub"))?;
    write(dir.path().join("docs/mypkg/sub/leaf.rst"), "old leaf")?;

    nestdoc(dir.path(), "true")
        .args(["src/mypkg", "-o", "docs"])
        .assert()
        .success();
    assert_eq!(read(dir.path(), "docs/mypkg/sub/leaf.rst"), "old leaf");
    assert!(!dir.path().join("docs/mypkg.sub.leaf.rst").exists());

    write(dir.path().join("docs/mypkg.sub.leaf.rst"), "new leaf")?;
    nestdoc(dir.path(), "true")
        .args(["-f", "src/mypkg", "-o", "docs"])
        .assert()
        .success();
    assert_eq!(read(dir.path(), "docs/mypkg/sub/leaf.rst"), "new leaf");

    Ok(())
}

#[test]
fn invalid_package_name_fails() -> Result<()> {
    let dir = fixture()?;

    nestdoc(dir.path(), "true")
        .args(["--package-name", "../..", "src/mypkg", "-o", "docs"])
        .assert()
        .failure()
        .code(1);

    assert_eq!(read(dir.path(), "docs/mypkg.rst"), "mypkg.rst");

    Ok(())
}

#[test]
fn generator_failure_skips_rewrite() -> Result<()> {
    let dir = fixture()?;

    nestdoc(dir.path(), "false")
        .args(["src/mypkg", "-o", "docs"])
        .assert()
        .failure()
        .code(1);

    assert_eq!(read(dir.path(), "docs/mypkg.rst"), "mypkg.rst");
    assert!(!dir.path().join("docs/mypkg").exists());

    Ok(())
}

#[test]
fn generator_help_is_streamed() -> Result<()> {
    let dir = fixture()?;

    nestdoc(dir.path(), "echo")
        .args(["src/mypkg", "-o", "docs", "-n", "--", "--help", "-n"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--separate --suffix rst --help -n"));

    assert_eq!(read(dir.path(), "docs/mypkg.rst"), "mypkg.rst");

    Ok(())
}

#[test]
fn dotted_suffix_fails() -> Result<()> {
    let dir = fixture()?;

    nestdoc(dir.path(), "true")
        .args(["-s", ".rst", "src/mypkg", "-o", "docs"])
        .assert()
        .failure()
        .code(1);

    Ok(())
}

#[test]
fn config_runs_build_hook() -> Result<()> {
    let dir = fixture()?;
    write(
        dir.path().join("nestdoc.toml"),
        "package_dir = \"src/mypkg\"\nsrcdir = \"docs\"\ngenerator = \"true\"\n",
    )?;

    nestdoc(dir.path(), "false")
        .args(["--config", "nestdoc.toml"])
        .assert()
        .success();

    assert_eq!(read(dir.path(), "docs/mypkg/sub/index.rst"), "mypkg.sub.rst");
    assert_eq!(read(dir.path(), "docs/modules.rst"), "modules.rst");

    Ok(())
}

#[test]
fn missing_output_dir_is_usage_error() {
    let dir = tempdir().expect("temporary directory");

    nestdoc(dir.path(), "true")
        .arg("src/mypkg")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output-dir"));
}

#[test]
fn hyphen_args_reach_generator_without_separator() -> Result<()> {
    let dir = fixture()?;

    nestdoc(dir.path(), "echo")
        .args(["-vv", "src/mypkg", "-o", "docs", "-e", "-P"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""rst", "-e", "-P"]"#));

    assert_eq!(read(dir.path(), "docs/mypkg/sub/leaf.rst"), "mypkg.sub.leaf.rst");

    Ok(())
}
