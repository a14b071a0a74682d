//! CLI argument parsing and exit code tests.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn pkgrecipe() -> Command {
    Command::cargo_bin("pkgrecipe").expect("pkgrecipe binary")
}

/// A module `hello/` with a recipe, next to an empty workspace `ws/`.
fn create_temp_module(recipe: &str) -> (TempDir, PathBuf, PathBuf) {
    let td = tempfile::tempdir().expect("tempdir");
    let module = td.path().join("hello");
    let ws = td.path().join("ws");
    fs::create_dir_all(module.join("src")).unwrap();
    fs::create_dir_all(&ws).unwrap();
    fs::write(module.join("CMakeLists.txt"), "project(hello C)\n").unwrap();
    fs::write(module.join("src").join("hello.c"), "int hello(void) { return 1; }\n").unwrap();
    fs::write(module.join("recipe.toml"), recipe).unwrap();
    (td, module, ws)
}

const LIB_RECIPE: &str = r#"
[recipe]
version = "1.0.0"
artifact_type = "lib"
artifact_name = "hello"
requires = ["zlib/1.2.11"]
"#;

fn recipe_arg(module: &Path) -> String {
    module.join("recipe.toml").display().to_string()
}

#[test]
fn test_properties_lists_every_key() {
    pkgrecipe()
        .arg("properties")
        .assert()
        .success()
        .stdout(predicate::str::contains("artifact_type"))
        .stdout(predicate::str::contains("requires"))
        .stdout(predicate::str::contains("module_path"));
}

#[test]
fn test_properties_json_is_valid() {
    let output = pkgrecipe()
        .args(["properties", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value.as_array().map(Vec::len), Some(11));
}

#[test]
fn test_explain_known_key_with_legacy_prefix() {
    pkgrecipe()
        .args(["explain", "conan.requires"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PROPERTY: requires"));
}

#[test]
fn test_explain_unknown_key_fails() {
    pkgrecipe()
        .args(["explain", "flavour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown property"));
}

#[test]
fn test_set_requires_key_value() {
    pkgrecipe()
        .args(["info", "--set", "version"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn test_build_missing_version_exits_2() {
    let (_td, module, ws) = create_temp_module("[recipe]\nartifact_type = \"bin\"\n");
    pkgrecipe()
        .arg("build")
        .arg("--workspace")
        .arg(&ws)
        .arg("--recipe")
        .arg(recipe_arg(&module))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("version must be defined"));
    assert!(!ws.join("src").exists());
}

#[test]
fn test_build_unknown_key_exits_2() {
    let (_td, module, ws) = create_temp_module(LIB_RECIPE);
    pkgrecipe()
        .arg("build")
        .arg("--workspace")
        .arg(&ws)
        .arg("--recipe")
        .arg(recipe_arg(&module))
        .args(["--set", "flavour=sweet"])
        .assert()
        .code(2);
}

#[test]
fn test_info_json_reports_libs() {
    let (_td, module, ws) = create_temp_module(LIB_RECIPE);
    let output = pkgrecipe()
        .arg("info")
        .arg("--workspace")
        .arg(&ws)
        .arg("--recipe")
        .arg(recipe_arg(&module))
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["package_info"]["libs"][0], "hello");
    assert_eq!(value["requires"][0], "zlib/1.2.11");
    assert_eq!(value["metadata"]["name"], "hello");
}

#[test]
fn test_clean_on_empty_workspace_succeeds() {
    let td = tempfile::tempdir().unwrap();
    pkgrecipe()
        .arg("clean")
        .arg("--workspace")
        .arg(td.path())
        .assert()
        .success();
}

#[cfg(unix)]
#[test]
fn test_build_with_stand_in_orchestrator() {
    let (_td, module, ws) = create_temp_module(LIB_RECIPE);
    pkgrecipe()
        .arg("build")
        .arg("--workspace")
        .arg(&ws)
        .arg("--recipe")
        .arg(recipe_arg(&module))
        .args(["--cmake", "true"])
        .assert()
        .success();

    assert!(ws.join("src").join("hello.c").is_file());
    assert!(!ws.join("recipe.toml").exists());
    let manifest = fs::read_to_string(ws.join("filelist.txt")).unwrap();
    assert!(manifest.trim_end().ends_with("/src/hello.c"));
    assert!(ws.join(".pkgrecipe").join("report.json").is_file());
}

#[cfg(unix)]
#[test]
fn test_build_failing_orchestrator_exits_1() {
    let (_td, module, ws) = create_temp_module(LIB_RECIPE);
    pkgrecipe()
        .arg("build")
        .arg("--workspace")
        .arg(&ws)
        .arg("--recipe")
        .arg(recipe_arg(&module))
        .arg("--no-report")
        .env("PKGRECIPE_CMAKE", "false")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("configure"));

    // Sync and manifest ran before the orchestrator.
    assert!(ws.join("filelist.txt").is_file());
    assert!(!ws.join(".pkgrecipe").exists());
}
