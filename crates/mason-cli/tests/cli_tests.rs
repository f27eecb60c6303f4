//! CLI integration tests
//!
//! Exercises the `mason` binary end to end against real temp directories,
//! with the bundled passthrough compiler doing the emitting.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn mason_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mason").unwrap();
    cmd.current_dir(dir);
    cmd
}

fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A single project with one source file and declarations enabled.
fn write_simple_project(root: &Path) {
    write_file(
        root,
        "tsconfig.json",
        r#"{
            "compilerOptions": { "outDir": "dist", "declaration": true },
            "files": ["src/main.ts"]
        }"#,
    );
    write_file(root, "src/main.ts", "export const main = 1;\n");
}

/// `app` references `core`.
fn write_referencing_projects(root: &Path) {
    write_file(
        root,
        "core/tsconfig.json",
        r#"{
            "compilerOptions": { "outDir": "dist", "declaration": true },
            "files": ["core.ts"]
        }"#,
    );
    write_file(root, "core/core.ts", "export const core = 1;\n");
    write_file(
        root,
        "app/tsconfig.json",
        r#"{
            "compilerOptions": { "outDir": "dist" },
            "files": ["app.ts"],
            "references": [{ "path": "../core" }]
        }"#,
    );
    write_file(root, "app/app.ts", "export const app = 2;\n");
}

#[test]
fn test_build_produces_outputs() {
    let temp = TempDir::new().unwrap();
    write_simple_project(temp.path());

    mason_cmd(temp.path()).assert().success();

    assert!(temp.path().join("dist/main.js").is_file());
    assert!(temp.path().join("dist/main.d.ts").is_file());
    assert_eq!(
        fs::read_to_string(temp.path().join("dist/main.js")).unwrap(),
        "export const main = 1;\n"
    );
}

#[test]
fn test_second_build_is_up_to_date() {
    let temp = TempDir::new().unwrap();
    write_simple_project(temp.path());

    mason_cmd(temp.path()).assert().success();
    mason_cmd(temp.path())
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains("is up to date"));
}

#[test]
fn test_build_follows_references() {
    let temp = TempDir::new().unwrap();
    write_referencing_projects(temp.path());

    mason_cmd(temp.path()).arg("app").assert().success();

    assert!(temp.path().join("core/dist/core.js").is_file());
    assert!(temp.path().join("core/dist/core.d.ts").is_file());
    assert!(temp.path().join("app/dist/app.js").is_file());
}

#[test]
fn test_dry_run_reports_without_writing() {
    let temp = TempDir::new().unwrap();
    write_simple_project(temp.path());

    mason_cmd(temp.path())
        .arg("--dry")
        .assert()
        .success()
        .stdout(predicate::str::contains("A non-dry build would build project"));

    assert!(!temp.path().join("dist").exists());
}

#[test]
fn test_clean_removes_outputs() {
    let temp = TempDir::new().unwrap();
    write_simple_project(temp.path());

    mason_cmd(temp.path()).assert().success();
    assert!(temp.path().join("dist/main.js").is_file());

    mason_cmd(temp.path()).arg("--clean").assert().success();
    assert!(!temp.path().join("dist/main.js").exists());
    assert!(!temp.path().join("dist/main.d.ts").exists());
    assert!(temp.path().join("src/main.ts").is_file());
}

#[test]
fn test_missing_project_spec_fails() {
    let temp = TempDir::new().unwrap();

    mason_cmd(temp.path())
        .arg("no-such-project")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_missing_input_file_fails_the_build() {
    let temp = TempDir::new().unwrap();
    write_file(
        temp.path(),
        "tsconfig.json",
        r#"{ "files": ["src/gone.ts"] }"#,
    );

    mason_cmd(temp.path())
        .arg("-v")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read input file"));
}

#[test]
fn test_force_rebuilds_up_to_date_project() {
    let temp = TempDir::new().unwrap();
    write_simple_project(temp.path());

    mason_cmd(temp.path()).assert().success();
    mason_cmd(temp.path())
        .args(["-v", "-f"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Building project"));
}

#[test]
fn test_help_lists_flags() {
    let temp = TempDir::new().unwrap();
    mason_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("--dry"))
        .stdout(predicate::str::contains("--force"))
        .stdout(predicate::str::contains("--clean"));
}
