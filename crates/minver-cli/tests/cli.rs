//! Runs the `minver` binary against a documentation tree and import manifest
//! written to a temporary directory.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r#"
search_paths = ["C:/Windows/System32"]

[[modules]]
path = "C:/App/app.exe"

[[modules.imports]]
module = "KERNEL32.dll"
symbols = ["CreateFile2", "CreateFileW"]

[[modules.imports]]
module = "vendor.dll"
symbols = ["VendorInit"]

[[modules]]
path = "C:/App/plain.exe"

[[modules.imports]]
module = "private.dll"
symbols = ["Internal"]

[[modules]]
path = "C:/Windows/System32/kernel32.dll"
"#;

fn page(name: &str, version: &str) -> String {
    format!(
        "---\nUID: NF:fileapi.{name}\nreq.dll: Kernel32.dll\nreq.target-min-winverclnt: {version}\napi_type:\n - DllExport\napi_location:\n - Kernel32.dll\napi_name:\n - {name}\n---\n\n# {name} function\n"
    )
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs/fileapi");
    fs::create_dir_all(&docs).unwrap();
    fs::write(
        docs.join("nf-fileapi-createfile2.md"),
        page("CreateFile2", "Windows 8 [desktop apps | UWP apps]"),
    )
    .unwrap();
    fs::write(
        docs.join("nf-fileapi-createfilew.md"),
        page("CreateFileW", "Windows XP [desktop apps | UWP apps]"),
    )
    .unwrap();
    fs::write(dir.path().join("imports.toml"), MANIFEST).unwrap();
    dir
}

fn minver(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("minver").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("MINVER_MAX_EXPECTED")
        .env_remove("MINVER_STORE_PATH")
        .env_remove("MINVER_DOCS_DIR")
        .env_remove("MINVER_FORMAT")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn build_store_then_check_passes() {
    let dir = workspace();

    minver(dir.path())
        .args(["build-store", "--docs-dir", "docs"])
        .assert()
        .success()
        .stderr(predicate::str::contains("with 2 symbols"));
    assert!(dir.path().join("symbols.redb").is_file());

    minver(dir.path())
        .args(["check", "-m", "imports.toml", "C:/App/app.exe"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Result: OK"))
        .stdout(predicate::str::contains("Required OS version: Win8 (Win8_RTM, build 9200)"))
        .stdout(predicate::str::contains("vendor.dll"));
}

#[test]
fn threshold_violation_sets_exit_code() {
    let dir = workspace();

    minver(dir.path())
        .args([
            "check",
            "-m",
            "imports.toml",
            "C:/App/app.exe",
            "--docs-dir",
            "docs",
            "--max-expected",
            "Win7",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Result: FAIL"))
        .stdout(predicate::str::contains("Symbols above expected max OS version Win7 (1):"))
        .stdout(predicate::str::contains("CreateFile2"));
}

#[test]
fn json_report() {
    let dir = workspace();

    let output = minver(dir.path())
        .args([
            "check",
            "-m",
            "imports.toml",
            "C:/App/app.exe",
            "--docs-dir",
            "docs",
            "--format",
            "json",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["result"], "ok");
    assert_eq!(json["os_build"], "Win8_RTM");
    assert_eq!(json["symbols_at_max_version"][0]["symbol"], "CreateFile2");
    assert_eq!(json["unresolved_modules"][0], "vendor.dll");
}

#[test]
fn no_matched_symbols_exits_255() {
    let dir = workspace();

    minver(dir.path())
        .args(["check", "-m", "imports.toml", "C:/App/plain.exe", "--docs-dir", "docs"])
        .assert()
        .code(255)
        .stdout(predicate::str::contains("Result: no symbols found"));
}

#[test]
fn config_file_supplies_threshold() {
    let dir = workspace();
    fs::write(
        dir.path().join("minver.toml"),
        "docs_dir = \"docs\"\nmax_expected = \"WinXP\"\n",
    )
    .unwrap();

    minver(dir.path())
        .args(["check", "-m", "imports.toml", "C:/App/app.exe"])
        .assert()
        .code(1);

    minver(dir.path())
        .args(["check", "-m", "imports.toml", "C:/App/app.exe", "--max-expected", "Win8"])
        .assert()
        .code(0);
}

#[test]
fn missing_store_suggests_building_it() {
    let dir = workspace();

    minver(dir.path())
        .args(["check", "-m", "imports.toml", "C:/App/app.exe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("build-store"));
}

#[test]
fn unknown_root_is_an_error() {
    let dir = workspace();

    minver(dir.path())
        .args(["check", "-m", "imports.toml", "C:/App/other.exe", "--docs-dir", "docs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("other.exe"));
}

#[test]
fn invalid_threshold_is_rejected() {
    let dir = workspace();

    minver(dir.path())
        .args([
            "check",
            "-m",
            "imports.toml",
            "C:/App/app.exe",
            "--docs-dir",
            "docs",
            "--max-expected",
            "Windows95",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_expected"));
}
