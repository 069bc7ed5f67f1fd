//! Integration tests for the scriptdist binary.

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const GRADLE_ZIP: &str = "gradle-enterprise-gradle-build-validation";
const MAVEN_ZIP: &str = "gradle-enterprise-maven-build-validation";

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Minimal scripts project with parsers already generated.
fn project(version: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "LICENSE", "Apache License 2.0");
    write(root, "release/version.txt", &format!("{version}\n"));
    write(root, "release/changes.md", "- Initial release");
    write(root, "components/scripts/gradle/01-validate.sh", "VERSION=<HEAD>");
    write(root, "components/scripts/gradle/gradle-init-scripts/init.gradle", "// init");
    write(root, "components/scripts/maven/01-validate.sh", "VERSION=<HEAD>");
    write(root, "components/scripts/README.md", "Scripts <HEAD>");
    write(root, "components/scripts/lib/common.sh", "SUMMARY=<SUMMARY_VERSION>");
    write(root, "build/generated/scripts/lib/cli-parsers/gradle/gradle-cli-parser.sh", "#!/bin/bash");
    write(root, "build/generated/scripts/lib/cli-parsers/maven/maven-cli-parser.sh", "#!/bin/bash");
    temp
}

fn scriptdist(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("scriptdist");
    cmd.current_dir(dir)
        .env_remove("FINAL_RELEASE")
        .env_remove("GITHUB_ACCESS_TOKEN")
        .env_remove("RUST_LOG")
        .env("SCRIPTDIST__GENERATOR__KIND", "prebuilt");
    cmd
}

#[test]
fn help_lists_the_pipeline_commands() {
    cargo_bin_cmd!("scriptdist")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("assemble"))
        .stdout(predicate::str::contains("checksum"))
        .stdout(predicate::str::contains("release"))
        .stdout(predicate::str::contains("--final-release"));
}

#[test]
fn version_flag_prints_the_crate_version() {
    cargo_bin_cmd!("scriptdist")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn development_coordinates_by_default() {
    let temp = project("3.0");
    scriptdist(temp.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("development-latest"))
        .stdout(predicate::str::contains("Development release"))
        .stdout(predicate::str::contains("dev"));
}

#[test]
fn final_flag_selects_versioned_tag() {
    let temp = project("3.0");
    let out = scriptdist(temp.path())
        .args(["--final-release", "--output-format", "json", "version"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["tag_name"], "v3.0");
    assert_eq!(json["distribution_version"], "3.0");
    assert_eq!(json["prerelease"], false);
    assert_eq!(json["overwrite"], false);
}

#[test]
fn falsy_environment_value_still_selects_final_and_warns() {
    let temp = project("3.0");
    scriptdist(temp.path())
        .env("FINAL_RELEASE", "false")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("v3.0"))
        .stderr(predicate::str::contains("presence-based"));
}

#[test]
fn assemble_writes_both_archives() {
    let temp = project("3.0");
    scriptdist(temp.path()).arg("assemble").assert().success();

    let dists = temp.path().join("build/distributions");
    assert!(dists.join(format!("{GRADLE_ZIP}-dev.zip")).is_file());
    assert!(dists.join(format!("{MAVEN_ZIP}-dev.zip")).is_file());
    assert_eq!(
        fs::read_to_string(temp.path().join("build/scripts/gradle/01-validate.sh")).unwrap(),
        "VERSION=3.0"
    );
    assert!(temp.path().join("build/scripts/gradle/lib/gradle-init-scripts/init.gradle").is_file());
    assert!(temp.path().join("build/scripts/maven/lib/maven-cli-parser.sh").is_file());
}

#[test]
fn assemble_can_be_limited_to_one_distribution() {
    let temp = project("3.0");
    scriptdist(temp.path())
        .args(["--final-release", "assemble", "--distribution", "maven"])
        .assert()
        .success();

    let dists = temp.path().join("build/distributions");
    assert!(dists.join(format!("{MAVEN_ZIP}-3.0.zip")).is_file());
    assert!(!dists.join(format!("{GRADLE_ZIP}-3.0.zip")).exists());
}

#[test]
fn checksum_writes_hex_sidecars() {
    let temp = project("3.0");
    scriptdist(temp.path()).arg("checksum").assert().success();

    let sidecar = temp
        .path()
        .join(format!("build/distributions/checksums/{GRADLE_ZIP}-dev.zip.sha512"));
    let digest = fs::read_to_string(sidecar).unwrap();
    assert_eq!(digest.len(), 128);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn init_then_config_get_round_trip() {
    let temp = TempDir::new().unwrap();
    scriptdist(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains(".scriptdist.toml"));
    assert!(temp.path().join(".scriptdist.toml").is_file());

    scriptdist(temp.path())
        .args(["config", "get", "github.owner"])
        .assert()
        .success()
        .stdout(predicate::str::diff("gradle\n"));

    scriptdist(temp.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".scriptdist.toml"));

    // A second init keeps the existing file.
    scriptdist(temp.path())
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn project_config_file_is_honoured() {
    let temp = project("3.0");
    write(temp.path(), ".scriptdist.toml", "[github]\nowner = \"acme\"\n");
    scriptdist(temp.path())
        .args(["config", "get", "github.owner"])
        .assert()
        .success()
        .stdout(predicate::str::diff("acme\n"));
}

#[test]
fn environment_overrides_config() {
    let temp = TempDir::new().unwrap();
    scriptdist(temp.path())
        .env("SCRIPTDIST__GIT__REMOTE", "upstream")
        .args(["config", "get", "git.remote"])
        .assert()
        .success()
        .stdout(predicate::str::diff("upstream\n"));
}

#[test]
fn completions_generate() {
    cargo_bin_cmd!("scriptdist")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scriptdist"));
}
