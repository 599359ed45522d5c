//! Configuration integration tests.
//!
//! These tests verify config discovery, format parsing, and precedence
//! from an end-to-end perspective using the compiled binary. Results are
//! observed through `info --json`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

/// Run `info --json` from `dir` and parse the output.
fn info_json(dir: &Path) -> serde_json::Value {
    let output = cmd()
        .env("AUTOBUMP_LOG_DIR", std::env::temp_dir().join("autobump-test-logs"))
        .args(["-C", dir.to_str().unwrap(), "info", "--json"])
        .assert()
        .success();
    serde_json::from_slice(&output.get_output().stdout).expect("info --json should output JSON")
}

// =============================================================================
// Config File Discovery
// =============================================================================

#[test]
fn runs_without_config_file() {
    let tmp = TempDir::new().unwrap();

    let json = info_json(tmp.path());
    assert!(json["config"].get("config_file").is_none());
    assert_eq!(json["bump"]["files"], serde_json::json!([]));
    assert_eq!(json["bump"]["snapshot_suffix"], "-SNAPSHOT");
}

#[test]
fn discovers_dotfile_config_in_current_dir() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".autobump.toml"), "[[bump.files]]\npath = \"VERSION\"\n").unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["bump"]["files"][0]["path"], "VERSION");
    assert!(
        json["config"]["config_file"]
            .as_str()
            .unwrap()
            .ends_with(".autobump.toml")
    );
}

#[test]
fn discovers_regular_config_in_current_dir() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("autobump.toml"), "[bump]\ncurrent_version = \"0.4.0\"\n").unwrap();

    assert_eq!(info_json(tmp.path())["bump"]["current_version"], "0.4.0");
}

#[test]
fn discovers_config_in_parent_directory() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("nested").join("deep");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(tmp.path().join(".autobump.toml"), "[bump]\nscripted = true\n").unwrap();

    assert_eq!(info_json(&sub_dir)["bump"]["scripted"], true);
}

#[test]
fn dotfile_takes_precedence_over_regular_name() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".autobump.toml"), "[bump]\nsnapshot_suffix = \"-dot\"\n").unwrap();
    fs::write(tmp.path().join("autobump.toml"), "[bump]\nsnapshot_suffix = \"-plain\"\n").unwrap();

    assert_eq!(info_json(tmp.path())["bump"]["snapshot_suffix"], "-dot");
}

// =============================================================================
// Config Format Parsing
// =============================================================================

#[test]
fn parses_toml_bump_section() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".autobump.toml"),
        r#"
[bump]
current_version = "0.9.0"
default_line_ending = "crlf"

[[bump.files]]
path = "src/version.ts"

[[bump.files]]
path = "README.md"
safe_matching = false
regex_replace = [{ regex = 'v\d+\.\d+\.\d+', value = "v{version}" }]
"#,
    )
    .unwrap();

    let json = info_json(tmp.path());
    let bump = &json["bump"];
    assert_eq!(bump["current_version"], "0.9.0");
    assert_eq!(bump["line_ending"], "crlf");
    assert_eq!(bump["files"][0]["safe_matching"], true);
    assert_eq!(bump["files"][1]["safe_matching"], false);
    assert_eq!(bump["files"][1]["regex_replace"][0]["value"], "v{version}");
}

#[test]
fn parses_yaml_bump_section() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".autobump.yaml"),
        r#"
bump:
  scripted: true
  files:
    - path: pom.xml
      scripted: true
"#,
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["bump"]["scripted"], true);
    assert_eq!(json["bump"]["files"][0]["path"], "pom.xml");
}

#[test]
fn parses_yml_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".autobump.yml"), "bump:\n  default_line_ending: cr\n").unwrap();

    assert_eq!(info_json(tmp.path())["bump"]["line_ending"], "cr");
}

#[test]
fn parses_json_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".autobump.json"),
        r#"{"bump": {"snapshot_suffix": "-dev", "files": [{"path": "VERSION"}]}}"#,
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["bump"]["snapshot_suffix"], "-dev");
    assert_eq!(json["bump"]["files"][0]["path"], "VERSION");
}

#[test]
fn explicit_config_flag_overrides_discovery() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".autobump.toml"),
        "[bump]\ncurrent_version = \"1.0.0\"\n[[bump.files]]\npath = \"a\"\n",
    )
    .unwrap();
    let explicit = tmp.path().join("release.toml");
    fs::write(&explicit, "[[bump.files]]\npath = \"b\"\n").unwrap();

    let output = cmd()
        .env("AUTOBUMP_LOG_DIR", tmp.path().join("logs"))
        .args(["-C", tmp.path().to_str().unwrap(), "--config"])
        .arg(&explicit)
        .args(["info", "--json"])
        .assert()
        .success();
    let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(json["bump"]["current_version"], "1.0.0");
    assert_eq!(json["bump"]["files"][0]["path"], "b");
    assert_eq!(json["bump"]["files"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Config Precedence
// =============================================================================

#[test]
fn closer_config_takes_precedence() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("project");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(tmp.path().join(".autobump.toml"), "[[bump.files]]\npath = \"outer\"\n").unwrap();
    fs::write(sub_dir.join(".autobump.toml"), "[[bump.files]]\npath = \"inner\"\n").unwrap();

    assert_eq!(info_json(&sub_dir)["bump"]["files"][0]["path"], "inner");
}

#[test]
fn toml_preferred_over_yaml_in_same_directory() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".autobump.toml"), "[bump]\nscripted = true\n").unwrap();
    fs::write(tmp.path().join(".autobump.yaml"), "bump:\n  scripted: false\n").unwrap();

    assert_eq!(info_json(tmp.path())["bump"]["scripted"], true);
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn invalid_toml_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".autobump.toml"), "this is not valid toml [[[").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn invalid_json_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".autobump.json"), "{not valid json}").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure();
}

#[test]
fn file_entry_without_path_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".autobump.toml"),
        "[[bump.files]]\nsafe_matching = false\n",
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure();
}

#[test]
fn unknown_line_ending_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".autobump.toml"),
        "[bump]\ndefault_line_ending = \"lfcr\"\n",
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure();
}

#[test]
fn unknown_config_field_is_ignored() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".autobump.toml"),
        r#"
unknown_field = "should be ignored"

[bump]
another_unknown = 42
"#,
    )
    .unwrap();

    info_json(tmp.path());
}

// =============================================================================
// Boundary Marker Tests
// =============================================================================

#[test]
fn git_boundary_stops_config_search() {
    let tmp = TempDir::new().unwrap();
    let parent = tmp.path().join("parent");
    let repo = parent.join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(parent.join(".autobump.toml"), "[[bump.files]]\npath = \"x\"\n").unwrap();
    fs::create_dir(repo.join(".git")).unwrap();

    let json = info_json(&src);
    assert!(json["config"].get("config_file").is_none());
    assert_eq!(json["bump"]["files"], serde_json::json!([]));
}

#[test]
fn config_in_same_dir_as_git_is_found() {
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path().join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();
    fs::write(repo.join(".autobump.toml"), "[[bump.files]]\npath = \"x\"\n").unwrap();

    assert_eq!(info_json(&src)["bump"]["files"][0]["path"], "x");
}
