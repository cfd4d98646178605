use predicates::prelude::*;

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(parts: &[&str]) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    for part in parts {
        path.push(part);
    }
    path.to_string_lossy().into_owned()
}

/// Test that the binary runs and shows help
#[test]
fn test_help_command() {
    assert_cmd::cargo_bin_cmd!("vss-mapper")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("vehicle HAL property model"));
}

/// Test that the binary shows version
#[test]
fn test_version_command() {
    assert_cmd::cargo_bin_cmd!("vss-mapper")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vss-mapper"));
}

/// Test convert with a nonexistent root spec
#[test]
fn test_convert_nonexistent_spec() {
    assert_cmd::cargo_bin_cmd!("vss-mapper")
        .args(["convert", "/nonexistent/root.vspec"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Root specification not found"));
}

/// Test convert writes the model JSON to stdout
#[test]
fn test_convert_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let spec = temp_dir.path().join("root.vspec");
    fs::write(&spec, "A:\n  type: branch\n  B:\n    datatype: float\n    description: x\n").unwrap();

    assert_cmd::cargo_bin_cmd!("vss-mapper")
        .args(["convert", spec.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"A.B\""))
        .stdout(predicate::str::contains("\"target_type\": \"FLOAT\""))
        .stdout(predicate::str::contains("\"change_mode\": \"ON_CHANGE\""));
}

/// Test convert writes to an output file
#[test]
fn test_convert_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("model.json");
    let spec = fixture(&["vss", "Vehicle.vspec"]);
    let config = fixture(&["config"]);

    assert_cmd::cargo_bin_cmd!("vss-mapper")
        .args(["convert", spec.as_str(), "--config-dir", config.as_str(), "-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("14 signal(s)"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["Vehicle.Speed"]["change_mode"], "CONTINUOUS");
    assert_eq!(json["Vehicle.Cabin.Row1.DriverSide.IsLocked"]["area"], "DOOR");
}

/// Test check prints diagnostics and a summary
#[test]
fn test_check_reports_diagnostics() {
    let spec = fixture(&["vss", "Vehicle.vspec"]);
    let config = fixture(&["config"]);

    assert_cmd::cargo_bin_cmd!("vss-mapper")
        .args(["check", spec.as_str(), "--config-dir", config.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("error[missing-include] Missing.vspec"))
        .stdout(predicate::str::contains("info[unmapped-unit] Vehicle.Powertrain.AccumulatedBrakingEnergy"))
        .stdout(predicate::str::contains("1 error(s), 0 warning(s), 1 info"));
}

/// Test --deny-warnings turns recorded diagnostics into a failing exit status
#[test]
fn test_check_deny_warnings_fails() {
    let spec = fixture(&["vss", "Vehicle.vspec"]);
    let config = fixture(&["config"]);

    assert_cmd::cargo_bin_cmd!("vss-mapper")
        .args(["check", spec.as_str(), "--config-dir", config.as_str(), "--deny-warnings"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--deny-warnings"));
}

/// Test --deny-warnings passes when only informational diagnostics exist
#[test]
fn test_deny_warnings_ignores_info() {
    let temp_dir = TempDir::new().unwrap();
    let spec = temp_dir.path().join("root.vspec");
    fs::write(&spec, "Speed:\n  datatype: float\n  unit: furlong\n  description: s\n").unwrap();

    assert_cmd::cargo_bin_cmd!("vss-mapper")
        .args(["check", spec.to_str().unwrap(), "--deny-warnings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 warning(s), 1 info"));
}

/// Test an unparseable configuration file is fatal
#[test]
fn test_bad_config_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let spec = temp_dir.path().join("root.vspec");
    fs::write(&spec, "A: {type: branch}\n").unwrap();
    let config_dir = temp_dir.path().join("config");
    fs::create_dir(&config_dir).unwrap();
    fs::write(
        config_dir.join("property_heuristics.yml"),
        "access_mode_rules:\n  - patterns: [x]\n    result: sometimes\n",
    )
    .unwrap();

    assert_cmd::cargo_bin_cmd!("vss-mapper")
        .args(["check", spec.to_str().unwrap(), "--config-dir", config_dir.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
