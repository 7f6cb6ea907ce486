use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn opmatrix() -> Command {
    Command::cargo_bin("opmatrix").unwrap()
}

#[test]
fn test_generate_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    opmatrix()
        .args(["generate", "--annotate", "-o"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 635 operators"));

    assert!(dir.path().join("operators.c").is_file());
    assert!(dir.path().join("operators.sql").is_file());
    let scenarios = fs::read_to_string(dir.path().join("test/sql/operators.sql")).unwrap();
    assert!(scenarios.contains("SELECT '3'::uint1 + '4'::int2; --> 7"));
}

#[test]
fn test_generate_with_matrix_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("matrix.json");
    fs::write(
        &config,
        r#"{"arithmetic": false, "bitwise": false, "complement": false, "shifts": false}"#,
    )
    .unwrap();

    opmatrix()
        .args(["generate", "-o"])
        .arg(dir.path().join("out"))
        .arg("--matrix-config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 330 operators"));
}

#[test]
fn test_generate_with_emitter_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("emit.json");
    fs::write(&config, r#"{"module_name": "fixedint"}"#).unwrap();

    opmatrix()
        .args(["generate", "-o"])
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let registration = fs::read_to_string(dir.path().join("operators.sql")).unwrap();
    assert!(registration.contains("'$libdir/fixedint'"));
}

#[test]
fn test_list_filters() {
    opmatrix()
        .args(["list", "--operator", "%", "--type", "uint8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("uint8int2mod"))
        .stdout(predicate::str::contains("uint1pl").not());
}

#[test]
fn test_list_json() {
    let output = opmatrix()
        .args(["list", "--format", "json", "--operator", "~"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 5);
}

#[test]
fn test_list_rejects_unknown_type() {
    opmatrix()
        .args(["list", "--type", "uint16"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("uint16"));
}

#[test]
fn test_validate_generated_registration() {
    let dir = tempfile::tempdir().unwrap();
    opmatrix()
        .args(["generate", "-o"])
        .arg(dir.path())
        .assert()
        .success();

    opmatrix()
        .arg("validate")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("VALID"))
        .stdout(predicate::str::contains("635 functions, 635 operators"));
}

#[test]
fn test_validate_reports_undeclared_procedure() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("broken.sql");
    fs::write(
        &script,
        "CREATE OPERATOR + (LEFTARG = uint1, RIGHTARG = uint1, PROCEDURE = uint1uint1pl);\n",
    )
    .unwrap();

    opmatrix()
        .arg("validate")
        .arg(&script)
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID"))
        .stdout(predicate::str::contains(
            "line 1: procedure uint1uint1pl is not declared",
        ));
}

#[test]
fn test_validate_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    opmatrix()
        .arg("validate")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no .sql scripts"));
}

#[test]
fn test_check_generated_scenarios() {
    let dir = tempfile::tempdir().unwrap();
    opmatrix()
        .args(["generate", "--annotate", "-o"])
        .arg(dir.path())
        .assert()
        .success();

    opmatrix()
        .arg("check")
        .arg(dir.path().join("test/sql/operators.sql"))
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"));
}

#[test]
fn test_check_reports_wrong_annotation() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("probe.sql");
    fs::write(
        &script,
        "SELECT '255'::uint1 + '1'::uint1; --> 0\nSELECT '2'::uint1 * '2'::uint1; --> 4\n",
    )
    .unwrap();

    opmatrix()
        .arg("check")
        .arg(&script)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "line 1: expected \"0\", evaluated \"ERROR:  integer out of range\"",
        ));
}

#[test]
fn test_check_syntax_error() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("bad.sql");
    fs::write(&script, "SELECT '1'::uint1 +;\n").unwrap();

    opmatrix()
        .arg("check")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}

#[test]
fn test_verify_restricted_matrix() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("matrix.json");
    fs::write(
        &config,
        r#"{"comparisons": false, "arithmetic": false, "shifts": false}"#,
    )
    .unwrap();

    opmatrix()
        .arg("verify")
        .arg("--matrix-config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("agree with exact arithmetic"));
}

#[test]
fn test_json_logging_goes_to_stderr() {
    let output = opmatrix()
        .args(["--log-level", "info", "--log-format", "json", "list", "--operator", "~"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("\"level\""));
}
