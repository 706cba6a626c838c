//! Basic CLI tests for the entigen command-line interface.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BOILER_TOML: &str = r#"
[opentherm]
in_pin = "GPIO21"
out_pin = "GPIO22"

[sensor.t_boiler]
name = "Boiler water"

[sensor.ch_pressure]
data_type = "f88"
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Test that the CLI binary exists and shows help.
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("compile"))
        .stdout(predicate::str::contains("sensors"))
        .stdout(predicate::str::contains("decode"))
        .stdout(predicate::str::contains("packet"))
        .stdout(predicate::str::contains("request"));
}

/// Test that the CLI shows version information.
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("entigen"));
}

/// Test that providing no subcommand shows an error.
#[test]
fn test_no_subcommand_shows_error() {
    let mut cmd = Command::cargo_bin("entigen").unwrap();

    cmd.assert().failure().code(2);
}

#[test]
fn test_validate_valid_toml() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "boiler.toml", BOILER_TOML);

    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("validate").arg(&path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Configuration: VALID"))
        .stdout(predicate::str::contains("opentherm_hub"))
        .stdout(predicate::str::contains("- ch_pressure"))
        .stdout(predicate::str::contains("- t_boiler"));
}

#[test]
fn test_validate_reports_every_issue() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "broken.json",
        r#"{"opentherm": {"in_pin": 4}, "sensor": {"t_boiler": {"data_type": "u32"}}}"#,
    );

    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("validate").arg(&path);

    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Configuration: INVALID"))
        .stdout(predicate::str::contains("MISSING_REQUIRED"))
        .stdout(predicate::str::contains("[opentherm->out_pin]"))
        .stdout(predicate::str::contains("unknown value 'u32'"));
}

#[test]
fn test_validate_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "boiler.yaml", "opentherm: {}");

    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("validate").arg(&path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type"));
}

#[test]
fn test_compile_to_stdout() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "boiler.toml", BOILER_TOML);

    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("compile").arg(&path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("void setup() {"))
        .stdout(predicate::str::contains(
            "opentherm_hub->set_t_boiler_sensor(t_boiler_sensor);",
        ))
        .stdout(predicate::str::contains(
            "opentherm_hub->set_ch_pressure_sensor_data_type(opentherm::MessageDataType::F88);",
        ));
}

#[test]
fn test_compile_to_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "boiler.toml", BOILER_TOML);
    let out = dir.path().join("main.cpp");

    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("compile").arg(&path).arg("-o").arg(&out);

    cmd.assert().success();
    let code = fs::read_to_string(&out).unwrap();
    assert!(code.contains("App.register_sensor(t_boiler_sensor);"));
}

#[test]
fn test_sensors_lists_table() {
    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("sensors");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("t_boiler"))
        .stdout(predicate::str::contains("FEED_TEMP"))
        .stdout(predicate::str::contains("rel_mod_level"));
}

#[test]
fn test_sensors_json() {
    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("sensors").arg("--json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let table: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(table["t_boiler"]["message"], "FEED_TEMP");
    assert_eq!(table["t_boiler"]["message_data"], "f88");
}

#[test]
fn test_decode_uses_table_data_types() {
    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("decode").arg("0xC0193C80");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("00000100 00011001 00111100 10000000"))
        .stdout(predicate::str::contains("type: READ_ACK; id: FEED_TEMP"))
        .stdout(predicate::str::contains("t_boiler (f88): 60.5"));
}

#[test]
fn test_decode_with_explicit_data_type() {
    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("decode").arg("0xC0193C80").arg("--data-type").arg("u8_hb");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("u8_hb: 60"));
}

#[test]
fn test_decode_rejects_bad_parity() {
    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("decode").arg("0x40193C80");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("parity error"));
}

#[test]
fn test_request_encodes_command_packet() {
    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("request").arg("0xC0193C80");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("a000040800030c01090c000000000060"));
}

#[test]
fn test_packet_decodes_command_response() {
    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("packet").arg("ff a0 00 05 08 00 03 0c 01 09 0c 00 00 01 00 00 00 00 60");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OT_COMMAND_RESPONSE (status 1)"))
        .stdout(predicate::str::contains("id: FEED_TEMP"));
}

#[test]
fn test_packet_reports_wrong_size() {
    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("packet").arg("a0000400010000000060");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("DROPPED: packet type 4 carries 4 bytes, got 1"));
}

#[test]
fn test_packet_without_complete_packet_fails() {
    let mut cmd = Command::cargo_bin("entigen").unwrap();
    cmd.arg("packet").arg("a00004");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No complete packet"));
}
