#![cfg(feature = "cli")]

use std::process::{Command, Output};

/// Heartbeat header `{ 1: pdata, 14: 50 }`, pdata `{ 262: 76.5f }` XORed with 50.
const HEARTBEAT_HEX: &str = "0a0687223232ab707032";

fn altcharge(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_altcharge"))
        .arg("--log-level")
        .arg("off")
        .args(args)
        .output()
        .expect("altcharge should run")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("stdout should be json")
}

#[test]
fn decode_heartbeat_outputs_telemetry() {
    let output = altcharge(&["--format", "json", "decode", HEARTBEAT_HEX]);
    assert!(output.status.success());

    let payload = stdout_json(&output);
    assert_eq!(payload["sequence"], 50);
    assert_eq!(payload["class"], "heartbeat");
    assert_eq!(payload["telemetry"]["batSoc"].as_f64(), Some(76.5));
}

#[test]
fn decode_bare_payload_with_seq() {
    // pdata { 1: 3, 102: 25 } XORed with 2, no header around it.
    let output = altcharge(&["--format", "json", "decode", "--seq", "2", "0a01b2041b"]);
    assert!(output.status.success());

    let payload = stdout_json(&output);
    assert_eq!(payload["telemetry"]["status1"], 3);
    assert_eq!(payload["telemetry"]["temp"], 25);
}

#[test]
fn decode_truncated_frame_is_empty_not_an_error() {
    let output = altcharge(&["--format", "raw", "decode", "80"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "{}");
}

#[test]
fn decode_rejects_invalid_hex() {
    let output = altcharge(&["decode", "zz"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn encode_is_byte_exact_with_fixed_seq() {
    let output = altcharge(&[
        "--format", "pretty", "encode", "--seq", "1", "--param", "startStop=1",
    ]);
    assert!(output.status.success());

    let expected = concat!(
        "0a2c",
        "0a03d00701",
        "1020",
        "1814",
        "2001",
        "2801",
        "3001",
        "3803",
        "40fe01",
        "4811",
        "5003",
        "5801",
        "7001",
        "800113",
        "880101",
        "ba0107",
        "416e64726f6964",
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), expected);
}

#[test]
fn encode_start_voltage_reports_marker() {
    let output = altcharge(&[
        "--format",
        "json",
        "encode",
        "--json",
        r#"{"id": 17, "startVoltage": 13.5}"#,
    ]);
    assert!(output.status.success());

    let payload = stdout_json(&output);
    assert_eq!(payload["data_len"], 4);
    assert!(payload["seq"].as_u64().unwrap() >= 100_000_000);
    // pdata { 137: 135 } = c8 08 87 01
    assert!(payload["hex"].as_str().unwrap().contains("0a04c8088701"));
}

#[test]
fn encode_overflow_sends_nothing() {
    let output = altcharge(&["--format", "raw", "encode", "--param", "startVoltage=nan"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(output.stdout.is_empty());
}

#[test]
fn inspect_lists_raw_fields() {
    let output = altcharge(&["--format", "json", "inspect", HEARTBEAT_HEX]);
    assert!(output.status.success());

    let payload = stdout_json(&output);
    assert_eq!(payload["xor_key"], 50);
    assert_eq!(payload["header"]["seq"], 50);
    assert_eq!(payload["fields"][0]["number"], 262);
    assert_eq!(payload["fields"][0]["name"], "batSoc");
}

#[test]
fn version_reports_package_version() {
    let output = altcharge(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
