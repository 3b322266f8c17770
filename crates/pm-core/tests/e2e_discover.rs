//! End-to-end tests for the pm-core binary on the sample log.
//!
//! Sample log: T1 = A (2024-01-01), B (2024-01-02); T2 = A (2024-01-01), C (2024-01-03).

use assert_cmd::Command;
use serde_json::Value;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread;
use tempfile::TempDir;

fn pm_core(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pm-core").expect("pm-core binary should exist");
    cmd.env_remove("PM_CONFIG")
        .env_remove("PM_CONFIG_DIR")
        .env("XDG_CONFIG_HOME", home)
        .env("HOME", home)
        .env("PM_LOG", "error");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn run_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("run pm-core");
    assert!(
        output.status.success(),
        "pm-core failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn connection<'a>(connections: &'a [Value], e1: &str, e2: &str) -> &'a Value {
    connections
        .iter()
        .find(|c| c["e1"] == e1 && c["e2"] == e2)
        .unwrap_or_else(|| panic!("missing connection {e1} -> {e2}"))
}

#[test]
fn discover_sample_request() {
    let home = TempDir::new().unwrap();
    let out = run_json(
        pm_core(home.path())
            .args(["discover", "--no-deliver"])
            .arg(fixture("sample_request.json")),
    );

    assert_eq!(out["schema_version"], "1.0.0");
    assert!(out["delivery"].is_null());

    let response = &out["response"];
    assert_eq!(response["id"], "sample-1");
    assert_eq!(response["created"].as_str().unwrap().len(), 26);

    let connections = response["graph"]["connections"].as_array().unwrap();
    assert_eq!(connections.len(), 5);
    assert_eq!(connection(connections, "start_node", "A")["frequency"], 2);
    assert_eq!(connection(connections, "A", "B")["frequency"], 1);
    assert_eq!(connection(connections, "A", "B")["mean"], 86400.0);
    assert_eq!(connection(connections, "A", "C")["mean"], 172800.0);
    assert_eq!(connection(connections, "C", "end_node")["stdev"], -1.0);

    let metrics = &response["metrics"];
    assert_eq!(metrics["case_count"], 2);
    assert_eq!(metrics["event_count"], 4);
    assert_eq!(metrics["variant_count"], 2);
    assert_eq!(metrics["min_trace_duration"], 86400.0);
    assert_eq!(metrics["max_trace_duration"], 172800.0);
    assert_eq!(metrics["event_frequency_distribution"]["A"], 2);
    assert_eq!(metrics["trace_length_distribution"]["2"], 2);
    assert_eq!(metrics["top_variants"].as_array().unwrap().len(), 2);
}

#[test]
fn discover_reads_stdin() {
    let home = TempDir::new().unwrap();
    let request = std::fs::read_to_string(fixture("sample_request.json")).unwrap();
    let out = run_json(
        pm_core(home.path())
            .args(["discover", "--no-deliver", "-"])
            .write_stdin(request),
    );
    assert_eq!(out["response"]["metrics"]["case_count"], 2);
}

#[test]
fn config_exclusions_drop_metrics() {
    let home = TempDir::new().unwrap();
    let out = run_json(
        pm_core(home.path())
            .arg("--config")
            .arg(fixture("config.yml"))
            .args(["discover", "--no-deliver"])
            .arg(fixture("sample_request.json")),
    );
    let metrics = out["response"]["metrics"].as_object().unwrap();
    assert!(!metrics.contains_key("active_events"));
    assert!(metrics.contains_key("case_count"));
}

#[test]
fn reduce_keeps_dominant_variant() {
    let home = TempDir::new().unwrap();
    let out = run_json(
        pm_core(home.path())
            .args(["reduce", "--retain", "0"])
            .arg(fixture("sample_request.json")),
    );
    assert_eq!(out["stats"]["cases_before"], 2);
    assert_eq!(out["stats"]["cases_after"], 1);
    assert_eq!(out["log"]["concept:name"].as_object().unwrap().len(), 2);
}

#[test]
fn encode_counts_then_strip_round_trips_labels() {
    let home = TempDir::new().unwrap();
    let encoded = run_json(
        pm_core(home.path())
            .args(["encode", "--counts"])
            .arg(fixture("sample_request.json")),
    );
    assert_eq!(encoded["mode"], "counting");
    assert_eq!(encoded["log"]["concept:name"]["0"], "A_1");

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("encoded.json");
    std::fs::write(&path, encoded["log"].to_string()).unwrap();

    let stripped = run_json(pm_core(home.path()).args(["encode", "--strip"]).arg(&path));
    assert_eq!(stripped["log"]["concept:name"]["0"], "A");
    assert_eq!(stripped["log"]["concept:name"]["3"], "C");
}

#[test]
fn graph_uses_custom_node_names() {
    let home = TempDir::new().unwrap();
    let out = run_json(
        pm_core(home.path())
            .args(["graph", "--start-node", "START", "--end-node", "END"])
            .arg(fixture("sample_request.json")),
    );
    let connections = out["graph"]["connections"].as_array().unwrap();
    assert_eq!(connection(connections, "START", "A")["frequency"], 2);
    assert_eq!(connection(connections, "B", "END")["frequency"], 1);
}

#[test]
fn metrics_top_limits_variants() {
    let home = TempDir::new().unwrap();
    let out = run_json(
        pm_core(home.path())
            .args(["metrics", "--top", "1"])
            .arg(fixture("sample_request.json")),
    );
    assert_eq!(out["metrics"]["top_variants"].as_array().unwrap().len(), 1);
    assert_eq!(
        out["metrics"]["time_between_events"].as_array().unwrap().len(),
        1
    );
}

#[test]
fn check_summary_format() {
    let home = TempDir::new().unwrap();
    let output = pm_core(home.path())
        .args(["-f", "summary", "check"])
        .arg(fixture("sample_request.json"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("check: OK (4 events, 2 cases)"));
}

#[test]
fn schema_list_and_single() {
    let home = TempDir::new().unwrap();
    let list = run_json(pm_core(home.path()).args(["schema", "--list"]));
    assert!(list
        .as_array()
        .unwrap()
        .iter()
        .any(|entry| entry["name"] == "DiscoveryResponse"));

    let schema = run_json(pm_core(home.path()).args(["schema", "MetricsBundle"]));
    assert!(schema.get("$schema").is_some() || schema.get("type").is_some());
}

#[test]
fn config_show_defaults() {
    let home = TempDir::new().unwrap();
    let out = run_json(pm_core(home.path()).args(["config", "show"]));
    assert!(out["source"]["path"].is_null());
    assert_eq!(out["config"]["defaults"]["n_top_variants"], 10);
}

#[test]
fn version_reports_schema() {
    let home = TempDir::new().unwrap();
    let out = run_json(pm_core(home.path()).arg("version"));
    assert_eq!(out["schema_version"], "1.0.0");
}

/// Accept one POST, answer with `status_line`, and return the body.
fn callback_server(status_line: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/hook", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap();
            }
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).unwrap();
        let mut stream = stream;
        write!(
            stream,
            "{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        )
        .unwrap();
        String::from_utf8(body).unwrap()
    });
    (url, handle)
}

fn request_with_callback(dir: &TempDir, url: &str) -> PathBuf {
    let mut request: Value =
        serde_json::from_str(&std::fs::read_to_string(fixture("sample_request.json")).unwrap())
            .unwrap();
    request["callback_url"] = Value::String(url.to_string());
    let path = dir.path().join("request.json");
    std::fs::write(&path, request.to_string()).unwrap();
    path
}

#[test]
fn discover_posts_response_to_callback() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let (url, server) = callback_server("HTTP/1.1 200 OK");
    let path = request_with_callback(&dir, &url);

    let out = run_json(pm_core(home.path()).arg("discover").arg(path));
    assert_eq!(out["delivery"]["delivered"], true);
    assert_eq!(out["delivery"]["status"], 200);

    let posted: Value = serde_json::from_str(&server.join().unwrap()).unwrap();
    assert_eq!(posted["id"], "sample-1");
    assert_eq!(posted["graph"], out["response"]["graph"]);
}

#[test]
fn failed_callback_still_prints_response() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let (url, server) = callback_server("HTTP/1.1 503 Service Unavailable");
    let path = request_with_callback(&dir, &url);

    let output = pm_core(home.path()).arg("discover").arg(path).output().unwrap();
    server.join().unwrap();
    assert_eq!(output.status.code(), Some(23));

    let out: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(out["delivery"]["delivered"], false);
    assert_eq!(out["response"]["metrics"]["case_count"], 2);
}
