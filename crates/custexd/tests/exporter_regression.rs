//! Exporter regression tests.
//!
//! Drives the assembled exporter against real scripts: cycle by cycle
//! through the router, over a real socket, and through the binary's
//! argument handling.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;

use custex_runner::PollState;
use custexd::{Cli, Exporter};

const SCENARIO_A: &str = "web, nginx, myapp, prod, example.com, latency, 12.5";

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("metrics.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A script whose output is whatever `output.txt` next to it contains.
fn switchable_script(dir: &Path) -> (PathBuf, PathBuf) {
    let output = dir.join("output.txt");
    std::fs::write(&output, "").unwrap();
    let script = write_script(dir, &format!("cat '{}'", output.display()));
    (script, output)
}

fn cli(script: &Path, extra: &[&str]) -> Cli {
    let mut args = vec![
        "custom-exporter".to_string(),
        "-script".to_string(),
        script.display().to_string(),
        "-port".to_string(),
        "9101".to_string(),
        "-timeout".to_string(),
        "1".to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    Cli::try_parse_args(args).unwrap()
}

async fn scrape(exporter: &Exporter) -> String {
    let req = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let resp = exporter.router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

fn series(body: &str) -> Vec<&str> {
    body.lines().filter(|l| !l.starts_with('#')).collect()
}

#[tokio::test]
async fn scenario_line_is_exposed_with_all_labels() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), &format!("echo '{SCENARIO_A}'"));
    let mut exporter = Exporter::from_cli(&cli(&script, &[])).unwrap();

    assert_eq!(exporter.poller.step().await, Duration::from_secs(1));

    let body = scrape(&exporter).await;
    assert_eq!(
        series(&body),
        [
            "prom_custom_custom_metrics{component=\"web\",process_name=\"nginx\",\
             application_name=\"myapp\",env=\"prod\",domain_name=\"example.com\",\
             mon_type=\"latency\"} 12.5"
        ]
    );
}

#[tokio::test]
async fn bad_cycle_keeps_previous_values_and_backs_off() {
    let dir = tempfile::tempdir().unwrap();
    let (script, output) = switchable_script(dir.path());
    let mut exporter = Exporter::from_cli(&cli(&script, &[])).unwrap();

    std::fs::write(&output, format!("{SCENARIO_A}\n")).unwrap();
    exporter.poller.step().await;

    // Five fields instead of seven.
    std::fs::write(&output, "web, nginx, myapp, prod, 1\n").unwrap();
    let delay = exporter.poller.step().await;

    assert_eq!(delay, Duration::from_secs(5));
    assert_eq!(exporter.poller.state(), PollState::BackingOff);
    let body = scrape(&exporter).await;
    assert_eq!(series(&body).len(), 1);
    assert!(body.contains("} 12.5"));
}

#[tokio::test]
async fn bad_first_cycle_exposes_no_series() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "echo 'only, three, fields'");
    let mut exporter = Exporter::from_cli(&cli(&script, &[])).unwrap();

    exporter.poller.step().await;

    assert!(series(&scrape(&exporter).await).is_empty());
}

#[tokio::test]
async fn empty_run_clears_stale_series() {
    let dir = tempfile::tempdir().unwrap();
    let (script, output) = switchable_script(dir.path());
    let mut exporter = Exporter::from_cli(&cli(&script, &[])).unwrap();

    std::fs::write(&output, format!("{SCENARIO_A}\n")).unwrap();
    exporter.poller.step().await;
    assert_eq!(series(&scrape(&exporter).await).len(), 1);

    std::fs::write(&output, "").unwrap();
    exporter.poller.step().await;

    assert_eq!(exporter.poller.state(), PollState::Running);
    assert!(series(&scrape(&exporter).await).is_empty());
}

#[tokio::test]
async fn config_file_selects_service_schema() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("exporter.toml");
    std::fs::write(
        &config,
        "[metric]\nnamespace = \"\"\nsubsystem = \"\"\nname = \"inventory\"\npreset = \"service\"\n",
    )
    .unwrap();
    let script = write_script(dir.path(), "echo 'erp, billing, invoices, api, db, 3'");
    let mut exporter =
        Exporter::from_cli(&cli(&script, &["-config", &config.display().to_string()])).unwrap();

    exporter.poller.step().await;

    let body = scrape(&exporter).await;
    assert!(body.contains("# TYPE inventory gauge"));
    assert!(body.contains(
        "inventory{system=\"erp\",subsystem=\"billing\",name=\"invoices\",service=\"api\",component=\"db\"} 3"
    ));
}

#[tokio::test]
async fn invalid_config_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("exporter.toml");
    std::fs::write(&config, "[metric]\nlabels = [\"bad-name\"]\n").unwrap();
    let script = write_script(dir.path(), "true");

    let result = Exporter::from_cli(&cli(&script, &["-config", &config.display().to_string()]));
    assert!(result.is_err());

    let missing = dir.path().join("missing.toml");
    let result = Exporter::from_cli(&cli(&script, &["-config", &missing.display().to_string()]));
    assert!(result.is_err());
}

async fn http_get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

#[tokio::test]
async fn serves_scraped_metrics_over_tcp() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), &format!("echo '{SCENARIO_A}'"));
    let exporter = Exporter::from_cli(&cli(&script, &[])).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(exporter.serve(listener, async move {
        let _ = stop_rx.await;
    }));

    let mut response = String::new();
    for _ in 0..50 {
        response = http_get(addr, "/metrics").await;
        if response.contains("} 12.5") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("mon_type=\"latency\"} 12.5"), "{response}");

    let health = http_get(addr, "/healthz").await;
    assert!(health.contains("ok generation="), "{health}");

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[test]
fn binary_rejects_short_argument_list() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_custom-exporter"))
        .args(["-script", "/bin/true", "-port", "9101"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: custom-exporter -script"), "{stderr}");
}

#[test]
fn binary_rejects_non_integer_timeout() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_custom-exporter"))
        .args(["-script", "/bin/true", "-port", "9101", "-timeout", "ten"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage:"));
}

#[test]
fn binary_exits_when_port_is_taken() {
    let taken = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
    let port = taken.local_addr().unwrap().port().to_string();

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_custom-exporter"))
        .args(["-script", "/bin/true", "-port", &port, "-timeout", "60"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("failed to bind port"),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    // Also reported through the log, not only the process error.
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("custom exporter failed: failed to bind port"), "{stdout}");
}

#[test]
fn binary_rejects_port_zero() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_custom-exporter"))
        .args(["-script", "/bin/true", "-port", "0", "-timeout", "60"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage:"));
}

#[tokio::test]
async fn non_zero_exit_still_publishes_output() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), &format!("echo '{SCENARIO_A}'\nexit 1"));
    let mut exporter = Exporter::from_cli(&cli(&script, &[])).unwrap();

    assert_eq!(exporter.poller.step().await, Duration::from_secs(1));

    assert_eq!(exporter.poller.state(), PollState::Running);
    assert!(scrape(&exporter).await.contains("mon_type=\"latency\"} 12.5"));
}
