use rollcall_protocol::{ErrorBody, HealthResponse, MutationResponse, StatusMap, StatusRecord};
use serde_json::json;
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};
use tempfile::TempDir;

struct DaemonGuard {
    child: Child,
    base_url: String,
}

impl Drop for DaemonGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe port");
    listener.local_addr().expect("Probe port has no address").port()
}

fn spawn_daemon(home: &Path) -> DaemonGuard {
    let port = free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_rollcall-daemon"))
        .env("HOME", home)
        .env("ROLLCALL_HOME", home)
        .env("PORT", port.to_string())
        .env_remove("ROLLCALL_DATA_FILE")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn rollcall-daemon");
    wait_for_port(port, Duration::from_secs(5));
    DaemonGuard {
        child,
        base_url: format!("http://127.0.0.1:{port}"),
    }
}

fn wait_for_port(port: u16, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if TcpStream::connect(("127.0.0.1", port)).is_ok() {
            return;
        }
        sleep(Duration::from_millis(25));
    }
    panic!("Timed out waiting for daemon on port {port}");
}

fn client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build client")
}

fn get_statuses(daemon: &DaemonGuard) -> StatusMap {
    client()
        .get(format!("{}/api/statuses", daemon.base_url))
        .send()
        .expect("GET statuses failed")
        .json()
        .expect("Invalid statuses body")
}

#[test]
fn starts_with_empty_file_and_round_trips_a_record() {
    let temp = TempDir::new().expect("tempdir");
    let daemon = spawn_daemon(temp.path());

    assert!(get_statuses(&daemon).is_empty());
    let on_disk = std::fs::read_to_string(temp.path().join("data.json")).expect("data file");
    assert_eq!(on_disk.trim(), "{}");

    let response = client()
        .post(format!("{}/api/status", daemon.base_url))
        .json(&json!({
            "name": "Alex Nania",
            "status": {"category": "notInRoom", "arrivalTime": "20:00", "reason": "Class"}
        }))
        .send()
        .expect("POST failed");
    assert_eq!(response.status(), 200);
    let body: MutationResponse = response.json().expect("Invalid mutation body");
    assert!(body.success);

    let statuses = get_statuses(&daemon);
    let record = statuses.get("Alex Nania").expect("record missing");
    assert_eq!(record.reason(), Some("Class"));
    assert_eq!(record.arrival_time().map(|t| t.to_string()), Some("20:00".into()));
    assert_eq!(body.statuses, statuses);
}

#[test]
fn missing_fields_are_rejected_with_400() {
    let temp = TempDir::new().expect("tempdir");
    let daemon = spawn_daemon(temp.path());

    for payload in [
        json!({"status": {"category": "inRoom"}}),
        json!({"name": "DJ"}),
        json!({"name": "", "status": {"category": "inRoom"}}),
    ] {
        let response = client()
            .post(format!("{}/api/status", daemon.base_url))
            .json(&payload)
            .send()
            .expect("POST failed");
        assert_eq!(response.status(), 400);
        let body: ErrorBody = response.json().expect("Invalid error body");
        assert_eq!(body.error, "Name and status are required");
    }

    assert!(get_statuses(&daemon).is_empty());
}

#[test]
fn later_write_wins() {
    let temp = TempDir::new().expect("tempdir");
    let daemon = spawn_daemon(temp.path());

    for status in [
        json!({"category": "inRoom"}),
        json!({"category": "rolledOut", "rolledOutBy": "Owen Rowe"}),
    ] {
        client()
            .post(format!("{}/api/status", daemon.base_url))
            .json(&json!({"name": "DJ", "status": status}))
            .send()
            .expect("POST failed");
    }

    assert_eq!(
        get_statuses(&daemon).get("DJ"),
        Some(&StatusRecord::rolled_out(Some("Owen Rowe")))
    );
}

#[test]
fn delete_removes_the_member() {
    let temp = TempDir::new().expect("tempdir");
    let daemon = spawn_daemon(temp.path());

    client()
        .post(format!("{}/api/status", daemon.base_url))
        .json(&json!({"name": "Will Reem", "status": {"category": "inRoom"}}))
        .send()
        .expect("POST failed");

    let response = client()
        .delete(format!("{}/api/status/Will%20Reem", daemon.base_url))
        .send()
        .expect("DELETE failed");
    assert_eq!(response.status(), 200);
    let body: MutationResponse = response.json().expect("Invalid mutation body");
    assert!(body.statuses.is_empty());
    assert!(get_statuses(&daemon).is_empty());
}

#[test]
fn health_reports_member_count() {
    let temp = TempDir::new().expect("tempdir");
    let daemon = spawn_daemon(temp.path());

    client()
        .post(format!("{}/api/status", daemon.base_url))
        .json(&json!({"name": "DJ", "status": {"category": "inRoom", "leaveTime": "23:30"}}))
        .send()
        .expect("POST failed");

    let health: HealthResponse = client()
        .get(format!("{}/api/health", daemon.base_url))
        .send()
        .expect("GET health failed")
        .json()
        .expect("Invalid health body");
    assert_eq!(health.status, "ok");
    assert_eq!(health.members, 1);
}

#[test]
fn unreadable_data_file_fails_health_and_reads() {
    let temp = TempDir::new().expect("tempdir");
    let daemon = spawn_daemon(temp.path());
    std::fs::write(temp.path().join("data.json"), "not json").expect("corrupt data file");

    for path in ["/api/health", "/api/statuses"] {
        let response = client()
            .get(format!("{}{}", daemon.base_url, path))
            .send()
            .expect("GET failed");
        assert_eq!(response.status(), 500, "{path}");
        let body: ErrorBody = response.json().expect("Invalid error body");
        assert_eq!(body.error, "Failed to read data");
    }
}
