#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PDF: &[u8] = b"%PDF-1.7\n%fake\n";

fn invoice_pdf(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("invoice-pdf").unwrap();
    cmd.current_dir(dir.path())
        .env("INVOICE_ROOT", dir.path())
        .env("HOME", dir.path())
        .env_remove("INVOICE_PDF_ENDPOINT")
        .env_remove("RUST_LOG");
    cmd
}

fn write_payload(dir: &TempDir, name: &str, json: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, json).unwrap();
    path.display().to_string()
}

fn pdf_server() -> (mockito::ServerGuard, String) {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/render")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body(PDF)
        .create();
    let url = format!("{}/render", server.url());
    (server, url)
}

fn saved_list(dir: &TempDir) -> serde_json::Value {
    let out = invoice_pdf(dir)
        .args(["saved", "list", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    serde_json::from_slice(&out.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// init / config
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();
    invoice_pdf(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .invoice/config.yaml"));
    assert!(dir.path().join(".invoice/config.yaml").exists());

    invoice_pdf(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  .invoice/config.yaml"));
}

#[test]
fn config_validate_rejects_bad_endpoint() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".invoice")).unwrap();
    std::fs::write(
        dir.path().join(".invoice/config.yaml"),
        "render:\n  endpoint: render.local/pdf\n",
    )
    .unwrap();

    invoice_pdf(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] render.endpoint"));
}

#[test]
fn config_validate_accepts_defaults() {
    let dir = TempDir::new().unwrap();
    invoice_pdf(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn generate_downloads_invoice_pdf() {
    let dir = TempDir::new().unwrap();
    let (_server, url) = pdf_server();
    let payload = write_payload(&dir, "inv.json", r#"{"invoiceNumber":"INV-1"}"#);
    let out_dir = dir.path().join("out");

    invoice_pdf(&dir)
        .args([
            "generate",
            payload.as_str(),
            "--download",
            "--endpoint",
            url.as_str(),
            "--out-dir",
        ])
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("PDF generated"))
        .stdout(predicate::str::contains("Downloaded:"));

    assert_eq!(std::fs::read(out_dir.join("invoice.pdf")).unwrap(), PDF);
}

#[test]
fn generate_reads_payload_from_stdin() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/render")
        .match_body(mockito::Matcher::Json(
            serde_json::json!({"invoiceNumber": "INV-STDIN"}),
        ))
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body(PDF)
        .create();

    invoice_pdf(&dir)
        .args(["generate", "-", "--json"])
        .env("INVOICE_PDF_ENDPOINT", format!("{}/render", server.url()))
        .write_stdin(r#"{"invoiceNumber":"INV-STDIN"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("\"bytes\": {}", PDF.len())));
    mock.assert();
}

#[test]
fn generate_failure_exits_nonzero_without_side_effects() {
    let dir = TempDir::new().unwrap();
    let payload = write_payload(&dir, "inv.json", r#"{"invoiceNumber":"INV-1"}"#);
    let out_dir = dir.path().join("out");

    invoice_pdf(&dir)
        .args([
            "generate",
            payload.as_str(),
            "--download",
            "--save",
            "--endpoint",
            "http://127.0.0.1:1/render",
            "--out-dir",
        ])
        .arg(&out_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: render via"));

    assert!(!out_dir.join("invoice.pdf").exists());
    assert_eq!(saved_list(&dir), serde_json::json!([]));
}

#[test]
fn generate_server_error_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    server.mock("POST", "/render").with_status(500).create();
    let payload = write_payload(&dir, "inv.json", r#"{"a":1}"#);

    invoice_pdf(&dir)
        .args(["generate", payload.as_str(), "--endpoint"])
        .arg(format!("{}/render", server.url()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("HTTP 500"));
}

#[test]
fn generate_with_save_appends_in_order() {
    let dir = TempDir::new().unwrap();
    let (_server, url) = pdf_server();
    let first = write_payload(&dir, "a1.json", r#"{"a":1}"#);
    let second = write_payload(&dir, "a2.json", r#"{"a":2}"#);

    for payload in [&first, &second] {
        invoice_pdf(&dir)
            .args(["generate", payload.as_str(), "--save", "--endpoint", url.as_str()])
            .assert()
            .success();
    }

    assert_eq!(saved_list(&dir), serde_json::json!([{"a": 1}, {"a": 2}]));

    let raw = std::fs::read_to_string(dir.path().join(".invoice/storage.json")).unwrap();
    let store: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let saved: serde_json::Value =
        serde_json::from_str(store["savedInvoices"].as_str().unwrap()).unwrap();
    assert_eq!(saved, serde_json::json!([{"a": 1}, {"a": 2}]));
}

// ---------------------------------------------------------------------------
// save / saved
// ---------------------------------------------------------------------------

#[test]
fn save_without_pdf_is_skipped() {
    let dir = TempDir::new().unwrap();
    let payload = write_payload(&dir, "inv.json", r#"{"invoiceNumber":"INV-9"}"#);

    invoice_pdf(&dir)
        .args(["save", payload.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Save skipped"));

    assert!(!dir.path().join(".invoice/storage.json").exists());
}

#[test]
fn save_always_persists_and_lists() {
    let dir = TempDir::new().unwrap();
    let payload = write_payload(&dir, "inv.json", r#"{"invoiceNumber":"INV-9","total":42}"#);

    invoice_pdf(&dir)
        .args(["save", payload.as_str(), "--always"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved (1 total)"));

    invoice_pdf(&dir)
        .args(["saved", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INV-9"));

    invoice_pdf(&dir)
        .args(["saved", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 42"));
}

#[test]
fn save_works_without_home() {
    let dir = TempDir::new().unwrap();
    let payload = write_payload(&dir, "inv.json", r#"{"invoiceNumber":"INV-3"}"#);

    invoice_pdf(&dir)
        .env_remove("HOME")
        .args(["save", payload.as_str(), "--always"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved (1 total)"));
}

#[test]
fn saved_show_out_of_range_fails() {
    let dir = TempDir::new().unwrap();
    invoice_pdf(&dir)
        .args(["saved", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no saved invoice #1 (0 saved)"));
}

#[test]
fn corrupt_storage_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".invoice")).unwrap();
    std::fs::write(
        dir.path().join(".invoice/storage.json"),
        r#"{"savedInvoices":"{oops"}"#,
    )
    .unwrap();

    invoice_pdf(&dir)
        .args(["saved", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed"));
}
