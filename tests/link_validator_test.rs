//! Integration tests for link validation against a local HTTP server

mod common;

use common::Fixture;
use pdf_equivalence::prelude::*;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Accept one connection and answer it with `status_line`.
fn one_shot_server(status_line: &'static str) -> (String, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = [0u8; 2048];
        let _ = stream.read(&mut request);
        let response = format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status_line);
        stream.write_all(response.as_bytes()).unwrap();
    });
    (base, handle)
}

fn local_options() -> LinkCheckOptions {
    LinkCheckOptions {
        workers: 2,
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
        use_system_proxy: false,
        ..LinkCheckOptions::default()
    }
}

#[test]
fn test_not_found_is_broken_and_other_schemes_are_skipped() {
    let (base, server) = one_shot_server("404 Not Found");
    let dir = TempDir::new().unwrap();
    let pdf = Fixture::new()
        .page(&["Links"])
        .link(&format!("{}/missing", base))
        .link("ftp://files.example.com/archive.zip")
        .save(dir.path(), "links.pdf");

    let report = check_links(&pdf, &local_options()).unwrap();
    server.join().unwrap();

    assert_eq!(report.links.len(), 2);
    let broken = &report.links[0];
    assert_eq!(broken.outcome, LinkOutcome::Broken);
    assert_eq!(broken.http_status, Some(404));
    assert_eq!(broken.status_message.as_deref(), Some("Not Found"));
    assert_eq!(broken.page, 1);
    assert_eq!(report.links[1].outcome, LinkOutcome::UnsupportedProtocol);
    assert_eq!(report.links[1].http_status, None);
    assert!(!report.all_reachable());
}

#[test]
fn test_server_reason_phrase_is_reported() {
    let (base, server) = one_shot_server("404 Gone Fishing");
    let dir = TempDir::new().unwrap();
    let pdf = Fixture::new()
        .page(&["Away"])
        .link(&format!("{}/lake", base))
        .save(dir.path(), "away.pdf");

    let report = check_links(&pdf, &local_options()).unwrap();
    server.join().unwrap();

    let link = &report.links[0];
    assert_eq!(link.outcome, LinkOutcome::Broken);
    assert_eq!(link.http_status, Some(404));
    assert_eq!(link.status_message.as_deref(), Some("Gone Fishing"));
}

#[test]
fn test_ok_response_is_valid() {
    let (base, server) = one_shot_server("200 OK");
    let dir = TempDir::new().unwrap();
    let pdf = Fixture::new()
        .page(&["Home"])
        .link(&format!("{}/", base))
        .save(dir.path(), "home.pdf");

    let report = check_links(&pdf, &local_options()).unwrap();
    server.join().unwrap();

    assert_eq!(report.count(LinkOutcome::Valid), 1);
    assert!(report.all_reachable());
}

#[test]
fn test_unresolvable_host_is_unreachable() {
    let dir = TempDir::new().unwrap();
    let pdf = Fixture::new()
        .page(&["Dead link"])
        .link("http://nonexistent.invalidtld/")
        .save(dir.path(), "dead.pdf");

    let report = check_links(&pdf, &local_options()).unwrap();
    assert_eq!(report.links.len(), 1);
    assert_eq!(report.links[0].outcome, LinkOutcome::Unreachable);
    let message = report.links[0].status_message.as_deref().unwrap();
    assert!(message.starts_with("host not found"), "classified as: {}", message);
}

#[test]
fn test_document_without_links_has_empty_report() {
    let dir = TempDir::new().unwrap();
    let pdf = Fixture::new().page(&["Plain"]).save(dir.path(), "plain.pdf");

    let report = check_links(&pdf, &local_options()).unwrap();
    assert!(report.links.is_empty());
    assert!(report.all_reachable());
}

#[test]
fn test_unopenable_pdf_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, b"not a pdf").unwrap();

    assert!(check_links(&path, &local_options()).is_err());
}
