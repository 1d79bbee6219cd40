//! Integration tests for the Libris CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use tempfile::TempDir;

const FB2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<FictionBook xmlns="http://www.gribuser.ru/xml/fictionbook/2.0">
  <description>
    <title-info>
      <genre>prose_classic</genre>
      <author><first-name>Leo</first-name><last-name>Tolstoy</last-name></author>
      <book-title>War and Peace</book-title>
      <lang>ru</lang>
    </title-info>
    <document-info><id>wp-1869</id></document-info>
  </description>
  <body><section><p>Well, Prince.</p></section></body>
</FictionBook>"#;

const LIBRARY: &str = r#"[
  {"id": "00000000-0000-0000-0000-000000000001", "title": "The Idiot",
   "authors": [{"display_name": "Fyodor Dostoevsky", "sort_key": "dostoevsky fyodor"}],
   "has_bookmark": true},
  {"id": "00000000-0000-0000-0000-000000000002", "title": "Anna Karenina",
   "authors": [{"display_name": "Leo Tolstoy", "sort_key": "tolstoy leo"}],
   "labels": ["favorite"]},
  {"id": "00000000-0000-0000-0000-000000000003", "title": "The Adventures"}
]"#;

/// Write a file into the test directory
fn create_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Write a zip archive holding one entry
fn create_zip(dir: &TempDir, name: &str, entry: &str, content: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let file = fs::File::create(&path).expect("Failed to create archive");
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file(entry, zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(content).unwrap();
    zip.finish().unwrap();
    path
}

fn libris() -> Command {
    Command::cargo_bin("libris").unwrap()
}

#[test]
fn test_help() {
    libris()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("filter"))
        .stdout(predicate::str::contains("formats"))
        .stdout(predicate::str::contains("check-filter"));
}

#[test]
fn test_version() {
    libris()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("libris"));
}

#[test]
fn test_formats() {
    libris()
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("fb2.zip"))
        .stdout(predicate::str::contains("epub.zip"))
        .stdout(predicate::str::contains("in-process"))
        .stdout(predicate::str::contains("windows-1251"));
}

#[test]
fn test_check_filter() {
    let dir = TempDir::new().unwrap();
    let path = create_file(
        &dir,
        "shelf.xml",
        br#"<or><filter type="label" displayName="favorite"/><filter type="has-bookmark"/></or>"#,
    );

    libris()
        .arg("check-filter")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"Expression: (label:"favorite" or has-bookmark)"#,
        ))
        .stdout(predicate::str::contains(r#"<filter type="has-bookmark"/>"#));
}

#[test]
fn test_check_filter_rejects_bad_xml() {
    let dir = TempDir::new().unwrap();
    let path = create_file(&dir, "bad.xml", br#"<and><filter type="empty"/></and>"#);

    libris()
        .arg("check-filter")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid filter"));
}

#[test]
fn test_filter_library() {
    let dir = TempDir::new().unwrap();
    let library = create_file(&dir, "library.json", LIBRARY.as_bytes());
    let filter = create_file(
        &dir,
        "shelf.xml",
        br#"<or><filter type="label" displayName="favorite"/><filter type="author" displayName="" sorkKey=""/></or>"#,
    );

    // Title order ignores the leading article
    libris()
        .arg("filter")
        .arg(&library)
        .arg(&filter)
        .assert()
        .success()
        .stdout("The Adventures\nAnna Karenina\n");
}

#[test]
fn test_filter_bookmarked_only() {
    let dir = TempDir::new().unwrap();
    let library = create_file(&dir, "library.json", LIBRARY.as_bytes());
    let filter = create_file(&dir, "all.xml", br#"<filter type="empty"/>"#);

    libris()
        .arg("filter")
        .arg(&library)
        .arg(&filter)
        .arg("--bookmarked-only")
        .assert()
        .success()
        .stdout("The Idiot\n");
}

#[test]
fn test_inspect_text_json() {
    let dir = TempDir::new().unwrap();
    let path = create_file(&dir, "Walden.txt", b"I went to the woods.\n\nBecause I wished.");

    libris()
        .arg("inspect")
        .arg(&path)
        .arg("--json")
        .arg("--model")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""title": "Walden""#))
        .stdout(predicate::str::contains(r#""paragraphs": 2"#));
}

#[test]
fn test_inspect_zipped_fb2() {
    let dir = TempDir::new().unwrap();
    let path = create_zip(&dir, "war.fb2.zip", "war.fb2", FB2.as_bytes());

    libris()
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("War and Peace"))
        .stdout(predicate::str::contains("Leo Tolstoy"))
        .stdout(predicate::str::contains("fb2-id:wp-1869"))
        .stdout(predicate::str::contains("fb2.zip"));
}

#[test]
fn test_inspect_unsupported() {
    let dir = TempDir::new().unwrap();
    let path = create_file(&dir, "paper.pdf", b"%PDF-1.4");

    libris()
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format"));
}

#[test]
fn test_scan_with_filter() {
    let dir = TempDir::new().unwrap();
    create_file(&dir, "war.fb2", FB2.as_bytes());
    create_file(&dir, "notes.txt", b"Shopping list");
    create_file(&dir, "broken.fb2", b"<FictionBook><description>");
    let filter = create_file(
        &dir,
        "tolstoy.xml",
        br#"<filter type="pattern" pattern="tolstoy"/>"#,
    );

    libris()
        .arg("scan")
        .arg(dir.path())
        .arg("--filter")
        .arg(&filter)
        .arg("--jobs")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("War and Peace by Leo Tolstoy"))
        .stdout(predicate::str::contains("notes").not())
        .stdout(predicate::str::contains("1 of 3 books matched, 1 failed"))
        .stderr(predicate::str::contains("broken.fb2"));
}

#[test]
fn test_scan_rejects_zero_jobs() {
    let dir = TempDir::new().unwrap();
    libris()
        .arg("scan")
        .arg(dir.path())
        .arg("--jobs")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("jobs must be at least 1"));
}

#[test]
fn test_scan_missing_directory() {
    libris()
        .arg("scan")
        .arg("/nonexistent/library")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read directory"));
}
