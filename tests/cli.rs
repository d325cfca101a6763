use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG: &str = "
owner = ops

[server]
name = alpha
port = 80
port = 443

[server]
name = beta
port = 8080
";

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("vconfig").expect("binary is built")
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("failed to write test file");
    path
}

#[test]
fn show_prints_canonical_form() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = write(&dir, "a.conf", CONFIG);

    cli()
        .arg("show")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("owner=ops\n\n[server]\nname=alpha\n"));
}

#[test]
fn get_single_value() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = write(&dir, "a.conf", CONFIG);

    cli()
        .arg("get")
        .arg(&path)
        .args(["", "owner"])
        .assert()
        .success()
        .stdout("ops\n");
}

#[test]
fn get_falls_back_to_default() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = write(&dir, "a.conf", "[only]\nk = v\n");

    cli()
        .arg("get")
        .arg(&path)
        .args(["only", "missing", "--default", "fallback"])
        .assert()
        .success()
        .stdout("fallback\n");
}

#[test]
fn get_rejects_repeated_sections() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = write(&dir, "a.conf", CONFIG);

    cli()
        .arg("get")
        .arg(&path)
        .args(["server", "name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("multiple sections"));
}

#[test]
fn values_across_sections() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = write(&dir, "a.conf", CONFIG);

    cli()
        .arg("values")
        .arg(&path)
        .args(["server", "port"])
        .assert()
        .success()
        .stdout("80\n443\n8080\n");
}

#[test]
fn find_by_value() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = write(&dir, "a.conf", CONFIG);

    cli()
        .arg("find")
        .arg(&path)
        .args(["name", "beta", "--section", "server"])
        .assert()
        .success()
        .stdout("[server]\nname=beta\nport=8080\n");
}

#[test]
fn merge_writes_output() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let first = write(&dir, "a.conf", "g = 1\n[s]\nk = a\n");
    let second = write(&dir, "b.conf", "g = 2\n[s]\nk = b\n");
    let output = dir.path().join("merged.conf");

    cli()
        .arg("merge")
        .arg(&first)
        .arg(&second)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let merged = fs::read_to_string(&output).expect("merged file exists");
    assert_eq!(merged, "g=1\ng=2\n\n[s]\nk=a\n\n[s]\nk=b\n");
}

#[test]
fn parse_error_names_the_line() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = write(&dir, "bad.conf", "[s]\nk = v\n[]\n");

    cli()
        .arg("show")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"));
}
