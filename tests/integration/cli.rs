//! Tests for the `spherehorn` binary.
//!
//! Component: CLI
//!
//! These tests verify:
//! - Program output goes to stdout untouched
//! - Exit codes for success, parse errors, aborts, usage and missing files
//! - Optional memory dump and step limit

#![cfg(test)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::NamedTempFile;

fn source_file(code: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(code.as_bytes()).expect("write source");
    file
}

fn spherehorn(args: &[&str], path: Option<&Path>, stdin: &str) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_spherehorn"));
    if let Some(path) = path {
        command.arg(path);
    }
    let mut child = command
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn spherehorn");
    if let Some(mut pipe) = child.stdin.take() {
        // the binary may exit before reading anything
        let _ = pipe.write_all(stdin.as_bytes());
    }
    child.wait_with_output().expect("wait for spherehorn")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn runs_program_to_stdout() {
    let file = source_file("(\"Hello, World!\\n\") { strout ^ }");
    let output = spherehorn(&[], Some(file.path()), "");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(output.stdout, b"Hello, World!\n");
}

#[test]
fn reads_stdin() {
    let file = source_file("{ strin strout ^ }");
    let output = spherehorn(&[], Some(file.path()), "from stdin\n");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(output.stdout, b"from stdin");
}

#[test]
fn parse_errors_exit_with_failure() {
    let file = source_file("{ frob }");
    let output = spherehorn(&[], Some(file.path()), "");

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Parse error: unrecognized nullary instruction `frob`"));
    assert!(err.contains("Program was not run, as there were one or more parse errors."));
    assert!(output.stdout.is_empty());
}

#[test]
fn abort_exits_with_failure() {
    let file = source_file("{ numout -- }");
    let output = spherehorn(&[], Some(file.path()), "");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(output.stdout, b"0");
    assert!(stderr(&output).contains("Error: attempted decrement past zero"));
}

#[test]
fn missing_file_exits_no_input() {
    let output = spherehorn(&[], Some(Path::new("/nonexistent/program.spherehorn")), "");
    assert_eq!(output.status.code(), Some(66));
}

#[test]
fn missing_argument_is_usage_error() {
    let output = spherehorn(&[], None, "");
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn dump_memory_prints_json() {
    let file = source_file("(1 2) { . 9 ^ }");
    let output = spherehorn(&["--dump-memory"], Some(file.path()), "");

    assert_eq!(output.status.code(), Some(0));
    let err = stderr(&output);
    let json = &err[err.find('{').expect("json on stderr")..];
    let snapshot: serde_json::Value = serde_json::from_str(json.trim()).expect("valid json");
    assert_eq!(snapshot["value"], 2);
    assert_eq!(snapshot["forward"][0]["value"], 9);
}

#[test]
fn max_steps_aborts_runaway_program() {
    let file = source_file("{ ++ }");
    let output = spherehorn(&["--max-steps", "50"], Some(file.path()), "");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("step limit of 50 instructions exceeded"));
}
