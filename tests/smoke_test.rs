/// Smoke tests to verify the binary runs without panicking
use std::process::{Command, Output};

fn skytrail(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skytrail"))
        .args(args)
        .env("SKYTRAIL_LOG", "warn")
        .output()
        .expect("Failed to execute skytrail")
}

#[test]
fn binary_shows_help() {
    let output = skytrail(&["--help"]);

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("skytrail"), "Help output should mention skytrail");
    for command in ["globe", "fetch", "print"] {
        assert!(stdout.contains(command), "Help should list {}", command);
    }
}

#[test]
fn binary_shows_version() {
    let output = skytrail(&["--version"]);

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("0.1.0"));
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = skytrail(&["nonexistent-command"]);

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn headless_print_reports_objects() {
    let output = skytrail(&["print", "--seed", "1", "--balloons", "8", "--duration", "2", "--at", "0.5"]);

    assert!(
        output.status.success(),
        "print failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("progress"));
    assert!(stdout.contains("camera ("));
    let rows = stdout
        .lines()
        .filter(|l| l.ends_with(" live") || l.ends_with(" stale"))
        .count();
    assert!(rows > 0 && rows <= 8);
}

#[test]
fn headless_render_draws_braille() {
    let output = skytrail(&[
        "print", "--seed", "2", "--balloons", "4", "--duration", "1", "--render", "--width", "60",
        "--height", "20",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.chars().any(|c| ('\u{2801}'..='\u{28ff}').contains(&c)));
}

#[test]
fn missing_series_file_is_an_error() {
    let output = skytrail(&["print", "--file", "/nonexistent/skytrail-series.json"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("skytrail:"));
    assert!(!stderr.contains("panicked at"));
}
