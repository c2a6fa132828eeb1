use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

const DERBY: &str = r##"
homeTeam: Tottenham
awayTeam: Arsenal
tournament: Premier League
matchDate: Sat 17:30
layout: Classic VS
style: epic
accentColor: "#facc15"
"##;

fn write_match(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("match file should write");
}

fn run_matchday(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_matchday"))
        .current_dir(cwd)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("matchday command should run")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn check_summarizes_a_valid_match() {
    let dir = tempdir().expect("tempdir should create");
    write_match(dir.path(), "derby.yaml", DERBY);

    let plain = run_matchday(dir.path(), &["check", "derby.yaml"]);
    assert!(plain.status.success());
    let text = String::from_utf8_lossy(&plain.stdout);
    assert!(text.starts_with("OK: derby.yaml (TOTTENHAM vs ARSENAL"));

    let json = run_matchday(dir.path(), &["check", "derby.yaml", "--json"]);
    assert!(json.status.success());
    let summary = stdout_json(&json);
    assert_eq!(summary["ok"], true);
    assert_eq!(summary["layout"], "classic-vs");
    assert_eq!(summary["accentColor"], "#facc15");
    assert!(summary["sources"]["homeLogo"].is_null());
}

#[test]
fn render_writes_a_stable_banner() {
    let dir = tempdir().expect("tempdir should create");
    write_match(dir.path(), "derby.yaml", DERBY);

    let first = run_matchday(dir.path(), &["render", "derby.yaml", "-o", "a.jpg"]);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    let second = run_matchday(dir.path(), &["render", "derby.yaml", "-o", "b.jpg"]);
    assert!(second.status.success());

    let first_text = String::from_utf8_lossy(&first.stdout).into_owned();
    let second_text = String::from_utf8_lossy(&second.stdout).into_owned();
    assert!(first_text.contains("Wrote a.jpg"));
    let digest = |text: &str| {
        text.lines()
            .find_map(|line| line.strip_prefix("sha256 "))
            .map(str::to_owned)
            .expect("digest line")
    };
    assert_eq!(digest(&first_text), digest(&second_text));
    assert_eq!(digest(&first_text).len(), 64);

    let bytes = fs::read(dir.path().join("a.jpg")).expect("banner should exist");
    assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
}

#[test]
fn render_compact_defaults_to_suggested_png_name() {
    let dir = tempdir().expect("tempdir should create");
    write_match(dir.path(), "derby.yaml", DERBY);

    let output = run_matchday(
        dir.path(),
        &["render", "derby.yaml", "--preset", "compact", "--layout", "split-screen", "--json"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let summary = stdout_json(&output);
    assert_eq!(summary["fileName"], "offline-banner-tottenham-vs-arsenal.png");
    assert_eq!(summary["mime"], "image/png");
    assert_eq!(summary["layout"], "split-screen");
    assert_eq!(summary["width"], 1280);
    assert_eq!(summary["height"], 720);

    let bytes = fs::read(dir.path().join("offline-banner-tottenham-vs-arsenal.png"))
        .expect("banner should exist");
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn invalid_preset_is_a_usage_error_envelope() {
    let dir = tempdir().expect("tempdir should create");
    write_match(dir.path(), "derby.yaml", DERBY);

    let output = run_matchday(dir.path(), &["render", "derby.yaml", "--preset", "4k", "--json"]);
    assert_eq!(output.status.code(), Some(2));
    let envelope = stdout_json(&output);
    assert_eq!(envelope["ok"], false);
    assert_eq!(envelope["error"]["code"], "INVALID_PRESET");
    assert_eq!(envelope["error"]["details"]["provided"], "4k");
}

#[test]
fn missing_and_invalid_match_files_are_input_errors() {
    let dir = tempdir().expect("tempdir should create");

    let missing = run_matchday(dir.path(), &["check", "nope.yaml", "--json"]);
    assert_eq!(missing.status.code(), Some(3));
    assert_eq!(stdout_json(&missing)["error"]["code"], "MATCH_FILE_UNREADABLE");

    write_match(dir.path(), "empty.json", r#"{"homeTeam":" ","awayTeam":"Arsenal"}"#);
    let empty = run_matchday(dir.path(), &["check", "empty.json"]);
    assert_eq!(empty.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&empty.stderr).contains("EMPTY_TEAM_NAME"));
}

#[test]
fn prompt_prints_text_assets() {
    let dir = tempdir().expect("tempdir should create");
    write_match(dir.path(), "derby.yaml", DERBY);

    let output = run_matchday(dir.path(), &["prompt", "derby.yaml"]);
    assert!(output.status.success());
    let prompt = String::from_utf8_lossy(&output.stdout);
    assert!(prompt.contains("- HOME: TOTTENHAM"));
    assert!(prompt.contains("- TOURNAMENT: PREMIER LEAGUE"));
    assert!(prompt.contains("Cinematic stadium"));
    assert!(!prompt.contains("USE LOGO ASSET"));
}
