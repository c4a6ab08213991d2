use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

const LOOP1: &str = "def loop1(n) -> \"n\":\n    if n <= 0:\n        pass\n    else:\n        loop1(n - 1)\n";

fn scratch(name: &str, src: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("tempo-cli-{name}-{}-{ts}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("main.tempo");
    std::fs::write(&path, src).expect("write temp program");
    path
}

fn tempo(args: &[&str], path: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tempo"))
        .args(args)
        .arg(path)
        .env_remove("TEMPO_LOG")
        .output()
        .expect("spawn tempo")
}

#[test]
fn fmt_prints_canonical_source() {
    let path = scratch("fmt", "def loop1(n)->'n':\n  if n<=0:\n    pass\n  else:\n    loop1(n-1)\n");
    let out = tempo(&["fmt"], &path);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8_lossy(&out.stdout), LOOP1);
}

#[test]
fn costs_show_the_unit_call_charge() {
    let path = scratch("costs", LOOP1);
    let out = tempo(&["costs"], &path);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("loop1(n)"), "{stdout}");
    assert!(stdout.contains("cost:  (0 if n <= 0 else 1 + (n - 1))"), "{stdout}");
    assert!(stdout.contains("bound: n"), "{stdout}");
}

#[test]
fn smt_export_honours_flags() {
    let path = scratch("smt", LOOP1);
    let out = tempo(&["smt", "--infer", "--call-cost", "0"], &path);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("(declare-const c0__1 Int)"), "{stdout}");
    assert!(stdout.contains("(check-sat)"), "{stdout}");
    assert!(!stdout.contains("(+ 1 "), "{stdout}");
}

#[test]
fn manifest_settings_apply_to_the_input() {
    let path = scratch("manifest", LOOP1);
    let dir = path.parent().expect("temp dir");
    std::fs::write(dir.join("tempo.toml"), "[check]\ninfer = true\n").expect("write manifest");

    let out = tempo(&["smt"], &path);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("c1__2"));
}

#[test]
fn parse_errors_fail_the_command() {
    let path = scratch("parse", "def f(n):\n    g(m)\n");
    let out = tempo(&["costs"], &path);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("`m`"));
}

#[test]
fn undefined_calls_fail_the_command() {
    let path = scratch("undefined", "def f(n):\n    g(n)\n");
    let out = tempo(&["check"], &path);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no function named `g`"));
}

#[cfg(not(feature = "z3"))]
#[test]
fn check_without_z3_explains_how_to_enable_it() {
    let path = scratch("noz3", LOOP1);
    let out = tempo(&["check"], &path);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Z3"));
}

#[cfg(feature = "z3")]
#[test]
fn check_with_inference_writes_a_report() {
    let path = scratch("report", LOOP1);
    let report = path.with_file_name("report.json");
    let out = tempo(
        &["check", "--infer", "--report", report.to_str().expect("utf-8")],
        &path,
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("valid"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(json["status"], "valid");
    assert!(json["witnesses"]["c0__1"].as_i64().unwrap_or(0) >= 1);
}
