use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_sqlstrip");

fn write_script(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write script");
    path
}

fn fixture_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    write_script(
        dir.path(),
        "001_schema.sql",
        "create table t (id int /* pk */);\n",
    );
    write_script(
        dir.path(),
        "002_seed.sql",
        "/* seed\n data */\ninsert into t values (1);\n",
    );
    dir
}

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .output()
        .expect("failed to run sqlstrip")
}

fn run_with_stdin(args: &[&str], input: &[u8]) -> Output {
    let mut child = Command::new(BIN)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn sqlstrip");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input)
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for sqlstrip")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

// ---------------------------------------------------------------------------
// strip
// ---------------------------------------------------------------------------

#[test]
fn strip_stdin_to_stdout() {
    let out = run_with_stdin(&["strip"], b"select /* a /* b */ c */ 1;\n");
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "select  1;\n");
}

#[test]
fn strip_dash_reads_stdin_and_preserves_line_breaks() {
    let out = run_with_stdin(
        &["strip", "-", "--preserve-line-breaks"],
        b"a/*\n\n*/b\n",
    );
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "a\n\nb\n");
}

#[test]
fn strip_stdin_rejects_invalid_utf8() {
    let out = run_with_stdin(&["strip"], b"select \xFF;");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
    assert!(stderr.contains("byte offset 7"), "stderr: {stderr}");
}

#[test]
fn strip_single_file_prints_to_stdout() {
    let dir = fixture_dir();
    let script = dir.path().join("001_schema.sql");

    let out = run(&["strip", path_arg(&script)]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "create table t (id int );\n"
    );
    // Source untouched.
    assert_eq!(
        fs::read_to_string(&script).unwrap(),
        "create table t (id int /* pk */);\n"
    );
}

#[test]
fn strip_directory_to_output_dir_with_report() {
    let dir = fixture_dir();
    let out_dir = dir.path().join("clean");
    let report = dir.path().join("reports").join("report.json");

    let out = run(&[
        "strip",
        path_arg(dir.path()),
        "--output",
        path_arg(&out_dir),
        "--report",
        path_arg(&report),
    ]);
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(String::from_utf8_lossy(&out.stdout).contains("from 2 script(s)"));

    assert_eq!(
        fs::read_to_string(out_dir.join("001_schema.sql")).unwrap(),
        "create table t (id int );\n"
    );
    assert_eq!(
        fs::read_to_string(out_dir.join("002_seed.sql")).unwrap(),
        "\ninsert into t values (1);\n"
    );

    let raw = fs::read_to_string(&report).expect("report should be written");
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["totals"]["files"], 2);
    assert_eq!(value["totals"]["comments_removed"], 2);
    assert_eq!(value["files"].as_array().unwrap().len(), 2);
}

#[test]
fn strip_in_place_overwrites_sources() {
    let dir = fixture_dir();

    let out = run(&["strip", path_arg(dir.path()), "--in-place"]);
    assert!(out.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("002_seed.sql")).unwrap(),
        "\ninsert into t values (1);\n"
    );
}

#[test]
fn strip_many_files_needs_a_destination() {
    let dir = fixture_dir();

    let out = run(&["strip", path_arg(dir.path())]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("--output <DIR> or --in-place"));
}

#[test]
fn strip_honors_extension_flag() {
    let dir = fixture_dir();
    write_script(dir.path(), "003_view.ddl", "create view v /* x */ as select 1;\n");
    let out_dir = dir.path().join("clean");

    let out = run(&[
        "strip",
        path_arg(dir.path()),
        "--ext",
        "ddl",
        "--output",
        path_arg(&out_dir),
    ]);
    assert!(out.status.success());
    assert!(out_dir.join("003_view.ddl").exists());
    assert!(!out_dir.join("001_schema.sql").exists());
}

#[test]
fn strip_reports_failed_scripts_and_exits_nonzero() {
    let dir = fixture_dir();
    fs::write(dir.path().join("bad.sql"), b"select \xFF;").unwrap();
    let out_dir = dir.path().join("clean");

    let out = run(&["strip", path_arg(dir.path()), "--output", path_arg(&out_dir)]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("bad.sql"), "stderr: {stderr}");
    assert!(stderr.contains("1 script(s) could not be stripped"), "stderr: {stderr}");
    // Good scripts are still written.
    assert!(out_dir.join("001_schema.sql").exists());
}

#[test]
fn strip_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(&["strip", path_arg(&dir.path().join("missing.sql"))]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("does not exist"));
}

// ---------------------------------------------------------------------------
// stats
// ---------------------------------------------------------------------------

#[test]
fn stats_json_counts_without_writing() {
    let dir = fixture_dir();
    write_script(dir.path(), "003_tail.sql", "select 1; /* open");

    let out = run(&["stats", path_arg(dir.path()), "--format", "json"]);
    assert!(out.status.success());

    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["totals"]["files"], 3);
    assert_eq!(value["totals"]["unterminated_files"], 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("003_tail.sql")).unwrap(),
        "select 1; /* open"
    );
}

#[test]
fn stats_table_is_default() {
    let dir = fixture_dir();
    let out = run(&["stats", path_arg(dir.path())]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("File"));
    assert!(stdout.contains("001_schema.sql"));
    assert!(stdout.contains("2 file(s), 2 changed, 0 failed"));
}

// ---------------------------------------------------------------------------
// init-config
// ---------------------------------------------------------------------------

#[test]
fn init_config_writes_loadable_defaults() {
    let dir = fixture_dir();
    let config = dir.path().join("sqlstrip.yml");

    let out = run(&["init-config", path_arg(&config)]);
    assert!(out.status.success());
    let raw = fs::read_to_string(&config).unwrap();
    assert!(raw.contains("extensions:"));

    // Refuses to clobber without --force.
    let out = run(&["init-config", path_arg(&config)]);
    assert_eq!(out.status.code(), Some(1));
    let out = run(&["init-config", path_arg(&config), "--force"]);
    assert!(out.status.success());

    // The written file drives a strip run.
    let out = run(&[
        "strip",
        path_arg(&dir.path().join("001_schema.sql")),
        "--config",
        path_arg(&config),
    ]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "create table t (id int );\n"
    );
}

#[test]
fn config_file_enables_preserve_line_breaks() {
    let dir = fixture_dir();
    let config = write_script(
        dir.path(),
        "sqlstrip.yml",
        "version: \"1.0\"\nextensions: [sql]\npreserve_line_breaks: true\n",
    );

    let out = run(&[
        "strip",
        path_arg(&dir.path().join("002_seed.sql")),
        "--config",
        path_arg(&config),
    ]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "\n\ninsert into t values (1);\n"
    );
}
