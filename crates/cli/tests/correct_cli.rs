// End-to-end tests for `nearcorr correct`, `run` and `validate`.
//
// Run with: cargo test -p nearcorr-cli --test correct_cli -- --nocapture

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn nearcorr() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nearcorr"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("RUST_LOG");
    cmd
}

const TARGET_CSV: &str = "\
value,label,index
10,a,1.0
20,b,2.0
30,c,3.0
";

const CORRECTION_CSV: &str = "\
id,name,index,offset
1,x,1.05,1
2,y,2.9,2
";

/// Temp dir holding target.csv and correction.csv in the default column layout.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("target.csv"), TARGET_CSV).unwrap();
    fs::write(dir.path().join("correction.csv"), CORRECTION_CSV).unwrap();
    dir
}

fn correct_in(dir: &Path, extra: &[&str]) -> Output {
    nearcorr()
        .arg("correct")
        .arg("--target")
        .arg(dir.join("target.csv"))
        .arg("--correction")
        .arg(dir.join("correction.csv"))
        .args(extra)
        .output()
        .unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// ===========================================================================
// correct
// ===========================================================================

#[test]
fn correct_writes_sibling_file() {
    let dir = workspace();
    let out = correct_in(dir.path(), &[]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let written = fs::read_to_string(dir.path().join("target_corrected.csv")).unwrap();
    assert_eq!(
        written,
        "\
value,label,index,matched_correction_index,applied_correction_value,corrected_value
10,a,1.0,1.05,1,9
20,b,2.0,,,
30,c,3.0,2.9,2,28
"
    );

    let err = stderr(&out);
    assert!(err.contains("wrote "), "stderr: {err}");
    assert!(err.contains("3 target rows: 2 matched, 1 unmatched, 0 not attempted"), "stderr: {err}");
    assert!(
        err.contains("1 of 3 target rows had no correction match within tolerance=0.5."),
        "stderr: {err}"
    );
}

#[test]
fn correct_json_dry_run() {
    let dir = workspace();
    let out = correct_in(dir.path(), &["--json", "--dry-run"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(!dir.path().join("target_corrected.csv").exists());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["meta"]["job_name"], "target");
    assert!(json["meta"].get("output_file").is_none());
    assert!(json["meta"]["run_at"].is_string());
    assert_eq!(json["diagnostics"]["unmatched_count"], 1);
    assert_eq!(json["diagnostics"]["lookup_size"], 2);
    assert_eq!(
        json["warning"],
        "1 of 3 target rows had no correction match within tolerance=0.5."
    );

    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["corrected_value"], 9.0);
    assert_eq!(rows[1]["status"], "unmatched");
    assert_eq!(rows[2]["matched_index"], 2.9);
}

#[test]
fn correct_wider_tolerance_matches_all() {
    let dir = workspace();
    let out_path = dir.path().join("out.tsv");
    let out = correct_in(
        dir.path(),
        &["--tolerance", "1", "-o", out_path.to_str().unwrap(), "--strict"],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let written = fs::read_to_string(&out_path).unwrap();
    let second = written.lines().nth(2).unwrap();
    // 2.0 is 0.95 from 1.05 and 0.9 from 2.9
    assert_eq!(second, "20\tb\t2.0\t2.9\t2\t18");
}

#[test]
fn correct_named_columns() {
    let dir = workspace();
    let out = correct_in(
        dir.path(),
        &[
            "--target-index", "index",
            "--target-value", "value",
            "--correction-index", "2",
            "--correction-value", "offset",
            "--json", "--dry-run",
        ],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["diagnostics"]["matched_count"], 2);
}

#[test]
fn quiet_suppresses_summary_and_warning() {
    let dir = workspace();
    let out = correct_in(dir.path(), &["-q"]);
    assert!(out.status.success());
    assert!(stderr(&out).trim().is_empty(), "stderr: {}", stderr(&out));
    assert!(dir.path().join("target_corrected.csv").exists());
}

// ===========================================================================
// Exit codes
// ===========================================================================

#[test]
fn strict_with_unmatched_exits_63() {
    let dir = workspace();
    let out = correct_in(dir.path(), &["--strict"]);
    assert_eq!(out.status.code(), Some(63));
    assert!(stderr(&out).contains("error: 1 unmatched target row(s)"));
    // Output is still written before the strict check
    assert!(dir.path().join("target_corrected.csv").exists());
}

#[test]
fn missing_column_exits_62() {
    let dir = workspace();
    let out = correct_in(dir.path(), &["--target-index", "depth"]);
    assert_eq!(out.status.code(), Some(62));
    assert!(stderr(&out).contains("target table: missing column 'depth'"));
}

#[test]
fn unparseable_column_exits_61() {
    let dir = workspace();
    let out = correct_in(dir.path(), &["--correction-value", "name"]);
    assert_eq!(out.status.code(), Some(61));
    assert!(stderr(&out).contains("correction table: column 'correction'"));
}

#[test]
fn negative_tolerance_is_usage_error() {
    let dir = workspace();
    let out = correct_in(dir.path(), &["--tolerance", "-1"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("tolerance"));
}

#[test]
fn missing_input_exits_3() {
    let dir = workspace();
    let out = nearcorr()
        .arg("correct")
        .arg("--target")
        .arg(dir.path().join("nope.csv"))
        .arg("--correction")
        .arg(dir.path().join("correction.csv"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(stderr(&out).contains("no such file"));
}

#[test]
fn unsupported_extension_exits_2() {
    let dir = workspace();
    fs::write(dir.path().join("target.parquet"), "x").unwrap();
    let out = nearcorr()
        .arg("correct")
        .arg("--target")
        .arg(dir.path().join("target.parquet"))
        .arg("--correction")
        .arg(dir.path().join("correction.csv"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("unsupported format '.parquet'"));
}

// ===========================================================================
// run / validate
// ===========================================================================

const JOB_TOML: &str = r#"
name = "Detector calibration"
tolerance = 0.5

[target]
file = "target.csv"
[target.columns]
index = "C"
value = "A"

[correction]
file = "correction.csv"
[correction.columns]
index = "index"
correction = "offset"

[output]
file = "corrected/out.csv"
report = "report.json"
"#;

#[test]
fn run_resolves_paths_against_config_dir() {
    let dir = workspace();
    fs::create_dir(dir.path().join("corrected")).unwrap();
    let config = dir.path().join("calibration.correct.toml");
    fs::write(&config, JOB_TOML).unwrap();

    let out = nearcorr().arg("run").arg(&config).output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    assert!(dir.path().join("corrected/out.csv").exists());
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(report["meta"]["job_name"], "Detector calibration");
    assert_eq!(report["diagnostics"]["matched_count"], 2);
    assert!(report["meta"]["output_file"].as_str().unwrap().ends_with("out.csv"));
}

#[test]
fn validate_reports_job() {
    let dir = workspace();
    let config = dir.path().join("job.correct.toml");
    fs::write(&config, JOB_TOML).unwrap();

    let out = nearcorr().arg("validate").arg(&config).output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("valid: job 'Detector calibration'"));
}

#[test]
fn invalid_config_exits_60() {
    let dir = workspace();
    let config = dir.path().join("bad.correct.toml");
    fs::write(&config, "tolerance = -2\n[target]\nfile = \"t.csv\"\n[correction]\nfile = \"c.csv\"\n")
        .unwrap();

    for cmd in ["validate", "run"] {
        let out = nearcorr().arg(cmd).arg(&config).output().unwrap();
        assert_eq!(out.status.code(), Some(60), "{cmd}: {}", stderr(&out));
    }
}
