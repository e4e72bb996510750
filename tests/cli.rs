use std::fs;

use assert_cmd::Command;

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("seqlabel 0.1.0\n");
}

// Validate subcommand tests

#[test]
fn validate_valid_table_succeeds() {
    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args(["validate", "tests/fixtures/seconds_only.csv"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Validation passed"))
        .stdout(predicates::str::contains("2 annotation(s)"));
}

#[test]
fn validate_reports_every_violation() {
    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args(["validate", "tests/fixtures/invalid_unpaired_seconds.csv"]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("Validation failed"))
        .stdout(predicates::str::contains("UnpairedSecondsColumn"));
}

#[test]
fn validate_reports_unknown_column() {
    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args(["validate", "tests/fixtures/invalid_unknown_column.csv"]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("UnknownColumn"))
        .stdout(predicates::str::contains("'invalid'"));
}

#[test]
fn validate_json_output_format() {
    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args([
        "validate",
        "tests/fixtures/invalid_missing_label.csv",
        "--output",
        "json",
    ]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("\"valid\": false"))
        .stdout(predicates::str::contains("\"code\": \"missing_required_column\""));
}

#[test]
fn validate_reversed_interval_fails_on_reconstruction() {
    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args(["validate", "tests/fixtures/invalid_reversed_interval.csv"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Cannot rebuild annotation 'a.txt'"));
}

#[test]
fn validate_nonexistent_file_fails() {
    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args(["validate", "nonexistent_file.csv"]);
    cmd.assert().failure();
}

// Convert subcommand tests

#[test]
fn convert_timit_directory_to_generic_seq() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");

    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args(["convert", "--from", "timit", "--to", "generic-seq", "--basename", "-o"])
        .arg(&out)
        .arg("tests/fixtures/timit");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("2 annotations, 2 sequences, 7 segments"));

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("annot_path,sequence,label,onset_sample,offset_sample\n"));
    assert!(csv.contains("sa1.phn,0,h#,0,3050\n"));
}

#[test]
fn convert_samplerate_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("labels");

    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.env("SEQLABEL_SAMPLERATE", "16000")
        .args(["convert", "--from", "timit", "--to", "audacity", "--allow-lossy", "-o"])
        .arg(&out_dir)
        .arg("tests/fixtures/timit/sx2.phn");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("sample indices"));

    let text = fs::read_to_string(out_dir.join("sx2.txt")).unwrap();
    assert!(text.starts_with("0.0\t0.14125\th#\n"));
}

#[test]
fn convert_multi_sequence_to_timit_is_blocked() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("phn");

    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args([
        "convert",
        "--from",
        "generic-seq",
        "--to",
        "timit",
        "-o",
    ])
    .arg(&out_dir)
    .arg("tests/fixtures/both_units.csv");
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("not possible"))
        .stdout(predicates::str::contains("more than one sequence"));
    assert!(!out_dir.exists());
}

#[test]
fn convert_seconds_to_timit_is_blocked() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("phn");

    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args(["convert", "--from", "simple-seq", "--to", "timit", "--allow-lossy", "-o"])
        .arg(&out_dir)
        .arg("tests/fixtures/simple/bird2.csv");
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("not possible"));
}

#[test]
fn convert_notated_path_loss_needs_allow_lossy() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("simple");

    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args(["convert", "--from", "generic-seq", "--to", "simple-seq", "-o"])
        .arg(&out_dir)
        .arg("tests/fixtures/seconds_only.csv");
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("--allow-lossy"));

    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args([
        "convert",
        "--from",
        "generic-seq",
        "--to",
        "simple-seq",
        "--allow-lossy",
        "-o",
    ])
    .arg(&out_dir)
    .arg("tests/fixtures/seconds_only.csv");
    cmd.assert().success();

    assert_eq!(
        fs::read_to_string(out_dir.join("song1.csv")).unwrap(),
        "onset_s,offset_s,label\n0.5,0.75,a\n1.0,1.25,b\n1.5,1.8,a\n"
    );
}

#[test]
fn convert_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.json");

    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args([
        "convert",
        "--from",
        "audacity",
        "--to",
        "seq-json",
        "--report",
        "json",
        "-o",
    ])
    .arg(&out)
    .arg("tests/fixtures/audacity/bird1.txt");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"from\": \"audacity\""))
        .stdout(predicates::str::contains(
            "\"code\": \"audacity_reader_skips_spectral_lines\"",
        ));
    assert!(out.exists());
}

#[test]
fn convert_rejects_unknown_format() {
    let mut cmd = Command::cargo_bin("seqlabel").unwrap();
    cmd.args([
        "convert",
        "--from",
        "textgrid",
        "--to",
        "generic-seq",
        "-o",
        "out.csv",
        "in.TextGrid",
    ]);
    cmd.assert().failure();
}
