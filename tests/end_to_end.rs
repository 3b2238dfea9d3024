use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use covalic_score::evaluation::{L2_DIFFERENCE, MFS_SOLUTION};
use covalic_score::{score_all, ScoreCfg, ScoreError};
use tempfile::{tempdir, TempDir};
use zip::write::SimpleFileOptions;

fn signal_json(rows: &[[f64; 2]]) -> String {
    serde_json::json!({ "Signal": { "Ve": rows, "fs": 1000 } }).to_string()
}

/// Level-5 MAT bytes holding a 1x1 `Signal` struct with a double `Ve` field.
fn signal_mat(rows: &[&[f64]]) -> Vec<u8> {
    fn element(ty: u32, payload: &[u8]) -> Vec<u8> {
        let mut out = [ty.to_le_bytes(), (payload.len() as u32).to_le_bytes()].concat();
        out.extend_from_slice(payload);
        out.resize(out.len().next_multiple_of(8), 0);
        out
    }
    fn matrix(class: u32, dims: [i32; 2], name: &str, body: &[u8]) -> Vec<u8> {
        let mut payload = element(6, &[class.to_le_bytes(), [0; 4]].concat());
        payload.extend(element(5, &[dims[0].to_le_bytes(), dims[1].to_le_bytes()].concat()));
        payload.extend(element(1, name.as_bytes()));
        payload.extend_from_slice(body);
        element(14, &payload)
    }

    let cols = rows[0].len();
    let column_major: Vec<u8> = (0..cols)
        .flat_map(|c| rows.iter().map(move |row| row[c]))
        .flat_map(f64::to_le_bytes)
        .collect();
    let ve = matrix(6, [rows.len() as i32, cols as i32], "", &element(9, &column_major));

    let mut body = element(5, &4i32.to_le_bytes());
    body.extend(element(1, b"Ve\0\0"));
    body.extend(ve);

    let mut out = b"MATLAB 5.0 MAT-file".to_vec();
    out.resize(124, b' ');
    out.extend_from_slice(&0x0100u16.to_le_bytes());
    out.extend_from_slice(b"IM");
    out.extend(matrix(2, [1, 1], "Signal", &body));
    out
}

fn write_zip(path: &Path, entries: &[(&str, String)]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, body) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

struct Dirs {
    _root: TempDir,
    truth: std::path::PathBuf,
    submission: std::path::PathBuf,
}

impl Dirs {
    fn new() -> Self {
        let root = tempdir().unwrap();
        let truth = root.path().join("truth");
        let submission = root.path().join("submission");
        fs::create_dir(&truth).unwrap();
        fs::create_dir(&submission).unwrap();
        Self {
            _root: root,
            truth,
            submission,
        }
    }

    fn cfg(&self) -> ScoreCfg {
        ScoreCfg::new(&self.truth, &self.submission)
    }
}

#[test]
fn two_one_to_one_pairs_produce_two_records() {
    let dirs = Dirs::new();
    fs::write(dirs.truth.join("case1_ref.json"), signal_json(&[[1.0, 2.0], [3.0, 4.0]])).unwrap();
    fs::write(dirs.truth.join("case2_ref.json"), signal_json(&[[0.0, 0.0]])).unwrap();
    fs::write(dirs.submission.join("case1_signal.json"), signal_json(&[[1.0, 2.0], [3.0, 4.0]])).unwrap();
    fs::write(dirs.submission.join("case2_signal.json"), signal_json(&[[3.0, 4.0]])).unwrap();

    let report = score_all(&dirs.cfg()).unwrap();

    assert_eq!(report.len(), 2);
    let first = &report.records()[0];
    let second = &report.records()[1];
    assert_eq!(first.dataset, "case1_signal.json");
    assert_eq!(second.dataset, "case2_signal.json");
    assert_eq!(first.metric(L2_DIFFERENCE).unwrap().value, Some(0.0));
    assert_eq!(second.metric(L2_DIFFERENCE).unwrap().value, Some(5.0));
    for record in report.records() {
        assert_eq!(record.metric(MFS_SOLUTION).unwrap().value, None);
    }
}

#[test]
fn one_submission_scored_against_each_truth_sharing_its_root() {
    let dirs = Dirs::new();
    fs::write(dirs.truth.join("case1_ref.csv"), "1,1\n").unwrap();
    fs::write(dirs.truth.join("case1_alt.csv"), "2,2\n").unwrap();
    fs::write(dirs.submission.join("case1_signal.csv"), "1,1\n").unwrap();

    let report = score_all(&dirs.cfg()).unwrap();

    assert_eq!(report.len(), 2);
    assert!(report.records().iter().all(|r| r.dataset == "case1_signal.csv"));
    // Sorted listing puts case1_alt before case1_ref.
    let values: Vec<_> = report
        .records()
        .iter()
        .map(|r| r.metric(L2_DIFFERENCE).unwrap().value.unwrap())
        .collect();
    assert_eq!(values, vec![2f64.sqrt(), 0.0]);
}

#[test]
fn archived_submission_is_unpacked_and_unmatched_file_omitted() {
    let dirs = Dirs::new();
    fs::write(dirs.truth.join("case1_ref.json"), signal_json(&[[1.0, 1.0]])).unwrap();
    fs::write(dirs.truth.join("case2_ref.json"), signal_json(&[[2.0, 2.0]])).unwrap();
    write_zip(
        &dirs.submission.join("results.zip"),
        &[
            ("out/case1_signal.json", signal_json(&[[1.0, 1.0]])),
            ("out/case2_signal.json", signal_json(&[[2.0, 2.0]])),
        ],
    );
    fs::write(dirs.submission.join("stray_signal.json"), signal_json(&[[9.0, 9.0]])).unwrap();

    let report = score_all(&dirs.cfg()).unwrap();

    assert!(!dirs.submission.join("results.zip").exists());
    let datasets: Vec<_> = report.records().iter().map(|r| r.dataset.as_str()).collect();
    assert_eq!(datasets, vec!["case1_signal.json", "case2_signal.json"]);
}

#[test]
fn only_unmatched_submission_fails_with_no_match() {
    let dirs = Dirs::new();
    fs::write(dirs.truth.join("case1_ref.json"), signal_json(&[[1.0, 1.0]])).unwrap();
    write_zip(
        &dirs.submission.join("results.zip"),
        &[("stray_signal.json", signal_json(&[[1.0, 1.0]]))],
    );

    let err = score_all(&dirs.cfg()).unwrap_err();
    assert!(matches!(err, ScoreError::NoMatch), "{err:?}");
}

#[test]
fn empty_submission_folder_fails_with_no_input() {
    let dirs = Dirs::new();
    fs::write(dirs.truth.join("case1_ref.json"), signal_json(&[[1.0, 1.0]])).unwrap();

    let err = score_all(&dirs.cfg()).unwrap_err();
    assert!(matches!(err, ScoreError::NoInput { .. }), "{err:?}");
    assert!(err.to_string().starts_with("error reading submission folder"));
}

#[test]
fn empty_truth_folder_fails_with_no_input() {
    let dirs = Dirs::new();
    fs::write(dirs.submission.join("case1_signal.json"), signal_json(&[[1.0, 1.0]])).unwrap();

    let err = score_all(&dirs.cfg()).unwrap_err();
    assert!(err.to_string().starts_with("error reading ground truth folder"));
}

#[test]
fn shape_mismatch_fails_the_whole_run() {
    let dirs = Dirs::new();
    fs::write(dirs.truth.join("case1_ref.csv"), "1,2,3\n").unwrap();
    fs::write(dirs.truth.join("case2_ref.csv"), "1\n").unwrap();
    fs::write(dirs.submission.join("case1_signal.csv"), "1,2\n").unwrap();
    fs::write(dirs.submission.join("case2_signal.csv"), "1\n").unwrap();

    let err = score_all(&dirs.cfg()).unwrap_err();
    assert!(matches!(err, ScoreError::ShapeMismatch { .. }), "{err:?}");
}

#[test]
fn repeated_runs_yield_identical_reports() {
    let dirs = Dirs::new();
    for name in ["b_ref.csv", "a_ref.csv", "a_alt.csv"] {
        fs::write(dirs.truth.join(name), "1,2\n").unwrap();
    }
    for name in ["b_sig.csv", "a_sig.csv"] {
        fs::write(dirs.submission.join(name), "2,2\n").unwrap();
    }

    let first = score_all(&dirs.cfg()).unwrap();
    let second = score_all(&dirs.cfg()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn mat_files_score_against_every_truth_sharing_the_root() {
    let dirs = Dirs::new();
    fs::write(dirs.truth.join("case1_ref.mat"), signal_mat(&[&[1.0, 2.0], &[3.0, 4.0]])).unwrap();
    fs::write(dirs.truth.join("case1_alt.mat"), signal_mat(&[&[1.0, 2.0], &[3.0, 8.0]])).unwrap();
    fs::write(dirs.submission.join("case1_signal.mat"), signal_mat(&[&[1.0, 2.0], &[3.0, 4.0]])).unwrap();

    let report = score_all(&dirs.cfg()).unwrap();

    assert_eq!(report.len(), 2);
    assert!(report.records().iter().all(|r| r.dataset == "case1_signal.mat"));
    let values: Vec<_> = report
        .records()
        .iter()
        .map(|r| r.metric(L2_DIFFERENCE).unwrap().value)
        .collect();
    assert_eq!(values, vec![Some(4.0), Some(0.0)]);
}

#[test]
fn very_large_differences_stay_numeric_in_the_report() {
    let dirs = Dirs::new();
    fs::write(dirs.truth.join("case1_ref.csv"), "1e200\n").unwrap();
    fs::write(dirs.submission.join("case1_signal.csv"), "0\n").unwrap();

    let report = score_all(&dirs.cfg()).unwrap();

    let value = report.records()[0].metric(L2_DIFFERENCE).unwrap().value.unwrap();
    assert!(value.is_finite());
    assert_eq!(value, 1e200);
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json[0]["metrics"][0]["value"].as_f64(), Some(1e200));
}
