//! Scoring pipeline: unpack, match, load, evaluate, aggregate.

use std::path::Path;
use std::time::Instant;

use crate::common::config::ScoreCfg;
use crate::common::error::{DirRole, ScoreCode, ScoreError, ScoreResult};
use crate::common::log::log_stage;
use crate::matching::domain::{MatchSet, RootGroups, RootRule, SuffixRule};
use crate::matching::service::{derive_roots, match_to_truth};
use crate::matrix::domain::{Matrix, MatrixLoader};
use crate::matrix::repo_fs::FsMatrixLoader;
use crate::unpack::service::prepare_dir;

use super::domain::{Report, ScoreRecord};
use super::metrics::evaluate_l2;

/// Compare one already loaded pair and build its record.
pub fn score_pair(
    truth_name: &str,
    truth: &Matrix,
    submission_name: &str,
    submission: &Matrix,
) -> ScoreResult<ScoreRecord> {
    let l2 = evaluate_l2(truth, submission).map_err(|source| ScoreError::ShapeMismatch {
        submission: submission_name.to_string(),
        truth: truth_name.to_string(),
        source,
    })?;
    Ok(ScoreRecord::with_l2(submission_name, l2))
}

/// Score every matched pair. Records follow submission order, then truth
/// order within a submission.
///
/// A file that fails to load skips its pairs; if nothing was scored the first
/// such failure is returned, otherwise [`ScoreError::NoMatch`]. Truth indices
/// in `matches` must come from `groups`.
pub fn score_matches(
    truth_dir: &Path,
    groups: &RootGroups,
    submission_dir: &Path,
    matches: &MatchSet,
    loader: &dyn MatrixLoader,
) -> ScoreResult<Report> {
    let mut report = Report::default();
    let mut first_failure: Option<ScoreError> = None;

    for (entry, truths) in matches.submissions.iter().zip(&matches.matches) {
        if truths.is_empty() {
            continue;
        }
        let submission = match loader.load(&submission_dir.join(&entry.name)) {
            Ok(m) => m,
            Err(err) if err.is_pair_local() => {
                skip_pair(err, &mut first_failure);
                continue;
            }
            Err(err) => return Err(err),
        };

        for &truth_idx in truths {
            let Some(truth_entry) = groups.entry(truth_idx) else {
                tracing::warn!(
                    submission = %entry.name,
                    truth_idx,
                    "match refers to a truth file outside the grouped listing"
                );
                continue;
            };
            let truth_name = &truth_entry.name;
            let truth = match loader.load(&truth_dir.join(truth_name)) {
                Ok(m) => m,
                Err(err) if err.is_pair_local() => {
                    skip_pair(err, &mut first_failure);
                    continue;
                }
                Err(err) => return Err(err),
            };
            let record = score_pair(truth_name, &truth, &entry.name, &submission)?;
            tracing::debug!(submission = %entry.name, truth = %truth_name, "scored pair");
            report.push(record);
        }
    }

    if report.is_empty() {
        return Err(first_failure.unwrap_or(ScoreError::NoMatch));
    }
    Ok(report)
}

fn skip_pair(err: ScoreError, first_failure: &mut Option<ScoreError>) {
    tracing::warn!(code = err.code().as_str(), error = %err, "skipping pair");
    if first_failure.is_none() {
        *first_failure = Some(err);
    }
}

/// Run the full pipeline with explicit loader and root rule.
pub fn score_all_with(
    cfg: &ScoreCfg,
    loader: &dyn MatrixLoader,
    rule: &dyn RootRule,
) -> ScoreResult<Report> {
    let started = Instant::now();

    let truth_names = prepare_dir(&cfg.groundtruth, cfg.keep_archives)?;
    if truth_names.is_empty() {
        return Err(ScoreError::NoInput {
            role: DirRole::GroundTruth,
            dir: cfg.groundtruth.clone(),
        });
    }
    let groups = derive_roots(&truth_names, rule);

    let submission_names = prepare_dir(&cfg.submission, cfg.keep_archives)?;
    if submission_names.is_empty() {
        return Err(ScoreError::NoInput {
            role: DirRole::Submission,
            dir: cfg.submission.clone(),
        });
    }
    let matches = match_to_truth(&submission_names, &groups, rule);
    tracing::info!(
        truth_files = groups.len(),
        truth_roots = groups.roots().count(),
        submission_files = submission_names.len(),
        pairs = matches.pair_count(),
        unmatched = matches.unmatched().count(),
        "matched submission to ground truth"
    );

    let result = score_matches(
        &cfg.groundtruth,
        &groups,
        &cfg.submission,
        &matches,
        loader,
    );
    let code = match &result {
        Ok(_) => ScoreCode::Ok,
        Err(err) => err.code(),
    };
    log_stage("evaluation", "score_all", code, started);
    result
}

/// Run the full pipeline with the filesystem loader and [`SuffixRule`].
pub fn score_all(cfg: &ScoreCfg) -> ScoreResult<Report> {
    score_all_with(cfg, &FsMatrixLoader::new(), &SuffixRule)
}
