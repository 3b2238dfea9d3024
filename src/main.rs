//! Scores a submission folder against a ground truth folder and prints the
//! JSON report on stdout.

use std::process::ExitCode;

use covalic_score::common::log;
use covalic_score::{score_all, ScoreCfg, ERROR_PREFIX};

fn main() -> ExitCode {
    let cfg = ScoreCfg::load();
    log::init(&cfg.log_level);

    let report = match score_all(&cfg) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{ERROR_PREFIX}{err}");
            return ExitCode::FAILURE;
        }
    };

    match report.to_json() {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{ERROR_PREFIX}could not serialise report: {err}");
            ExitCode::FAILURE
        }
    }
}
