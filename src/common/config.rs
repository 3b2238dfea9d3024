//! Runtime configuration loaded from the command line with environment fallbacks.

use std::path::PathBuf;

use clap::Parser;

/// Command line surface of the scorer.
#[derive(Debug, Parser)]
#[command(name = "score-submission")]
#[command(about = "Submission scoring helper")]
struct Cli {
    /// Path to the ground truth folder
    #[arg(short, long, env = "COVALIC_GROUNDTRUTH")]
    groundtruth: PathBuf,

    /// Path to the submission folder
    #[arg(short, long, env = "COVALIC_SUBMISSION")]
    submission: PathBuf,

    /// Leave zip archives in place after extracting them
    #[arg(long, env = "COVALIC_KEEP_ARCHIVES")]
    keep_archives: bool,

    /// Log filter written to stderr (e.g. "info", "covalic_score=debug")
    #[arg(long, env = "COVALIC_LOG", default_value = "off")]
    log_level: String,
}

/// Snapshot of configuration values consumed by the scorer.
#[derive(Clone, Debug)]
pub struct ScoreCfg {
    pub groundtruth: PathBuf,
    pub submission: PathBuf,
    pub keep_archives: bool,
    pub log_level: String,
}

impl ScoreCfg {
    /// Config for the two input folders with every other option defaulted.
    pub fn new(groundtruth: impl Into<PathBuf>, submission: impl Into<PathBuf>) -> Self {
        Self {
            groundtruth: groundtruth.into(),
            submission: submission.into(),
            keep_archives: false,
            log_level: "off".to_string(),
        }
    }

    /// Parse the process arguments. Usage errors exit through clap with code 2.
    pub fn load() -> Self {
        Self::from_cli(Cli::parse())
    }

    /// Parse an explicit argument list.
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Cli::try_parse_from(args).map(Self::from_cli)
    }

    fn from_cli(cli: Cli) -> Self {
        Self {
            groundtruth: cli.groundtruth,
            submission: cli.submission,
            keep_archives: cli.keep_archives,
            log_level: cli.log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags() {
        let cfg = ScoreCfg::try_from_args(["score-submission", "-g", "truth/", "-s", "sub/"])
            .expect("valid args");
        assert_eq!(cfg.groundtruth, PathBuf::from("truth/"));
        assert_eq!(cfg.submission, PathBuf::from("sub/"));
        assert!(!cfg.keep_archives);
    }

    #[test]
    fn parses_long_flags() {
        let cfg = ScoreCfg::try_from_args([
            "score-submission",
            "--groundtruth",
            "gt",
            "--submission",
            "sub",
            "--keep-archives",
            "--log-level",
            "debug",
        ])
        .expect("valid args");
        assert!(cfg.keep_archives);
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn missing_submission_is_a_usage_error() {
        let err = ScoreCfg::try_from_args(["score-submission", "-g", "gt"])
            .expect_err("submission is required");
        assert_eq!(err.exit_code(), 2);
    }
}
