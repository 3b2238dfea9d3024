//! Scoring of submissions against ground truth.

pub mod domain;
pub mod metrics;
pub mod service;

pub use domain::{MetricRecord, Report, ScoreRecord, L2_DIFFERENCE, MFS_SOLUTION};
pub use metrics::evaluate_l2;
pub use service::{score_all, score_all_with, score_matches, score_pair};
