// lib.rs - submission scoring pipeline
pub mod common;
pub mod evaluation;
pub mod matching;
pub mod matrix;
pub mod unpack;

pub use common::{ScoreCfg, ScoreError, ScoreResult};
pub use evaluation::{score_all, Report};

/// Prefix of the single diagnostic line written to stderr on failure.
pub const ERROR_PREFIX: &str = "covalic.error: ";
