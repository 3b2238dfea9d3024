//! Shared configuration, error and logging plumbing.
pub mod config;
pub mod error;
pub mod log;

pub use config::ScoreCfg;
pub use error::{DirRole, ScoreCode, ScoreError, ScoreResult};
