//! Error handling primitives shared across the scorer.
//!
//! Every failure surfaces as a [`ScoreError`]; the binary turns it into a
//! single `covalic.error: ` line on stderr.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::matrix::domain::Shape;

/// Stable codes attached to log events so failures can be grepped by kind.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScoreCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// An archive could not be opened or extracted.
    Archive = 1,
    /// A required directory had no usable files.
    NoInput = 2,
    /// No (submission, truth) pair was scored.
    NoMatch = 3,
    /// A matched pair had matrices of different shapes.
    ShapeMismatch = 4,
    /// A file could not be turned into a signal matrix.
    BadMatrix = 5,
    /// Filesystem failure.
    Io = 6,
}

impl ScoreCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreCode::Ok => "ok",
            ScoreCode::Archive => "archive",
            ScoreCode::NoInput => "no_input",
            ScoreCode::NoMatch => "no_match",
            ScoreCode::ShapeMismatch => "shape_mismatch",
            ScoreCode::BadMatrix => "bad_matrix",
            ScoreCode::Io => "io",
        }
    }
}

/// Which input directory a failure refers to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DirRole {
    GroundTruth,
    Submission,
}

impl std::fmt::Display for DirRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirRole::GroundTruth => f.write_str("ground truth"),
            DirRole::Submission => f.write_str("submission"),
        }
    }
}

/// Raised by the metric evaluator when two matrices cannot be compared.
#[derive(Copy, Clone, Debug, Error, Eq, PartialEq)]
#[error("truth is {truth}, submission is {test}")]
pub struct ShapeMismatch {
    pub truth: Shape,
    pub test: Shape,
}

/// Canonical error type for the scorer.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Could not read ZIP file \"{archive}\": {source}")]
    Archive {
        archive: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("error reading {role} folder: {}", .dir.display())]
    NoInput { role: DirRole, dir: PathBuf },

    #[error("there are no matching submission files")]
    NoMatch,

    #[error("shape mismatch scoring \"{submission}\" against \"{truth}\": {source}")]
    ShapeMismatch {
        submission: String,
        truth: String,
        #[source]
        source: ShapeMismatch,
    },

    #[error("{}: missing field \"{field}\"", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{}: invalid matrix: {reason}", .path.display())]
    InvalidMatrix { path: PathBuf, reason: String },

    #[error("{}: unsupported matrix format", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("{}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result alias used throughout the crate.
pub type ScoreResult<T> = Result<T, ScoreError>;

impl ScoreError {
    /// IO helper that keeps the offending path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidMatrix {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ScoreCode {
        match self {
            ScoreError::Archive { .. } => ScoreCode::Archive,
            ScoreError::NoInput { .. } => ScoreCode::NoInput,
            ScoreError::NoMatch => ScoreCode::NoMatch,
            ScoreError::ShapeMismatch { .. } => ScoreCode::ShapeMismatch,
            ScoreError::MissingField { .. }
            | ScoreError::InvalidMatrix { .. }
            | ScoreError::UnsupportedFormat { .. }
            | ScoreError::Json { .. }
            | ScoreError::Csv { .. } => ScoreCode::BadMatrix,
            ScoreError::Io { .. } => ScoreCode::Io,
        }
    }

    /// Failures confined to loading one file of a pair. The orchestrator may
    /// skip such a pair as long as other pairs still produce scores.
    pub fn is_pair_local(&self) -> bool {
        matches!(self.code(), ScoreCode::BadMatrix | ScoreCode::Io)
    }
}
