//! Dense signal matrices and the loader contract.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::{ScoreError, ScoreResult};

/// Field path holding the signal inside a structured document.
pub const SIGNAL_FIELD: &str = "Signal.Ve";

/// Matrix dimensions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Row-major dense matrix of `f64`.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    shape: Shape,
    data: Vec<f64>,
}

impl Matrix {
    /// Build from rows. Rows must be non-empty, equally long and finite.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, String> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err("matrix is empty".to_string());
        }
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(format!(
                    "row {} has {} values, expected {}",
                    idx + 1,
                    row.len(),
                    cols
                ));
            }
            if let Some(bad) = row.iter().find(|v| !v.is_finite()) {
                return Err(format!("row {} holds non-finite value {}", idx + 1, bad));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            shape: Shape {
                rows: rows.len(),
                cols,
            },
            data,
        })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Elements in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.shape.rows || col >= self.shape.cols {
            return None;
        }
        self.data.get(row * self.shape.cols + col).copied()
    }
}

/// Structured document carrying the signal under `Signal.Ve`.
#[derive(Debug, Deserialize)]
pub struct SignalDocument {
    #[serde(rename = "Signal")]
    signal: Option<SignalBlock>,
}

#[derive(Debug, Deserialize)]
struct SignalBlock {
    #[serde(rename = "Ve")]
    ve: Option<Vec<Vec<f64>>>,
}

impl SignalDocument {
    /// Return the signal matrix or fail naming the expected field.
    pub fn into_signal(self, path: &Path) -> ScoreResult<Matrix> {
        let rows = self
            .signal
            .and_then(|block| block.ve)
            .ok_or_else(|| ScoreError::MissingField {
                path: path.to_path_buf(),
                field: SIGNAL_FIELD,
            })?;
        Matrix::from_rows(rows).map_err(|reason| ScoreError::invalid(path, reason))
    }
}

/// Loads the signal matrix stored in a file.
pub trait MatrixLoader {
    fn load(&self, path: &Path) -> ScoreResult<Matrix>;
}
