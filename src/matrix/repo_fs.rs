//! Filesystem-backed matrix loader.
//!
//! The format is picked from the file extension: `.json` documents carry the
//! signal under `Signal.Ve`, `.mat` files are MATLAB Level-5 files holding a
//! `Signal` struct with a `Ve` field, `.csv`/`.txt` files are a bare numeric
//! grid.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use crate::common::error::{ScoreError, ScoreResult};

use super::domain::{Matrix, MatrixLoader, SignalDocument, SIGNAL_FIELD};
use super::mat5::MatFile;

/// Loads signal matrices from files on the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsMatrixLoader;

impl FsMatrixLoader {
    pub fn new() -> Self {
        Self
    }

    fn load_json(&self, path: &Path) -> ScoreResult<Matrix> {
        let file = File::open(path).map_err(|e| ScoreError::io(path, e))?;
        let doc: SignalDocument = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            ScoreError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        doc.into_signal(path)
    }

    fn load_mat(&self, path: &Path) -> ScoreResult<Matrix> {
        let bytes = fs::read(path).map_err(|e| ScoreError::io(path, e))?;
        let mat = MatFile::parse(&bytes).map_err(|reason| ScoreError::invalid(path, reason))?;
        let ve = mat
            .get("Signal")
            .and_then(|signal| signal.field("Ve"))
            .ok_or_else(|| ScoreError::MissingField {
                path: path.to_path_buf(),
                field: SIGNAL_FIELD,
            })?;
        let rows = ve.to_rows().map_err(|reason| ScoreError::invalid(path, reason))?;
        Matrix::from_rows(rows).map_err(|reason| ScoreError::invalid(path, reason))
    }

    fn load_csv(&self, path: &Path) -> ScoreResult<Matrix> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| ScoreError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        let mut rows = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|source| ScoreError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            let mut row = Vec::with_capacity(record.len());
            for (col_idx, cell) in record.iter().enumerate() {
                let value = cell.parse::<f64>().map_err(|_| {
                    ScoreError::invalid(
                        path,
                        format!(
                            "value '{}' at row {}, column {} is not a number",
                            cell,
                            row_idx + 1,
                            col_idx + 1
                        ),
                    )
                })?;
                row.push(value);
            }
            rows.push(row);
        }

        Matrix::from_rows(rows).map_err(|reason| ScoreError::invalid(path, reason))
    }
}

impl MatrixLoader for FsMatrixLoader {
    fn load(&self, path: &Path) -> ScoreResult<Matrix> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => self.load_json(path),
            Some("mat") => self.load_mat(path),
            Some("csv") | Some("txt") => self.load_csv(path),
            _ => Err(ScoreError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}
