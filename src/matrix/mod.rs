//! Signal matrices and the loaders that read them from disk.

pub mod domain;
pub mod mat5;
pub mod repo_fs;

pub use domain::{Matrix, MatrixLoader, Shape, SIGNAL_FIELD};
pub use repo_fs::FsMatrixLoader;
