//! Archive unpacking and input listings.

pub mod service;

pub use service::{extract_zip, list_files, prepare_dir, unzip_all};
