//! In-place archive extraction and directory listings.
//!
//! Archives found directly inside an input folder are flattened into that
//! folder: entries land by base name only and platform metadata is skipped.
//!
//! TODO: Report archive entries whose base names collide instead of letting
//! the later one overwrite the earlier.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use crate::common::error::{ScoreError, ScoreResult};

const MACOS_METADATA: &str = "__MACOSX";

fn is_archive(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".zip")
}

/// Regular-file names directly inside `dir`, sorted.
fn file_names(dir: &Path) -> ScoreResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ScoreError::io(dir, e))? {
        let entry = entry.map_err(|e| ScoreError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| ScoreError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        // Non UTF-8 names cannot be reported in the JSON output.
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => tracing::warn!(
                dir = %dir.display(),
                name = %raw.to_string_lossy(),
                "skipping file with a non UTF-8 name"
            ),
        }
    }
    names.sort();
    Ok(names)
}

/// Extract every entry of the archive at `path` into `dest`, flattened.
pub fn extract_zip(path: &Path, dest: &Path) -> ScoreResult<usize> {
    let archive_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let zip_err = |source| ScoreError::Archive {
        archive: archive_name.clone(),
        source,
    };

    fs::create_dir_all(dest).map_err(|e| ScoreError::io(dest, e))?;
    let file = File::open(path).map_err(|e| ScoreError::io(path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(zip_err)?;

    let mut written = 0;
    for idx in 0..archive.len() {
        let mut entry = archive.by_index(idx).map_err(zip_err)?;
        let raw_name = entry.name().to_string();
        if raw_name.starts_with(MACOS_METADATA) || entry.is_dir() {
            continue;
        }
        let base = match raw_name.rsplit(['/', '\\']).next() {
            Some(base) if !base.is_empty() => base.to_string(),
            _ => continue,
        };

        let out_path = dest.join(&base);
        let mut out = File::create(&out_path).map_err(|e| ScoreError::io(&out_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| ScoreError::io(&out_path, e))?;
        tracing::trace!(archive = %archive_name, entry = %base, "extracted");
        written += 1;
    }
    Ok(written)
}

/// Extract every zip archive found directly inside `dir` into `dir`.
///
/// Archives are removed afterwards unless `keep` is set. Returns the archive
/// names in processing order.
pub fn unzip_all(dir: &Path, keep: bool) -> ScoreResult<Vec<String>> {
    let archives: Vec<String> = file_names(dir)?
        .into_iter()
        .filter(|name| is_archive(name))
        .collect();

    for name in &archives {
        let path = dir.join(name);
        let entries = extract_zip(&path, dir)?;
        tracing::info!(dir = %dir.display(), archive = %name, entries, "unpacked archive");
        if !keep {
            fs::remove_file(&path).map_err(|e| ScoreError::io(&path, e))?;
        }
    }
    Ok(archives)
}

/// Files eligible for scoring: sorted, without hidden files or archives.
pub fn list_files(dir: &Path) -> ScoreResult<Vec<String>> {
    Ok(file_names(dir)?
        .into_iter()
        .filter(|name| !name.starts_with('.') && !is_archive(name))
        .collect())
}

/// Unpack `dir` and return its scoring listing.
pub fn prepare_dir(dir: &Path, keep_archives: bool) -> ScoreResult<Vec<String>> {
    unzip_all(dir, keep_archives)?;
    list_files(dir)
}
