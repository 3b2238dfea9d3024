//! Name-root matching between submission and truth listings.

pub mod domain;
pub mod service;

pub use domain::{FileEntry, MatchSet, RootGroups, RootRule, SuffixRule};
pub use service::{derive_roots, match_to_truth};
