//! Matching of submission files to truth files by root key.

use super::domain::{FileEntry, MatchSet, RootGroups, RootRule};

/// Group truth names by their root. Indices follow the order of `names`.
pub fn derive_roots<S: AsRef<str>>(names: &[S], rule: &dyn RootRule) -> RootGroups {
    let mut groups = RootGroups::default();
    for name in names {
        groups.insert(FileEntry::new(name.as_ref(), rule));
    }
    tracing::debug!(
        files = groups.len(),
        roots = groups.roots().count(),
        "derived truth roots"
    );
    groups
}

/// For each submission name, collect every truth index sharing its root.
///
/// Matching is many-to-many; truth files with identical roots are all kept.
pub fn match_to_truth<S: AsRef<str>>(
    submission_names: &[S],
    groups: &RootGroups,
    rule: &dyn RootRule,
) -> MatchSet {
    let mut set = MatchSet::default();
    for name in submission_names {
        let entry = FileEntry::new(name.as_ref(), rule);
        let truths = groups.indices_for(&entry.root).to_vec();
        if truths.is_empty() {
            tracing::debug!(submission = %entry.name, root = %entry.root, "no truth file shares this root");
        }
        set.submissions.push(entry);
        set.matches.push(truths);
    }
    set
}
