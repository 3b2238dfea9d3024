//! File entries, root groups and the rules that derive root keys.

use std::collections::BTreeMap;

/// Maps a file name to the root key shared by files of the same dataset.
///
/// Implementations must be pure: the same name always yields the same root.
pub trait RootRule {
    fn root_of(&self, name: &str) -> String;
}

impl<F> RootRule for F
where
    F: Fn(&str) -> String,
{
    fn root_of(&self, name: &str) -> String {
        self(name)
    }
}

/// Default rule: lowercase, drop the extension, drop trailing numeric
/// segments, then drop the role tag (`signal`, `ref`, ...) after the last
/// separator.
///
/// `case1_signal.mat` and `Case1_Ref_02.MAT` both map to `case1`.
///
/// The last segment is always treated as the tag, so untagged multi-segment
/// names lose part of their dataset name: `patient_a.mat` maps to `patient`
/// and will not pair with `patient_a_signal.mat`. Corpora named that way need
/// their own [`RootRule`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SuffixRule;

impl RootRule for SuffixRule {
    fn root_of(&self, name: &str) -> String {
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        let lowered = base.to_lowercase();
        let stem = match lowered.rfind('.') {
            Some(dot) if dot > 0 => &lowered[..dot],
            _ => lowered.as_str(),
        };

        let mut segments: Vec<&str> = stem
            .split(|c: char| matches!(c, '_' | '-' | '.' | ' '))
            .filter(|s| !s.is_empty())
            .collect();
        while segments.len() > 1
            && segments
                .last()
                .is_some_and(|s| s.chars().all(|c| c.is_ascii_digit()))
        {
            segments.pop();
        }
        if segments.len() > 1 {
            segments.pop();
        }
        segments.join("_")
    }
}

/// A file name together with its derived root key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub root: String,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, rule: &dyn RootRule) -> Self {
        let name = name.into();
        let root = rule.root_of(&name);
        Self { name, root }
    }
}

/// Truth files grouped by root key. Indices are listing positions, resolved
/// through [`RootGroups::entry`].
#[derive(Clone, Debug, Default)]
pub struct RootGroups {
    entries: Vec<FileEntry>,
    groups: BTreeMap<String, Vec<usize>>,
}

impl RootGroups {
    pub(crate) fn insert(&mut self, entry: FileEntry) {
        let idx = self.entries.len();
        self.groups.entry(entry.root.clone()).or_default().push(idx);
        self.entries.push(entry);
    }

    pub fn entry(&self, idx: usize) -> Option<&FileEntry> {
        self.entries.get(idx)
    }

    /// Truth indices sharing `root`, in listing order.
    pub fn indices_for(&self, root: &str) -> &[usize] {
        self.groups.get(root).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Submission files and, index-aligned, the truth indices each one matches.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatchSet {
    pub submissions: Vec<FileEntry>,
    pub matches: Vec<Vec<usize>>,
}

impl MatchSet {
    /// (submission index, truth index) pairs in discovery order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.matches
            .iter()
            .enumerate()
            .flat_map(|(sub, truths)| truths.iter().map(move |&truth| (sub, truth)))
    }

    pub fn pair_count(&self) -> usize {
        self.matches.iter().map(Vec::len).sum()
    }

    /// Submissions whose root matched no truth file.
    pub fn unmatched(&self) -> impl Iterator<Item = &FileEntry> {
        self.submissions
            .iter()
            .zip(&self.matches)
            .filter(|(_, truths)| truths.is_empty())
            .map(|(entry, _)| entry)
    }
}
