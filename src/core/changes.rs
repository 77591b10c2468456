//! core::changes
//!
//! Commits sorted into the release-note categories the user picked.

use crate::git::CommitInfo;

/// How a commit affects the release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Major,
    Minor,
    Patch,
    Ignore,
}

impl ChangeKind {
    /// All kinds, in prompt order.
    pub const ALL: [ChangeKind; 4] = [
        ChangeKind::Major,
        ChangeKind::Minor,
        ChangeKind::Patch,
        ChangeKind::Ignore,
    ];

    /// Label shown when asking the user.
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Major => "Major Change",
            ChangeKind::Minor => "Minor Change",
            ChangeKind::Patch => "Patch",
            ChangeKind::Ignore => "Ignore",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A commit with the message and id kept for the release notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedCommit {
    pub message: String,
    pub oid: String,
}

impl From<&CommitInfo> for ClassifiedCommit {
    fn from(commit: &CommitInfo) -> Self {
        Self {
            message: commit.message.clone(),
            oid: commit.oid.clone(),
        }
    }
}

/// Commits grouped by kind, each group in walk order (newest first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub majors: Vec<ClassifiedCommit>,
    pub minors: Vec<ClassifiedCommit>,
    pub patches: Vec<ClassifiedCommit>,
    pub ignored: Vec<ClassifiedCommit>,
}

impl ChangeSet {
    /// File `commit` under `kind`.
    pub fn push(&mut self, kind: ChangeKind, commit: ClassifiedCommit) {
        match kind {
            ChangeKind::Major => self.majors.push(commit),
            ChangeKind::Minor => self.minors.push(commit),
            ChangeKind::Patch => self.patches.push(commit),
            ChangeKind::Ignore => self.ignored.push(commit),
        }
    }

    /// Number of commits that will appear in the notes.
    pub fn reported_len(&self) -> usize {
        self.majors.len() + self.minors.len() + self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reported_len() == 0 && self.ignored.is_empty()
    }
}
