//! ui::release_notes
//!
//! Pure functions for rendering the release body from classified commits.
//!
//! # Example Output
//!
//! ```markdown
//! ### Major Changes
//!
//!   - Drop support for the v1 config: 1f0c2ab9e...
//!
//! ### Patches
//!
//!   - Fix crash on empty tag: 77d01e3c4...
//! ```
//!
//! Sections without commits are left out. Ignored commits never appear.

use crate::core::changes::{ChangeSet, ClassifiedCommit};

/// Longest summary kept as is, in characters.
const SUMMARY_LIMIT: usize = 33;

/// Format a commit message for a release-note line.
///
/// Keeps the first line, upper-cases its first character, and cuts it to
/// 30 characters plus `...` when it reaches 33 characters.
pub fn format_summary(message: &str) -> String {
    let line = message.lines().next().unwrap_or("").trim();

    let mut chars = line.chars();
    let mut summary: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => return String::new(),
    };

    if summary.chars().count() >= SUMMARY_LIMIT {
        summary = summary.chars().take(SUMMARY_LIMIT - 3).collect();
        summary.push_str("...");
    }
    summary
}

/// Render the release body.
pub fn render_body(changes: &ChangeSet) -> String {
    let sections = [
        ("Major Changes", &changes.majors),
        ("Minor Changes", &changes.minors),
        ("Patches", &changes.patches),
    ];

    sections
        .iter()
        .filter(|(_, commits)| !commits.is_empty())
        .map(|(title, commits)| render_section(title, commits))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_section(title: &str, commits: &[ClassifiedCommit]) -> String {
    let mut out = format!("### {}\n\n", title);
    for commit in commits {
        out.push_str(&format!(
            "  - {}: {}\n",
            format_summary(&commit.message),
            commit.oid
        ));
    }
    out
}
