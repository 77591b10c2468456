//! ui::prompts
//!
//! Interactive prompts.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input fail with a clear error message.
//! Prompts take their reader and writer as arguments so tests can script
//! the answers.

use std::io::{BufRead, Write};

use thiserror::Error;

use crate::core::changes::{ChangeKind, ChangeSet, ClassifiedCommit};
use crate::git::{CommitInfo, GitError};

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Prompt to select from a list of options.
///
/// Prints a numbered menu and reads a 1-based choice, asking again on
/// invalid input. Returns the 0-based index of the selected option.
pub fn select<T: AsRef<str>>(
    message: &str,
    options: &[T],
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<usize, PromptError> {
    writeln!(output, "{}", message)?;
    for (i, option) in options.iter().enumerate() {
        writeln!(output, "  {}) {}", i + 1, option.as_ref())?;
    }

    loop {
        write!(output, "Choose [1-{}]: ", options.len())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(PromptError::Cancelled);
        }

        match line.trim().parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
            _ => writeln!(output, "Please enter a number between 1 and {}.", options.len())?,
        }
    }
}

/// Ask the user to classify each commit until they choose "End" or history
/// runs out.
pub fn classify_commits<I>(
    commits: I,
    interactive: bool,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<ChangeSet, PromptError>
where
    I: IntoIterator<Item = Result<CommitInfo, GitError>>,
{
    if !interactive {
        return Err(PromptError::NotInteractive);
    }

    let mut options: Vec<&str> = ChangeKind::ALL.iter().map(|k| k.label()).collect();
    options.push("End");

    let mut changes = ChangeSet::default();
    for commit in commits {
        let commit = commit?;
        let question = format!(
            "Commit '{}' ({}) is a change of:",
            commit.summary,
            commit.short_oid()
        );
        let choice = select(&question, &options, input, output)?;

        match ChangeKind::ALL.get(choice) {
            Some(kind) => changes.push(*kind, ClassifiedCommit::from(&commit)),
            None => break,
        }
    }
    Ok(changes)
}
