//! Turns a transformed working tree into a single commit on a fresh release branch.

use serde::Serialize;
use std::path::Path;

use crate::defaults::CommitAuthor;
use crate::error::{Error, Result};
use crate::git;
use crate::transform::StagedChange;
use crate::version::Version;

/// Branch, commit message and review title derived from one release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseNames {
    pub branch: String,
    pub commit_message: String,
    pub title: String,
}

impl ReleaseNames {
    pub fn new(addon: &str, channel: &str, version: &Version) -> Self {
        Self {
            branch: format!("{}-{}-v{}", addon, channel, version),
            commit_message: format!("update {} {} to {}", addon, channel, version),
            title: format!("Update {} {} to {}", addon, channel, version),
        }
    }
}

/// A committed release branch, ready to publish.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeSet {
    pub branch: String,
    pub commit: String,
    pub message: String,
    pub title: String,
    pub staged: String,
}

/// Verify the repo sits on `main_branch`, then switch to a new release branch.
///
/// Nothing in the repo is touched when the branch check fails.
pub fn begin(repo: &Path, main_branch: &str, names: &ReleaseNames) -> Result<()> {
    let current = git::current_branch(repo)?;
    if current != main_branch {
        return Err(Error::wrong_branch(main_branch, current));
    }

    git::create_branch(repo, &names.branch)?;
    log_status!("git", "Created branch {}", names.branch);
    Ok(())
}

/// Stage the transform output, commit, and require a clean tree afterwards.
pub fn commit(
    repo: &Path,
    names: &ReleaseNames,
    staged: &StagedChange,
    author: &CommitAuthor,
) -> Result<ChangeSet> {
    git::add(repo, &staged.pathspec())?;
    let output = git::commit_all(repo, &names.commit_message, author)?;
    log_status!("git", "Committed {} ({})", output.message, short_sha(&output.sha));

    let status = git::status(repo)?;
    if !status.is_empty() {
        return Err(Error::dirty_tree(&names.branch, status));
    }

    Ok(ChangeSet {
        branch: names.branch.clone(),
        commit: output.sha,
        message: output.message,
        title: names.title.clone(),
        staged: staged.path().to_string(),
    })
}

fn short_sha(sha: &str) -> &str {
    sha.get(..8).unwrap_or(sha)
}
