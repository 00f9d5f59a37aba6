use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::command;

use super::run_git;

/// Clone a single branch or tag of `url` into `target_dir`.
pub fn clone_ref(url: &str, reference: &str, target_dir: &Path) -> Result<()> {
    let parent = target_dir.parent().unwrap_or(Path::new("."));
    let target = target_dir.to_string_lossy();
    run_git(
        parent,
        &["clone", "--quiet", "--single-branch", "--branch", reference, url, &target],
        "git clone",
    )?;
    Ok(())
}

pub fn add_remote(repo: &Path, name: &str, url: &str) -> Result<()> {
    run_git(repo, &["remote", "add", name, url], "git remote add")?;
    Ok(())
}

/// Current branch name, or `HEAD` when detached.
pub fn current_branch(repo: &Path) -> Result<String> {
    if !is_git_repo(repo) {
        return Err(Error::git_command_failed(format!(
            "{} is not a git repository",
            repo.display()
        )));
    }
    Ok(command::run_in_optional(repo, "git", &["symbolic-ref", "--short", "-q", "HEAD"])
        .unwrap_or_else(|| "HEAD".to_string()))
}

pub fn checkout(repo: &Path, branch: &str) -> Result<()> {
    run_git(repo, &["checkout", "--quiet", branch], "git checkout")?;
    Ok(())
}

pub fn create_branch(repo: &Path, branch: &str) -> Result<()> {
    run_git(repo, &["checkout", "--quiet", "-b", branch], "git checkout -b")?;
    Ok(())
}

/// Porcelain status; empty when the working tree is clean.
pub fn status(repo: &Path) -> Result<String> {
    run_git(repo, &["status", "--porcelain"], "git status")
}

pub fn head_commit(repo: &Path) -> Result<String> {
    run_git(repo, &["rev-parse", "HEAD"], "git rev-parse")
}

pub(crate) fn is_git_repo(path: &Path) -> bool {
    path.is_dir() && command::run_in_optional(path, "git", &["rev-parse", "--git-dir"]).is_some()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn current_branch_reports_main() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        assert_eq!(current_branch(dir.path()).unwrap(), "main");
    }

    #[test]
    fn current_branch_fails_outside_repo() {
        let dir = TempDir::new().unwrap();
        let err = current_branch(dir.path()).unwrap_err();
        assert_eq!(err.code.as_str(), "git.command_failed");
    }

    #[test]
    fn status_lists_untracked_files() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        assert!(status(dir.path()).unwrap().is_empty());

        fs::write(dir.path().join("stray.txt"), "x").unwrap();
        assert_eq!(status(dir.path()).unwrap(), "?? stray.txt");
    }

    #[test]
    fn clone_ref_checks_out_requested_branch() {
        let origin = TempDir::new().unwrap();
        init_repo(origin.path());
        let scratch = TempDir::new().unwrap();
        let target = scratch.path().join("clone");

        clone_ref(&origin.path().to_string_lossy(), "main", &target).unwrap();
        assert_eq!(current_branch(&target).unwrap(), "main");
        assert!(target.join("README.md").is_file());
    }

    #[test]
    fn create_branch_switches_to_it() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        create_branch(dir.path(), "foo-stage-v1.2.3").unwrap();
        assert_eq!(current_branch(dir.path()).unwrap(), "foo-stage-v1.2.3");
        checkout(dir.path(), "main").unwrap();
        assert_eq!(current_branch(dir.path()).unwrap(), "main");
    }
}
