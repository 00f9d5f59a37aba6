use base64::Engine;
use serde::Serialize;
use std::path::Path;

use crate::defaults::CommitAuthor;
use crate::error::{Error, Result};
use crate::utils::command;

use super::primitives::head_commit;
use super::run_git;

/// Username paired with a personal access token for HTTP basic auth.
const TOKEN_USERNAME: &str = "oauth2";

#[derive(Debug, Clone, Serialize)]
pub struct CommitOutput {
    pub sha: String,
    pub message: String,
}

/// Stage a pathspec relative to the repo root.
pub fn add(repo: &Path, pathspec: &str) -> Result<()> {
    run_git(repo, &["add", "--", pathspec], "git add")?;
    Ok(())
}

/// Commit staged changes plus modifications to tracked files.
///
/// Author and committer both come from `author`; the commit date is taken from
/// the local clock so retries produce distinct commits.
pub fn commit_all(repo: &Path, message: &str, author: &CommitAuthor) -> Result<CommitOutput> {
    let name = format!("user.name={}", author.name);
    let email = format!("user.email={}", author.email);
    let date = chrono::Local::now().to_rfc2822();

    run_git(
        repo,
        &[
            "-c", &name, "-c", &email, "commit", "--quiet", "-a", "-m", message, "--date", &date,
        ],
        "git commit",
    )?;

    Ok(CommitOutput {
        sha: head_commit(repo)?,
        message: message.to_string(),
    })
}

/// Push `branch` to `remote`, authenticating with `token` when one is given.
///
/// The credential reaches git through `GIT_CONFIG_*` variables in the child's
/// environment, so it is neither on the command line nor in the clone's config.
pub fn push(repo: &Path, remote: &str, branch: &str, token: Option<&str>) -> Result<()> {
    let env = token.map(auth_env).unwrap_or_default();
    let env: Vec<(&str, &str)> = env.iter().map(|(k, v)| (*k, v.as_str())).collect();

    let output = command::output_in_with_env(
        repo,
        "git",
        &push_args(remote, branch),
        &env,
        "git push",
    )?;
    if !output.status.success() {
        return Err(Error::push_failed(remote, branch, command::error_text(&output)));
    }
    Ok(())
}

fn push_args<'a>(remote: &'a str, branch: &'a str) -> [&'a str; 4] {
    ["push", "--quiet", remote, branch]
}

fn auth_env(token: &str) -> Vec<(&'static str, String)> {
    let credentials = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", TOKEN_USERNAME, token));
    vec![
        ("GIT_CONFIG_COUNT", "1".to_string()),
        ("GIT_CONFIG_KEY_0", "http.extraHeader".to_string()),
        ("GIT_CONFIG_VALUE_0", format!("Authorization: Basic {}", credentials)),
    ]
}
