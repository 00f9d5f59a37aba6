mod operations;
mod primitives;

pub use operations::*;
pub use primitives::*;

#[cfg(test)]
pub(crate) use primitives::test_support;

use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::command;

/// Run git in `repo`, returning trimmed stdout or a `git.command_failed` error.
fn run_git(repo: &Path, args: &[&str], context: &str) -> Result<String> {
    let output = command::output_in(repo, "git", args, context)?;
    if !output.status.success() {
        return Err(Error::git_command_failed(format!(
            "{} failed: {}",
            context,
            command::error_text(&output)
        ))
        .with_hint(format!("Repository: {}", repo.display())));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}
