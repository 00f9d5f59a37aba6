use clap::Args;
use serde::Serialize;

use addon_release::defaults;
use addon_release::keychain::{self, TokenSource};
use addon_release::release::{self, ReleaseOutcome};
use addon_release::review::GitLabClient;
use addon_release::Error;

use super::{CmdResult, GlobalArgs, SelectionArgs};

#[derive(Args)]
pub struct ReleaseArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Description for the merge request
    #[arg(long, default_value = "")]
    merge_request_description: String,

    /// GitLab personal access token (falls back to GITLAB_TOKEN, then the keychain)
    #[arg(long, value_name = "TOKEN")]
    gitlab_token: Option<String>,

    /// Commit the release branch locally without pushing or opening a merge request
    #[arg(long)]
    dry_run: bool,
}

#[derive(Serialize)]
pub struct ReleaseOutput {
    command: &'static str,
    #[serde(flatten)]
    outcome: ReleaseOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_source: Option<TokenSource>,
}

pub fn run(args: ReleaseArgs, _global: &GlobalArgs) -> CmdResult<ReleaseOutput> {
    let settings = defaults::load_defaults()?;
    let request = args
        .selection
        .into_request(args.merge_request_description, args.dry_run)?;

    let resolved = keychain::resolve_token(args.gitlab_token.as_deref())?;
    if resolved.is_none() && !request.dry_run {
        return Err(Error::config_missing_key("gitlab_token", None).with_hint(format!(
            "Pass --gitlab-token, set {} or run 'addon-release auth login'",
            keychain::TOKEN_ENV
        )));
    }
    let (token, token_source) = match resolved {
        Some((token, source)) => (Some(token), Some(source)),
        None => (None, None),
    };

    let review = GitLabClient::new(&settings.api_base(), token.as_deref().unwrap_or_default())?;
    let outcome = release::run(&request, &settings, token.as_deref(), &review)?;

    Ok((
        ReleaseOutput {
            command: "release",
            outcome,
            token_source,
        },
        0,
    ))
}
