use clap::{Args, Subcommand};
use serde::Serialize;

use addon_release::keychain::{self, TokenSource};
use addon_release::Error;

use super::{CmdResult, GlobalArgs};
use crate::tty::prompt_password;

#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommand,
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Store a GitLab token in the system keychain
    Login {
        /// Personal access token (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,
    },

    /// Remove the stored GitLab token
    Logout,

    /// Show where the GitLab token would be read from
    Status,
}

#[derive(Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum AuthOutput {
    Login { stored: bool },
    Logout { removed: bool },
    Status {
        authenticated: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<TokenSource>,
    },
}

pub fn run(args: AuthArgs, _global: &GlobalArgs) -> CmdResult<AuthOutput> {
    match args.command {
        AuthCommand::Login { token } => run_login(token),
        AuthCommand::Logout => run_logout(),
        AuthCommand::Status => run_status(),
    }
}

fn run_login(token: Option<String>) -> CmdResult<AuthOutput> {
    let token = match token {
        Some(token) => token,
        None => prompt_password("GitLab token: ")?,
    };

    if token.trim().is_empty() {
        return Err(Error::validation_invalid_argument(
            "token",
            "Token must not be empty",
            None,
            None,
        ));
    }

    keychain::store_token(token.trim())?;
    Ok((AuthOutput::Login { stored: true }, 0))
}

fn run_logout() -> CmdResult<AuthOutput> {
    keychain::delete_token()?;
    Ok((AuthOutput::Logout { removed: true }, 0))
}

fn run_status() -> CmdResult<AuthOutput> {
    let source = keychain::resolve_token(None)?.map(|(_, source)| source);

    Ok((
        AuthOutput::Status {
            authenticated: source.is_some(),
            source,
        },
        0,
    ))
}
