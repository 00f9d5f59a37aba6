use clap::{Args, Subcommand};
use serde::Serialize;

use addon_release::defaults::{self, Defaults};
use addon_release::paths;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display configuration (merged defaults + file)
    Show {
        /// Show only built-in defaults (ignore config.json)
        #[arg(long)]
        builtin: bool,
    },
    /// Show the path to config.json
    Path,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    defaults: Option<Defaults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
}

pub fn run(args: ConfigArgs, _global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    match args.command {
        ConfigCommand::Show { builtin } => show(builtin),
        ConfigCommand::Path => path(),
    }
}

fn show(builtin: bool) -> CmdResult<ConfigOutput> {
    let defaults = if builtin {
        Defaults::default()
    } else {
        defaults::load_defaults()?
    };

    Ok((
        ConfigOutput {
            command: "config.show".to_string(),
            defaults: Some(defaults),
            path: None,
            exists: None,
        },
        0,
    ))
}

fn path() -> CmdResult<ConfigOutput> {
    let path = paths::config_json()?;

    Ok((
        ConfigOutput {
            command: "config.path".to_string(),
            defaults: None,
            exists: Some(path.exists()),
            path: Some(path.display().to_string()),
        },
        0,
    ))
}
