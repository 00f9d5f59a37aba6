use clap::Args;
use std::path::PathBuf;

use addon_release::release::ReleaseRequest;

pub type CmdResult<T> = addon_release::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

/// Addon/channel/version selection shared by `release` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Addon name as listed in the addons config
    #[arg(long)]
    pub name: String,

    /// Version to release (e.g. 1.2.3 or 1.2.3-rc1)
    #[arg(long)]
    pub version: String,

    /// Path to the addons config file
    #[arg(long, value_name = "PATH")]
    pub addons_config: String,

    /// Release channel (stage, edge or stable)
    #[arg(long, default_value = "stage")]
    pub channel: String,

    /// Origin project path, overriding the channel default
    #[arg(long, value_name = "PROJECT")]
    pub origin: Option<String>,

    /// Fork project path, overriding the channel default
    #[arg(long, value_name = "PROJECT")]
    pub fork: Option<String>,
}

impl SelectionArgs {
    pub fn into_request(
        self,
        description: String,
        dry_run: bool,
    ) -> addon_release::Result<ReleaseRequest> {
        Ok(ReleaseRequest {
            addons_config: addons_config_path(&self.addons_config)?,
            addon: self.name,
            channel: self.channel,
            version: self.version,
            description,
            origin: self.origin,
            fork: self.fork,
            dry_run,
        })
    }
}

pub(crate) fn addons_config_path(raw: &str) -> addon_release::Result<PathBuf> {
    if raw.trim().is_empty() {
        return Err(addon_release::Error::validation_invalid_argument(
            "addons-config",
            "The addons config path must not be empty",
            None,
            None,
        ));
    }
    addon_release::paths::expand(raw)
}

pub mod auth;
pub mod catalog;
pub mod config;
pub mod plan;
pub mod release;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (addon_release::Result<serde_json::Value>, i32) {
    crate::tty::status("addon-release is working...");

    match command {
        crate::Commands::Release(args) => dispatch!(args, global, release),
        crate::Commands::Plan(args) => dispatch!(args, global, plan),
        crate::Commands::Catalog(args) => dispatch!(args, global, catalog),
        crate::Commands::Auth(args) => dispatch!(args, global, auth),
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}
