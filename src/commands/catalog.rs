use clap::{Args, Subcommand};
use serde::Serialize;

use addon_release::catalog::{self, AddonConfig};
use addon_release::Error;

use super::{addons_config_path, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    command: CatalogCommand,
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// List configured addons and their channels
    List {
        /// Path to the addons config file
        #[arg(long, value_name = "PATH")]
        addons_config: String,
    },
    /// Show the full configuration of one addon
    Show {
        /// Addon name
        addon: String,
        /// Path to the addons config file
        #[arg(long, value_name = "PATH")]
        addons_config: String,
    },
}

#[derive(Serialize)]
pub struct AddonSummary {
    name: String,
    bundle_repo: String,
    channels: Vec<String>,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum CatalogOutput {
    #[serde(rename = "catalog.list")]
    List {
        source: String,
        addons: Vec<AddonSummary>,
    },
    #[serde(rename = "catalog.show")]
    Show { source: String, addon: AddonConfig },
}

pub fn run(args: CatalogArgs, _global: &GlobalArgs) -> CmdResult<CatalogOutput> {
    match args.command {
        CatalogCommand::List { addons_config } => list(&addons_config),
        CatalogCommand::Show {
            addon,
            addons_config,
        } => show(&addon, &addons_config),
    }
}

fn list(addons_config: &str) -> CmdResult<CatalogOutput> {
    let catalog = catalog::load(&addons_config_path(addons_config)?)?;
    let addons = catalog
        .addons
        .iter()
        .map(|addon| AddonSummary {
            name: addon.name.clone(),
            bundle_repo: addon.bundle.repo.clone(),
            channels: addon.channels.iter().map(|c| c.name.clone()).collect(),
        })
        .collect();

    Ok((
        CatalogOutput::List {
            source: catalog.source,
            addons,
        },
        0,
    ))
}

fn show(name: &str, addons_config: &str) -> CmdResult<CatalogOutput> {
    let catalog = catalog::load(&addons_config_path(addons_config)?)?;
    let addon = catalog
        .find_addon(name)
        .cloned()
        .ok_or_else(|| Error::addon_not_found(name, &catalog.source))?;

    Ok((
        CatalogOutput::Show {
            source: catalog.source,
            addon,
        },
        0,
    ))
}
