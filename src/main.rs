use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{auth, catalog, config, plan, release};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "addon-release")]
#[command(version = VERSION)]
#[command(about = "Promote addon releases into the managed tenants repositories")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Promote an addon version to a channel and open a merge request
    Release(release::ReleaseArgs),
    /// Show what a release would do without touching any repository
    Plan(plan::PlanArgs),
    /// Inspect the addons config
    Catalog(catalog::CatalogArgs),
    /// Manage the stored GitLab token
    Auth(auth::AuthArgs),
    /// Show global addon-release configuration
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    if let Err(err) = output::print_json_result(json_result) {
        eprintln!("{}", err);
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
