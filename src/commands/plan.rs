use clap::Args;
use serde::Serialize;

use addon_release::defaults;
use addon_release::release::{self, ReleasePlan};

use super::{CmdResult, GlobalArgs, SelectionArgs};

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    selection: SelectionArgs,
}

#[derive(Serialize)]
pub struct PlanOutput {
    command: &'static str,
    plan: ReleasePlan,
}

pub fn run(args: PlanArgs, _global: &GlobalArgs) -> CmdResult<PlanOutput> {
    let settings = defaults::load_defaults()?;
    let request = args.selection.into_request(String::new(), true)?;
    let plan = release::plan(&request, &settings)?;

    Ok((
        PlanOutput {
            command: "plan",
            plan,
        },
        0,
    ))
}
