//! `stratus create NAME` - submit a new stack and watch it converge.

use anyhow::Result;
use cloudkit::StackAction;

use crate::cli::StackArgs;
use crate::config::Settings;
use crate::flow::StackFlow;

pub fn run(settings: &Settings, args: &StackArgs) -> Result<()> {
    StackFlow {
        settings,
        action: StackAction::Create,
    }
    .run(args)
}
