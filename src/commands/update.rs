//! `stratus update NAME` - submit an update to an existing stack.

use anyhow::Result;
use cloudkit::StackAction;

use crate::cli::StackArgs;
use crate::config::Settings;
use crate::flow::StackFlow;

pub fn run(settings: &Settings, args: &StackArgs) -> Result<()> {
    StackFlow {
        settings,
        action: StackAction::Update,
    }
    .run(args)
}
