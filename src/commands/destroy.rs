//! `stratus destroy NAME` - delete a stack.
//!
//! Deletion is guarded by a confirmation prompt and, like every mutating
//! call, is submitted exactly once. Progress is observable with
//! `stratus events NAME --poll`.

use anyhow::{Context, Result, bail};
use cloudkit::StackOrchestrator;
use dialoguer::Confirm;

use crate::cli::DestroyArgs;
use crate::config::Settings;
use crate::ui;

pub fn run(settings: &Settings, args: &DestroyArgs) -> Result<()> {
    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Destroy stack '{}'?", args.name))
            .default(false)
            .interact()
            .context("confirmation prompt aborted")?;
        if !confirmed {
            bail!("destroy of '{}' aborted", args.name);
        }
    }

    let registry = settings.registry()?;
    let mut orchestrator = StackOrchestrator::new(&registry);
    orchestrator.delete_stack(&args.name)?;
    ui::info(&format!("Stack deletion initialized for {}", args.name));
    Ok(())
}
