//! `stratus list` - stack summaries, served from the per-filter cache.

use anyhow::Result;
use cloudkit::StackOrchestrator;
use cloudkit::events;

use crate::cli::ListArgs;
use crate::config::Settings;
use crate::ui;

pub fn run(settings: &Settings, args: &ListArgs) -> Result<()> {
    let registry = settings.registry()?;
    let mut orchestrator = StackOrchestrator::new(&registry);

    let summaries = orchestrator.list_stacks(&args.statuses, args.force_refresh)?;
    if summaries.is_empty() {
        ui::warn("No information found");
        return Ok(());
    }

    let attributes = settings.list_attributes(args);
    let rows: Vec<Vec<String>> = summaries
        .iter()
        .map(|summary| {
            attributes
                .iter()
                .map(|attribute| summary.attribute(attribute).unwrap_or_default())
                .collect()
        })
        .collect();
    ui::print_table(&events::titles(&attributes), &rows);
    Ok(())
}
