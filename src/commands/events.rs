//! `stratus events NAME` - event history, optionally polled to completion.

use anyhow::Result;
use cloudkit::events;
use cloudkit::{Poller, StackOrchestrator};

use crate::cli::EventsArgs;
use crate::config::Settings;
use crate::ui;

pub fn run(settings: &Settings, args: &EventsArgs) -> Result<()> {
    let registry = settings.registry()?;
    let mut orchestrator = StackOrchestrator::new(&registry);
    let attributes = settings.event_attributes(&args.attributes);

    if args.poll {
        ui::info(&format!("Polling events for stack: {}", args.name));
        ui::print_row(&events::titles(&attributes));

        let poller = Poller::new(settings.poll_interval(args.interval));
        let stack = orchestrator.stack(&args.name);
        let status = poller.poll(stack, |batch| {
            for row in events::event_rows(batch, &attributes) {
                ui::print_row(&row);
            }
        })?;
        println!();
        ui::info(&format!(
            "Stack reached terminal state: {}",
            ui::colored_status(status.as_str())
        ));
    } else {
        let stack = orchestrator.stack(&args.name);
        let batch = stack.new_events()?;
        if batch.is_empty() {
            ui::warn("No information found");
        } else {
            ui::info(&format!("Events for stack: {}", args.name));
            ui::print_table(&events::titles(&attributes), &events::event_rows(&batch, &attributes));
        }
    }
    Ok(())
}
