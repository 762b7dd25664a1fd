//! Shared create/update flow.
//!
//! Both submission commands run the same sequence: resolve a template,
//! collect parameters, build the definition, submit, then poll to a
//! terminal state. Which terminal status counts as success comes from the
//! [`StackAction`] the command was constructed with.

use anyhow::{Context, Result, bail};
use std::fs;

use crate::cli::StackArgs;
use crate::commands::inspect;
use crate::config::Settings;
use crate::prompt::{self, TerminalPrompt};
use crate::ui;
use cloudkit::events;
use cloudkit::{ConnectionRegistry, Poller, StackAction, StackOrchestrator};
use formation::{Template, build};

/// One create or update invocation.
pub struct StackFlow<'a> {
    pub settings: &'a Settings,
    pub action: StackAction,
}

impl StackFlow<'_> {
    pub fn run(&self, args: &StackArgs) -> Result<()> {
        let template_path = match &args.file {
            Some(path) => path.clone(),
            None => prompt::discover_template(
                &self
                    .settings
                    .templates_directory(args.templates_directory.as_deref()),
            )?,
        };
        let text = fs::read_to_string(&template_path).with_context(|| {
            format!(
                "Invalid template file path provided: {}",
                template_path.display()
            )
        })?;
        let mut template = Template::from_json(&text)
            .with_context(|| format!("Could not parse template {}", template_path.display()))?;

        if args.print_only {
            ui::warn("Print only requested");
            println!("{}", template.to_json_pretty()?);
            return Ok(());
        }

        ui::header(&format!("Stack {}: {}", self.action, args.name));
        ui::kv("Template", &template_path.display().to_string());
        if let Some(description) = template.description() {
            ui::kv("Description", description);
        }

        let mut options = self.settings.stack_options(args)?;
        let interactive = self.settings.interactive_parameters(args);
        prompt::populate_parameters(&template, &mut options, &mut TerminalPrompt, interactive)?;
        let definition = build(&mut template, &options)?;

        let registry = self.settings.registry()?;
        let mut orchestrator = StackOrchestrator::new(&registry);
        orchestrator.submit(self.action, &args.name, &definition)?;

        if self.settings.poll(args) {
            poll_and_report(
                &mut orchestrator,
                &registry,
                &args.name,
                self.action,
                self.settings,
            )
        } else {
            ui::warn("Stack state polling has been disabled.");
            ui::info(&format!(
                "Stack {} initialized for {}",
                self.action, args.name
            ));
            Ok(())
        }
    }
}

/// Poll a submitted stack to a terminal state and report the outcome.
///
/// On success the stack's outputs are printed; on failure the inspect
/// drill-down runs and the flow exits with an error.
pub fn poll_and_report(
    orchestrator: &mut StackOrchestrator,
    registry: &ConnectionRegistry,
    name: &str,
    action: StackAction,
    settings: &Settings,
) -> Result<()> {
    let attributes = settings.event_attributes(&[]);
    ui::section("Events");
    ui::print_row(&events::titles(&attributes));

    let poller = Poller::new(settings.poll_interval(None));
    let status = {
        let stack = orchestrator.stack(name);
        poller.poll(stack, |batch| {
            for row in events::event_rows(batch, &attributes) {
                ui::print_row(&row);
            }
        })?
    };
    println!();

    if status == action.success_status() {
        ui::success(&format!("Stack {action} complete: {name}"));
        let outputs = orchestrator.stack(name).outputs()?;
        if !outputs.is_empty() {
            ui::section("Outputs");
            for output in &outputs {
                ui::kv(&output.output_key, &output.output_value);
            }
        }
        Ok(())
    } else {
        ui::error(&format!(
            "Stack {action} of {name} failed: {}",
            ui::colored_status(status.as_str())
        ));
        inspect::failure_report(orchestrator, registry, name)?;
        bail!("stack {action} of '{name}' ended in {status}");
    }
}
