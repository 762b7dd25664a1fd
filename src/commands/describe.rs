//! `stratus describe NAME` - description, outputs, and resources.

use anyhow::Result;
use cloudkit::StackOrchestrator;

use crate::cli::DescribeArgs;
use crate::config::Settings;
use crate::ui;

pub fn run(settings: &Settings, args: &DescribeArgs) -> Result<()> {
    let registry = settings.registry()?;
    let mut orchestrator = StackOrchestrator::new(&registry);
    let stack = orchestrator.stack(&args.name);

    let show_all = !args.outputs && !args.resources;

    if show_all {
        let description = stack.description()?.clone();
        ui::header(&format!("Stack: {}", description.stack_name));
        ui::kv("Stack Id", &description.stack_id);
        ui::kv("Status", &ui::colored_status(description.stack_status.as_str()));
        ui::kv(
            "Created",
            &description
                .creation_time
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
        );
        if let Some(text) = &description.description {
            ui::kv("Description", text);
        }
        if !description.capabilities.is_empty() {
            ui::kv("Capabilities", &description.capabilities.join(", "));
        }
        if let Some(timeout) = description.timeout_in_minutes {
            ui::kv("Timeout", &format!("{timeout} minutes"));
        }
        if !description.parameters.is_empty() {
            ui::section("Parameters");
            for parameter in &description.parameters {
                ui::kv(&parameter.parameter_key, &parameter.parameter_value);
            }
        }
    }

    if show_all || args.outputs {
        let outputs = stack.outputs()?;
        if outputs.is_empty() {
            if args.outputs {
                ui::warn("No information found");
            }
        } else {
            ui::section("Outputs");
            for output in &outputs {
                ui::kv(&output.output_key, &output.output_value);
                if let Some(text) = &output.description {
                    ui::dim(text);
                }
            }
        }
    }

    if show_all || args.resources {
        let resources = stack.resources()?;
        if resources.is_empty() {
            if args.resources {
                ui::warn("No information found");
            }
        } else {
            let titles = vec![
                "Logical Resource Id".to_string(),
                "Resource Type".to_string(),
                "Resource Status".to_string(),
                "Physical Resource Id".to_string(),
            ];
            let rows: Vec<Vec<String>> = resources
                .iter()
                .map(|resource| {
                    vec![
                        resource.logical_resource_id.clone(),
                        resource.resource_type.clone(),
                        resource.resource_status.clone(),
                        resource.physical_resource_id.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            ui::section("Resources");
            ui::print_table(&titles, &rows);
        }
    }

    Ok(())
}
