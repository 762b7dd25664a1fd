//! `stratus inspect NAME` - failure drill-down for a stack.
//!
//! Surfaces every failed resource transition, then asks the compute service
//! for detail on failed instances so the root cause is visible without
//! leaving the terminal.

use anyhow::Result;
use cloudkit::api::StackEvent;
use cloudkit::{ComputeApi, ConnectionRegistry, StackOrchestrator};

use crate::cli::InspectArgs;
use crate::config::Settings;
use crate::ui;

pub fn run(settings: &Settings, args: &InspectArgs) -> Result<()> {
    let registry = settings.registry()?;
    let mut orchestrator = StackOrchestrator::new(&registry);
    ui::header(&format!("Inspect: {}", args.name));
    failure_report(&mut orchestrator, &registry, &args.name)
}

/// Print failed resource events and instance detail for a stack.
pub fn failure_report(
    orchestrator: &mut StackOrchestrator,
    registry: &ConnectionRegistry,
    name: &str,
) -> Result<()> {
    let failures: Vec<StackEvent> = orchestrator
        .stack(name)
        .events()?
        .iter()
        .filter(|event| event.is_failure())
        .cloned()
        .collect();

    if failures.is_empty() {
        ui::info("No failed resources found");
        return Ok(());
    }

    ui::section("Failed resources");
    // Event listings arrive newest first; report in the order things broke
    for event in failures.iter().rev() {
        ui::kv(
            &event.logical_resource_id,
            &format!(
                "{} ({})",
                ui::colored_status(&event.resource_status),
                event
                    .resource_status_reason
                    .as_deref()
                    .unwrap_or("no reason given")
            ),
        );
    }

    let instance_ids: Vec<String> = failures
        .iter()
        .filter(|event| event.resource_type.ends_with("::Instance"))
        .filter_map(|event| event.physical_resource_id.clone())
        .collect();
    if instance_ids.is_empty() {
        return Ok(());
    }

    match registry.compute().describe_instances(&instance_ids) {
        Ok(instances) => {
            if !instances.is_empty() {
                ui::section("Instances");
                for instance in &instances {
                    let mut detail = vec![instance.state.clone()];
                    if let Some(instance_type) = &instance.instance_type {
                        detail.push(instance_type.clone());
                    }
                    if let Some(address) = &instance.private_ip_address {
                        detail.push(address.clone());
                    }
                    ui::kv(&instance.instance_id, &detail.join("  "));
                }
            }
        }
        Err(error) => ui::warn(&format!("Could not fetch instance detail: {error}")),
    }
    Ok(())
}
