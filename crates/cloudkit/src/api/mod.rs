//! API traits and wire types for the remote services.
//!
//! This module provides the [`StackApi`] and [`ComputeApi`] traits and the
//! structured data the remote endpoints exchange. The concrete blocking HTTP
//! implementations live in [`http`].
//!
//! # Testing
//!
//! Use [`MockStackApi`] for testing without network access:
//!
//! ```
//! use cloudkit::api::{MockStackApi, StackApi};
//! use cloudkit::StackStatus;
//!
//! let mock = MockStackApi::default();
//! mock.set_status("web", StackStatus::CreateComplete);
//!
//! let description = mock.describe_stack("web").unwrap();
//! assert_eq!(description.stack_status, StackStatus::CreateComplete);
//! ```

pub mod http;

pub use http::{HttpComputeClient, HttpStackClient};

use crate::error::{Error, Result};
use crate::stack::StackStatus;
use chrono::{DateTime, Utc};
use formation::{StackDefinition, StackParameter};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

/// One row of a stack listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackSummary {
    /// Provider-assigned stack identifier
    pub stack_id: String,
    /// Operator-assigned stack name
    pub stack_name: String,
    /// Current lifecycle status
    pub stack_status: StackStatus,
    /// When the stack was created
    pub creation_time: DateTime<Utc>,
    /// When the stack was last updated, if ever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_time: Option<DateTime<Utc>>,
    /// Description carried over from the template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_description: Option<String>,
}

impl StackSummary {
    /// Look up a display attribute by its wire name.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "StackId" => Some(self.stack_id.clone()),
            "StackName" => Some(self.stack_name.clone()),
            "StackStatus" => Some(self.stack_status.to_string()),
            "CreationTime" => Some(format_time(&self.creation_time)),
            "LastUpdatedTime" => Some(
                self.last_updated_time
                    .as_ref()
                    .map(format_time)
                    .unwrap_or_default(),
            ),
            "TemplateDescription" => Some(self.template_description.clone().unwrap_or_default()),
            _ => None,
        }
    }
}

/// Full description of one stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackDescription {
    /// Provider-assigned stack identifier
    pub stack_id: String,
    /// Operator-assigned stack name
    pub stack_name: String,
    /// Current lifecycle status
    pub stack_status: StackStatus,
    /// When the stack was created
    pub creation_time: DateTime<Utc>,
    /// Description carried over from the template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameter values the stack was provisioned with
    #[serde(default)]
    pub parameters: Vec<StackParameter>,
    /// Declared stack outputs
    #[serde(default)]
    pub outputs: Vec<StackOutput>,
    /// Capability opt-ins the stack was submitted with
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Whether rollback on failure was disabled
    #[serde(default)]
    pub disable_rollback: bool,
    /// Server-side operation timeout, if one was set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_in_minutes: Option<u32>,
}

/// One declared output of a deployed stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackOutput {
    /// Output name
    pub output_key: String,
    /// Resolved output value
    pub output_value: String,
    /// Human description, if declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A timestamped record of a state transition during a stack operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackEvent {
    /// Stable event identifier used for deduplication
    pub event_id: String,
    /// Provider-assigned stack identifier
    pub stack_id: String,
    /// Operator-assigned stack name
    pub stack_name: String,
    /// Template-declared name of the resource the event concerns
    pub logical_resource_id: String,
    /// Provider-assigned identifier of the provisioned resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    /// Declared resource type
    pub resource_type: String,
    /// Status the resource transitioned to
    pub resource_status: String,
    /// Reason attached to the transition, typically on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_status_reason: Option<String>,
    /// When the transition happened
    pub timestamp: DateTime<Utc>,
}

impl StackEvent {
    /// Look up a display attribute by its wire name.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "EventId" => Some(self.event_id.clone()),
            "StackId" => Some(self.stack_id.clone()),
            "StackName" => Some(self.stack_name.clone()),
            "LogicalResourceId" => Some(self.logical_resource_id.clone()),
            "PhysicalResourceId" => Some(self.physical_resource_id.clone().unwrap_or_default()),
            "ResourceType" => Some(self.resource_type.clone()),
            "ResourceStatus" => Some(self.resource_status.clone()),
            "ResourceStatusReason" => {
                Some(self.resource_status_reason.clone().unwrap_or_default())
            }
            "Timestamp" => Some(format_time(&self.timestamp)),
            _ => None,
        }
    }

    /// Whether this event records a failed resource transition.
    pub fn is_failure(&self) -> bool {
        self.resource_status.ends_with("_FAILED")
    }
}

/// One provisioned resource of a deployed stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackResource {
    /// Template-declared resource name
    pub logical_resource_id: String,
    /// Provider-assigned identifier of the provisioned resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    /// Declared resource type
    pub resource_type: String,
    /// Current resource status
    pub resource_status: String,
    /// Reason attached to the current status, typically on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_status_reason: Option<String>,
    /// When the resource last changed state
    pub timestamp: DateTime<Utc>,
}

/// A compute instance, as returned by the compute service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    /// Provider-assigned instance identifier
    pub instance_id: String,
    /// Current instance state (`running`, `terminated`, ...)
    pub state: String,
    /// Instance size/flavor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Private network address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
    /// Public network address, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip_address: Option<String>,
    /// When the instance was launched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_time: Option<DateTime<Utc>>,
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Operations consumed from the stack orchestration service.
///
/// Implementations must not retry: the orchestrator decides what is safe to
/// re-issue. Event listings are returned newest first.
pub trait StackApi {
    /// Submit a new stack. Returns the provider-assigned stack id.
    fn create_stack(&self, name: &str, definition: &StackDefinition) -> Result<String>;

    /// Submit an update to an existing stack. Returns the stack id.
    fn update_stack(&self, name: &str, definition: &StackDefinition) -> Result<String>;

    /// Request deletion of a stack.
    fn delete_stack(&self, name: &str) -> Result<()>;

    /// Fetch the full description of a stack.
    fn describe_stack(&self, name: &str) -> Result<StackDescription>;

    /// List stack summaries. An empty filter means no server-side filtering.
    fn list_stacks(&self, status_filter: &[String]) -> Result<Vec<StackSummary>>;

    /// Fetch the event history of a stack, newest first.
    fn describe_events(&self, name: &str) -> Result<Vec<StackEvent>>;

    /// Fetch the provisioned resources of a stack.
    fn describe_resources(&self, name: &str) -> Result<Vec<StackResource>>;
}

/// Operations consumed from the compute service.
pub trait ComputeApi {
    /// Describe the given instances. Unknown ids are silently omitted.
    fn describe_instances(&self, instance_ids: &[String]) -> Result<Vec<Instance>>;
}

// ============================================================================
// Mock
// ============================================================================

/// In-memory [`StackApi`] for tests; records call counts and filters.
#[derive(Debug, Default)]
pub struct MockStackApi {
    statuses: RefCell<HashMap<String, VecDeque<StackStatus>>>,
    events: RefCell<HashMap<String, Vec<StackEvent>>>,
    resources: RefCell<HashMap<String, Vec<StackResource>>>,
    outputs: RefCell<HashMap<String, Vec<StackOutput>>>,
    summaries: RefCell<Vec<StackSummary>>,
    /// `(verb, stack name)` pairs for every mutating call received
    pub submissions: RefCell<Vec<(String, String)>>,
    /// Status filters passed to each `list_stacks` call
    pub list_filters: RefCell<Vec<Vec<String>>>,
    /// Number of `describe_stack` calls
    pub describe_calls: Cell<usize>,
    /// Number of `list_stacks` calls
    pub list_calls: Cell<usize>,
    /// Number of `describe_events` calls
    pub event_calls: Cell<usize>,
}

impl MockStackApi {
    /// Set the stack's status for every subsequent describe.
    pub fn set_status(&self, name: &str, status: StackStatus) {
        self.statuses
            .borrow_mut()
            .insert(name.to_string(), VecDeque::from([status]));
    }

    /// Queue a status; each describe pops one and the last value sticks.
    pub fn push_status(&self, name: &str, status: StackStatus) {
        self.statuses
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .push_back(status);
    }

    /// Replace the stack's event history (newest first, as on the wire).
    pub fn set_events(&self, name: &str, events: Vec<StackEvent>) {
        self.events.borrow_mut().insert(name.to_string(), events);
    }

    /// Replace the stack's resource listing.
    pub fn set_resources(&self, name: &str, resources: Vec<StackResource>) {
        self.resources
            .borrow_mut()
            .insert(name.to_string(), resources);
    }

    /// Replace the stack's declared outputs.
    pub fn set_outputs(&self, name: &str, outputs: Vec<StackOutput>) {
        self.outputs.borrow_mut().insert(name.to_string(), outputs);
    }

    /// Add a summary row to the listing.
    pub fn add_summary(&self, summary: StackSummary) {
        self.summaries.borrow_mut().push(summary);
    }

    fn next_status(&self, name: &str) -> Option<StackStatus> {
        let mut statuses = self.statuses.borrow_mut();
        let queue = statuses.get_mut(name)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().copied()
        }
    }
}

impl StackApi for MockStackApi {
    fn create_stack(&self, name: &str, _definition: &StackDefinition) -> Result<String> {
        self.submissions
            .borrow_mut()
            .push(("create".to_string(), name.to_string()));
        Ok(format!("stk-{name}"))
    }

    fn update_stack(&self, name: &str, _definition: &StackDefinition) -> Result<String> {
        self.submissions
            .borrow_mut()
            .push(("update".to_string(), name.to_string()));
        Ok(format!("stk-{name}"))
    }

    fn delete_stack(&self, name: &str) -> Result<()> {
        self.submissions
            .borrow_mut()
            .push(("delete".to_string(), name.to_string()));
        Ok(())
    }

    fn describe_stack(&self, name: &str) -> Result<StackDescription> {
        self.describe_calls.set(self.describe_calls.get() + 1);
        let status = self.next_status(name).ok_or_else(|| {
            Error::api(
                format!("describe of stack '{name}' failed"),
                404,
                "no such stack",
            )
        })?;
        Ok(StackDescription {
            stack_id: format!("stk-{name}"),
            stack_name: name.to_string(),
            stack_status: status,
            creation_time: Utc::now(),
            description: None,
            parameters: Vec::new(),
            outputs: self
                .outputs
                .borrow()
                .get(name)
                .cloned()
                .unwrap_or_default(),
            capabilities: Vec::new(),
            disable_rollback: false,
            timeout_in_minutes: None,
        })
    }

    fn list_stacks(&self, status_filter: &[String]) -> Result<Vec<StackSummary>> {
        self.list_calls.set(self.list_calls.get() + 1);
        self.list_filters.borrow_mut().push(status_filter.to_vec());
        let summaries = self.summaries.borrow();
        if status_filter.is_empty() {
            return Ok(summaries.clone());
        }
        Ok(summaries
            .iter()
            .filter(|s| status_filter.iter().any(|f| f == s.stack_status.as_str()))
            .cloned()
            .collect())
    }

    fn describe_events(&self, name: &str) -> Result<Vec<StackEvent>> {
        self.event_calls.set(self.event_calls.get() + 1);
        Ok(self.events.borrow().get(name).cloned().unwrap_or_default())
    }

    fn describe_resources(&self, name: &str) -> Result<Vec<StackResource>> {
        Ok(self
            .resources
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default())
    }
}
