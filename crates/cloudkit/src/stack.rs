//! Stack handles and the stack status state machine.
//!
//! A [`Stack`] represents one remote stack. Its description, events, and
//! resources are fetched lazily and cached on the handle until [`Stack::refresh`]
//! is called (the poll loop refreshes once per tick). Whether a terminal
//! status counts as success depends on the operator's intent, so success
//! classification is keyed by [`StackAction`].

use crate::api::{StackApi, StackDescription, StackEvent, StackOutput, StackResource};
use crate::error::Result;
use crate::events::EventDeduplicator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Stack lifecycle statuses observed from the remote API.
///
/// The wire strings are case-sensitive; a status ending in `_IN_PROGRESS`
/// is non-terminal, everything else is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum StackStatus {
    CreateInProgress,
    CreateComplete,
    CreateFailed,
    RollbackInProgress,
    RollbackComplete,
    RollbackFailed,
    UpdateInProgress,
    UpdateComplete,
    UpdateCompleteCleanupInProgress,
    UpdateRollbackInProgress,
    UpdateRollbackFailed,
    UpdateRollbackCompleteCleanupInProgress,
    UpdateRollbackComplete,
    DeleteInProgress,
    DeleteFailed,
}

impl StackStatus {
    /// The exact wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateInProgress => "CREATE_IN_PROGRESS",
            Self::CreateComplete => "CREATE_COMPLETE",
            Self::CreateFailed => "CREATE_FAILED",
            Self::RollbackInProgress => "ROLLBACK_IN_PROGRESS",
            Self::RollbackComplete => "ROLLBACK_COMPLETE",
            Self::RollbackFailed => "ROLLBACK_FAILED",
            Self::UpdateInProgress => "UPDATE_IN_PROGRESS",
            Self::UpdateComplete => "UPDATE_COMPLETE",
            Self::UpdateCompleteCleanupInProgress => "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
            Self::UpdateRollbackInProgress => "UPDATE_ROLLBACK_IN_PROGRESS",
            Self::UpdateRollbackFailed => "UPDATE_ROLLBACK_FAILED",
            Self::UpdateRollbackCompleteCleanupInProgress => {
                "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS"
            }
            Self::UpdateRollbackComplete => "UPDATE_ROLLBACK_COMPLETE",
            Self::DeleteInProgress => "DELETE_IN_PROGRESS",
            Self::DeleteFailed => "DELETE_FAILED",
        }
    }

    /// Whether the remote workflow is still running.
    pub fn in_progress(&self) -> bool {
        self.as_str().ends_with("_IN_PROGRESS")
    }

    /// Whether no further transition happens without operator action.
    pub fn is_terminal(&self) -> bool {
        !self.in_progress()
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StackStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unrecognized stack status: {s}"))
    }
}

/// The operator-initiated action a stack operation was started with.
///
/// Replaces action-name string dispatch: the same terminal status can be a
/// success for one action and a failure for the other, so classification is
/// keyed off this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackAction {
    /// A new stack is being created
    Create,
    /// An existing stack is being updated
    Update,
}

impl StackAction {
    /// The single terminal status that counts as success for this action.
    pub fn success_status(&self) -> StackStatus {
        match self {
            Self::Create => StackStatus::CreateComplete,
            Self::Update => StackStatus::UpdateComplete,
        }
    }

    /// Lower-case verb for log and status lines.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for StackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Handle to one remote stack, with lazily-fetched cached state.
pub struct Stack {
    name: String,
    api: Rc<dyn StackApi>,
    description: Option<StackDescription>,
    events: Option<Vec<StackEvent>>,
    resources: Option<Vec<StackResource>>,
    dedup: EventDeduplicator,
}

impl Stack {
    pub(crate) fn new(name: impl Into<String>, api: Rc<dyn StackApi>) -> Self {
        Self {
            name: name.into(),
            api,
            description: None,
            events: None,
            resources: None,
            dedup: EventDeduplicator::new(),
        }
    }

    /// The stack's identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drop cached remote state so the next accessor re-fetches.
    ///
    /// The seen-event set is deliberately kept: refreshing must never cause
    /// an already-surfaced event to be re-emitted.
    pub fn refresh(&mut self) {
        self.description = None;
        self.events = None;
        self.resources = None;
    }

    /// The stack's remote description, fetched on first access.
    pub fn description(&mut self) -> Result<&StackDescription> {
        if self.description.is_none() {
            self.description = Some(self.api.describe_stack(&self.name)?);
        }
        Ok(self.description.as_ref().expect("description cached above"))
    }

    /// Current remote status.
    pub fn status(&mut self) -> Result<StackStatus> {
        Ok(self.description()?.stack_status)
    }

    /// Whether the remote workflow is still running.
    pub fn in_progress(&mut self) -> Result<bool> {
        Ok(self.status()?.in_progress())
    }

    /// Whether the stack reached the terminal success status for `action`.
    pub fn succeeded(&mut self, action: StackAction) -> Result<bool> {
        Ok(self.status()? == action.success_status())
    }

    /// Whether the stack reached a terminal status other than success.
    pub fn failed(&mut self, action: StackAction) -> Result<bool> {
        let status = self.status()?;
        Ok(status.is_terminal() && status != action.success_status())
    }

    /// Raw event history, newest first, fetched on first access.
    pub fn events(&mut self) -> Result<&[StackEvent]> {
        if self.events.is_none() {
            self.events = Some(self.api.describe_events(&self.name)?);
        }
        Ok(self.events.as_deref().unwrap_or_default())
    }

    /// Events not yet surfaced through this handle, oldest first.
    ///
    /// Each returned event is recorded in the handle's seen set and will
    /// never be returned again for the life of the handle.
    pub fn new_events(&mut self) -> Result<Vec<StackEvent>> {
        if self.events.is_none() {
            self.events = Some(self.api.describe_events(&self.name)?);
        }
        let raw = self.events.as_deref().unwrap_or_default();
        Ok(self.dedup.process_new(raw))
    }

    /// Declared outputs from the stack description.
    pub fn outputs(&mut self) -> Result<Vec<StackOutput>> {
        Ok(self.description()?.outputs.clone())
    }

    /// Provisioned resources, fetched on first access.
    pub fn resources(&mut self) -> Result<&[StackResource]> {
        if self.resources.is_none() {
            self.resources = Some(self.api.describe_resources(&self.name)?);
        }
        Ok(self.resources.as_deref().unwrap_or_default())
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
