//! Event deduplication, display projection, and the polling loop.
//!
//! Remote event listings arrive newest first. The deduplicator reverses them
//! to chronological order and drops anything already surfaced, so a polling
//! loop never reprints an event. The poller is a blocking wait-and-retry
//! cycle with a bounded, non-zero interval between ticks.

use crate::api::StackEvent;
use crate::error::Result;
use crate::stack::{Stack, StackStatus};
use std::collections::HashSet;
use std::thread;
use std::time::Duration;

/// Display attributes shown for events when none are configured.
pub const DEFAULT_EVENT_ATTRIBUTES: [&str; 5] = [
    "Timestamp",
    "LogicalResourceId",
    "ResourceType",
    "ResourceStatus",
    "ResourceStatusReason",
];

/// Tracks which event identifiers have already been surfaced.
///
/// The seen set is append-only: once recorded, an identifier is never
/// emitted again for the life of this deduplicator.
#[derive(Debug, Default)]
pub struct EventDeduplicator {
    seen: HashSet<String>,
}

impl EventDeduplicator {
    /// Create an empty deduplicator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter a newest-first event listing down to unseen events,
    /// returned oldest first.
    pub fn process_new(&mut self, raw: &[StackEvent]) -> Vec<StackEvent> {
        let mut fresh = Vec::new();
        for event in raw.iter().rev() {
            if self.seen.insert(event.event_id.clone()) {
                fresh.push(event.clone());
            }
        }
        fresh
    }
}

/// Split a CamelCase attribute name into spaced words for column titles.
pub fn humanize(attribute: &str) -> String {
    let mut out = String::with_capacity(attribute.len() + 4);
    let mut prev_lower = false;
    for c in attribute.chars() {
        if c.is_uppercase() && prev_lower {
            out.push(' ');
        }
        prev_lower = c.is_lowercase();
        out.push(c);
    }
    out
}

/// Column titles for the requested display attributes.
pub fn titles(attributes: &[String]) -> Vec<String> {
    attributes.iter().map(|a| humanize(a)).collect()
}

/// Project events onto the requested display attributes, one row per event.
pub fn event_rows(events: &[StackEvent], attributes: &[String]) -> Vec<Vec<String>> {
    events
        .iter()
        .map(|event| {
            attributes
                .iter()
                .map(|attribute| event.attribute(attribute).unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Consecutive failed ticks tolerated before the poll loop gives up.
const MAX_TICK_FAILURES: u32 = 5;

/// Blocking poll loop over a stack's events until a terminal state.
///
/// The loop sleeps between ticks and is interruptible between them: an
/// operator interrupt ends the process while the remote operation continues
/// server-side. Read failures are re-issued by the next tick; only a run of
/// consecutive failures aborts the loop.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
}

impl Poller {
    /// Interval used when none is configured.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

    /// Create a poller. A zero interval is raised to one second so the
    /// loop never hammers the remote API.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            Duration::from_secs(1)
        } else {
            interval
        };
        Self { interval }
    }

    /// Poll until the stack reaches a terminal status.
    ///
    /// `on_events` receives each batch of not-yet-surfaced events in
    /// chronological order. Returns the terminal status for the caller's
    /// success/failure branch.
    pub fn poll<F>(&self, stack: &mut Stack, mut on_events: F) -> Result<StackStatus>
    where
        F: FnMut(&[StackEvent]),
    {
        let mut failures = 0u32;
        loop {
            stack.refresh();
            match Self::tick(stack) {
                Ok((events, status)) => {
                    failures = 0;
                    if !events.is_empty() {
                        on_events(&events);
                    }
                    if status.is_terminal() {
                        return Ok(status);
                    }
                }
                Err(error) => {
                    failures += 1;
                    if failures >= MAX_TICK_FAILURES {
                        return Err(error);
                    }
                    log::warn!("poll tick failed ({error}); retrying on the next tick");
                }
            }
            thread::sleep(self.interval);
        }
    }

    fn tick(stack: &mut Stack) -> Result<(Vec<StackEvent>, StackStatus)> {
        let events = stack.new_events()?;
        let status = stack.status()?;
        Ok((events, status))
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockStackApi, StackApi};
    use chrono::{TimeZone, Utc};
    use std::rc::Rc;

    fn event(id: &str, resource: &str) -> StackEvent {
        StackEvent {
            event_id: id.to_string(),
            stack_id: "stk-web".to_string(),
            stack_name: "web".to_string(),
            logical_resource_id: resource.to_string(),
            physical_resource_id: None,
            resource_type: "Stratus::Compute::Instance".to_string(),
            resource_status: "CREATE_IN_PROGRESS".to_string(),
            resource_status_reason: None,
            timestamp: Utc.with_ymd_and_hms(2014, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_dedup_reverses_to_chronological_order() {
        let mut dedup = EventDeduplicator::new();
        let raw = vec![event("e3", "c"), event("e2", "b"), event("e1", "a")];

        let fresh = dedup.process_new(&raw);
        let ids: Vec<&str> = fresh.iter().map(|e| e.event_id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2", "e3"]);
    }

    #[test]
    fn test_dedup_never_reemits() {
        let mut dedup = EventDeduplicator::new();
        let raw = vec![event("e2", "b"), event("e1", "a")];

        assert_eq!(dedup.process_new(&raw).len(), 2);
        assert!(dedup.process_new(&raw).is_empty());

        // A longer listing only yields the new tail
        let raw = vec![event("e3", "c"), event("e2", "b"), event("e1", "a")];
        let fresh = dedup.process_new(&raw);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].event_id, "e3");
    }

    #[test]
    fn test_humanize_titles() {
        assert_eq!(humanize("StackName"), "Stack Name");
        assert_eq!(humanize("ResourceStatusReason"), "Resource Status Reason");
        assert_eq!(humanize("Timestamp"), "Timestamp");
    }

    #[test]
    fn test_event_rows_project_requested_attributes() {
        let attributes = vec!["LogicalResourceId".to_string(), "ResourceStatus".to_string()];
        let rows = event_rows(&[event("e1", "Database")], &attributes);
        assert_eq!(rows, vec![vec!["Database".to_string(), "CREATE_IN_PROGRESS".to_string()]]);
    }

    #[test]
    fn test_poll_runs_until_terminal() {
        let api = Rc::new(MockStackApi::default());
        api.push_status("web", StackStatus::CreateInProgress);
        api.push_status("web", StackStatus::CreateInProgress);
        api.push_status("web", StackStatus::CreateComplete);
        api.set_events("web", vec![event("e2", "b"), event("e1", "a")]);

        let mut orchestrator =
            crate::orchestrator::StackOrchestrator::with_api(Rc::clone(&api) as Rc<dyn StackApi>);
        let stack = orchestrator.stack("web");

        let mut batches = 0;
        let mut total = 0;
        let status = Poller::new(Duration::from_millis(1))
            .poll(stack, |events| {
                batches += 1;
                total += events.len();
            })
            .unwrap();

        assert_eq!(status, StackStatus::CreateComplete);
        // Same raw events every tick, surfaced exactly once
        assert_eq!(batches, 1);
        assert_eq!(total, 2);
        assert_eq!(api.describe_calls.get(), 3);
    }
}
