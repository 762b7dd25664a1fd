//! The stack orchestrator: single entry point for stack CRUD and listing.
//!
//! Owns the per-name stack-handle memo and the list cache. Mutating calls
//! (create, update, delete) are submitted exactly once; a transport failure
//! propagates with context and is never retried here, since partial
//! application is possible and a blind retry could double-apply.

use crate::api::{StackApi, StackSummary};
use crate::error::Result;
use crate::registry::ConnectionRegistry;
use crate::stack::{Stack, StackAction, StackStatus};
use formation::StackDefinition;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Every lifecycle status a listing includes when no filter is given.
///
/// Deleted stacks are deliberately absent: a default listing shows what
/// still exists or failed to go away.
pub const DEFAULT_STACK_STATUS: [StackStatus; 15] = [
    StackStatus::CreateInProgress,
    StackStatus::CreateComplete,
    StackStatus::CreateFailed,
    StackStatus::RollbackInProgress,
    StackStatus::RollbackComplete,
    StackStatus::RollbackFailed,
    StackStatus::UpdateInProgress,
    StackStatus::UpdateComplete,
    StackStatus::UpdateCompleteCleanupInProgress,
    StackStatus::UpdateRollbackInProgress,
    StackStatus::UpdateRollbackFailed,
    StackStatus::UpdateRollbackCompleteCleanupInProgress,
    StackStatus::UpdateRollbackComplete,
    StackStatus::DeleteInProgress,
    StackStatus::DeleteFailed,
];

/// Single entry point for stack CRUD, listing, and handle lookup.
pub struct StackOrchestrator {
    api: Rc<dyn StackApi>,
    stacks: HashMap<String, Stack>,
    list_cache: HashMap<u64, Vec<StackSummary>>,
}

impl StackOrchestrator {
    /// Create an orchestrator over the registry's orchestration client.
    #[must_use]
    pub fn new(registry: &ConnectionRegistry) -> Self {
        Self::with_api(registry.orchestration())
    }

    /// Create an orchestrator over any [`StackApi`] implementation.
    #[must_use]
    pub fn with_api(api: Rc<dyn StackApi>) -> Self {
        Self {
            api,
            stacks: HashMap::new(),
            list_cache: HashMap::new(),
        }
    }

    /// Submit a create or update. Returns the provider-assigned stack id.
    ///
    /// Failures propagate with the operation and stack name attached; the
    /// call is never re-issued automatically.
    pub fn submit(
        &mut self,
        action: StackAction,
        name: &str,
        definition: &StackDefinition,
    ) -> Result<String> {
        log::info!("submitting {action} of stack '{name}'");
        let stack_id = match action {
            StackAction::Create => self.api.create_stack(name, definition)?,
            StackAction::Update => self.api.update_stack(name, definition)?,
        };
        log::debug!("{action} of '{name}' accepted as {stack_id}");
        Ok(stack_id)
    }

    /// Request deletion of a stack. Never retried automatically.
    pub fn delete_stack(&mut self, name: &str) -> Result<()> {
        log::info!("submitting delete of stack '{name}'");
        self.api.delete_stack(name)
    }

    /// List stack summaries, served from the per-filter cache when possible.
    ///
    /// An empty `status_filter` falls back to [`DEFAULT_STACK_STATUS`]. The
    /// special member `"none"` requests an unfiltered listing, distinct from
    /// the empty-filter default. The cache key is derived from the filter
    /// set's content, so equivalent sets in different order share an entry;
    /// `force_refresh` evicts only that entry.
    pub fn list_stacks(
        &mut self,
        status_filter: &[String],
        force_refresh: bool,
    ) -> Result<&[StackSummary]> {
        let effective: Vec<String> = if status_filter.is_empty() {
            DEFAULT_STACK_STATUS
                .iter()
                .map(|s| s.as_str().to_string())
                .collect()
        } else {
            status_filter.to_vec()
        };
        let key = filter_key(&effective);

        if force_refresh {
            self.list_cache.remove(&key);
        }
        if !self.list_cache.contains_key(&key) {
            let unfiltered = effective.iter().any(|s| s.eq_ignore_ascii_case("none"));
            let server_filter = if unfiltered { Vec::new() } else { effective };
            let summaries = self.api.list_stacks(&server_filter)?;
            self.list_cache.insert(key, summaries);
        }
        Ok(self
            .list_cache
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// The memoized handle for a stack name, created on first request.
    pub fn stack(&mut self, name: &str) -> &mut Stack {
        let api = Rc::clone(&self.api);
        self.stacks
            .entry(name.to_string())
            .or_insert_with(|| Stack::new(name, api))
    }
}

/// Order-insensitive key over the filter set's content.
fn filter_key(statuses: &[String]) -> u64 {
    let set: BTreeSet<&str> = statuses.iter().map(String::as_str).collect();
    let mut hasher = DefaultHasher::new();
    set.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockStackApi;
    use chrono::{TimeZone, Utc};

    fn summary(name: &str, status: StackStatus) -> StackSummary {
        StackSummary {
            stack_id: format!("stk-{name}"),
            stack_name: name.to_string(),
            stack_status: status,
            creation_time: Utc.with_ymd_and_hms(2014, 3, 1, 12, 0, 0).unwrap(),
            last_updated_time: None,
            template_description: None,
        }
    }

    fn orchestrator_with_mock() -> (Rc<MockStackApi>, StackOrchestrator) {
        let api = Rc::new(MockStackApi::default());
        api.add_summary(summary("web", StackStatus::CreateComplete));
        api.add_summary(summary("db", StackStatus::UpdateComplete));
        let orchestrator = StackOrchestrator::with_api(Rc::clone(&api) as Rc<dyn StackApi>);
        (api, orchestrator)
    }

    fn filter(statuses: &[&str]) -> Vec<String> {
        statuses.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_list_is_cached_per_filter() {
        let (api, mut orchestrator) = orchestrator_with_mock();
        let statuses = filter(&["CREATE_COMPLETE"]);

        orchestrator.list_stacks(&statuses, false).unwrap();
        orchestrator.list_stacks(&statuses, false).unwrap();
        assert_eq!(api.list_calls.get(), 1);

        orchestrator.list_stacks(&statuses, true).unwrap();
        assert_eq!(api.list_calls.get(), 2);
    }

    #[test]
    fn test_equivalent_filter_sets_share_a_cache_entry() {
        let (api, mut orchestrator) = orchestrator_with_mock();

        orchestrator
            .list_stacks(&filter(&["CREATE_COMPLETE", "UPDATE_COMPLETE"]), false)
            .unwrap();
        orchestrator
            .list_stacks(&filter(&["UPDATE_COMPLETE", "CREATE_COMPLETE"]), false)
            .unwrap();
        assert_eq!(api.list_calls.get(), 1);
    }

    #[test]
    fn test_force_refresh_evicts_only_that_entry() {
        let (api, mut orchestrator) = orchestrator_with_mock();
        let first = filter(&["CREATE_COMPLETE"]);
        let second = filter(&["UPDATE_COMPLETE"]);

        orchestrator.list_stacks(&first, false).unwrap();
        orchestrator.list_stacks(&second, false).unwrap();
        assert_eq!(api.list_calls.get(), 2);

        orchestrator.list_stacks(&first, true).unwrap();
        assert_eq!(api.list_calls.get(), 3);
        // The other entry is still served from cache
        orchestrator.list_stacks(&second, false).unwrap();
        assert_eq!(api.list_calls.get(), 3);
    }

    #[test]
    fn test_empty_filter_falls_back_to_default_statuses() {
        let (api, mut orchestrator) = orchestrator_with_mock();
        orchestrator.list_stacks(&[], false).unwrap();

        let filters = api.list_filters.borrow();
        assert_eq!(filters[0].len(), DEFAULT_STACK_STATUS.len());
        assert!(filters[0].contains(&"ROLLBACK_FAILED".to_string()));
    }

    #[test]
    fn test_none_filter_requests_unfiltered_listing() {
        let (api, mut orchestrator) = orchestrator_with_mock();
        let all = orchestrator.list_stacks(&filter(&["none"]), false).unwrap();
        assert_eq!(all.len(), 2);

        let filters = api.list_filters.borrow();
        assert!(filters[0].is_empty());
    }

    #[test]
    fn test_none_is_distinct_from_empty_filter() {
        let (api, mut orchestrator) = orchestrator_with_mock();
        orchestrator.list_stacks(&filter(&["none"]), false).unwrap();
        orchestrator.list_stacks(&[], false).unwrap();
        // Different cache keys, two underlying calls
        assert_eq!(api.list_calls.get(), 2);
    }

    #[test]
    fn test_stack_handles_are_memoized() {
        let (_, mut orchestrator) = orchestrator_with_mock();

        let first = std::ptr::from_ref(orchestrator.stack("web")) as usize;
        let again = std::ptr::from_ref(orchestrator.stack("web")) as usize;
        let other = std::ptr::from_ref(orchestrator.stack("db")) as usize;

        assert_eq!(first, again);
        assert_ne!(first, other);
    }

    #[test]
    fn test_submit_dispatches_on_action() {
        let (api, mut orchestrator) = orchestrator_with_mock();
        let definition = StackDefinition {
            template_body: "{}".to_string(),
            parameters: Vec::new(),
            capabilities: Vec::new(),
            notification_targets: Vec::new(),
            disable_rollback: false,
            timeout_in_minutes: None,
        };

        let id = orchestrator
            .submit(StackAction::Create, "web", &definition)
            .unwrap();
        assert_eq!(id, "stk-web");
        orchestrator
            .submit(StackAction::Update, "web", &definition)
            .unwrap();

        let submissions = api.submissions.borrow();
        assert_eq!(
            *submissions,
            vec![
                ("create".to_string(), "web".to_string()),
                ("update".to_string(), "web".to_string()),
            ]
        );
    }
}
