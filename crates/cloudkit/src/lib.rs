//! # cloudkit
//!
//! Remote-side toolkit for cloud stack orchestration.
//!
//! This crate provides functionality for:
//! - Talking to the stack orchestration API over blocking HTTP
//! - Memoizing one client handle per logical service (compute, orchestration)
//! - Caching stack handles and stack listings per orchestrator instance
//! - Classifying terminal stack states and polling events to completion
//!
//! ## Example
//!
//! ```no_run
//! use cloudkit::{ConnectionRegistry, Credentials, StackAction, StackOrchestrator};
//!
//! let registry = ConnectionRegistry::new(Credentials {
//!     access_key_id: "AKID".to_string(),
//!     secret_key: "secret".to_string(),
//!     region: "us-east-1".to_string(),
//! });
//! let mut orchestrator = StackOrchestrator::new(&registry);
//!
//! for summary in orchestrator.list_stacks(&[], false).unwrap() {
//!     println!("{}: {}", summary.stack_name, summary.stack_status);
//! }
//! ```
//!
//! ## Caching
//!
//! All caches are in-memory and scoped to one orchestrator instance: the
//! stack-handle memo, the list cache (keyed by status-filter content), and
//! each handle's seen-event set. Nothing is persisted across invocations.
//!
//! Mutating calls (create, update, delete) are never retried automatically;
//! read-only calls are naturally re-issued by the next poll tick.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod registry;
pub mod stack;

pub use api::{
    ComputeApi, Instance, StackApi, StackDescription, StackEvent, StackOutput, StackResource,
    StackSummary,
};
pub use error::{Error, Result};
pub use events::{DEFAULT_EVENT_ATTRIBUTES, EventDeduplicator, Poller};
pub use orchestrator::{DEFAULT_STACK_STATUS, StackOrchestrator};
pub use registry::{ClientHandle, ConnectionRegistry, Credentials, ServiceKind};
pub use stack::{Stack, StackAction, StackStatus};
