//! Engagement Workflow Engine
//!
//! The rules by which an engagement or a procedure may change state, and
//! who may cause that change. The engine is invoked by many concurrent
//! callers against the same entity and never blocks: every operation
//! succeeds immediately, fails immediately with a typed reason, or is
//! rejected as stale and retried by the caller.
//!
//! # Components
//!
//! - [`transitions`]: static tables of legal `(state, action)` edges for
//!   both lifecycles.
//! - [`guards`]: pure precondition predicates that collect every blocker
//!   instead of failing fast, and fail closed on missing data.
//! - [`roles`]: the sign-off hierarchy, risk-driven chain lengths, and
//!   per-action initiation allow-lists.
//! - [`integrity`]: content fingerprinting and post-signature edit
//!   detection.
//! - [`controller`]: the two workflow controllers that orchestrate
//!   validation and atomic, version-checked commits.
//! - [`progress`]: percentage and next-step reporting for dashboards.

#![deny(unsafe_code)]

pub mod controller;
pub mod guards;
pub mod integrity;
pub mod notify;
pub mod progress;
pub mod roles;
pub mod transitions;

pub use controller::{ActionCheck, EngagementController, ProcedureController};
pub use guards::{Guard, GuardOutcome, GuardResult, GuardSet};
pub use notify::{Notifier, NoopNotifier, TracingNotifier, TransitionEvent};
