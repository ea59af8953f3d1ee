//! Engagement Workflow Domain Types
//!
//! An audit engagement moves through two coupled lifecycles:
//!
//! - The **engagement** lifecycle: one state machine per audit job,
//!   from `draft` through `issued` and `archived`.
//! - The **procedure** sign-off lifecycle: one state machine per unit of
//!   audit work, from `not_started` through `signed_off`, with a
//!   risk-driven chain of sign-off ranks.
//!
//! # Key Concepts
//!
//! - **Engagement**: one audit job for one client, with assigned
//!   partner/manager/preparer roles and milestone timestamps.
//! - **Procedure**: one unit of audit work inside an engagement. Its risk
//!   level decides how many sign-off ranks are required before it may
//!   reach `signed_off`.
//! - **SignoffRecord**: one approval event by one role. Immutable once
//!   written; superseded (never deleted) when changes are requested or a
//!   sign-off is redone.
//! - **AuditTrailEntry**: append-only log of every attempted and
//!   committed transition, rejected attempts included.
//!
//! # Design Principles
//!
//! 1. State changes go through the workflow controllers, never through
//!    direct field writes.
//! 2. Every failure is a typed result, never a silent pass.
//! 3. Records are superseded, never mutated or deleted.

#![deny(unsafe_code)]

mod action;
mod actor;
mod engagement;
mod errors;
mod ids;
mod procedure;
mod signoff;
mod state;
mod trail;

pub use action::*;
pub use actor::*;
pub use engagement::*;
pub use errors::*;
pub use ids::*;
pub use procedure::*;
pub use signoff::*;
pub use state::*;
pub use trail::*;
