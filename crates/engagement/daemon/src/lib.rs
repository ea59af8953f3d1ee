//! Engagement workflow daemon
//!
//! Thin REST surface over the workflow engine. All domain rules live in
//! `engagement-engine`; the daemon translates HTTP to controller calls
//! and maps the error taxonomy onto status codes.

#![deny(unsafe_code)]

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult, DaemonError, DaemonResult};
pub use router::create_router;
pub use state::AppState;
