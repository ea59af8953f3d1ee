//! API request handlers

mod engagements;
mod health;
mod procedures;

pub use engagements::*;
pub use health::*;
pub use procedures::*;

use crate::error::ApiError;
use engagement_types::{Actor, ActorId, SignoffRole};
use engagement_storage::QueryWindow;
use serde::Deserialize;

/// Who is making the request, carried in action bodies.
///
/// Stands in for the identity collaborator: the daemon trusts the
/// asserted identity and role.
#[derive(Debug, Deserialize)]
pub struct ActorBody {
    pub actor_id: String,
    pub actor_role: SignoffRole,
}

impl ActorBody {
    pub fn into_actor(self) -> Actor {
        Actor {
            id: ActorId::new(self.actor_id),
            role: self.actor_role,
        }
    }
}

/// `?role=` query for listing available actions
#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: SignoffRole,
}

/// Paging query for trail reads
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl WindowQuery {
    pub fn into_window(self) -> QueryWindow {
        QueryWindow {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

pub(crate) fn parse_action<T: std::str::FromStr>(name: &str) -> Result<T, ApiError> {
    name.parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown action '{}'", name)))
}
