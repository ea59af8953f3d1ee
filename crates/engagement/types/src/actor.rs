//! The acting user, passed explicitly into every controller call

use crate::{ActorId, SignoffRole};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who is requesting an action.
///
/// Identity and role come from the identity collaborator and are trusted
/// input here. There is no ambient "current user": every controller call
/// takes the actor as an explicit parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: SignoffRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: SignoffRole) -> Self {
        Self {
            id: ActorId::new(id),
            role,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.role)
    }
}
