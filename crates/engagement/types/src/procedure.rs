//! Procedures: units of audit work with risk-driven sign-off chains

use crate::{
    EngagementId, ProcedureId, ProcedureState, RiskLevel, SignoffRecord, SignoffRole,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic digest of normalized procedure content.
///
/// Captured on every sign-off record so that edits made after a signature
/// are detectable. Comparison is plain equality of the hex digest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentFingerprint(pub String);

impl ContentFingerprint {
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of audit work within an engagement.
///
/// Created in `NotStarted` and mutated only through the procedure
/// workflow controller; direct field writes bypassing the controller
/// violate the lifecycle contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Procedure {
    pub id: ProcedureId,
    /// The owning engagement
    pub engagement_id: EngagementId,
    pub title: String,
    /// Assessed risk, drives the required sign-off chain length
    pub risk: RiskLevel,
    /// Workpaper content blob
    pub content: String,
    /// Fingerprint of `content` as of the last controlled update
    pub fingerprint: ContentFingerprint,
    pub state: ProcedureState,
    /// All sign-off records, superseded rounds included
    pub signoffs: Vec<SignoffRecord>,
    /// Optimistic-concurrency version counter
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Procedure {
    pub fn new(engagement_id: EngagementId, title: impl Into<String>, risk: RiskLevel) -> Self {
        let now = Utc::now();
        Self {
            id: ProcedureId::generate(),
            engagement_id,
            title: title.into(),
            risk,
            content: String::new(),
            fingerprint: ContentFingerprint::default(),
            state: ProcedureState::NotStarted,
            signoffs: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: ProcedureId) -> Self {
        self.id = id;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>, fingerprint: ContentFingerprint) -> Self {
        self.content = content.into();
        self.fingerprint = fingerprint;
        self
    }

    /// Sign-off records still counting toward the chain
    pub fn active_signoffs(&self) -> impl Iterator<Item = &SignoffRecord> {
        self.signoffs.iter().filter(|r| r.is_active())
    }

    /// Whether an active record fills the given rank
    pub fn has_active_signoff(&self, role: SignoffRole) -> bool {
        self.active_signoffs().any(|r| r.role == role)
    }

    /// Mark every active record at or above `rank` as superseded.
    ///
    /// Used when a stale rank is redone. Records are flagged, never
    /// removed: the history stays intact.
    pub fn supersede_at_or_above(&mut self, rank: SignoffRole) {
        for record in &mut self.signoffs {
            if record.is_active() && record.role >= rank {
                record.superseded = true;
            }
        }
    }

    /// Mark every active record strictly above `rank` as superseded.
    ///
    /// Requesting changes invalidates the sign-offs above the requesting
    /// reviewer; the requester's own record and those below it stand.
    pub fn supersede_above(&mut self, rank: SignoffRole) {
        for record in &mut self.signoffs {
            if record.is_active() && record.role > rank {
                record.superseded = true;
            }
        }
    }
}
