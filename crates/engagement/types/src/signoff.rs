//! Sign-off roles, risk levels, and sign-off records

use crate::{ActorId, ContentFingerprint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Assessed risk of a procedure. Drives the required sign-off depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        write!(f, "{}", name)
    }
}

/// Sign-off roles, declared in ascending hierarchy order.
///
/// The derived `Ord` follows declaration order, so
/// `Preparer < Reviewer < SeniorReviewer < Manager < Partner`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SignoffRole {
    Preparer,
    Reviewer,
    SeniorReviewer,
    Manager,
    Partner,
}

impl fmt::Display for SignoffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignoffRole::Preparer => "preparer",
            SignoffRole::Reviewer => "reviewer",
            SignoffRole::SeniorReviewer => "senior_reviewer",
            SignoffRole::Manager => "manager",
            SignoffRole::Partner => "partner",
        };
        write!(f, "{}", name)
    }
}

/// One approval event by one role on one procedure.
///
/// Records are immutable once written. A later content edit does not
/// delete the record; the integrity verifier reports the mismatch and the
/// record is superseded when the rank is redone.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignoffRecord {
    /// The rank this record fills
    pub role: SignoffRole,
    /// Who signed
    pub actor: ActorId,
    /// When the signature was recorded
    pub signed_at: DateTime<Utc>,
    /// Fingerprint of the procedure content at signature time
    pub fingerprint: ContentFingerprint,
    /// Optional reviewer comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Set when a later round replaced this record. Superseded records
    /// stay in history and no longer count toward the chain.
    #[serde(default)]
    pub superseded: bool,
}

impl SignoffRecord {
    pub fn new(role: SignoffRole, actor: ActorId, fingerprint: ContentFingerprint) -> Self {
        Self {
            role,
            actor,
            signed_at: Utc::now(),
            fingerprint,
            comment: None,
            superseded: false,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// A record counts toward the chain only while not superseded
    pub fn is_active(&self) -> bool {
        !self.superseded
    }
}
