//! Content integrity: detecting edits made after a sign-off
//!
//! Every sign-off record captures a fingerprint of the procedure content
//! at signature time. Before the next signature lands, and before the
//! transition into `signed_off`, the current content is re-fingerprinted
//! and compared against every active record. A mismatch means someone
//! edited the workpaper after it was signed; the record stays in history
//! and the stale rank must be redone.

use engagement_types::{ContentFingerprint, Procedure, SignoffRole};

/// Fingerprint content: blake3 over normalized bytes.
///
/// Normalization makes the digest stable across line-ending and trailing
/// whitespace churn: CRLF becomes LF, trailing whitespace per line is
/// stripped, and trailing blank lines are dropped.
pub fn fingerprint(content: &str) -> ContentFingerprint {
    let normalized = normalize(content);
    ContentFingerprint::new(blake3::hash(normalized.as_bytes()).to_hex().to_string())
}

fn normalize(content: &str) -> String {
    let mut normalized = content
        .replace("\r\n", "\n")
        .split('\n')
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    while normalized.ends_with('\n') {
        normalized.pop();
    }
    normalized
}

/// Whether every active sign-off record still matches current content.
///
/// `false` as soon as *any* active record's captured fingerprint differs
/// from the recomputed one.
pub fn validate(procedure: &Procedure) -> bool {
    let current = fingerprint(&procedure.content);
    procedure
        .active_signoffs()
        .all(|record| record.fingerprint == current)
}

/// Ranks whose active record no longer matches current content,
/// ascending. The lowest stale rank is the one that must be redone first.
pub fn stale_ranks(procedure: &Procedure) -> Vec<SignoffRole> {
    let current = fingerprint(&procedure.content);
    let mut ranks = procedure
        .active_signoffs()
        .filter(|record| record.fingerprint != current)
        .map(|record| record.role)
        .collect::<Vec<_>>();
    ranks.sort();
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use engagement_types::{ActorId, EngagementId, RiskLevel, SignoffRecord};
    use proptest::prelude::*;

    fn procedure_with_content(content: &str) -> Procedure {
        let fp = fingerprint(content);
        Procedure::new(EngagementId::new("eng-1"), "Cash testing", RiskLevel::Low)
            .with_content(content, fp)
    }

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(fingerprint("abc"), fingerprint("abc"));
        assert_ne!(fingerprint("abc"), fingerprint("abd"));
    }

    #[test]
    fn normalization_ignores_line_endings_and_trailing_whitespace() {
        assert_eq!(fingerprint("a\r\nb\r\n"), fingerprint("a\nb"));
        assert_eq!(fingerprint("a  \nb\n\n\n"), fingerprint("a\nb"));
        assert_ne!(fingerprint("a\nb"), fingerprint("a\n b"));
    }

    #[test]
    fn validate_passes_with_no_signoffs() {
        let proc = procedure_with_content("tested 25 of 25 items");
        assert!(validate(&proc));
    }

    #[test]
    fn edit_after_signoff_is_detected() {
        let mut proc = procedure_with_content("tested 25 of 25 items");
        proc.signoffs.push(SignoffRecord::new(
            SignoffRole::Preparer,
            ActorId::new("prep-1"),
            fingerprint(&proc.content),
        ));
        assert!(validate(&proc));

        proc.content = "tested 20 of 25 items".to_string();
        assert!(!validate(&proc));
        assert_eq!(stale_ranks(&proc), vec![SignoffRole::Preparer]);
    }

    #[test]
    fn superseded_records_do_not_count_as_stale() {
        let mut proc = procedure_with_content("v2");
        let mut old = SignoffRecord::new(
            SignoffRole::Preparer,
            ActorId::new("prep-1"),
            fingerprint("v1"),
        );
        old.superseded = true;
        proc.signoffs.push(old);
        proc.signoffs.push(SignoffRecord::new(
            SignoffRole::Preparer,
            ActorId::new("prep-1"),
            fingerprint("v2"),
        ));

        assert!(validate(&proc));
        assert!(stale_ranks(&proc).is_empty());
    }

    proptest! {
        #[test]
        fn fingerprint_invariant_under_crlf(content in "[ -~\n]{0,200}") {
            let crlf = content.replace('\n', "\r\n");
            prop_assert_eq!(fingerprint(&content), fingerprint(&crlf));
        }

        #[test]
        fn fingerprint_invariant_under_trailing_newlines(content in "[ -~\n]{0,200}") {
            let padded = format!("{}\n\n", content);
            prop_assert_eq!(fingerprint(&content), fingerprint(&padded));
        }
    }
}
