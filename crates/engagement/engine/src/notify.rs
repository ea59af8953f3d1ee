//! Notification collaborator: informed after a commit, fire-and-forget
//!
//! Delivery is outside the transition's atomicity: a failed or slow
//! notification never rolls back a committed transition.

use engagement_types::{ActorId, Lifecycle};

/// What happened, handed to the notifier after a successful commit
#[derive(Clone, Debug)]
pub struct TransitionEvent {
    pub lifecycle: Lifecycle,
    pub entity_id: String,
    pub action: String,
    pub new_state: String,
    pub actor: ActorId,
}

/// Downstream communication channel for committed transitions
pub trait Notifier: Send + Sync {
    fn transition_committed(&self, event: &TransitionEvent);
}

/// Discards every event
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn transition_committed(&self, _event: &TransitionEvent) {}
}

/// Emits each event as a structured log line
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn transition_committed(&self, event: &TransitionEvent) {
        tracing::info!(
            lifecycle = %event.lifecycle,
            entity = %event.entity_id,
            action = %event.action,
            new_state = %event.new_state,
            actor = %event.actor,
            "transition notification"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording(Mutex<Vec<String>>);

    impl Notifier for Recording {
        fn transition_committed(&self, event: &TransitionEvent) {
            self.0
                .lock()
                .expect("notifier lock")
                .push(format!("{}:{}", event.entity_id, event.action));
        }
    }

    #[test]
    fn custom_notifiers_receive_events() {
        let recorder = Recording(Mutex::new(Vec::new()));
        recorder.transition_committed(&TransitionEvent {
            lifecycle: Lifecycle::Engagement,
            entity_id: "eng-1".into(),
            action: "issue_report".into(),
            new_state: "issued".into(),
            actor: ActorId::new("partner-1"),
        });
        assert_eq!(recorder.0.lock().unwrap().as_slice(), ["eng-1:issue_report"]);
    }
}
