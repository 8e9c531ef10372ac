use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::domain::moves::MoveId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AuditCategory {
    Wizard,
    Summary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AuditOutcome {
    Success,
    Rejected,
    Failed,
}

/// Who asked and under which request. Every event built from it carries
/// these fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditContext {
    pub move_id: Option<MoveId>,
    pub correlation_id: String,
    pub actor: String,
}

impl AuditContext {
    pub fn new(
        move_id: Option<MoveId>,
        correlation_id: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self { move_id, correlation_id: correlation_id.into(), actor: actor.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    pub move_id: Option<MoveId>,
    pub correlation_id: String,
    pub event_type: String,
    pub category: AuditCategory,
    pub actor: String,
    pub outcome: AuditOutcome,
    pub metadata: BTreeMap<String, String>,
}

impl AuditEvent {
    pub fn from_context(
        context: &AuditContext,
        event_type: impl Into<String>,
        category: AuditCategory,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            move_id: context.move_id.clone(),
            correlation_id: context.correlation_id.clone(),
            event_type: event_type.into(),
            category,
            actor: context.actor.clone(),
            outcome,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

pub trait AuditSink: Send + Sync {
    fn emit(&self, event: AuditEvent);
}

#[derive(Clone, Default)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditSink {
    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for InMemoryAuditSink {
    fn emit(&self, event: AuditEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::audit::{
        AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink,
    };
    use crate::domain::moves::MoveId;

    #[test]
    fn in_memory_sink_records_events_with_correlation_fields() {
        let context = AuditContext::new(Some(MoveId("move-42".to_owned())), "req-123", "summary");
        let sink = InMemoryAuditSink::default();
        sink.emit(
            AuditEvent::from_context(
                &context,
                "summary.dispatched",
                AuditCategory::Summary,
                AuditOutcome::Success,
            )
            .with_metadata("move_status", "APPROVED"),
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].correlation_id, "req-123");
        assert_eq!(events[0].move_id.as_ref().map(|id| id.0.as_str()), Some("move-42"));
        assert_eq!(events[0].metadata.get("move_status").map(String::as_str), Some("APPROVED"));
    }

    #[test]
    fn events_built_from_context_copy_its_fields() {
        let context = AuditContext::new(Some(MoveId("move-7".to_owned())), "req-7", "wizard");
        let event = AuditEvent::from_context(
            &context,
            "wizard.page_resolved",
            AuditCategory::Wizard,
            AuditOutcome::Rejected,
        );

        assert_eq!(event.move_id, context.move_id);
        assert_eq!(event.actor, "wizard");
        assert_eq!(event.correlation_id, "req-7");
        assert_eq!(event.category, AuditCategory::Wizard);
        assert!(event.metadata.is_empty());
    }

    #[test]
    fn events_serialize_only_what_the_log_carries() {
        let context = AuditContext::new(None, "req-8", "wizard");
        let event = AuditEvent::from_context(
            &context,
            "wizard.missing_context",
            AuditCategory::Wizard,
            AuditOutcome::Rejected,
        );

        let value = serde_json::to_value(&event).expect("serialize");
        let mut keys: Vec<&str> = value
            .as_object()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["actor", "category", "correlation_id", "event_type", "metadata", "move_id", "outcome"]
        );
    }
}
