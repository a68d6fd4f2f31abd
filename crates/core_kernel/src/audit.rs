//! Audit event port
//!
//! Business operations emit audit events to an external sink. The sink must
//! never block or fail the operation that produced the event: implementations
//! swallow their own errors and at most log them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identifiers::UserId;

/// The kind of change an audit event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Close,
}

/// A single audit trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Acting user, when known
    pub user_id: Option<UserId>,
    pub action: AuditAction,
    /// Entity kind, e.g. `sales_invoice`
    pub entity_type: String,
    /// Primary key of the affected entity, when one exists
    pub entity_id: Option<Uuid>,
    /// Free-form JSON context
    pub payload: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(action: AuditAction, entity_type: impl Into<String>) -> Self {
        Self {
            user_id: None,
            action,
            entity_type: entity_type.into(),
            entity_id: None,
            payload: None,
        }
    }

    pub fn by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn entity(mut self, id: impl Into<Uuid>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Destination for audit events.
///
/// `record` is infallible by contract: a sink that cannot persist an event
/// logs the failure and returns normally.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}

/// A sink that drops every event. Useful as a default and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _event: AuditEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_builder() {
        let user = UserId::new();
        let entity = Uuid::new_v4();
        let event = AuditEvent::new(AuditAction::Create, "sales_invoice")
            .by(user)
            .entity(entity)
            .payload(json!({ "total": "95.00" }));

        assert_eq!(event.user_id, Some(user));
        assert_eq!(event.entity_id, Some(entity));
        assert_eq!(event.entity_type, "sales_invoice");
    }

    #[tokio::test]
    async fn test_noop_sink_accepts_events() {
        NoopAuditSink
            .record(AuditEvent::new(AuditAction::Update, "expense"))
            .await;
    }
}
