//! Postgres audit sink
//!
//! Persists audit events outside the business transaction. A failed insert
//! must never fail the operation that produced the event, so errors are
//! logged and swallowed here.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{AuditAction, AuditEvent, AuditSink};

#[derive(Debug, Clone)]
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn action_str(action: AuditAction) -> &'static str {
    match action {
        AuditAction::Create => "CREATE",
        AuditAction::Update => "UPDATE",
        AuditAction::Delete => "DELETE",
        AuditAction::Close => "CLOSE",
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, event: AuditEvent) {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_events (id, user_id, action, entity_type, entity_id, payload)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(event.user_id.map(Uuid::from))
        .bind(action_str(event.action))
        .bind(&event.entity_type)
        .bind(event.entity_id)
        .bind(&event.payload)
        .execute(&self.pool)
        .await;

        if let Err(err) = result {
            tracing::warn!(
                entity_type = %event.entity_type,
                error = %err,
                "failed to persist audit event"
            );
        }
    }
}
