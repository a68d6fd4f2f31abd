//! Repository implementations for domain entities
//!
//! Each repository mirrors one domain module's operations transactionally:
//! the validations and orderings of the in-memory aggregates, executed
//! against PostgreSQL with row locks where a check precedes a write.

use core_kernel::{AuditAction, AuditEvent, UserId};
use uuid::Uuid;

pub mod fiscal;
pub mod inventory;
pub mod purchasing;
pub mod sales;
pub mod treasury;

pub use fiscal::FiscalRepository;
pub use inventory::{FifoConsumption, FifoDraw, InventoryRepository};
pub use purchasing::PurchasingRepository;
pub use sales::SalesRepository;
pub use treasury::TreasuryRepository;

/// Builds the audit entry for a committed write.
pub(crate) fn audit_event(
    action: AuditAction,
    entity_type: &str,
    entity_id: Uuid,
    user: Option<UserId>,
    payload: serde_json::Value,
) -> AuditEvent {
    let mut event = AuditEvent::new(action, entity_type)
        .entity(entity_id)
        .payload(payload);
    if let Some(user) = user {
        event = event.by(user);
    }
    event
}
