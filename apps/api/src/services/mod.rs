//! Service layer.
//!
//! Each service owns one area of the API and runs its writes inside a
//! single database transaction. Handlers in [`crate::routes`] only parse
//! input and shape envelopes.

pub mod auth_service;
pub mod dashboard_service;
pub mod product_service;
pub mod stock_service;

use chrono::{DateTime, Utc};
use stockfast_core::stock::{AlertDecision, MovementClassification};
use stockfast_core::{AuditAction, AuditLog, StockAlert, StockMovement, PRODUCT_ENTITY};
use uuid::Uuid;

use crate::auth::CurrentUser;

pub use auth_service::AuthService;
pub use dashboard_service::DashboardService;
pub use product_service::ProductService;
pub use stock_service::StockService;

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Optional text columns of a new movement.
#[derive(Debug, Default)]
pub(crate) struct MovementNote {
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub reference_id: Option<String>,
}

pub(crate) fn movement_row(
    product_id: &str,
    previous_stock: i64,
    new_stock: i64,
    classification: MovementClassification,
    note: MovementNote,
    actor: &CurrentUser,
    now: DateTime<Utc>,
) -> StockMovement {
    StockMovement {
        id: new_id(),
        product_id: product_id.to_string(),
        movement_type: classification.movement_type,
        quantity: classification.quantity,
        previous_stock,
        new_stock,
        reason: note.reason,
        notes: note.notes,
        reference_id: note.reference_id,
        performed_by: actor.id.clone(),
        created_at: now,
    }
}

pub(crate) fn alert_row(product_id: &str, decision: AlertDecision, now: DateTime<Utc>) -> StockAlert {
    StockAlert {
        id: new_id(),
        product_id: product_id.to_string(),
        alert_type: decision.alert_type,
        threshold: decision.threshold,
        current_stock: decision.current_stock,
        is_active: true,
        acknowledged_at: None,
        acknowledged_by: None,
        created_at: now,
    }
}

pub(crate) fn product_audit(
    actor: &CurrentUser,
    action: AuditAction,
    product_id: &str,
    changes: serde_json::Value,
    now: DateTime<Utc>,
) -> AuditLog {
    AuditLog {
        id: new_id(),
        user_id: actor.id.clone(),
        action,
        entity: PRODUCT_ENTITY.to_string(),
        entity_id: product_id.to_string(),
        changes,
        created_at: now,
    }
}
