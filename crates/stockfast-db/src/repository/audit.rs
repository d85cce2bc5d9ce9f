//! # Audit Repository
//!
//! Insert-only log of product mutations. `changes` is stored as JSON text.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockfast_core::{AuditAction, AuditLog};

#[derive(Debug, FromRow)]
struct AuditRow {
    id: String,
    user_id: String,
    action: AuditAction,
    entity: String,
    entity_id: String,
    changes: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditLog {
    type Error = DbError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let changes = serde_json::from_str(&row.changes).map_err(|e| DbError::Decode {
            column: "audit_logs.changes".to_string(),
            reason: e.to_string(),
        })?;

        Ok(AuditLog {
            id: row.id,
            user_id: row.user_id,
            action: row.action,
            entity: row.entity,
            entity_id: row.entity_id,
            changes,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    pub async fn insert(conn: &mut SqliteConnection, entry: &AuditLog) -> DbResult<()> {
        debug!(
            action = ?entry.action,
            entity = %entry.entity,
            entity_id = %entry.entity_id,
            "Writing audit entry"
        );

        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, user_id, action, entity, entity_id, changes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(entry.action)
        .bind(&entry.entity)
        .bind(&entry.entity_id)
        .bind(entry.changes.to_string())
        .bind(entry.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// History of one entity, oldest first.
    pub async fn for_entity(&self, entity: &str, entity_id: &str) -> DbResult<Vec<AuditLog>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, user_id, action, entity, entity_id, changes, created_at
            FROM audit_logs
            WHERE entity = ?1 AND entity_id = ?2
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(entity)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AuditLog::try_from).collect()
    }
}
