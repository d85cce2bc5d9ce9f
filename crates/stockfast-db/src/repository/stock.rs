//! # Stock Repository
//!
//! Stock movements (append-only history) and stock alerts.
//!
//! Movements are never updated or deleted. Alerts are only ever
//! deactivated: on acknowledgement, or when their product is soft-deleted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockfast_core::{MovementType, StockAlert, StockMovement};

/// A movement joined with the name of whoever performed it.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MovementWithPerformer {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub movement: StockMovement,
    pub performed_by_name: String,
}

/// An active alert joined with its product's display fields.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AlertWithProduct {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub alert: StockAlert,
    pub product_name: String,
    pub product_hardware_id: String,
}

/// Repository for stock movements and alerts.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    // =========================================================================
    // Movements
    // =========================================================================

    /// Appends a movement.
    pub async fn insert_movement(
        conn: &mut SqliteConnection,
        movement: &StockMovement,
    ) -> DbResult<()> {
        debug!(
            product_id = %movement.product_id,
            movement_type = movement.movement_type.as_str(),
            quantity = movement.quantity,
            "Recording stock movement"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, product_id, type, quantity, previous_stock, new_stock,
                reason, notes, reference_id, performed_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.product_id)
        .bind(movement.movement_type)
        .bind(movement.quantity)
        .bind(movement.previous_stock)
        .bind(movement.new_stock)
        .bind(&movement.reason)
        .bind(&movement.notes)
        .bind(&movement.reference_id)
        .bind(&movement.performed_by)
        .bind(movement.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Most recent movements of a product, newest first, with performer name.
    pub async fn recent_movements(
        &self,
        product_id: &str,
        limit: u32,
    ) -> DbResult<Vec<MovementWithPerformer>> {
        let rows = sqlx::query_as::<_, MovementWithPerformer>(
            r#"
            SELECT m.id, m.product_id, m.type, m.quantity, m.previous_stock, m.new_stock,
                   m.reason, m.notes, m.reference_id, m.performed_by, m.created_at,
                   u.name AS performed_by_name
            FROM stock_movements m
            INNER JOIN users u ON u.id = m.performed_by
            WHERE m.product_id = ?1
            ORDER BY m.created_at DESC, m.rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(product_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every movement of a product, oldest first.
    pub async fn movements_for_product(&self, product_id: &str) -> DbResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, type, quantity, previous_stock, new_stock,
                   reason, notes, reference_id, performed_by, created_at
            FROM stock_movements
            WHERE product_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Counts a product's movements of one type.
    pub async fn count_movements(
        &self,
        product_id: &str,
        movement_type: MovementType,
    ) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock_movements WHERE product_id = ?1 AND type = ?2",
        )
        .bind(product_id)
        .bind(movement_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    // =========================================================================
    // Alerts
    // =========================================================================

    /// Raises an alert. Prior alerts of the product are left as they are.
    pub async fn insert_alert(conn: &mut SqliteConnection, alert: &StockAlert) -> DbResult<()> {
        debug!(
            product_id = %alert.product_id,
            alert_type = ?alert.alert_type,
            current_stock = alert.current_stock,
            "Raising stock alert"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_alerts (
                id, product_id, type, threshold, current_stock, is_active,
                acknowledged_at, acknowledged_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&alert.id)
        .bind(&alert.product_id)
        .bind(alert.alert_type)
        .bind(alert.threshold)
        .bind(alert.current_stock)
        .bind(alert.is_active)
        .bind(alert.acknowledged_at)
        .bind(&alert.acknowledged_by)
        .bind(alert.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Gets an alert by id on the given connection.
    pub async fn fetch_alert(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<StockAlert>> {
        let alert = sqlx::query_as::<_, StockAlert>(
            r#"
            SELECT id, product_id, type, threshold, current_stock, is_active,
                   acknowledged_at, acknowledged_by, created_at
            FROM stock_alerts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(alert)
    }

    /// Active alerts of one product, newest first.
    pub async fn active_alerts_for_product(&self, product_id: &str) -> DbResult<Vec<StockAlert>> {
        let alerts = sqlx::query_as::<_, StockAlert>(
            r#"
            SELECT id, product_id, type, threshold, current_stock, is_active,
                   acknowledged_at, acknowledged_by, created_at
            FROM stock_alerts
            WHERE product_id = ?1 AND is_active = 1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    /// Active alerts across the catalogue, newest first.
    pub async fn list_active_alerts(&self, limit: u32) -> DbResult<Vec<AlertWithProduct>> {
        let alerts = sqlx::query_as::<_, AlertWithProduct>(
            r#"
            SELECT a.id, a.product_id, a.type, a.threshold, a.current_stock, a.is_active,
                   a.acknowledged_at, a.acknowledged_by, a.created_at,
                   p.name AS product_name, p.hardware_id AS product_hardware_id
            FROM stock_alerts a
            INNER JOIN products p ON p.id = a.product_id
            WHERE a.is_active = 1
            ORDER BY a.created_at DESC, a.rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    /// Marks one alert as acknowledged and inactive.
    pub async fn acknowledge(
        conn: &mut SqliteConnection,
        id: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE stock_alerts
            SET is_active = 0, acknowledged_at = ?2, acknowledged_by = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(actor)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StockAlert", id));
        }
        Ok(())
    }

    /// Deactivates every active alert of a product. Returns how many changed.
    pub async fn deactivate_for_product(
        conn: &mut SqliteConnection,
        product_id: &str,
    ) -> DbResult<u64> {
        let result =
            sqlx::query("UPDATE stock_alerts SET is_active = 0 WHERE product_id = ?1 AND is_active = 1")
                .bind(product_id)
                .execute(conn)
                .await?;

        Ok(result.rows_affected())
    }
}
