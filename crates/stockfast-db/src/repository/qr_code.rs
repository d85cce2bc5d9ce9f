//! # QR Code Repository
//!
//! One QR record per product. The image is regenerated in place: the record
//! keeps its id and code string.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockfast_core::QrCode;

const QR_COLUMNS: &str =
    "id, product_id, code, image_data, image_url, is_active, generated_by, generated_at";

#[derive(Debug, Clone)]
pub struct QrCodeRepository {
    pool: SqlitePool,
}

impl QrCodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        QrCodeRepository { pool }
    }

    pub async fn insert(conn: &mut SqliteConnection, qr: &QrCode) -> DbResult<()> {
        debug!(
            product_id = %qr.product_id,
            has_image = qr.image_data.is_some(),
            "Inserting QR code"
        );

        sqlx::query(
            r#"
            INSERT INTO qr_codes (
                id, product_id, code, image_data, image_url, is_active, generated_by, generated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&qr.id)
        .bind(&qr.product_id)
        .bind(&qr.code)
        .bind(&qr.image_data)
        .bind(&qr.image_url)
        .bind(qr.is_active)
        .bind(&qr.generated_by)
        .bind(qr.generated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<QrCode>> {
        let qr = sqlx::query_as::<_, QrCode>(&format!(
            "SELECT {} FROM qr_codes WHERE id = ?1",
            QR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(qr)
    }

    pub async fn for_product(&self, product_id: &str) -> DbResult<Option<QrCode>> {
        let qr = sqlx::query_as::<_, QrCode>(&format!(
            "SELECT {} FROM qr_codes WHERE product_id = ?1",
            QR_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(qr)
    }

    /// Replaces the image of an existing record and refreshes `generated_at`.
    pub async fn replace_image(
        conn: &mut SqliteConnection,
        id: &str,
        image_data: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE qr_codes SET image_data = ?2, generated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(image_data)
                .bind(now)
                .execute(conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("QRCode", id));
        }
        Ok(())
    }

    /// Deactivates the product's QR code(s). Returns how many changed.
    pub async fn deactivate_for_product(
        conn: &mut SqliteConnection,
        product_id: &str,
    ) -> DbResult<u64> {
        let result =
            sqlx::query("UPDATE qr_codes SET is_active = 0 WHERE product_id = ?1 AND is_active = 1")
                .bind(product_id)
                .execute(conn)
                .await?;

        Ok(result.rows_affected())
    }
}
