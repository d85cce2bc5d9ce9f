//! Stock adjustments, sales and alert handling.
//!
//! ## Adjustment Flow
//! ```text
//! adjust_stock(product, newStock)
//!      │
//!      ├── BEGIN
//!      ├── read product            ──► 404 if missing
//!      ├── newStock < 0            ──► 400 fieldErrors.newStock
//!      ├── UPDATE products.available_stock
//!      ├── INSERT stock_movements  (ADJUSTMENT, |Δ|)
//!      ├── INSERT stock_alerts     (only at 0 or ≤ min)
//!      ├── INSERT audit_logs       (ADJUST_STOCK)
//!      └── COMMIT
//! ```
//! Dropping the transaction on any `?` rolls everything back.

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use stockfast_core::stock::{alert_for_level, classify_movement, MovementIntent};
use stockfast_core::validation::validate_stock_adjustment;
use stockfast_core::{
    AuditAction, CoreError, Product, Sale, StockAlert, StockMovement, ValidationError,
};
use stockfast_db::{
    AlertWithProduct, AuditRepository, Database, ProductRepository, SaleRepository,
    StockRepository,
};

use super::{alert_row, movement_row, new_id, product_audit, MovementNote};
use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;

const DEFAULT_ADJUSTMENT_REASON: &str = "Manual adjustment";
const SALE_REASON: &str = "Sale";

/// Outcome of a manual stock adjustment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub product: Product,
    pub movement: StockMovement,
    pub alert: Option<StockAlert>,
    pub previous_stock: i64,
    pub new_stock: i64,
}

impl StockAdjustment {
    pub fn message(&self) -> String {
        format!(
            "Stock adjusted from {} to {}",
            self.previous_stock, self.new_stock
        )
    }
}

/// Outcome of a recorded sale.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub sale: Sale,
    pub product: Product,
    pub movement: StockMovement,
    pub alert: Option<StockAlert>,
}

/// Stock-changing workflows.
pub struct StockService {
    state: AppState,
}

impl StockService {
    pub fn new(state: AppState) -> Self {
        StockService { state }
    }

    /// Sets a product's stock to an absolute level.
    pub async fn adjust_stock(
        &self,
        product_id: &str,
        new_stock: i64,
        reason: Option<String>,
        notes: Option<String>,
        actor: &CurrentUser,
    ) -> ApiResult<StockAdjustment> {
        let mut tx = self.state.db.begin().await?;

        let product = ProductRepository::fetch(&mut tx, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let new_stock = validate_stock_adjustment(new_stock)?;

        let now = Utc::now();
        let previous_stock = product.available_stock;
        let reason = reason.unwrap_or_else(|| DEFAULT_ADJUSTMENT_REASON.to_string());

        ProductRepository::set_stock(&mut tx, product_id, new_stock, &actor.id, now).await?;

        let movement = movement_row(
            product_id,
            previous_stock,
            new_stock,
            classify_movement(previous_stock, new_stock, MovementIntent::ManualAdjustment),
            MovementNote {
                reason: Some(reason.clone()),
                notes: notes.clone(),
                reference_id: None,
            },
            actor,
            now,
        );
        StockRepository::insert_movement(&mut tx, &movement).await?;

        let alert = alert_for_level(new_stock, product.min_stock_level)
            .map(|decision| alert_row(product_id, decision, now));
        if let Some(alert) = &alert {
            StockRepository::insert_alert(&mut tx, alert).await?;
        }

        let audit = product_audit(
            actor,
            AuditAction::AdjustStock,
            product_id,
            json!({
                "previousStock": previous_stock,
                "newStock": new_stock,
                "adjustment": new_stock - previous_stock,
                "reason": reason,
                "notes": notes,
            }),
            now,
        );
        AuditRepository::insert(&mut tx, &audit).await?;

        let product = ProductRepository::fetch(&mut tx, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        Database::commit(tx).await?;

        info!(
            product_id = %product_id,
            previous_stock,
            new_stock,
            user_id = %actor.id,
            "Stock adjusted"
        );

        Ok(StockAdjustment {
            product,
            movement,
            alert,
            previous_stock,
            new_stock,
        })
    }

    /// Sells `quantity` units of an active product at its current selling
    /// price.
    pub async fn record_sale(
        &self,
        product_id: &str,
        quantity: i64,
        actor: &CurrentUser,
    ) -> ApiResult<SaleRecord> {
        let mut tx = self.state.db.begin().await?;

        let product = ProductRepository::fetch(&mut tx, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if !product.is_active() {
            return Err(CoreError::ProductInactive(product.id).into());
        }
        if quantity > product.available_stock {
            return Err(CoreError::InsufficientStock {
                product: product.name,
                available: product.available_stock,
                requested: quantity,
            }
            .into());
        }

        let total_amount = product
            .selling()
            .checked_times(quantity)
            .ok_or_else(|| {
                CoreError::from(ValidationError::rule(
                    "quantity",
                    "Sale total exceeds the largest supported amount",
                ))
            })?
            .minor();

        let now = Utc::now();
        let previous_stock = product.available_stock;
        let new_stock = previous_stock - quantity;

        let sale = Sale {
            id: new_id(),
            product_id: product_id.to_string(),
            quantity,
            unit_price: product.selling_price,
            total_amount,
            sold_by: actor.id.clone(),
            sold_at: now,
        };
        SaleRepository::insert(&mut tx, &sale).await?;

        ProductRepository::set_stock(&mut tx, product_id, new_stock, &actor.id, now).await?;

        let movement = movement_row(
            product_id,
            previous_stock,
            new_stock,
            classify_movement(previous_stock, new_stock, MovementIntent::Sale),
            MovementNote {
                reason: Some(SALE_REASON.to_string()),
                notes: None,
                reference_id: Some(sale.id.clone()),
            },
            actor,
            now,
        );
        StockRepository::insert_movement(&mut tx, &movement).await?;

        let alert = alert_for_level(new_stock, product.min_stock_level)
            .map(|decision| alert_row(product_id, decision, now));
        if let Some(alert) = &alert {
            StockRepository::insert_alert(&mut tx, alert).await?;
        }

        let audit = product_audit(
            actor,
            AuditAction::Sale,
            product_id,
            json!({
                "saleId": sale.id,
                "quantity": quantity,
                "unitPrice": sale.unit_price,
                "totalAmount": sale.total_amount,
                "previousStock": previous_stock,
                "newStock": new_stock,
            }),
            now,
        );
        AuditRepository::insert(&mut tx, &audit).await?;

        let product = ProductRepository::fetch(&mut tx, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        Database::commit(tx).await?;

        info!(
            sale_id = %sale.id,
            product_id = %product_id,
            quantity,
            total = sale.total_amount,
            "Sale recorded"
        );

        Ok(SaleRecord {
            sale,
            product,
            movement,
            alert,
        })
    }

    /// Marks an alert as handled by `actor`.
    pub async fn acknowledge_alert(
        &self,
        alert_id: &str,
        actor: &CurrentUser,
    ) -> ApiResult<StockAlert> {
        let mut tx = self.state.db.begin().await?;

        if StockRepository::fetch_alert(&mut tx, alert_id).await?.is_none() {
            return Err(CoreError::AlertNotFound(alert_id.to_string()).into());
        }

        StockRepository::acknowledge(&mut tx, alert_id, &actor.id, Utc::now()).await?;

        let alert = StockRepository::fetch_alert(&mut tx, alert_id)
            .await?
            .ok_or_else(|| CoreError::AlertNotFound(alert_id.to_string()))?;

        Database::commit(tx).await?;

        info!(alert_id = %alert_id, user_id = %actor.id, "Alert acknowledged");
        Ok(alert)
    }

    /// Active alerts, newest first.
    pub async fn list_active_alerts(&self, limit: u32) -> ApiResult<Vec<AlertWithProduct>> {
        Ok(self.state.db.stock().list_active_alerts(limit).await?)
    }
}
