//! Product catalogue: create, update, soft-delete, QR labels and reads.
//!
//! ## Create Flow
//! ```text
//! form ──► validate ──► hardware id free? ──► BEGIN
//!                                               ├── INSERT products
//!                                               ├── encode QR (failure: no image)
//!                                               ├── INSERT qr_codes
//!                                               ├── INSERT stock_movements (stock > 0)
//!                                               ├── INSERT audit_logs (CREATE)
//!                                               └── COMMIT
//! ```

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use stockfast_core::qr::{parse_qr_content, qr_code_string, QrPayload};
use stockfast_core::query::{ListParams, Page, ProductQuery, SearchMetadata, SearchParams};
use stockfast_core::stock::{classify_movement, MovementIntent, ProductMetrics, StockStatus};
use stockfast_core::validation::{
    validate_product_input, validate_product_update, RawProductInput,
};
use stockfast_core::{
    AuditAction, CoreError, Product, ProductStatus, QrCode, StockAlert, RECENT_MOVEMENTS_LIMIT,
};
use stockfast_db::{
    AuditRepository, Database, MovementWithPerformer, ProductRepository, QrCodeRepository,
    StockRepository, UserSummary,
};

use super::{movement_row, new_id, product_audit, MovementNote};
use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const INITIAL_STOCK_REASON: &str = "Initial stock";

/// A product as listed, with its derived stock status and margin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stock_status: StockStatus,
    /// Basis points over the purchase price (3000 = 30%).
    pub profit_margin_bps: Option<i64>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        ProductView {
            stock_status: product.stock_status(),
            profit_margin_bps: product.profit_margin_bps(),
            product,
        }
    }
}

/// Everything the product page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductView,
    pub creator: Option<UserSummary>,
    pub qr_code: Option<QrCode>,
    pub recent_movements: Vec<MovementWithPerformer>,
    pub active_alerts: Vec<StockAlert>,
}

/// A freshly created product and its label.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub qr_code: QrCode,
}

/// Result of the advanced search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub page: Page<ProductView>,
    pub search: Option<SearchMetadata>,
}

pub struct ProductService {
    state: AppState,
}

impl ProductService {
    pub fn new(state: AppState) -> Self {
        ProductService { state }
    }

    fn db(&self) -> &Database {
        &self.state.db
    }

    fn label_payload(&self, product: &Product, now: DateTime<Utc>) -> QrPayload {
        QrPayload::for_product(
            &product.id,
            &product.hardware_id,
            &self.state.config.qr.base_url,
            now,
        )
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Creates a product with its QR label and initial stock movement.
    pub async fn create(
        &self,
        raw: &RawProductInput,
        actor: &CurrentUser,
    ) -> ApiResult<CreatedProduct> {
        let validated = validate_product_input(raw)?;

        if self
            .db()
            .products()
            .find_by_hardware_id(&validated.hardware_id)
            .await?
            .is_some()
        {
            return Err(CoreError::DuplicateHardwareId(validated.hardware_id).into());
        }

        let now = Utc::now();
        let audit_changes = serde_json::to_value(&validated)?;
        let product = validated.into_product(new_id(), &actor.id, now);

        let mut tx = self.db().begin().await?;

        ProductRepository::insert(&mut tx, &product).await?;

        let image_data = match self
            .state
            .qr
            .encode(&self.label_payload(&product, now).to_content())
        {
            Ok(data_url) => Some(data_url),
            Err(e) => {
                warn!(
                    product_id = %product.id,
                    error = %e,
                    "QR image generation failed, storing label without image"
                );
                None
            }
        };
        let qr_code = QrCode {
            id: new_id(),
            product_id: product.id.clone(),
            code: qr_code_string(&product.id, now),
            image_data,
            image_url: None,
            is_active: true,
            generated_by: actor.id.clone(),
            generated_at: now,
        };
        QrCodeRepository::insert(&mut tx, &qr_code).await?;

        if product.available_stock > 0 {
            let movement = movement_row(
                &product.id,
                0,
                product.available_stock,
                classify_movement(0, product.available_stock, MovementIntent::InitialStock),
                MovementNote {
                    reason: Some(INITIAL_STOCK_REASON.to_string()),
                    ..Default::default()
                },
                actor,
                now,
            );
            StockRepository::insert_movement(&mut tx, &movement).await?;
        }

        let audit = product_audit(actor, AuditAction::Create, &product.id, audit_changes, now);
        AuditRepository::insert(&mut tx, &audit).await?;

        Database::commit(tx).await?;

        info!(
            product_id = %product.id,
            hardware_id = %product.hardware_id,
            user_id = %actor.id,
            "Product created"
        );

        Ok(CreatedProduct { product, qr_code })
    }

    /// Applies a partial edit. A stock change is recorded as a movement but
    /// raises no alert.
    pub async fn update(
        &self,
        product_id: &str,
        raw: &RawProductInput,
        actor: &CurrentUser,
    ) -> ApiResult<Product> {
        let patch = validate_product_update(raw)?;

        let current = self
            .db()
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if patch.is_empty() {
            return Ok(current);
        }

        if let Some(hardware_id) = &patch.hardware_id {
            if *hardware_id != current.hardware_id {
                let taken = self.db().products().find_by_hardware_id(hardware_id).await?;
                if taken.is_some_and(|other| other.id != current.id) {
                    return Err(CoreError::DuplicateHardwareId(hardware_id.clone()).into());
                }
            }
        }

        let now = Utc::now();
        let mut next = patch.apply_to(&current)?;
        next.updated_by = Some(actor.id.clone());
        next.updated_at = now;

        let mut tx = self.db().begin().await?;

        ProductRepository::update(&mut tx, &next).await?;

        let (previous_stock, new_stock) = (current.available_stock, next.available_stock);
        if new_stock != previous_stock {
            let reason = if new_stock > previous_stock {
                "Positive adjustment"
            } else {
                "Negative adjustment"
            };
            let movement = movement_row(
                product_id,
                previous_stock,
                new_stock,
                classify_movement(previous_stock, new_stock, MovementIntent::ProductEdit),
                MovementNote {
                    reason: Some(reason.to_string()),
                    notes: Some(format!(
                        "Stock adjusted from {} to {}",
                        previous_stock, new_stock
                    )),
                    reference_id: None,
                },
                actor,
                now,
            );
            StockRepository::insert_movement(&mut tx, &movement).await?;
        }

        let audit = product_audit(
            actor,
            AuditAction::Update,
            product_id,
            json!({ "updated": patch, "previous": current }),
            now,
        );
        AuditRepository::insert(&mut tx, &audit).await?;

        Database::commit(tx).await?;

        info!(product_id = %product_id, user_id = %actor.id, "Product updated");
        Ok(next)
    }

    /// Marks a product INACTIVE and retires its label and alerts.
    pub async fn soft_delete(&self, product_id: &str, actor: &CurrentUser) -> ApiResult<Product> {
        let product = self
            .db()
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if self.db().sales().count_for_product(product_id).await? > 0 {
            return Err(CoreError::ProductHasSales(product_id.to_string()).into());
        }
        if product.status == ProductStatus::Inactive {
            return Err(CoreError::ProductAlreadyInactive(product_id.to_string()).into());
        }

        let now = Utc::now();
        let mut tx = self.db().begin().await?;

        ProductRepository::set_status(&mut tx, product_id, ProductStatus::Inactive, &actor.id, now)
            .await?;
        let labels = QrCodeRepository::deactivate_for_product(&mut tx, product_id).await?;
        let alerts = StockRepository::deactivate_for_product(&mut tx, product_id).await?;

        let audit = product_audit(
            actor,
            AuditAction::Delete,
            product_id,
            json!({
                "status": ProductStatus::Inactive,
                "action": "Soft delete - Product inactivated",
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
            qr_codes = labels,
            alerts,
            user_id = %actor.id,
            "Product inactivated"
        );
        Ok(product)
    }

    /// Re-renders a product's QR image in place.
    pub async fn regenerate_qr(&self, product_id: &str, qr_code_id: &str) -> ApiResult<QrCode> {
        let product = self
            .db()
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let qr_code = self
            .db()
            .qr_codes()
            .get_by_id(qr_code_id)
            .await?
            .filter(|qr| qr.product_id == product.id)
            .ok_or_else(|| CoreError::QrCodeNotFound(qr_code_id.to_string()))?;

        let now = Utc::now();
        let image_data = self
            .state
            .qr
            .encode(&self.label_payload(&product, now).to_content())?;

        let mut tx = self.db().begin().await?;
        QrCodeRepository::replace_image(&mut tx, &qr_code.id, &image_data, now).await?;
        Database::commit(tx).await?;

        info!(product_id = %product_id, qr_code_id = %qr_code_id, "QR code regenerated");

        Ok(QrCode {
            image_data: Some(image_data),
            generated_at: now,
            ..qr_code
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Resolves scanned label content to its product.
    pub async fn scan(&self, content: &str) -> ApiResult<ProductView> {
        let payload = parse_qr_content(content).ok_or(CoreError::InvalidQrContent)?;

        let product = self
            .db()
            .products()
            .get_by_id(&payload.product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(payload.product_id.clone()))?;

        if product.hardware_id != payload.hardware_id {
            return Err(CoreError::InvalidQrContent.into());
        }
        Ok(product.into())
    }

    /// Catalogue listing.
    pub async fn list(&self, params: &ListParams) -> ApiResult<Page<ProductView>> {
        let query = ProductQuery::from_list_params(params, self.state.config.pagination.list_limits())
            .map_err(ApiError::invalid_query)?;

        let (rows, count) = self.db().products().query(&query).await?;
        Ok(query.finish_page(rows, count).map(ProductView::from))
    }

    /// Advanced search with timing metadata.
    pub async fn search(&self, params: &SearchParams) -> ApiResult<SearchResult> {
        let started = Instant::now();
        let query =
            ProductQuery::from_search_params(params, self.state.config.pagination.search_limits())
                .map_err(ApiError::invalid_query)?;

        let (rows, count) = self.db().products().query(&query).await?;
        let page = query.finish_page(rows, count).map(ProductView::from);

        let search = query.text_term().map(|(text, exact_match)| SearchMetadata {
            query: text.to_string(),
            exact_match,
            results_found: page.pagination.total,
            search_time: started.elapsed().as_millis() as u64,
        });

        Ok(SearchResult { page, search })
    }

    /// Product page data.
    pub async fn detail(&self, product_id: &str) -> ApiResult<ProductDetail> {
        let product = self
            .db()
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let creator = self.db().users().summary(&product.created_by).await?;
        let qr_code = self.db().qr_codes().for_product(product_id).await?;
        let recent_movements = self
            .db()
            .stock()
            .recent_movements(product_id, RECENT_MOVEMENTS_LIMIT)
            .await?;
        let active_alerts = self.db().stock().active_alerts_for_product(product_id).await?;

        Ok(ProductDetail {
            product: product.into(),
            creator,
            qr_code,
            recent_movements,
            active_alerts,
        })
    }

    /// Movement history of one product, newest first.
    pub async fn movements(
        &self,
        product_id: &str,
        limit: u32,
    ) -> ApiResult<Vec<MovementWithPerformer>> {
        if self.db().products().get_by_id(product_id).await?.is_none() {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }
        Ok(self.db().stock().recent_movements(product_id, limit).await?)
    }

    /// Headline metrics over active products.
    pub async fn stats(&self) -> ApiResult<ProductMetrics> {
        let products = self.db().products().list_by_status(ProductStatus::Active).await?;
        Ok(ProductMetrics::from_products(&products))
    }
}
