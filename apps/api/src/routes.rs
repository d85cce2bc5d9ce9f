//! HTTP routes.
//!
//! ```text
//! GET    /health                              (public)
//! POST   /api/auth/sign-up                    (public, JSON)
//! POST   /api/auth/sign-in                    (public, JSON)
//! GET    /api/auth/session
//!
//! GET    /api/products                        list
//! POST   /api/products                        create        (form)
//! GET    /api/products/search                 advanced search
//! GET    /api/products/stats                  catalogue metrics
//! POST   /api/products/regenerate-qr          (JSON)
//! POST   /api/products/scan                   (JSON)
//! GET    /api/products/{id}                   detail
//! POST   /api/products/{id}                   update        (form)
//! DELETE /api/products/{id}                   soft-delete
//! GET    /api/products/{id}/movements
//! POST   /api/products/{id}/stock             adjust stock  (form)
//! POST   /api/sales                           record sale   (form)
//! GET    /api/alerts
//! POST   /api/alerts/{id}/acknowledge
//! GET    /api/dashboard/stats
//! ```

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Extension, Form, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use stockfast_core::query::{ListParams, Pagination, SearchMetadata, SearchParams};
use stockfast_core::validation::{
    parse_whole_number, validate_notes, validate_reason, validate_sale_quantity, validate_uuid,
    RawProductInput,
};
use stockfast_core::{ValidationError, ValidationErrors, RECENT_MOVEMENTS_LIMIT};

use crate::auth::{auth_middleware, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::services::auth_service::{SignInRequest, SignUpRequest};
use crate::services::{AuthService, DashboardService, ProductService, StockService};
use crate::AppState;

/// Upper bound for `limit` on the movement and alert lists.
const MAX_LIST_LIMIT: u32 = 100;
const DEFAULT_ALERT_LIMIT: u32 = 50;

// =============================================================================
// Envelope
// =============================================================================

/// Success body shared by every endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<SearchMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    fn ok(data: T) -> Self {
        Envelope {
            success: true,
            data,
            pagination: None,
            search: None,
            message: None,
        }
    }

    fn paginated(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    fn with_search(mut self, search: Option<SearchMetadata>) -> Self {
        self.search = search;
        self
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

fn created<T: Serialize>(envelope: Envelope<T>) -> Response {
    (StatusCode::CREATED, envelope).into_response()
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

fn form_body<T>(body: Result<Form<T>, FormRejection>) -> ApiResult<T> {
    body.map(|Form(value)| value)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

fn list_limit(raw: Option<&str>, default: u32) -> ApiResult<u32> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(value) => {
            let limit = parse_whole_number("limit", Some(value))
                .ok()
                .filter(|l| *l > 0)
                .ok_or_else(|| {
                    ApiError::invalid_query(ValidationErrors::from(ValidationError::MustBePositive {
                        field: "limit".to_string(),
                    }))
                })?;
            Ok(u32::try_from(limit).unwrap_or(MAX_LIST_LIMIT).min(MAX_LIST_LIMIT))
        }
    }
}

// =============================================================================
// Router
// =============================================================================

/// Builds the application router with the session layer applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/sign-up", post(sign_up))
        .route("/api/auth/sign-in", post(sign_in))
        .route("/api/auth/session", get(session))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/search", get(search_products))
        .route("/api/products/stats", get(product_stats))
        .route("/api/products/regenerate-qr", post(regenerate_qr))
        .route("/api/products/scan", post(scan_qr))
        .route(
            "/api/products/{id}",
            get(product_detail)
                .post(update_product)
                .delete(delete_product),
        )
        .route("/api/products/{id}/movements", get(product_movements))
        .route("/api/products/{id}/stock", post(adjust_stock))
        .route("/api/sales", post(record_sale))
        .route("/api/alerts", get(list_alerts))
        .route("/api/alerts/{id}/acknowledge", post(acknowledge_alert))
        .route("/api/dashboard/stats", get(dashboard_stats))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

// =============================================================================
// Health & Auth
// =============================================================================

#[derive(Serialize)]
struct Health {
    status: &'static str,
    database: bool,
}

async fn health(State(state): State<AppState>) -> Response {
    let database = state.db.health_check().await;
    let (code, status) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };
    (code, Json(Health { status, database })).into_response()
}

async fn sign_up(
    State(state): State<AppState>,
    body: Result<Json<SignUpRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let req = json_body(body)?;
    let user = AuthService::new(state).sign_up(&req).await?;
    Ok(created(Envelope::ok(user).with_message("Account created successfully")))
}

async fn sign_in(
    State(state): State<AppState>,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let req = json_body(body)?;
    let session = AuthService::new(state).sign_in(&req).await?;
    Ok(Envelope::ok(session).into_response())
}

async fn session(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Response> {
    let user = AuthService::new(state).session(&user).await?;
    Ok(Envelope::ok(user).into_response())
}

// =============================================================================
// Products: reads
// =============================================================================

async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Response> {
    let page = ProductService::new(state).list(&params).await?;
    Ok(Envelope::ok(page.items)
        .paginated(page.pagination)
        .into_response())
}

async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Response> {
    let result = ProductService::new(state).search(&params).await?;
    Ok(Envelope::ok(result.page.items)
        .paginated(result.page.pagination)
        .with_search(result.search)
        .into_response())
}

async fn product_stats(State(state): State<AppState>) -> ApiResult<Response> {
    let metrics = ProductService::new(state).stats().await?;
    Ok(Envelope::ok(metrics).into_response())
}

async fn product_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let detail = ProductService::new(state).detail(&id).await?;
    Ok(Envelope::ok(detail).into_response())
}

#[derive(Debug, Default, Deserialize)]
struct LimitParams {
    limit: Option<String>,
}

async fn product_movements(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Response> {
    let limit = list_limit(params.limit.as_deref(), RECENT_MOVEMENTS_LIMIT)?;
    let movements = ProductService::new(state).movements(&id, limit).await?;
    Ok(Envelope::ok(movements).into_response())
}

// =============================================================================
// Products: writes
// =============================================================================

async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    form: Result<Form<RawProductInput>, FormRejection>,
) -> ApiResult<Response> {
    let raw = form_body(form)?;
    let created_product = ProductService::new(state).create(&raw, &user).await?;
    Ok(created(
        Envelope::ok(created_product).with_message("Product created successfully"),
    ))
}

async fn update_product(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    form: Result<Form<RawProductInput>, FormRejection>,
) -> ApiResult<Response> {
    let raw = form_body(form)?;
    let product = ProductService::new(state).update(&id, &raw, &user).await?;
    Ok(Envelope::ok(product)
        .with_message("Product updated successfully")
        .into_response())
}

async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let product = ProductService::new(state).soft_delete(&id, &user).await?;
    Ok(Envelope::ok(product)
        .with_message("Product deactivated successfully")
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockForm {
    new_stock: Option<String>,
    reason: Option<String>,
    notes: Option<String>,
}

async fn adjust_stock(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    form: Result<Form<StockForm>, FormRejection>,
) -> ApiResult<Response> {
    let form = form_body(form)?;

    let mut errors = ValidationErrors::new();
    let new_stock = errors.check(parse_whole_number("newStock", form.new_stock.as_deref()));
    let reason = errors.check(validate_reason(form.reason.as_deref()));
    let notes = errors.check(validate_notes(form.notes.as_deref()));
    let (new_stock, reason, notes) = match (new_stock, reason, notes) {
        (Some(s), Some(r), Some(n)) if errors.is_empty() => (s, r, n),
        _ => return Err(errors.into()),
    };

    let adjustment = StockService::new(state)
        .adjust_stock(&id, new_stock, reason, notes, &user)
        .await?;
    let message = adjustment.message();
    Ok(Envelope::ok(adjustment).with_message(message).into_response())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaleForm {
    product_id: Option<String>,
    quantity: Option<String>,
}

async fn record_sale(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    form: Result<Form<SaleForm>, FormRejection>,
) -> ApiResult<Response> {
    let form = form_body(form)?;

    let mut errors = ValidationErrors::new();
    let product_id = form.product_id.unwrap_or_default();
    errors.check(validate_uuid("productId", &product_id));
    let quantity = errors.check(validate_sale_quantity(form.quantity.as_deref()));
    let quantity = match quantity {
        Some(q) if errors.is_empty() => q,
        _ => return Err(errors.into()),
    };

    let record = StockService::new(state)
        .record_sale(&product_id, quantity, &user)
        .await?;
    Ok(created(
        Envelope::ok(record).with_message("Sale recorded successfully"),
    ))
}

// =============================================================================
// QR codes
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegenerateQrRequest {
    product_id: Option<String>,
    qr_code_id: Option<String>,
}

async fn regenerate_qr(
    State(state): State<AppState>,
    body: Result<Json<RegenerateQrRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let req = json_body(body)?;
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(product_id), Some(qr_code_id)) = (non_empty(req.product_id), non_empty(req.qr_code_id))
    else {
        return Err(ApiError::validation("Product ID and QR code ID are required"));
    };

    let qr_code = ProductService::new(state)
        .regenerate_qr(&product_id, &qr_code_id)
        .await?;
    Ok(Envelope::ok(qr_code)
        .with_message("QR code regenerated successfully")
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
struct ScanRequest {
    content: Option<String>,
}

async fn scan_qr(
    State(state): State<AppState>,
    body: Result<Json<ScanRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let req = json_body(body)?;
    let content = req
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::validation("QR code content is required"))?;

    let product = ProductService::new(state).scan(&content).await?;
    Ok(Envelope::ok(product).into_response())
}

// =============================================================================
// Alerts & Dashboard
// =============================================================================

async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Response> {
    let limit = list_limit(params.limit.as_deref(), DEFAULT_ALERT_LIMIT)?;
    let alerts = StockService::new(state).list_active_alerts(limit).await?;
    Ok(Envelope::ok(alerts).into_response())
}

async fn acknowledge_alert(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let alert = StockService::new(state).acknowledge_alert(&id, &user).await?;
    Ok(Envelope::ok(alert)
        .with_message("Alert acknowledged")
        .into_response())
}

async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<Response> {
    let stats = DashboardService::new(state).stats(Utc::now()).await?;
    Ok(Json(stats).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_limit() {
        assert_eq!(list_limit(None, 10).unwrap(), 10);
        assert_eq!(list_limit(Some(" "), 10).unwrap(), 10);
        assert_eq!(list_limit(Some("25"), 10).unwrap(), 25);
        assert_eq!(list_limit(Some("5000"), 10).unwrap(), MAX_LIST_LIMIT);
        assert!(list_limit(Some("0"), 10).is_err());
        assert!(list_limit(Some("ten"), 10).is_err());
    }
}
