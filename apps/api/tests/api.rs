//! End-to-end tests of the HTTP surface against an in-memory database.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use stockfast_api::{build_router, AppConfig, AppState};
use stockfast_core::qr::{QrEncodeError, QrEncoder, QrPayload};
use stockfast_core::{AlertType, AuditAction, MovementType, ProductStatus};
use stockfast_db::{Database, DbConfig};

const HARDWARE_ID: &str = "123456789012345";

struct TestApp {
    router: Router,
    db: Database,
    token: String,
}

struct BrokenEncoder;

impl QrEncoder for BrokenEncoder {
    fn encode(&self, _content: &str) -> Result<String, QrEncodeError> {
        Err(QrEncodeError::Render("printer on fire".to_string()))
    }
}

async fn app() -> TestApp {
    app_with(None).await
}

async fn app_with(encoder: Option<Arc<dyn QrEncoder>>) -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let config = AppConfig::default();
    let state = match encoder {
        Some(encoder) => AppState::with_encoder(db.clone(), config, encoder),
        None => AppState::new(db.clone(), config),
    };
    let router = build_router(state);

    let (status, _) = send(
        &router,
        "POST",
        "/api/auth/sign-up",
        None,
        Payload::Json(json!({
            "name": "Awa Ndiaye",
            "email": "awa@stockfast.cm",
            "password": "correct horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &router,
        "POST",
        "/api/auth/sign-in",
        None,
        Payload::Json(json!({"email": "awa@stockfast.cm", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    TestApp { router, db, token }
}

enum Payload<'a> {
    None,
    Json(Value),
    Form(&'a [(&'a str, &'a str)]),
}

fn url_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    payload: Payload<'_>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let body = match payload {
        Payload::None => Body::empty(),
        Payload::Json(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&v).unwrap())
        }
        Payload::Form(fields) => {
            builder = builder.header("content-type", "application/x-www-form-urlencoded");
            let encoded: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, url_encode(v)))
                .collect();
            Body::from(encoded.join("&"))
        }
    };

    let resp = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 4 * 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        json!(null)
    } else {
        serde_json::from_slice(&bytes).unwrap_or(json!(null))
    };
    (status, json)
}

impl TestApp {
    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.router, "GET", uri, Some(&self.token), Payload::None).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.router, "DELETE", uri, Some(&self.token), Payload::None).await
    }

    async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> (StatusCode, Value) {
        send(&self.router, "POST", uri, Some(&self.token), Payload::Form(fields)).await
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        send(&self.router, "POST", uri, Some(&self.token), Payload::Json(body)).await
    }

    /// Creates a phone and returns its id.
    async fn create_phone(&self, name: &str, hardware_id: &str, stock: &str, min: &str) -> String {
        let (status, body) = self
            .post_form(
                "/api/products",
                &[
                    ("name", name),
                    ("brand", "Apple"),
                    ("model", "15"),
                    ("purchasePrice", "500000"),
                    ("sellingPrice", "650000"),
                    ("hardwareId", hardware_id),
                    ("availableStock", stock),
                    ("minStockLevel", min),
                    ("category", "PHONE"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn adjust(&self, id: &str, new_stock: &str) -> (StatusCode, Value) {
        self.post_form(
            &format!("/api/products/{}/stock", id),
            &[("newStock", new_stock)],
        )
        .await
    }
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_requests_without_session_are_rejected() {
    let app = app().await;

    let (status, body) = send(&app.router, "GET", "/api/products", None, Payload::None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Authentification requise");

    let (status, _) = send(
        &app.router,
        "GET",
        "/api/products",
        Some("not-a-token"),
        Payload::None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app.router, "GET", "/health", None, Payload::None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_session_and_bad_credentials() {
    let app = app().await;

    let (status, body) = app.get("/api/auth/session").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "awa@stockfast.cm");

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/auth/sign-in",
        None,
        Payload::Json(json!({"email": "awa@stockfast.cm", "password": "wrong horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/auth/sign-up",
        None,
        Payload::Json(json!({"name": "Awa", "email": "AWA@stockfast.cm", "password": "12345678"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["fieldErrors"]["email"].is_string());
}

// =============================================================================
// Product creation
// =============================================================================

#[tokio::test]
async fn test_create_product_records_movement_label_and_audit() {
    let app = app().await;

    let (status, body) = app
        .post_form(
            "/api/products",
            &[
                ("name", "iPhone 15"),
                ("brand", "Apple"),
                ("model", "15"),
                ("purchasePrice", "500000"),
                ("sellingPrice", "650000"),
                ("hardwareId", HARDWARE_ID),
                ("availableStock", "10"),
                ("minStockLevel", "2"),
                ("category", "PHONE"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Product created successfully");
    assert_eq!(body["data"]["status"], "ACTIVE");
    let id = body["data"]["id"].as_str().unwrap();

    let movements = app.db.stock().movements_for_product(id).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].movement_type, MovementType::Purchase);
    assert_eq!(movements[0].previous_stock, 0);
    assert_eq!(movements[0].new_stock, 10);
    assert_eq!(movements[0].quantity, 10);
    assert_eq!(movements[0].reason.as_deref(), Some("Initial stock"));

    let qr = app.db.qr_codes().for_product(id).await.unwrap().unwrap();
    assert!(qr.is_active);
    assert!(qr.code.starts_with(&format!("PROD_{}_", id)));
    assert!(qr
        .image_data
        .unwrap()
        .starts_with("data:image/png;base64,"));

    let audit = app.db.audit().for_entity("Product", id).await.unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, AuditAction::Create);
    assert_eq!(audit[0].changes["hardwareId"], HARDWARE_ID);
}

#[tokio::test]
async fn test_create_without_stock_has_no_movement() {
    let app = app().await;
    let id = app.create_phone("Galaxy A15", HARDWARE_ID, "0", "0").await;

    let movements = app.db.stock().movements_for_product(&id).await.unwrap();
    assert!(movements.is_empty());
}

#[tokio::test]
async fn test_duplicate_hardware_id_is_conflict() {
    let app = app().await;
    app.create_phone("iPhone 15", HARDWARE_ID, "10", "2").await;

    let (status, body) = app
        .post_form(
            "/api/products",
            &[
                ("name", "iPhone 15 Pro"),
                ("brand", "Apple"),
                ("model", "15 Pro"),
                ("purchasePrice", "700000"),
                ("sellingPrice", "850000"),
                ("hardwareId", HARDWARE_ID),
                ("availableStock", "3"),
                ("category", "PHONE"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert!(body["fieldErrors"]["hardwareId"].is_string());

    let products = app
        .db
        .products()
        .list_by_status(ProductStatus::Active)
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
}

#[tokio::test]
async fn test_invalid_product_form_reports_fields() {
    let app = app().await;

    let (status, body) = app
        .post_form(
            "/api/products",
            &[
                ("name", "iPhone 15"),
                ("brand", "Apple"),
                ("model", "15"),
                ("purchasePrice", "650000"),
                ("sellingPrice", "650000"),
                ("hardwareId", "12345"),
                ("availableStock", "10"),
                ("category", "PHONE"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["fieldErrors"]["sellingPrice"],
        "Selling price must be greater than purchase price"
    );
    assert!(body["fieldErrors"]["hardwareId"].is_string());

    let products = app
        .db
        .products()
        .list_by_status(ProductStatus::Active)
        .await
        .unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_encoder_failure_still_creates_product() {
    let app = app_with(Some(Arc::new(BrokenEncoder))).await;
    let id = app.create_phone("iPhone 15", HARDWARE_ID, "10", "2").await;

    let qr = app.db.qr_codes().for_product(&id).await.unwrap().unwrap();
    assert!(qr.image_data.is_none());

    let (status, _) = app
        .post_json(
            "/api/products/regenerate-qr",
            json!({"productId": id, "qrCodeId": qr.id}),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// Stock adjustment
// =============================================================================

#[tokio::test]
async fn test_adjust_round_trip() {
    let app = app().await;
    let id = app.create_phone("iPhone 15", HARDWARE_ID, "10", "2").await;

    let (status, body) = app.adjust(&id, "5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Stock adjusted from 10 to 5");
    assert_eq!(body["data"]["movement"]["type"], "ADJUSTMENT");
    assert_eq!(body["data"]["movement"]["quantity"], 5);
    assert_eq!(body["data"]["product"]["availableStock"], 5);
    assert!(body["data"]["alert"].is_null());

    let (status, body) = app.adjust(&id, "10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["movement"]["quantity"], 5);
    assert_eq!(body["data"]["previousStock"], 5);

    let product = app.db.products().get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(product.available_stock, 10);
    let adjustments = app
        .db
        .stock()
        .count_movements(&id, MovementType::Adjustment)
        .await
        .unwrap();
    assert_eq!(adjustments, 2);

    let audit = app.db.audit().for_entity("Product", &id).await.unwrap();
    let adjust_rows: Vec<_> = audit
        .iter()
        .filter(|a| a.action == AuditAction::AdjustStock)
        .collect();
    assert_eq!(adjust_rows.len(), 2);
}

#[tokio::test]
async fn test_adjust_alert_boundaries() {
    let app = app().await;
    let id = app.create_phone("iPhone 15", HARDWARE_ID, "10", "2").await;

    let (_, body) = app.adjust(&id, "3").await;
    assert!(body["data"]["alert"].is_null());

    let (_, body) = app.adjust(&id, "2").await;
    assert_eq!(body["data"]["alert"]["type"], "LOW_STOCK");
    assert_eq!(body["data"]["alert"]["threshold"], 2);
    assert_eq!(body["data"]["alert"]["currentStock"], 2);

    let (_, body) = app.adjust(&id, "0").await;
    assert_eq!(body["data"]["alert"]["type"], "OUT_OF_STOCK");
    assert_eq!(body["data"]["alert"]["threshold"], 0);

    // alerts accumulate; recovery does not clear them
    app.adjust(&id, "8").await;
    let alerts = app.db.stock().active_alerts_for_product(&id).await.unwrap();
    assert_eq!(alerts.len(), 2);
    assert!(alerts.iter().any(|a| a.alert_type == AlertType::OutOfStock));
}

#[tokio::test]
async fn test_adjust_to_same_level_records_zero_quantity() {
    let app = app().await;
    let id = app.create_phone("iPhone 15", HARDWARE_ID, "10", "2").await;

    app.adjust(&id, "7").await;
    let (status, body) = app.adjust(&id, "7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["movement"]["quantity"], 0);
    assert_eq!(body["data"]["movement"]["previousStock"], 7);
    assert_eq!(body["data"]["movement"]["newStock"], 7);
}

#[tokio::test]
async fn test_adjust_rejections() {
    let app = app().await;
    let id = app.create_phone("iPhone 15", HARDWARE_ID, "10", "2").await;

    let (status, body) = app.adjust(&id, "-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fieldErrors"]["newStock"].is_string());

    let (status, _) = app.adjust(&id, "two").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // missing product wins over the negative level
    let (status, _) = app
        .adjust("550e8400-e29b-41d4-a716-446655440000", "-1")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let product = app.db.products().get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(product.available_stock, 10);
    let movements = app.db.stock().movements_for_product(&id).await.unwrap();
    assert_eq!(movements.len(), 1);
}

// =============================================================================
// Update, sales and soft-delete
// =============================================================================

#[tokio::test]
async fn test_update_stock_change_records_edit_movement() {
    let app = app().await;
    let id = app.create_phone("iPhone 15", HARDWARE_ID, "10", "2").await;

    let (status, body) = app
        .post_form(
            &format!("/api/products/{}", id),
            &[("availableStock", "1"), ("name", "iPhone 15 (refurb)")],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "iPhone 15 (refurb)");
    assert_eq!(body["data"]["availableStock"], 1);

    let movements = app.db.stock().movements_for_product(&id).await.unwrap();
    let edit = movements.last().unwrap();
    assert_eq!(edit.movement_type, MovementType::Adjustment);
    assert_eq!(edit.quantity, 9);
    assert_eq!(edit.reason.as_deref(), Some("Negative adjustment"));
    assert_eq!(edit.notes.as_deref(), Some("Stock adjusted from 10 to 1"));

    // edits never raise alerts
    let alerts = app.db.stock().active_alerts_for_product(&id).await.unwrap();
    assert!(alerts.is_empty());

    let (status, body) = app
        .post_form(&format!("/api/products/{}", id), &[("sellingPrice", "400000")])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fieldErrors"]["sellingPrice"].is_string());
}

#[tokio::test]
async fn test_sale_then_soft_delete_is_blocked() {
    let app = app().await;
    let id = app.create_phone("iPhone 15", HARDWARE_ID, "3", "1").await;

    let (status, body) = app
        .post_form("/api/sales", &[("productId", id.as_str()), ("quantity", "2")])
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["sale"]["totalAmount"], 1_300_000);
    assert_eq!(body["data"]["movement"]["type"], "SALE");
    assert_eq!(body["data"]["alert"]["type"], "LOW_STOCK");

    let (status, _) = app
        .post_form("/api/sales", &[("productId", id.as_str()), ("quantity", "5")])
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.delete(&format!("/api/products/{}", id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Cannot delete a product that has associated sales");

    let product = app.db.products().get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(product.status, ProductStatus::Active);
    assert_eq!(product.available_stock, 1);
}

#[tokio::test]
async fn test_sale_total_overflow_is_rejected() {
    let app = app().await;

    let (status, body) = app
        .post_form(
            "/api/products",
            &[
                ("name", "Galaxy Fold"),
                ("brand", "Samsung"),
                ("model", "Z Fold 6"),
                ("purchasePrice", "1"),
                ("sellingPrice", "9000000000000000000"),
                ("hardwareId", HARDWARE_ID),
                ("availableStock", "2"),
                ("minStockLevel", "0"),
                ("category", "PHONE"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["fieldErrors"]["sellingPrice"],
        "Price cannot exceed 1 000 000 000 000 FCFA"
    );

    let (status, body) = app
        .post_form(
            "/api/products",
            &[
                ("name", "Cable USB-C"),
                ("brand", "Anker"),
                ("model", "PowerLine"),
                ("purchasePrice", "999999999999"),
                ("sellingPrice", "1000000000000"),
                ("hardwareId", HARDWARE_ID),
                ("availableStock", "10000000"),
                ("minStockLevel", "0"),
                ("category", "ACCESSORY"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post_form(
            "/api/sales",
            &[("productId", id.as_str()), ("quantity", "10000000")],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fieldErrors"]["quantity"].is_string());

    let product = app.db.products().get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(product.available_stock, 10_000_000);
    assert_eq!(app.db.sales().count_for_product(&id).await.unwrap(), 0);

    let (status, body) = app.get("/api/products/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalValue"], i64::MAX);
}

#[tokio::test]
async fn test_blank_minimum_follows_small_stock() {
    let app = app().await;

    let (status, body) = app
        .post_form(
            "/api/products",
            &[
                ("name", "Nokia 105"),
                ("brand", "Nokia"),
                ("model", "105"),
                ("purchasePrice", "8000"),
                ("sellingPrice", "12000"),
                ("hardwareId", HARDWARE_ID),
                ("availableStock", "0"),
                ("category", "PHONE"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["minStockLevel"], 0);
}

#[tokio::test]
async fn test_soft_delete_retires_label_and_alerts() {
    let app = app().await;
    let id = app.create_phone("iPhone 15", HARDWARE_ID, "10", "2").await;
    app.adjust(&id, "0").await;

    let (status, body) = app.delete(&format!("/api/products/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "INACTIVE");

    let qr = app.db.qr_codes().for_product(&id).await.unwrap().unwrap();
    assert!(!qr.is_active);
    let alerts = app.db.stock().active_alerts_for_product(&id).await.unwrap();
    assert!(alerts.is_empty());

    let (status, body) = app.delete(&format!("/api/products/{}", id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Product is already inactive");

    let (status, _) = app
        .delete("/api/products/550e8400-e29b-41d4-a716-446655440000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_list_search_and_detail() {
    let app = app().await;
    let iphone = app.create_phone("iPhone 15", HARDWARE_ID, "10", "2").await;
    app.create_phone("iPhone 14", "123456789012346", "1", "1").await;
    app.create_phone("Pixel 8", "123456789012347", "0", "0").await;

    let (status, body) = app.get("/api/products?limit=2&sortBy=availableStock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["data"][0]["name"], "Pixel 8");
    assert_eq!(body["data"][1]["name"], "iPhone 14");

    let (_, body) = app.get("/api/products?search=IPHONE").await;
    assert_eq!(body["pagination"]["total"], 2);
    // 500 000 → 650 000
    assert_eq!(body["data"][0]["profitMarginBps"], 3000);

    let (_, body) = app.get("/api/products?stockStatus=out_of_stock").await;
    assert_eq!(body["data"][0]["name"], "Pixel 8");
    assert_eq!(body["data"][0]["stockStatus"], "out_of_stock");

    let (status, body) = app.get("/api/products?category=TABLET").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid query parameters");

    let (status, body) = app.get("/api/products/search?query=iPhone%2015&exactMatch=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["search"]["query"], "iPhone 15");
    assert_eq!(body["search"]["exactMatch"], true);
    assert_eq!(body["search"]["resultsFound"], 1);

    let (status, body) = app.get(&format!("/api/products/{}", iphone)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["creator"]["name"], "Awa Ndiaye");
    assert_eq!(body["data"]["recentMovements"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["data"]["recentMovements"][0]["performedByName"],
        "Awa Ndiaye"
    );
    assert!(body["data"]["qrCode"]["imageData"].is_string());

    let (status, _) = app
        .get("/api/products/550e8400-e29b-41d4-a716-446655440000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/products/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalProducts"], 3);
    assert_eq!(body["data"]["outOfStockProducts"], 1);
    assert_eq!(body["data"]["lowStockProducts"], 1);
}

#[tokio::test]
async fn test_search_folds_accented_names() {
    let app = app().await;
    let (status, body) = app
        .post_form(
            "/api/products",
            &[
                ("name", "Écran OLED"),
                ("brand", "Samsung"),
                ("model", "S23 panel"),
                ("purchasePrice", "40000"),
                ("sellingPrice", "55000"),
                ("hardwareId", HARDWARE_ID),
                ("availableStock", "4"),
                ("minStockLevel", "1"),
                ("category", "COMPONENT"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    for term in ["%C3%A9cran", "%C3%89CRAN", "oled"] {
        let (status, body) = app.get(&format!("/api/products?search={}", term)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 1, "search={}", term);
        assert_eq!(body["data"][0]["name"], "Écran OLED");
    }

    let (_, body) = app.get("/api/products/search?query=%C3%A9cran").await;
    assert_eq!(body["search"]["resultsFound"], 1);
}

#[tokio::test]
async fn test_qr_regenerate_and_scan() {
    let app = app().await;
    let id = app.create_phone("iPhone 15", HARDWARE_ID, "10", "2").await;
    let qr = app.db.qr_codes().for_product(&id).await.unwrap().unwrap();

    let (status, _) = app
        .post_json("/api/products/regenerate-qr", json!({"productId": id}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_json(
            "/api/products/regenerate-qr",
            json!({"productId": id, "qrCodeId": "550e8400-e29b-41d4-a716-446655440000"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post_json(
            "/api/products/regenerate-qr",
            json!({"productId": id, "qrCodeId": qr.id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], qr.id.as_str());
    assert_eq!(body["data"]["code"], qr.code.as_str());

    let content = QrPayload::for_product(&id, HARDWARE_ID, "/products", chrono::Utc::now())
        .to_content();
    let (status, body) = app
        .post_json("/api/products/scan", json!({"content": content}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());

    let legacy = format!("Produit: iPhone 15\nIMEI: {}\nID: {}", HARDWARE_ID, id);
    let (status, _) = app
        .post_json("/api/products/scan", json!({"content": legacy}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post_json("/api/products/scan", json!({"content": "hello"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_alerts_and_dashboard() {
    let app = app().await;
    let id = app.create_phone("iPhone 15", HARDWARE_ID, "10", "2").await;
    app.adjust(&id, "0").await;

    let (status, body) = app.get("/api/alerts").await;
    assert_eq!(status, StatusCode::OK);
    let alerts = body["data"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["productName"], "iPhone 15");
    let alert_id = alerts[0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post_json(&format!("/api/alerts/{}/acknowledge", alert_id), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);
    assert!(body["data"]["acknowledgedBy"].is_string());

    let (status, body) = app.get("/api/dashboard/stats").await;
    assert_eq!(status, StatusCode::OK);
    let daily = body["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 30);
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    assert_eq!(daily[29]["date"], today.as_str());
    assert_eq!(daily[29]["products"], 1);
    assert_eq!(daily[29]["alerts"], 1);
    assert!(body["categories"].as_array().unwrap().is_empty());
}
