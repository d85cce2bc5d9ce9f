//! # Validation Module
//!
//! Turns untrusted form input into typed domain values.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web client                                                   │
//! │  └── Immediate feedback on the form                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Per-field rules (length, digits, ranges, enum membership)         │
//! │  ├── Cross-field rules (selling > purchase, minimum <= stock)          │
//! │  └── ALL failures collected, never a partially valid product           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── CHECK constraints (stock >= 0)                                    │
//! │  └── UNIQUE (hardware_id)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockfast_core::validation::{validate_product_input, RawProductInput};
//!
//! let raw = RawProductInput {
//!     name: Some("iPhone 15".into()),
//!     brand: Some("Apple".into()),
//!     model: Some("15".into()),
//!     purchase_price: Some("500000".into()),
//!     selling_price: Some("650000".into()),
//!     hardware_id: Some("123456789012345".into()),
//!     available_stock: Some("10".into()),
//!     min_stock_level: Some("5".into()),
//!     category: Some("PHONE".into()),
//!     ..Default::default()
//! };
//! let product = validate_product_input(&raw).unwrap();
//! assert_eq!(product.selling_price, 650_000);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError, ValidationErrors};
use crate::types::{Product, ProductCategory, ProductStatus};
use crate::money::Money;
use crate::{DEFAULT_MIN_STOCK_LEVEL, HARDWARE_ID_LEN, MAX_PRICE, MAX_PRODUCT_IMAGES};

/// Result type for single-field validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Raw Input
// =============================================================================

/// Product form exactly as submitted: every field optional and textual.
///
/// `images` carries a JSON array of strings; form encoding has no list type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProductInput {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub purchase_price: Option<String>,
    pub selling_price: Option<String>,
    #[serde(alias = "imei")]
    pub hardware_id: Option<String>,
    pub available_stock: Option<String>,
    pub min_stock_level: Option<String>,
    pub description: Option<String>,
    pub images: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

// =============================================================================
// Validated Product (create)
// =============================================================================

/// A product input that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedProduct {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub purchase_price: i64,
    pub selling_price: i64,
    pub hardware_id: String,
    pub available_stock: i64,
    pub min_stock_level: i64,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub category: ProductCategory,
    pub status: ProductStatus,
}

impl ValidatedProduct {
    /// Builds the product row created by `created_by` at `now`.
    pub fn into_product(self, id: String, created_by: &str, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            brand: self.brand,
            model: self.model,
            purchase_price: self.purchase_price,
            selling_price: self.selling_price,
            hardware_id: self.hardware_id,
            available_stock: self.available_stock,
            min_stock_level: self.min_stock_level,
            description: self.description,
            images: self.images,
            category: self.category,
            status: self.status,
            created_by: created_by.to_string(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validates a creation form.
///
/// ## Rules
/// - name: 2..=100 characters after trimming
/// - brand: required, at most 50 characters
/// - model: required, at most 100 characters
/// - purchasePrice, sellingPrice: whole numbers in 1..=MAX_PRICE
/// - sellingPrice > purchasePrice (reported on `sellingPrice`)
/// - hardwareId: exactly 15 ASCII digits
/// - availableStock: whole number >= 0
/// - minStockLevel: whole number >= 0, <= availableStock (reported on
///   `minStockLevel`); blank defaults to 5 capped at availableStock
/// - description: at most 500 characters
/// - images: at most 5 entries
/// - category: required, one of PHONE / ACCESSORY / COMPONENT
/// - status: optional (default ACTIVE), one of ACTIVE / INACTIVE / DISCONTINUED
///
/// Cross-field rules run only when both operands are individually valid.
pub fn validate_product_input(raw: &RawProductInput) -> Result<ValidatedProduct, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = errors.check(validate_product_name(raw.name.as_deref()));
    let brand = errors.check(validate_brand(raw.brand.as_deref()));
    let model = errors.check(validate_model(raw.model.as_deref()));
    let purchase_price = errors.check(validate_price("purchasePrice", raw.purchase_price.as_deref()));
    let selling_price = errors.check(validate_price("sellingPrice", raw.selling_price.as_deref()));
    let hardware_id = errors.check(validate_hardware_id(raw.hardware_id.as_deref()));
    let available_stock =
        errors.check(validate_stock_level("availableStock", raw.available_stock.as_deref()));
    let min_stock_level = match raw.min_stock_level.as_deref().map(str::trim) {
        None | Some("") => Some(
            available_stock.map_or(DEFAULT_MIN_STOCK_LEVEL, |s| s.min(DEFAULT_MIN_STOCK_LEVEL)),
        ),
        Some(value) => errors.check(validate_stock_level("minStockLevel", Some(value))),
    };
    let description = errors.check(validate_description(raw.description.as_deref()));
    let images = errors.check(validate_images(raw.images.as_deref()));
    let category = errors.check(validate_category(raw.category.as_deref()));
    let status = errors.check(validate_status(raw.status.as_deref()));

    if let (Some(purchase), Some(selling)) = (purchase_price, selling_price) {
        errors.check(check_price_order(purchase, selling));
    }
    if let (Some(stock), Some(min)) = (available_stock, min_stock_level) {
        if min > stock {
            errors.push(ValidationError::rule(
                "minStockLevel",
                "Minimum stock level cannot exceed available stock",
            ));
        }
    }

    match (
        name,
        brand,
        model,
        purchase_price,
        selling_price,
        hardware_id,
        available_stock,
        min_stock_level,
        description,
        images,
        category,
        status,
    ) {
        (
            Some(name),
            Some(brand),
            Some(model),
            Some(purchase_price),
            Some(selling_price),
            Some(hardware_id),
            Some(available_stock),
            Some(min_stock_level),
            Some(description),
            Some(images),
            Some(category),
            Some(status),
        ) if errors.is_empty() => Ok(ValidatedProduct {
            name,
            brand,
            model,
            purchase_price,
            selling_price,
            hardware_id,
            available_stock,
            min_stock_level,
            description,
            images,
            category,
            status: status.unwrap_or_default(),
        }),
        _ => Err(errors),
    }
}

// =============================================================================
// Product Patch (update)
// =============================================================================

/// A partial product update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock_level: Option<i64>,
    /// `Some(None)` clears the description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ProductCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == ProductPatch::default()
    }

    /// Merges the patch over `current`, then checks the cross-field price
    /// rule against the merged values.
    ///
    /// The minimum-stock rule is a creation-time rule and is not re-checked.
    pub fn apply_to(&self, current: &Product) -> Result<Product, ValidationErrors> {
        let mut next = current.clone();

        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(brand) = &self.brand {
            next.brand = brand.clone();
        }
        if let Some(model) = &self.model {
            next.model = model.clone();
        }
        if let Some(price) = self.purchase_price {
            next.purchase_price = price;
        }
        if let Some(price) = self.selling_price {
            next.selling_price = price;
        }
        if let Some(hardware_id) = &self.hardware_id {
            next.hardware_id = hardware_id.clone();
        }
        if let Some(stock) = self.available_stock {
            next.available_stock = stock;
        }
        if let Some(min) = self.min_stock_level {
            next.min_stock_level = min;
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(images) = &self.images {
            next.images = images.clone();
        }
        if let Some(category) = self.category {
            next.category = category;
        }
        if let Some(status) = self.status {
            next.status = status;
        }

        check_price_order(next.purchase_price, next.selling_price)?;
        Ok(next)
    }
}

/// Validates an update form. Absent fields are untouched; present fields
/// follow the same rules as creation.
pub fn validate_product_update(raw: &RawProductInput) -> Result<ProductPatch, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut patch = ProductPatch::default();

    if raw.name.is_some() {
        patch.name = errors.check(validate_product_name(raw.name.as_deref()));
    }
    if raw.brand.is_some() {
        patch.brand = errors.check(validate_brand(raw.brand.as_deref()));
    }
    if raw.model.is_some() {
        patch.model = errors.check(validate_model(raw.model.as_deref()));
    }
    if raw.purchase_price.is_some() {
        patch.purchase_price =
            errors.check(validate_price("purchasePrice", raw.purchase_price.as_deref()));
    }
    if raw.selling_price.is_some() {
        patch.selling_price =
            errors.check(validate_price("sellingPrice", raw.selling_price.as_deref()));
    }
    if raw.hardware_id.is_some() {
        patch.hardware_id = errors.check(validate_hardware_id(raw.hardware_id.as_deref()));
    }
    if raw.available_stock.is_some() {
        patch.available_stock =
            errors.check(validate_stock_level("availableStock", raw.available_stock.as_deref()));
    }
    if raw.min_stock_level.is_some() {
        patch.min_stock_level =
            errors.check(validate_stock_level("minStockLevel", raw.min_stock_level.as_deref()));
    }
    if raw.description.is_some() {
        patch.description = errors.check(validate_description(raw.description.as_deref()));
    }
    if raw.images.is_some() {
        patch.images = errors.check(validate_images(raw.images.as_deref()));
    }
    if raw.category.is_some() {
        patch.category = errors.check(validate_category(raw.category.as_deref()));
    }
    if raw.status.is_some() {
        patch.status = errors.check(validate_status(raw.status.as_deref())).flatten();
    }

    if let (Some(purchase), Some(selling)) = (patch.purchase_price, patch.selling_price) {
        errors.check(check_price_order(purchase, selling));
    }

    errors.into_result(|| patch)
}

// =============================================================================
// Field Validators
// =============================================================================

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn check_max_chars(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a product name: 2 to 100 characters.
pub fn validate_product_name(name: Option<&str>) -> ValidationResult<String> {
    let name = name.map(str::trim).unwrap_or_default();

    if name.chars().count() < 2 {
        return Err(ValidationError::TooShort {
            field: "name".to_string(),
            min: 2,
        });
    }
    check_max_chars("name", name, 100)?;

    Ok(name.to_string())
}

pub fn validate_brand(brand: Option<&str>) -> ValidationResult<String> {
    let brand = trimmed(brand).ok_or_else(|| ValidationError::Required {
        field: "brand".to_string(),
    })?;
    check_max_chars("brand", brand, 50)?;
    Ok(brand.to_string())
}

pub fn validate_model(model: Option<&str>) -> ValidationResult<String> {
    let model = trimmed(model).ok_or_else(|| ValidationError::Required {
        field: "model".to_string(),
    })?;
    check_max_chars("model", model, 100)?;
    Ok(model.to_string())
}

/// Parses a whole number from a form value.
pub fn parse_whole_number(field: &str, value: Option<&str>) -> ValidationResult<i64> {
    let value = trimmed(value).ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })?;

    value.parse::<i64>().map_err(|_| ValidationError::NotAnInteger {
        field: field.to_string(),
    })
}

/// Validates a price in minor units: whole, strictly positive, at most
/// [`MAX_PRICE`].
pub fn validate_price(field: &str, value: Option<&str>) -> ValidationResult<i64> {
    let price = parse_whole_number(field, value)?;
    if price <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if price > MAX_PRICE {
        return Err(ValidationError::rule(
            field,
            format!("Price cannot exceed {}", Money::from_minor(MAX_PRICE)),
        ));
    }
    Ok(price)
}

/// Validates a stock quantity: whole and zero or more.
pub fn validate_stock_level(field: &str, value: Option<&str>) -> ValidationResult<i64> {
    let level = parse_whole_number(field, value)?;
    if level < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(level)
}

fn check_price_order(purchase: i64, selling: i64) -> ValidationResult<()> {
    if selling <= purchase {
        return Err(ValidationError::rule(
            "sellingPrice",
            "Selling price must be greater than purchase price",
        ));
    }
    Ok(())
}

/// Validates a hardware identifier (IMEI): exactly 15 ASCII digits.
///
/// ```rust
/// use stockfast_core::validation::validate_hardware_id;
///
/// assert!(validate_hardware_id(Some("123456789012345")).is_ok());
/// assert!(validate_hardware_id(Some("12345678901234")).is_err());
/// assert!(validate_hardware_id(Some("12345678901234a")).is_err());
/// ```
pub fn validate_hardware_id(value: Option<&str>) -> ValidationResult<String> {
    let value = trimmed(value).ok_or_else(|| ValidationError::Required {
        field: "hardwareId".to_string(),
    })?;

    if value.len() != HARDWARE_ID_LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "hardwareId".to_string(),
            reason: format!("must contain exactly {HARDWARE_ID_LEN} digits"),
        });
    }

    Ok(value.to_string())
}

/// Validates an optional description. Blank means no description.
pub fn validate_description(value: Option<&str>) -> ValidationResult<Option<String>> {
    match trimmed(value) {
        None => Ok(None),
        Some(description) => {
            check_max_chars("description", description, 500)?;
            Ok(Some(description.to_string()))
        }
    }
}

/// Validates the image list, submitted as a JSON array of strings.
pub fn validate_images(value: Option<&str>) -> ValidationResult<Vec<String>> {
    let Some(value) = trimmed(value) else {
        return Ok(Vec::new());
    };

    let images: Vec<String> =
        serde_json::from_str(value).map_err(|_| ValidationError::InvalidFormat {
            field: "images".to_string(),
            reason: "must be a JSON array of strings".to_string(),
        })?;

    if images.len() > MAX_PRODUCT_IMAGES {
        return Err(ValidationError::TooMany {
            field: "images".to_string(),
            max: MAX_PRODUCT_IMAGES,
        });
    }
    if images.iter().any(|i| i.trim().is_empty()) {
        return Err(ValidationError::InvalidFormat {
            field: "images".to_string(),
            reason: "entries cannot be empty".to_string(),
        });
    }

    Ok(images)
}

pub fn validate_category(value: Option<&str>) -> ValidationResult<ProductCategory> {
    let value = trimmed(value).ok_or_else(|| ValidationError::Required {
        field: "category".to_string(),
    })?;

    value.parse().map_err(|_| ValidationError::NotAllowed {
        field: "category".to_string(),
        allowed: ProductCategory::NAMES.iter().map(|s| s.to_string()).collect(),
    })
}

/// Validates an optional status. Blank means "use the default".
pub fn validate_status(value: Option<&str>) -> ValidationResult<Option<ProductStatus>> {
    let Some(value) = trimmed(value) else {
        return Ok(None);
    };

    value.parse().map(Some).map_err(|_| ValidationError::NotAllowed {
        field: "status".to_string(),
        allowed: ProductStatus::NAMES.iter().map(|s| s.to_string()).collect(),
    })
}

// =============================================================================
// Workflow Validators
// =============================================================================

/// Validates a requested stock level for a manual adjustment. Callers
/// check that the product exists first.
pub fn validate_stock_adjustment(new_stock: i64) -> Result<i64, CoreError> {
    if new_stock < 0 {
        return Err(CoreError::NegativeStock {
            requested: new_stock,
        });
    }
    Ok(new_stock)
}

/// Validates a free-text adjustment reason (at most 200 characters).
pub fn validate_reason(value: Option<&str>) -> ValidationResult<Option<String>> {
    match trimmed(value) {
        None => Ok(None),
        Some(reason) => {
            check_max_chars("reason", reason, 200)?;
            Ok(Some(reason.to_string()))
        }
    }
}

/// Validates free-text notes (at most 500 characters).
pub fn validate_notes(value: Option<&str>) -> ValidationResult<Option<String>> {
    match trimmed(value) {
        None => Ok(None),
        Some(notes) => {
            check_max_chars("notes", notes, 500)?;
            Ok(Some(notes.to_string()))
        }
    }
}

/// Validates a sale quantity: whole and strictly positive.
pub fn validate_sale_quantity(value: Option<&str>) -> ValidationResult<i64> {
    let quantity = parse_whole_number("quantity", value)?;
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(quantity)
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (no text filter)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();
    check_max_chars("query", query, 100)?;
    Ok(query.to_string())
}

/// Validates an entity ID (UUID format).
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates sign-up credentials.
pub fn validate_credentials(
    name: &str,
    email: &str,
    password: &str,
) -> Result<(String, String), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = errors.check(validate_product_name(Some(name)));

    let email = email.trim().to_lowercase();
    let well_formed = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);
    if !well_formed {
        errors.push(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must be a valid email address".to_string(),
        });
    }

    if password.chars().count() < 8 {
        errors.push(ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        });
    }

    match name {
        Some(name) if errors.is_empty() => Ok((name, email)),
        _ => Err(errors),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn iphone() -> RawProductInput {
        RawProductInput {
            name: Some("iPhone 15".into()),
            brand: Some("Apple".into()),
            model: Some("15".into()),
            purchase_price: Some("500000".into()),
            selling_price: Some("650000".into()),
            hardware_id: Some("123456789012345".into()),
            available_stock: Some("10".into()),
            min_stock_level: Some("5".into()),
            category: Some("PHONE".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_product() {
        let product = validate_product_input(&iphone()).unwrap();
        assert_eq!(product.name, "iPhone 15");
        assert_eq!(product.purchase_price, 500_000);
        assert_eq!(product.available_stock, 10);
        assert_eq!(product.category, ProductCategory::Phone);
        assert_eq!(product.status, ProductStatus::Active);
        assert!(product.images.is_empty());
        assert_eq!(product.description, None);
    }

    #[test]
    fn test_selling_must_exceed_purchase() {
        let mut raw = iphone();
        raw.selling_price = Some("500000".into());
        let errors = validate_product_input(&raw).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.has_field("sellingPrice"));
    }

    #[test]
    fn test_min_stock_cannot_exceed_stock_on_create() {
        let mut raw = iphone();
        raw.min_stock_level = Some("11".into());
        let errors = validate_product_input(&raw).unwrap_err();
        assert!(errors.has_field("minStockLevel"));
    }

    #[test]
    fn test_collects_every_error() {
        let raw = RawProductInput {
            name: Some("X".into()),
            purchase_price: Some("-1".into()),
            selling_price: Some("12.5".into()),
            hardware_id: Some("1234".into()),
            available_stock: Some("-3".into()),
            category: Some("TABLET".into()),
            status: Some("GONE".into()),
            ..Default::default()
        };
        let errors = validate_product_input(&raw).unwrap_err();
        for field in [
            "name",
            "brand",
            "model",
            "purchasePrice",
            "sellingPrice",
            "hardwareId",
            "availableStock",
            "category",
            "status",
        ] {
            assert!(errors.has_field(field), "missing error for {field}");
        }
        // cross-field rules skipped when operands are invalid
        assert!(!errors.has_field("minStockLevel"));
    }

    #[test]
    fn test_min_stock_defaults() {
        let mut raw = iphone();
        raw.min_stock_level = None;
        assert_eq!(validate_product_input(&raw).unwrap().min_stock_level, 5);

        // the default never exceeds the stock being created
        raw.available_stock = Some("2".into());
        assert_eq!(validate_product_input(&raw).unwrap().min_stock_level, 2);
        raw.available_stock = Some("0".into());
        assert_eq!(validate_product_input(&raw).unwrap().min_stock_level, 0);

        // an explicit minimum is still checked
        raw.min_stock_level = Some("3".into());
        assert!(validate_product_input(&raw).unwrap_err().has_field("minStockLevel"));
    }

    #[test]
    fn test_price_ceiling() {
        assert_eq!(
            validate_price("sellingPrice", Some("1000000000000")),
            Ok(MAX_PRICE)
        );
        let err = validate_price("sellingPrice", Some("1000000000001")).unwrap_err();
        assert_eq!(err.field(), "sellingPrice");
        assert_eq!(
            err.to_string(),
            "Price cannot exceed 1 000 000 000 000 FCFA"
        );

        let mut raw = iphone();
        raw.selling_price = Some("9000000000000000000".into());
        assert!(validate_product_input(&raw).unwrap_err().has_field("sellingPrice"));
    }

    #[test]
    fn test_hardware_id_alias_imei() {
        let raw: RawProductInput =
            serde_json::from_str(r#"{"name":"iPhone","imei":"123456789012345"}"#).unwrap();
        assert_eq!(raw.hardware_id.as_deref(), Some("123456789012345"));
    }

    #[test]
    fn test_images() {
        assert_eq!(validate_images(None).unwrap(), Vec::<String>::new());
        assert_eq!(
            validate_images(Some(r#"["a.png","b.png"]"#)).unwrap(),
            vec!["a.png".to_string(), "b.png".to_string()]
        );
        assert!(validate_images(Some(r#"["1","2","3","4","5","6"]"#)).is_err());
        assert!(validate_images(Some("a.png")).is_err());
    }

    #[test]
    fn test_partial_update_only_touches_present_fields() {
        let raw = RawProductInput {
            available_stock: Some("7".into()),
            ..Default::default()
        };
        let patch = validate_product_update(&raw).unwrap();
        assert_eq!(patch.available_stock, Some(7));
        assert_eq!(patch.name, None);
        assert!(!patch.is_empty());
        assert!(ProductPatch::default().is_empty());
    }

    #[test]
    fn test_partial_update_rejects_bad_present_fields() {
        let raw = RawProductInput {
            hardware_id: Some("abc".into()),
            selling_price: Some("0".into()),
            ..Default::default()
        };
        let errors = validate_product_update(&raw).unwrap_err();
        assert!(errors.has_field("hardwareId"));
        assert!(errors.has_field("sellingPrice"));
    }

    #[test]
    fn test_partial_update_blank_description_clears() {
        let raw = RawProductInput {
            description: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(validate_product_update(&raw).unwrap().description, Some(None));
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_stock_adjustment() {
        assert_eq!(validate_stock_adjustment(0).unwrap(), 0);
        assert!(matches!(
            validate_stock_adjustment(-1),
            Err(CoreError::NegativeStock { requested: -1 })
        ));
    }

    #[test]
    fn test_validate_sale_quantity() {
        assert_eq!(validate_sale_quantity(Some("3")), Ok(3));
        assert!(validate_sale_quantity(Some("0")).is_err());
        assert!(validate_sale_quantity(None).is_err());
    }

    #[test]
    fn test_validate_credentials() {
        let (name, email) =
            validate_credentials("Awa", " Awa@Shop.CM ", "correct horse").unwrap();
        assert_eq!(name, "Awa");
        assert_eq!(email, "awa@shop.cm");

        let errors = validate_credentials("A", "nope", "short").unwrap_err();
        assert!(errors.has_field("name"));
        assert!(errors.has_field("email"));
        assert!(errors.has_field("password"));
    }

    #[test]
    fn test_search_query() {
        assert_eq!(validate_search_query("  galaxy ").unwrap(), "galaxy");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }
}
