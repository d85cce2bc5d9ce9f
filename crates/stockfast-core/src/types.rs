//! # Domain Types
//!
//! Core domain types used throughout stockFast.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │                        ┌─────────────────┐                              │
//! │                        │    Product      │                              │
//! │                        │  ─────────────  │                              │
//! │                        │  hardware_id    │ 15 digits, unique            │
//! │                        │  available_stock│                              │
//! │                        │  min_stock_level│                              │
//! │                        └───────┬─────────┘                              │
//! │          ┌───────────────┬─────┴─────────┬───────────────┐              │
//! │          ▼               ▼               ▼               ▼              │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐    │
//! │  │StockMovement │ │  StockAlert  │ │    QrCode    │ │     Sale     │    │
//! │  │ many, append │ │ many, flag   │ │ one, 1:1     │ │ many         │    │
//! │  │ only         │ │ is_active    │ │              │ │              │    │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘    │
//! │                                                                         │
//! │  AuditLog: one row per mutation, keyed by (entity, entity_id)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! All structs serialize camelCase, matching the JSON the web client reads.
//! Enums serialize as SCREAMING_SNAKE_CASE (`PHONE`, `LOW_STOCK`) and are
//! stored the same way in SQLite.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;
use crate::stock::StockStatus;

// =============================================================================
// Enum parsing
// =============================================================================

/// A string did not name any variant of a domain enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub allowed: &'static [&'static str],
}

fn parse_variant<T: Copy>(
    kind: &'static str,
    value: &str,
    allowed: &'static [&'static str],
    variants: &[T],
) -> Result<T, ParseEnumError> {
    allowed
        .iter()
        .position(|name| *name == value)
        .map(|i| variants[i])
        .ok_or_else(|| ParseEnumError {
            kind,
            value: value.to_string(),
            allowed,
        })
}

// =============================================================================
// Product Category
// =============================================================================

/// What kind of article a product is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    Phone,
    Accessory,
    Component,
}

impl ProductCategory {
    pub const NAMES: &'static [&'static str] = &["PHONE", "ACCESSORY", "COMPONENT"];
    const ALL: [ProductCategory; 3] = [
        ProductCategory::Phone,
        ProductCategory::Accessory,
        ProductCategory::Component,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Phone => "PHONE",
            ProductCategory::Accessory => "ACCESSORY",
            ProductCategory::Component => "COMPONENT",
        }
    }
}

impl FromStr for ProductCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("category", s, Self::NAMES, &Self::ALL)
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product Status
// =============================================================================

/// Lifecycle state of a product. Deletion only ever moves a product to
/// `Inactive`; rows are never physically removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Discontinued,
}

impl ProductStatus {
    pub const NAMES: &'static [&'static str] = &["ACTIVE", "INACTIVE", "DISCONTINUED"];
    const ALL: [ProductStatus; 3] = [
        ProductStatus::Active,
        ProductStatus::Inactive,
        ProductStatus::Discontinued,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Inactive => "INACTIVE",
            ProductStatus::Discontinued => "DISCONTINUED",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("status", s, Self::NAMES, &Self::ALL)
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Movement Type
// =============================================================================

/// Why a product's stock level changed.
///
/// `In`, `Out`, `Return` and `Damage` are accepted by the store but no
/// workflow in this service emits them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
    Sale,
    Purchase,
    Return,
    Damage,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
            MovementType::Adjustment => "ADJUSTMENT",
            MovementType::Sale => "SALE",
            MovementType::Purchase => "PURCHASE",
            MovementType::Return => "RETURN",
            MovementType::Damage => "DAMAGE",
        }
    }
}

// =============================================================================
// Alert Type
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    LowStock,
    OutOfStock,
    /// Reserved for perishable components; never raised by stock rules.
    ExpirySoon,
}

// =============================================================================
// Audit Action
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    AdjustStock,
    Sale,
}

// =============================================================================
// User Role
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    #[default]
    Vendor,
}

// =============================================================================
// Product
// =============================================================================

/// A catalogued article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub name: String,
    pub brand: String,
    pub model: String,

    /// Purchase price in minor units.
    pub purchase_price: i64,

    /// Selling price in minor units. Always greater than `purchase_price`.
    pub selling_price: i64,

    /// 15-digit hardware identifier (IMEI), unique across all products.
    pub hardware_id: String,

    /// Units on hand. Never negative.
    pub available_stock: i64,

    /// Stock level at or below which the product counts as low.
    pub min_stock_level: i64,

    pub description: Option<String>,

    /// Image references (URLs or data URLs), at most five.
    pub images: Vec<String>,

    pub category: ProductCategory,
    pub status: ProductStatus,

    /// User who created the product.
    pub created_by: String,

    /// User who last modified the product.
    pub updated_by: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn purchase(&self) -> Money {
        Money::from_minor(self.purchase_price)
    }

    #[inline]
    pub fn selling(&self) -> Money {
        Money::from_minor(self.selling_price)
    }

    /// Margin of selling over purchase price in basis points of the
    /// purchase price. `None` when the purchase price is not positive.
    pub fn profit_margin_bps(&self) -> Option<i64> {
        Money::margin_bps(self.purchase(), self.selling())
    }

    /// Value of the units on hand at selling price.
    pub fn stock_value(&self) -> Money {
        self.selling().times(self.available_stock)
    }

    /// In / low / out classification of the current stock level.
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.available_stock, self.min_stock_level)
    }

    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// An immutable record of one stock change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub movement_type: MovementType,
    /// Absolute size of the change, `|new_stock - previous_stock|`.
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub reason: Option<String>,
    pub notes: Option<String>,
    /// External reference, e.g. the sale that caused the movement.
    pub reference_id: Option<String>,
    pub performed_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Stock Alert
// =============================================================================

/// A low or out-of-stock signal raised when a stock change crossed the
/// product's threshold. Deactivated, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub id: String,
    pub product_id: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub alert_type: AlertType,
    pub threshold: i64,
    pub current_stock: i64,
    pub is_active: bool,
    #[ts(as = "Option<String>")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub acknowledged_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Audit Log
// =============================================================================

/// One mutation of one entity, with a JSON snapshot of what changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,
    pub user_id: String,
    pub action: AuditAction,
    /// Entity kind, e.g. `"Product"`.
    pub entity: String,
    pub entity_id: String,
    #[ts(type = "unknown")]
    pub changes: serde_json::Value,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// QR Code
// =============================================================================

/// The scannable label of a product (one per product).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    pub id: String,
    pub product_id: String,
    /// Opaque code, `PROD_<productId>_<millis>`.
    pub code: String,
    /// PNG image as a `data:image/png;base64,` URL. Missing when encoding
    /// failed at creation time.
    pub image_data: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub generated_by: String,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A sold quantity of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Selling price at the time of sale (frozen).
    pub unit_price: i64,
    pub total_amount: i64,
    pub sold_by: String,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

/// An authenticated operator, as exposed to clients (no credentials).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
