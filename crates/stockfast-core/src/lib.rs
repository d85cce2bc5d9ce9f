//! # stockfast-core: Pure Business Logic for stockFast
//!
//! This crate holds every stockFast business rule as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        stockFast Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web client (React)                           │   │
//! │  │    Product list ──► Product form ──► Stock dialog ──► Dashboard │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (JSON / form-encoded)             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    routes, auth, services (transactions), QR rendering          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockfast-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌───────────────┐  │   │
//! │  │   │   types   │ │validation │ │   stock   │ │ query  │  qr  │  │   │
//! │  │   │  Product  │ │ raw form  │ │ classify  │ │filters │payload│ │   │
//! │  │   │  Movement │ │ → product │ │ alerts    │ │ paging │parse │  │   │
//! │  │   └───────────┘ └───────────┘ └───────────┘ └───────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockfast-db (Database Layer)                   │   │
//! │  │          SQLite queries, migrations, filter interpretation      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, StockMovement, StockAlert, ...)
//! - [`money`] - Integer money with XAF display
//! - [`error`] - Domain and validation error types
//! - [`validation`] - Form input → validated product / patch
//! - [`stock`] - Movement classification, alert rule, stock status, metrics
//! - [`query`] - Immutable product query with tagged filters
//! - [`qr`] - QR payload format and the encoder seam
//!
//! ## Example Usage
//!
//! ```rust
//! use stockfast_core::stock::{alert_for_level, classify_movement, MovementIntent};
//! use stockfast_core::{AlertType, MovementType};
//!
//! // An operator counts 0 units left of a product whose minimum is 5
//! let movement = classify_movement(4, 0, MovementIntent::ManualAdjustment);
//! assert_eq!(movement.movement_type, MovementType::Adjustment);
//! assert_eq!(movement.quantity, 4);
//!
//! let alert = alert_for_level(0, 5).unwrap();
//! assert_eq!(alert.alert_type, AlertType::OutOfStock);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod qr;
pub mod query;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationErrors};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Digits in a hardware identifier (IMEI).
pub const HARDWARE_ID_LEN: usize = 15;

/// Maximum image references per product.
pub const MAX_PRODUCT_IMAGES: usize = 5;

/// Minimum stock level applied when the form leaves it blank, capped at the
/// stock being created.
pub const DEFAULT_MIN_STOCK_LEVEL: i64 = 5;

/// Highest accepted unit price (one trillion FCFA). Keeps sale totals and
/// margins far from `i64` overflow.
pub const MAX_PRICE: i64 = 1_000_000_000_000;

/// Movements shown on the product detail page.
pub const RECENT_MOVEMENTS_LIMIT: u32 = 10;

/// Days covered by the dashboard series and category breakdown.
pub const DASHBOARD_WINDOW_DAYS: u32 = 30;

/// Entity name written to audit rows about products.
pub const PRODUCT_ENTITY: &str = "Product";
