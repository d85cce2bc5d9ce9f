//! # Stock Rules
//!
//! Pure decisions about stock changes: what kind of movement a change is,
//! whether it raises an alert, and how a stock level is classified.
//!
//! ## One Classifier, Every Call Site
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   classify_movement(prev, new, intent)                  │
//! │                                                                         │
//! │  create product ───► InitialStock      ───► PURCHASE                   │
//! │  edit product   ───► ProductEdit       ───► PURCHASE   (new > prev)    │
//! │                                         └─► ADJUSTMENT (new < prev)    │
//! │  adjust stock   ───► ManualAdjustment  ───► ADJUSTMENT (either sign)   │
//! │  record sale    ───► Sale              ───► SALE                       │
//! │                                                                         │
//! │  quantity = |new - prev| in every case                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Alert Rule
//! ```text
//!   new == 0              → OUT_OF_STOCK (threshold 0)
//!   0 < new <= minimum    → LOW_STOCK    (threshold = minimum)
//!   new > minimum         → nothing
//! ```
//! Alerts are only ever added by a stock change. Recovery above the
//! threshold does not clear earlier alerts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{AlertType, MovementType, Product};

// =============================================================================
// Movement Classification
// =============================================================================

/// The workflow that changed the stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementIntent {
    /// First stock of a newly created product.
    InitialStock,
    /// Explicit stock correction by an operator.
    ManualAdjustment,
    /// Stock field changed as part of a product edit.
    ProductEdit,
    /// Units leaving through a sale.
    Sale,
}

/// Result of classifying one stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementClassification {
    pub movement_type: MovementType,
    pub quantity: i64,
}

/// Classifies a stock change from `previous` to `new`.
///
/// ```rust
/// use stockfast_core::stock::{classify_movement, MovementIntent};
/// use stockfast_core::MovementType;
///
/// let c = classify_movement(10, 7, MovementIntent::ManualAdjustment);
/// assert_eq!(c.movement_type, MovementType::Adjustment);
/// assert_eq!(c.quantity, 3);
/// ```
pub fn classify_movement(previous: i64, new: i64, intent: MovementIntent) -> MovementClassification {
    let movement_type = match intent {
        MovementIntent::InitialStock => MovementType::Purchase,
        MovementIntent::ManualAdjustment => MovementType::Adjustment,
        MovementIntent::ProductEdit if new > previous => MovementType::Purchase,
        MovementIntent::ProductEdit => MovementType::Adjustment,
        MovementIntent::Sale => MovementType::Sale,
    };

    MovementClassification {
        movement_type,
        quantity: (new - previous).abs(),
    }
}

// =============================================================================
// Alert Decision
// =============================================================================

/// An alert that a stock change should raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDecision {
    pub alert_type: AlertType,
    pub threshold: i64,
    pub current_stock: i64,
}

/// Decides whether reaching `new_stock` raises an alert.
pub fn alert_for_level(new_stock: i64, min_stock_level: i64) -> Option<AlertDecision> {
    if new_stock == 0 {
        Some(AlertDecision {
            alert_type: AlertType::OutOfStock,
            threshold: 0,
            current_stock: 0,
        })
    } else if new_stock > 0 && new_stock <= min_stock_level {
        Some(AlertDecision {
            alert_type: AlertType::LowStock,
            threshold: min_stock_level,
            current_stock: new_stock,
        })
    } else {
        None
    }
}

// =============================================================================
// Stock Status
// =============================================================================

/// Derived classification of a stock level. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// `0` is out, `1..=min` is low, anything above is in stock.
    pub fn classify(stock: i64, min_stock_level: i64) -> Self {
        if stock <= 0 {
            StockStatus::OutOfStock
        } else if stock <= min_stock_level {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

// =============================================================================
// Catalogue Metrics
// =============================================================================

/// Headline numbers for the product list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetrics {
    pub total_products: i64,
    pub low_stock_products: i64,
    pub out_of_stock_products: i64,
    /// Sum of selling price × units on hand, saturating at `i64::MAX`.
    pub total_value: Money,
    /// Mean selling price, rounded down. Zero for an empty catalogue.
    pub average_price: Money,
}

impl ProductMetrics {
    pub fn from_products<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        let mut metrics = ProductMetrics::default();
        let mut price_sum = 0i64;

        for product in products {
            metrics.total_products += 1;
            price_sum = price_sum.saturating_add(product.selling_price);
            metrics.total_value = metrics.total_value.saturating_add(product.stock_value());
            match product.stock_status() {
                StockStatus::LowStock => metrics.low_stock_products += 1,
                StockStatus::OutOfStock => metrics.out_of_stock_products += 1,
                StockStatus::InStock => {}
            }
        }

        if metrics.total_products > 0 {
            metrics.average_price = Money::from_minor(price_sum / metrics.total_products);
        }
        metrics
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
