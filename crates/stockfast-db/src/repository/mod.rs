//! # Repository Module
//!
//! Database repository implementations for stockFast.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Reads and Writes                                     │
//! │                                                                         │
//! │  Reads go through a repository value holding the pool:                 │
//! │       db.products().get_by_id(id)                                      │
//! │       db.stock().recent_movements(id, 10)                              │
//! │                                                                         │
//! │  Writes are associated functions over one connection, so a service     │
//! │  can compose several of them inside a single transaction:              │
//! │       let mut tx = db.begin().await?;                                  │
//! │       ProductRepository::set_stock(&mut tx, ..).await?;                │
//! │       StockRepository::insert_movement(&mut tx, ..).await?;            │
//! │       AuditRepository::insert(&mut tx, ..).await?;                     │
//! │       tx.commit().await?;                                               │
//! │                                                                         │
//! │  Never read through the pool while holding a transaction: in-memory    │
//! │  databases have a single connection.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Products and filtered listing
//! - [`StockRepository`](stock::StockRepository) - Movements and alerts
//! - [`QrCodeRepository`](qr_code::QrCodeRepository) - Product QR labels
//! - [`SaleRepository`](sale::SaleRepository) - Sales
//! - [`AuditRepository`](audit::AuditRepository) - Audit trail
//! - [`UserRepository`](user::UserRepository) - Operator accounts
//! - [`DashboardRepository`](dashboard::DashboardRepository) - Aggregations

pub mod audit;
pub mod dashboard;
pub mod product;
pub mod qr_code;
pub mod sale;
pub mod stock;
pub mod user;
