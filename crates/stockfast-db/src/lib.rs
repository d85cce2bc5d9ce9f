//! # stockfast-db: Database Layer for stockFast
//!
//! SQLite persistence for the stockFast inventory, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        stockFast Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (adjust stock)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Service (apps/api) ── opens one transaction per mutation              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockfast-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ StockRepo     │    │ 001_initial  │  │   │
//! │  │   │ begin()       │    │ QrCode/Sale   │    │   _schema    │  │   │
//! │  │   │               │    │ Audit/User    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (database.path, WAL journal)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockfast_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("data/stockfast.db")).await?;
//! let product = db.products().get_by_id(&id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::audit::AuditRepository;
pub use repository::dashboard::{CategoryCount, DashboardRepository, WindowTotals};
pub use repository::product::ProductRepository;
pub use repository::qr_code::QrCodeRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::{AlertWithProduct, MovementWithPerformer, StockRepository};
pub use repository::user::{UserAccount, UserRepository, UserSummary};

/// Re-exported so callers can name transaction types without depending on sqlx.
pub use sqlx::{SqliteConnection, Transaction};
