//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Filtered, sorted, paged listing driven by a [`ProductQuery`]
//! - Lookups by id and by hardware id
//! - Transactional writes (insert, update, stock, status)
//!
//! ## Filter Interpretation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  ProductQuery → SQL                                     │
//! │                                                                         │
//! │  query.store_filters()                                                 │
//! │       │                                                                 │
//! │       ├── Search{text}        → search_text LIKE ?                     │
//! │       ├── ExactMatch{text}    → (name = ? OR brand = ? ...)            │
//! │       ├── Category(c)         → category = ?                           │
//! │       ├── Status(s)           → status = ?                             │
//! │       ├── Brand{contains}     → brand_key LIKE ?                       │
//! │       ├── PriceRange{min,max} → selling_price >= ? AND <= ?            │
//! │       └── StockStatus(in/out) → available_stock > 0 / = 0              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... WHERE <same predicates> ORDER BY <whitelist> LIMIT OFFSET  │
//! │  SELECT COUNT(*) WHERE <same predicates>                               │
//! │                                                                         │
//! │  query.post_filters() (low_stock, search-mode stock filters) are        │
//! │  applied by the caller through ProductQuery::finish_page               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite's `LOWER()` and `LIKE` only fold ASCII, so every write also stores
//! `str::to_lowercase` copies of the searchable text (`search_text`,
//! `brand_key`) and the case-insensitive filters match against those.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockfast_core::query::{ProductFilter, ProductQuery, SortField, SortOrder, StockStatusFilter};
use stockfast_core::{Product, ProductCategory, ProductStatus};

const PRODUCT_COLUMNS: &str = "id, name, brand, model, purchase_price, selling_price, \
     hardware_id, available_stock, min_stock_level, description, images, category, status, \
     created_by, updated_by, created_at, updated_at";

/// Raw `products` row. `images` is stored as a JSON array.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    brand: String,
    model: String,
    purchase_price: i64,
    selling_price: i64,
    hardware_id: String,
    available_stock: i64,
    min_stock_level: i64,
    description: Option<String>,
    images: String,
    category: ProductCategory,
    status: ProductStatus,
    created_by: String,
    updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let images: Vec<String> =
            serde_json::from_str(&row.images).map_err(|e| DbError::Decode {
                column: "products.images".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Product {
            id: row.id,
            name: row.name,
            brand: row.brand,
            model: row.model,
            purchase_price: row.purchase_price,
            selling_price: row.selling_price,
            hardware_id: row.hardware_id,
            available_stock: row.available_stock,
            min_stock_level: row.min_stock_level,
            description: row.description,
            images,
            category: row.category,
            status: row.status,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> DbResult<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

fn images_json(images: &[String]) -> DbResult<String> {
    serde_json::to_string(images).map_err(|e| DbError::Internal(e.to_string()))
}

/// Separates the fields inside `search_text` so a term cannot match across
/// two of them.
const SEARCH_FIELD_SEPARATOR: &str = "\u{1f}";

/// Lowercased name, brand, model, hardware id and description.
fn search_text(product: &Product) -> String {
    [
        product.name.as_str(),
        product.brand.as_str(),
        product.model.as_str(),
        product.hardware_id.as_str(),
        product.description.as_deref().unwrap_or_default(),
    ]
    .join(SEARCH_FIELD_SEPARATOR)
    .to_lowercase()
}

/// `%text%` with LIKE wildcards escaped (`ESCAPE '\'`).
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Name => "name",
        SortField::Brand => "brand",
        SortField::SellingPrice => "selling_price",
        SortField::AvailableStock => "available_stock",
        SortField::CreatedAt => "created_at",
    }
}

/// Appends ` AND <predicate>` for every filter. Expects a preceding
/// `WHERE 1 = 1`.
fn push_filters<'q, 'f>(
    qb: &mut QueryBuilder<'q, Sqlite>,
    filters: impl Iterator<Item = &'f ProductFilter>,
) {
    for filter in filters {
        match filter {
            ProductFilter::Search { text } => {
                qb.push(" AND search_text LIKE ")
                    .push_bind(like_pattern(&text.to_lowercase()))
                    .push(" ESCAPE '\\'");
            }
            ProductFilter::ExactMatch { text } => {
                qb.push(" AND (");
                for (i, column) in ["name", "brand", "model", "hardware_id"].iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(format!("{} = ", column)).push_bind(text.clone());
                }
                qb.push(")");
            }
            ProductFilter::Category(category) => {
                qb.push(" AND category = ").push_bind(*category);
            }
            ProductFilter::Status(status) => {
                qb.push(" AND status = ").push_bind(*status);
            }
            ProductFilter::Brand { contains } => {
                qb.push(" AND brand_key LIKE ")
                    .push_bind(like_pattern(&contains.to_lowercase()))
                    .push(" ESCAPE '\\'");
            }
            ProductFilter::PriceRange { min, max } => {
                if let Some(min) = min {
                    qb.push(" AND selling_price >= ").push_bind(*min);
                }
                if let Some(max) = max {
                    qb.push(" AND selling_price <= ").push_bind(*max);
                }
            }
            ProductFilter::StockStatus(StockStatusFilter::InStock) => {
                qb.push(" AND available_stock > 0");
            }
            ProductFilter::StockStatus(StockStatusFilter::OutOfStock) => {
                qb.push(" AND available_stock = 0");
            }
            ProductFilter::StockStatus(StockStatusFilter::LowStock) => {
                qb.push(" AND available_stock > 0 AND available_stock <= min_stock_level");
            }
        }
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// // Filtered page + store-level count
/// let (rows, count) = repo.query(&query).await?;
/// let page = query.finish_page(rows, count);
///
/// // Writes compose inside a transaction
/// let mut tx = db.begin().await?;
/// ProductRepository::insert(&mut tx, &product).await?;
/// Database::commit(tx).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    /// Gets a product by ID on the given connection (use inside a transaction).
    pub async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Gets a product by its 15-digit hardware id.
    pub async fn find_by_hardware_id(&self, hardware_id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE hardware_id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(hardware_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Runs the store side of a product query.
    ///
    /// ## Returns
    /// `(page_rows, store_count)`: the rows of the requested page matching
    /// the pushdown filters, and how many rows match them in total.
    /// Post-filters are NOT applied here.
    pub async fn query(&self, query: &ProductQuery) -> DbResult<(Vec<Product>, u64)> {
        let sort = query.sort();
        let page = query.page();

        debug!(
            mode = ?query.mode(),
            filters = query.filters().len(),
            page = page.page,
            limit = page.limit,
            "Querying products"
        );

        let mut count_qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM products WHERE 1 = 1");
        push_filters(&mut count_qb, query.store_filters());
        let count: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM products WHERE 1 = 1",
            PRODUCT_COLUMNS
        ));
        push_filters(&mut qb, query.store_filters());
        qb.push(format!(
            " ORDER BY {} {}, id ASC",
            sort_column(sort.field),
            match sort.order {
                SortOrder::Asc => "ASC",
                SortOrder::Desc => "DESC",
            }
        ));
        qb.push(" LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows = qb
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), total = count, "Query returned products");
        Ok((into_products(rows)?, count.max(0) as u64))
    }

    /// All products with the given status, newest first.
    pub async fn list_by_status(&self, status: ProductStatus) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE status = ?1 ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        into_products(rows)
    }

    // =========================================================================
    // Transactional writes
    // =========================================================================

    /// Inserts a new product.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` on `products.hardware_id`
    pub async fn insert(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, hardware_id = %product.hardware_id, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, brand, model, purchase_price, selling_price, hardware_id,
                available_stock, min_stock_level, description, images, category, status,
                created_by, updated_by, created_at, updated_at, search_text, brand_key
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.model)
        .bind(product.purchase_price)
        .bind(product.selling_price)
        .bind(&product.hardware_id)
        .bind(product.available_stock)
        .bind(product.min_stock_level)
        .bind(&product.description)
        .bind(images_json(&product.images)?)
        .bind(product.category)
        .bind(product.status)
        .bind(&product.created_by)
        .bind(&product.updated_by)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(search_text(product))
        .bind(product.brand.to_lowercase())
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Overwrites every mutable column of an existing product.
    pub async fn update(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2, brand = ?3, model = ?4, purchase_price = ?5, selling_price = ?6,
                hardware_id = ?7, available_stock = ?8, min_stock_level = ?9,
                description = ?10, images = ?11, category = ?12, status = ?13,
                updated_by = ?14, updated_at = ?15, search_text = ?16, brand_key = ?17
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.model)
        .bind(product.purchase_price)
        .bind(product.selling_price)
        .bind(&product.hardware_id)
        .bind(product.available_stock)
        .bind(product.min_stock_level)
        .bind(&product.description)
        .bind(images_json(&product.images)?)
        .bind(product.category)
        .bind(product.status)
        .bind(&product.updated_by)
        .bind(product.updated_at)
        .bind(search_text(product))
        .bind(product.brand.to_lowercase())
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }
        Ok(())
    }

    /// Sets the stock level and stamps the actor.
    pub async fn set_stock(
        conn: &mut SqliteConnection,
        id: &str,
        new_stock: i64,
        actor: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET available_stock = ?2, updated_by = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(new_stock)
        .bind(actor)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Sets the lifecycle status and stamps the actor.
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: &str,
        status: ProductStatus,
        actor: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET status = ?2, updated_by = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(status)
        .bind(actor)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
