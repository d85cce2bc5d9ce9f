//! # Dashboard Repository
//!
//! Read-only aggregations over half-open time windows `[start, end)`.
//!
//! ```text
//! day_totals(start, end)
//!     ├── products created   ┐
//!     ├── sales count        │ independent reads,
//!     ├── alerts raised      │ run concurrently
//!     └── revenue            ┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::error::DbResult;
use stockfast_core::ProductCategory;

/// Aggregates of one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowTotals {
    pub products: u64,
    pub sales: u64,
    pub alerts: u64,
    pub revenue: i64,
}

/// Units of sales per category.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CategoryCount {
    pub category: ProductCategory,
    pub count: i64,
}

#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    pub async fn products_created(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE created_at >= ?1 AND created_at < ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    pub async fn sales_count(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE sold_at >= ?1 AND sold_at < ?2")
                .bind(start)
                .bind(end)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }

    pub async fn alerts_raised(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock_alerts WHERE created_at >= ?1 AND created_at < ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    /// Sum of sale totals, 0 when there were none.
    pub async fn revenue(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<i64> {
        let sum: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount), 0) FROM sales WHERE sold_at >= ?1 AND sold_at < ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(sum)
    }

    /// The four window aggregates, queried concurrently.
    pub async fn window_totals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<WindowTotals> {
        let (products, sales, alerts, revenue) = tokio::try_join!(
            self.products_created(start, end),
            self.sales_count(start, end),
            self.alerts_raised(start, end),
            self.revenue(start, end),
        )?;

        Ok(WindowTotals {
            products,
            sales,
            alerts,
            revenue,
        })
    }

    /// Number of sales per product category since `since`, largest first.
    pub async fn sales_by_category(&self, since: DateTime<Utc>) -> DbResult<Vec<CategoryCount>> {
        let rows = sqlx::query_as::<_, CategoryCount>(
            r#"
            SELECT p.category AS category, COUNT(s.id) AS count
            FROM sales s
            INNER JOIN products p ON p.id = s.product_id
            WHERE s.sold_at >= ?1
            GROUP BY p.category
            ORDER BY count DESC, p.category ASC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::ProductRepository;
    use crate::repository::sale::SaleRepository;
    use crate::repository::test_support::{product, seed_user, test_db};
    use chrono::Duration;
    use stockfast_core::Sale;

    #[tokio::test]
    async fn test_window_totals_and_categories() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let now = Utc::now();
        let p = product(&user, "iPhone 15", "123456789012345", 10, 5);

        let mut conn = db.pool().acquire().await.unwrap();
        ProductRepository::insert(&mut conn, &p).await.unwrap();
        for (i, qty) in [1_i64, 2].iter().enumerate() {
            let sale = Sale {
                id: format!("sale-{}", i),
                product_id: p.id.clone(),
                quantity: *qty,
                unit_price: p.selling_price,
                total_amount: p.selling_price * qty,
                sold_by: user.clone(),
                sold_at: now,
            };
            SaleRepository::insert(&mut conn, &sale).await.unwrap();
        }
        drop(conn);

        let start = now - Duration::hours(1);
        let end = now + Duration::hours(1);
        let totals = db.dashboard().window_totals(start, end).await.unwrap();
        assert_eq!(totals.products, 1);
        assert_eq!(totals.sales, 2);
        assert_eq!(totals.alerts, 0);
        assert_eq!(totals.revenue, 650_000 * 3);

        let empty = db
            .dashboard()
            .window_totals(end, end + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(empty, WindowTotals::default());

        let categories = db.dashboard().sales_by_category(start).await.unwrap();
        assert_eq!(
            categories,
            vec![CategoryCount {
                category: ProductCategory::Phone,
                count: 2
            }]
        );
    }
}
