//! Dashboard statistics: a daily series and a category breakdown.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use stockfast_core::DASHBOARD_WINDOW_DAYS;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// One day of the dashboard chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStat {
    /// `YYYY-MM-DD` (UTC)
    pub date: String,
    pub products: u64,
    pub sales: u64,
    pub alerts: u64,
    pub revenue: i64,
}

/// Sales of one product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub daily: Vec<DailyStat>,
    pub categories: Vec<CategoryStat>,
}

pub struct DashboardService {
    state: AppState,
}

impl DashboardService {
    pub fn new(state: AppState) -> Self {
        DashboardService { state }
    }

    /// Statistics of the window ending today, oldest day first.
    pub async fn stats(&self, now: DateTime<Utc>) -> ApiResult<DashboardStats> {
        let dashboard = self.state.db.dashboard();
        let today = now.date_naive();
        let days = i64::from(DASHBOARD_WINDOW_DAYS);

        let mut daily = Vec::with_capacity(DASHBOARD_WINDOW_DAYS as usize);
        for offset in (0..days).rev() {
            let day = today - Duration::days(offset);
            let start = start_of_day(day)?;
            let totals = dashboard.window_totals(start, start + Duration::days(1)).await?;

            daily.push(DailyStat {
                date: day.format("%Y-%m-%d").to_string(),
                products: totals.products,
                sales: totals.sales,
                alerts: totals.alerts,
                revenue: totals.revenue,
            });
        }

        let since = now - Duration::days(days);
        let categories = dashboard
            .sales_by_category(since)
            .await?
            .into_iter()
            .map(|c| CategoryStat {
                name: c.category.as_str().to_string(),
                value: c.count,
            })
            .collect();

        debug!(days, "Dashboard statistics computed");
        Ok(DashboardStats { daily, categories })
    }
}

fn start_of_day(day: NaiveDate) -> ApiResult<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc())
        .ok_or_else(|| ApiError::internal("Invalid dashboard day"))
}
