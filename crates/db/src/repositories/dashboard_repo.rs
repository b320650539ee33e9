//! Aggregate queries backing the dashboard.

use sqlx::PgPool;

use crate::models::dashboard::DashboardSummary;

pub struct DashboardRepo;

impl DashboardRepo {
    /// Headline totals in a single round trip.
    pub async fn summary(pool: &PgPool) -> Result<DashboardSummary, sqlx::Error> {
        sqlx::query_as::<_, DashboardSummary>(
            "SELECT \
                (SELECT COUNT(*) FROM users) AS user_count, \
                (SELECT COUNT(*) FROM assets) AS asset_count, \
                (SELECT COUNT(*) FROM asset_items) AS asset_item_count, \
                (SELECT COUNT(*) FROM asset_categories) AS category_count",
        )
        .fetch_one(pool)
        .await
    }
}
