//! Dashboard count rows.

use serde::Serialize;
use sqlx::FromRow;

/// Headline totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct DashboardSummary {
    pub user_count: i64,
    pub asset_count: i64,
    pub asset_item_count: i64,
    pub category_count: i64,
}
