//! Handler for the dashboard page.

use std::collections::{BTreeMap, HashMap};

use assetdesk_core::asset_workflow::AssetStatus;
use assetdesk_core::dashboard::{
    compute_asset_statistics, generate_tasks, ItemFact, Task, TaskInputs, NEW_USER_WINDOW_DAYS,
    RECENT_LIMIT,
};
use assetdesk_core::item_status::{StatusBucket, MAINTENANCE};
use assetdesk_core::types::DbId;
use assetdesk_db::models::asset::AssetWithItems;
use assetdesk_db::models::asset_item::AssetItemWithCategory;
use assetdesk_db::models::user::UserResponse;
use assetdesk_db::repositories::{AssetItemRepo, AssetRepo, DashboardRepo, UserRepo};
use axum::extract::{OriginalUri, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::error::AppResult;
use crate::handlers::users::responses_for;
use crate::middleware::permissions::CurrentSubject;
use crate::response::Page;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SummaryCard {
    pub label: &'static str,
    #[serde(rename = "fullName")]
    pub full_name: &'static str,
    pub value: i64,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub summary: Vec<SummaryCard>,
    pub tasks: Vec<Task>,
    pub recommended_actions: Vec<Task>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardProps {
    pub dashboard_data: DashboardData,
    pub user_count_card: i64,
    pub asset_count_card: i64,
    pub asset_stats: BTreeMap<String, i64>,
    pub asset_status_stats: BTreeMap<StatusBucket, i64>,
    /// Items whose status falls in no bucket.
    pub unclassified_items: i64,
    pub recent_assets: Vec<AssetWithItems>,
    pub recent_users: Vec<UserResponse>,
}

/// GET /api/v1/dashboard
///
/// Any active user may view the dashboard.
pub async fn index(
    State(state): State<AppState>,
    CurrentSubject(_subject): CurrentSubject,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<Page<DashboardProps>>> {
    let summary = DashboardRepo::summary(&state.pool).await?;

    let facts = AssetItemRepo::item_facts(&state.pool).await?;
    let stats = compute_asset_statistics(facts.into_iter().map(|row| ItemFact {
        category_name: row.category_name,
        status: row.status,
    }));
    if stats.unclassified > 0 {
        tracing::debug!(unclassified = stats.unclassified, "Items with unmapped status");
    }

    let since = Utc::now() - Duration::days(NEW_USER_WINDOW_DAYS);
    let tasks = generate_tasks(TaskInputs {
        assets_pending_approval: AssetRepo::count_by_status(&state.pool, AssetStatus::PendingApproval)
            .await?,
        items_in_maintenance: AssetItemRepo::count_by_status(&state.pool, MAINTENANCE).await?,
        new_users: UserRepo::count_created_since(&state.pool, since).await?,
    });

    let recent = AssetRepo::recent(&state.pool, RECENT_LIMIT).await?;
    let ids: Vec<DbId> = recent.iter().map(|a| a.id).collect();
    let mut items: HashMap<DbId, Vec<AssetItemWithCategory>> = HashMap::new();
    for item in AssetItemRepo::list_for_assets(&state.pool, &ids).await? {
        items.entry(item.asset_id).or_default().push(item);
    }
    let recent_assets = recent
        .into_iter()
        .map(|asset| AssetWithItems {
            items: items.remove(&asset.id).unwrap_or_default(),
            asset,
        })
        .collect();

    let recent_users =
        responses_for(&state, UserRepo::recent(&state.pool, RECENT_LIMIT).await?).await?;

    let props = DashboardProps {
        dashboard_data: DashboardData {
            summary: vec![
                SummaryCard {
                    label: "Users",
                    full_name: "Total Users",
                    value: summary.user_count,
                    color: "blue",
                },
                SummaryCard {
                    label: "Assets",
                    full_name: "Total Assets",
                    value: summary.asset_count,
                    color: "green",
                },
                SummaryCard {
                    label: "Items",
                    full_name: "Asset Items",
                    value: summary.asset_item_count,
                    color: "purple",
                },
                SummaryCard {
                    label: "Categories",
                    full_name: "Asset Categories",
                    value: summary.category_count,
                    color: "orange",
                },
            ],
            tasks,
            recommended_actions: Vec::new(),
        },
        user_count_card: summary.user_count,
        asset_count_card: summary.asset_count,
        asset_stats: stats.category_counts,
        asset_status_stats: stats.status_counts,
        unclassified_items: stats.unclassified,
        recent_assets,
        recent_users,
    };

    Ok(Json(Page::new("Dashboard", props, uri.to_string())))
}
