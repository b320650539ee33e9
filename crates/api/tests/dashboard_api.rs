//! HTTP-level tests for the dashboard page and its task links.

mod common;

use assetdesk_core::permissions::{ASSET_VIEW, MANAGE_SYSTEM};
use assetdesk_db::models::asset::CreateAsset;
use assetdesk_db::models::asset_category::CreateAssetCategory;
use assetdesk_db::models::asset_item::CreateAssetItem;
use assetdesk_db::repositories::{AssetCategoryRepo, AssetItemRepo, AssetRepo, UserRepo};
use axum::http::StatusCode;
use common::{body_json, build_test_app, create_user, get, token_for};
use sqlx::PgPool;

async fn seed_asset(pool: &PgPool, reference_no: &str) -> i64 {
    let input = CreateAsset {
        reference_no: reference_no.to_string(),
        name: format!("Asset {reference_no}"),
        description: None,
        location_id: None,
        acquired_on: None,
    };
    AssetRepo::create(pool, &input, None).await.unwrap().id
}

async fn seed_item(pool: &PgPool, asset_id: i64, category_id: Option<i64>, status: &str) {
    let input = CreateAssetItem {
        category_id,
        name: format!("Item {status}"),
        serial_number: None,
        tag_no: None,
        status: Some(status.to_string()),
    };
    AssetItemRepo::create(pool, asset_id, &input).await.unwrap();
}

#[sqlx::test(migrations = "../db/migrations")]
async fn dashboard_breaks_down_items_and_orders_tasks(pool: PgPool) {
    let admin = create_user(&pool, "boss", &[MANAGE_SYSTEM]).await;
    let laptops = AssetCategoryRepo::create(
        &pool,
        &CreateAssetCategory {
            name: "Laptops".into(),
            description: None,
        },
    )
    .await
    .unwrap();

    let first = seed_asset(&pool, "A-001").await;
    let second = seed_asset(&pool, "A-002").await;
    seed_item(&pool, first, Some(laptops.id), "maintenance").await;
    seed_item(&pool, first, None, "in_use").await;
    seed_item(&pool, second, Some(laptops.id), "Good").await;
    seed_item(&pool, second, None, "scrapped").await;
    let app = build_test_app(pool);

    let response = get(&app.router, "/api/v1/dashboard", Some(&token_for(&admin))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let props = body_json(response).await["props"].clone();

    assert_eq!(
        props["assetStatusStats"],
        serde_json::json!({ "In Use": 2, "Maintenance": 1, "Disposed": 0, "Pending Approval": 0 })
    );
    assert_eq!(props["assetStats"], serde_json::json!({ "Laptops": 2, "Uncategorized": 2 }));
    assert_eq!(props["unclassifiedItems"], 1);
    assert_eq!(props["assetCountCard"], 2);

    let tasks = props["dashboardData"]["tasks"].as_array().unwrap();
    let ids: Vec<&str> = tasks.iter().map(|t| t["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["assets_pending_approval", "assets_maintenance", "new_users"]);
    assert_eq!(tasks[0]["count"], 2);
    assert_eq!(tasks[1]["count"], 1);
    assert_eq!(tasks[2]["count"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn every_task_route_resolves(pool: PgPool) {
    let admin = create_user(&pool, "boss", &[MANAGE_SYSTEM]).await;
    let serviced = seed_asset(&pool, "A-SVC").await;
    let idle = seed_asset(&pool, "A-IDLE").await;
    seed_item(&pool, serviced, None, "maintenance").await;
    seed_item(&pool, idle, None, "in_use").await;
    let app = build_test_app(pool);
    let token = token_for(&admin);

    let response = get(&app.router, "/api/v1/dashboard", Some(&token)).await;
    let json = body_json(response).await;
    let tasks = json["props"]["dashboardData"]["tasks"].as_array().unwrap().clone();
    assert_eq!(tasks.len(), 3);

    for task in &tasks {
        let route = task["route"].as_str().unwrap();
        let response = get(&app.router, &format!("/api/v1{route}"), Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK, "task route {route}");

        if task["id"] == "assets_maintenance" {
            let assets = &body_json(response).await["props"]["assets"];
            assert_eq!(assets["total"], 1);
            assert_eq!(assets["data"][0]["id"], serviced);
        }
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn dashboard_rejects_inactive_and_deleted_users(pool: PgPool) {
    let inactive = create_user(&pool, "sleeper", &[ASSET_VIEW]).await;
    let deleted = create_user(&pool, "gone", &[ASSET_VIEW]).await;
    let inactive_token = token_for(&inactive);
    let deleted_token = token_for(&deleted);
    UserRepo::set_active(&pool, inactive.id, false).await.unwrap();
    UserRepo::delete(&pool, deleted.id).await.unwrap();
    let app = build_test_app(pool);

    let response = get(&app.router, "/api/v1/dashboard", Some(&inactive_token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(&app.router, "/api/v1/dashboard", Some(&deleted_token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
