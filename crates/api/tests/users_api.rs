//! HTTP-level tests for `/settings/users` and `/profile`.

mod common;

use assetdesk_core::permissions::{ASSET_EDIT, ASSET_VIEW, USER_MANAGE};
use assetdesk_db::repositories::{PermissionRepo, UserRepo};
use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_user, delete, get, post_json, put_json, send_json,
    token_for, TEST_PASSWORD,
};
use sqlx::PgPool;

fn new_user_form(username: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "New Person",
        "username": username,
        "email": format!("{username}@example.com"),
        "password": "long-enough-pw",
        "title": "Clerk",
        "is_active": true,
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn user_management_requires_permission(pool: PgPool) {
    let viewer = create_user(&pool, "viewer", &[ASSET_VIEW]).await;
    let app = build_test_app(pool);

    let response = get(&app.router, "/api/v1/settings/users", Some(&token_for(&viewer))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_then_list_users(pool: PgPool) {
    let manager = create_user(&pool, "manager", &[USER_MANAGE]).await;
    let token = token_for(&manager);
    let view = PermissionRepo::find_by_name(&pool, ASSET_VIEW).await.unwrap().unwrap();
    let app = build_test_app(pool);

    let mut form = new_user_form("newbie");
    form["permissions"] = serde_json::json!([view.id]);
    let response = post_json(&app.router, "/api/v1/settings/users", Some(&token), form).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["permissions"][0]["name"], ASSET_VIEW);

    let response = get(
        &app.router,
        "/api/v1/settings/users?search=newbie&status=active",
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["component"], "User/Index");
    assert_eq!(json["props"]["users"]["total"], 1);
    assert_eq!(json["props"]["users"]["data"][0]["username"], "newbie");
    assert_eq!(json["props"]["filters"]["search"], "newbie");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_form_reports_every_field(pool: PgPool) {
    let manager = create_user(&pool, "manager", &[USER_MANAGE]).await;
    let app = build_test_app(pool);

    let form = serde_json::json!({ "email": "not-an-email", "password": "short" });
    let response =
        post_json(&app.router, "/api/v1/settings/users", Some(&token_for(&manager)), form).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    let fields = &json["fields"];
    assert!(fields["name"].is_array());
    assert!(fields["username"].is_array());
    assert!(fields["email"].is_array());
    assert!(fields["password"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_email_is_a_field_error(pool: PgPool) {
    let manager = create_user(&pool, "manager", &[USER_MANAGE]).await;
    let app = build_test_app(pool);

    let mut form = new_user_form("twin");
    form["email"] = serde_json::json!("manager@test.com");
    let response =
        post_json(&app.router, "/api/v1/settings/users", Some(&token_for(&manager)), form).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["fields"]["email"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cannot_delete_own_account(pool: PgPool) {
    let manager = create_user(&pool, "manager", &[USER_MANAGE]).await;
    let app = build_test_app(pool.clone());

    let uri = format!("/api/v1/settings/users/{}", manager.id);
    let response = delete(&app.router, &uri, &token_for(&manager)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(UserRepo::find_by_id(&pool, manager.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_other_user(pool: PgPool) {
    let manager = create_user(&pool, "manager", &[USER_MANAGE]).await;
    let victim = create_user(&pool, "victim", &[]).await;
    let app = build_test_app(pool.clone());
    let token = token_for(&manager);

    let uri = format!("/api/v1/settings/users/{}", victim.id);
    assert_eq!(delete(&app.router, &uri, &token).await.status(), StatusCode::OK);
    assert_eq!(delete(&app.router, &uri, &token).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn legacy_store_updates_in_place(pool: PgPool) {
    let manager = create_user(&pool, "manager", &[USER_MANAGE]).await;
    let target = create_user(&pool, "target", &[ASSET_VIEW, ASSET_EDIT]).await;
    let app = build_test_app(pool.clone());
    let token = token_for(&manager);

    let form = serde_json::json!({
        "id": target.id,
        "name": "Renamed",
        "username": "target",
        "email": "target@test.com",
        "title": "Lead",
    });
    for _ in 0..2 {
        let response =
            post_json(&app.router, "/api/v1/settings/users/store", Some(&token), form.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(UserRepo::count(&pool).await.unwrap(), 2);
    let stored = UserRepo::find_by_id(&pool, target.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Renamed");
    assert!(stored.is_active);

    // No permissions field: the set is cleared.
    let response = get(
        &app.router,
        &format!("/api/v1/settings/users/{}/permissions", target.id),
        Some(&token),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"], serde_json::json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bulk_toggle_rejects_empty_ids(pool: PgPool) {
    let manager = create_user(&pool, "manager", &[USER_MANAGE]).await;
    let app = build_test_app(pool);

    let body = serde_json::json!({ "user_ids": [], "is_active": false });
    let response = post_json(
        &app.router,
        "/api/v1/settings/users/bulk-toggle-status",
        Some(&token_for(&manager)),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reset_password_allows_new_login(pool: PgPool) {
    let manager = create_user(&pool, "manager", &[USER_MANAGE]).await;
    let target = create_user(&pool, "forgetful", &[]).await;
    let app = build_test_app(pool);

    let uri = format!("/api/v1/settings/users/{}/reset-password", target.id);
    let body = serde_json::json!({ "password": "brand-new-secret" });
    let response = post_json(&app.router, &uri, Some(&token_for(&manager)), body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let login = serde_json::json!({ "username": "forgetful", "password": TEST_PASSWORD });
    let response = post_json(&app.router, "/api/v1/auth/login", None, login).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let login = serde_json::json!({ "username": "forgetful", "password": "brand-new-secret" });
    let response = post_json(&app.router, "/api/v1/auth/login", None, login).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn grant_and_revoke_by_name(pool: PgPool) {
    let manager = create_user(&pool, "manager", &[USER_MANAGE]).await;
    let target = create_user(&pool, "target", &[]).await;
    let app = build_test_app(pool);
    let token = token_for(&manager);

    let grant = format!("/api/v1/settings/users/{}/grant-permission", target.id);
    let body = serde_json::json!({ "permission": ASSET_VIEW });
    let json = body_json(post_json(&app.router, &grant, Some(&token), body.clone()).await).await;
    assert_eq!(json["data"]["changed"], true);
    let json = body_json(post_json(&app.router, &grant, Some(&token), body.clone()).await).await;
    assert_eq!(json["data"]["changed"], false);

    let revoke = format!("/api/v1/settings/users/{}/revoke-permission", target.id);
    let json = body_json(post_json(&app.router, &revoke, Some(&token), body).await).await;
    assert_eq!(json["data"]["changed"], true);

    let unknown = serde_json::json!({ "permission": "does-not-exist" });
    let response = post_json(&app.router, &grant, Some(&token), unknown).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn profile_password_change_needs_current_password(pool: PgPool) {
    let user = create_user(&pool, "selfie", &[]).await;
    let app = build_test_app(pool);
    let token = token_for(&user);

    let body = serde_json::json!({ "current_password": "wrong", "password": "another-password" });
    let response =
        send_json(&app.router, axum::http::Method::PATCH, "/api/v1/profile", Some(&token), body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["fields"]["current_password"].is_array());

    let body = serde_json::json!({ "current_password": TEST_PASSWORD, "password": "another-password", "title": "Owner" });
    let response =
        send_json(&app.router, axum::http::Method::PATCH, "/api/v1/profile", Some(&token), body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app.router, "/api/v1/profile", Some(&token)).await;
    let json = body_json(response).await;
    assert_eq!(json["component"], "Profile/Edit");
    assert_eq!(json["props"]["user"]["title"], "Owner");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_keeps_permissions_when_omitted(pool: PgPool) {
    let manager = create_user(&pool, "manager", &[USER_MANAGE]).await;
    let target = create_user(&pool, "keeper", &[ASSET_VIEW]).await;
    let app = build_test_app(pool);
    let token = token_for(&manager);

    let form = serde_json::json!({
        "name": "Keeper",
        "username": "keeper",
        "email": "keeper@test.com",
        "title": "Same",
    });
    let uri = format!("/api/v1/settings/users/{}", target.id);
    let response = put_json(&app.router, &uri, &token, form).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["permissions"][0]["name"], ASSET_VIEW);
}
