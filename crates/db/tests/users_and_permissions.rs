//! Integration tests for user CRUD and permission membership.

use assert_matches::assert_matches;
use assetdesk_core::error::CoreError;
use assetdesk_core::pagination::PageRequest;
use assetdesk_core::permissions::{PermissionRef, ASSET_APPROVE, ASSET_VIEW, USER_MANAGE};
use assetdesk_db::error::RepoError;
use assetdesk_db::models::user::{CreateUser, UpdateProfile, UpdateUser, UserFilter};
use assetdesk_db::repositories::{PermissionRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(username: &str) -> CreateUser {
    CreateUser {
        name: format!("{username} Person"),
        username: username.to_string(),
        email: format!("{username}@example.org"),
        password_hash: "$argon2id$placeholder".to_string(),
        title: "Officer".to_string(),
        is_active: true,
    }
}

async fn permission_id(pool: &PgPool, name: &str) -> i64 {
    PermissionRepo::resolve(pool, &PermissionRef::name(name))
        .await
        .unwrap()
        .expect("seeded permission")
        .id
}

async fn association_rows(pool: &PgPool, user_id: i64) -> Vec<(i64, chrono::DateTime<chrono::Utc>)> {
    sqlx::query_as(
        "SELECT permission_id, created_at FROM permission_user WHERE user_id = $1 ORDER BY permission_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn seeded_permissions_are_present(pool: PgPool) {
    let all = PermissionRepo::list_all(&pool).await.unwrap();
    assert_eq!(all.len(), assetdesk_core::permissions::SEEDED_PERMISSIONS.len());
    assert!(assetdesk_db::permissions_provisioned(&pool).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn create_with_permissions_attaches_set(pool: PgPool) {
    let view = permission_id(&pool, ASSET_VIEW).await;
    let manage = permission_id(&pool, USER_MANAGE).await;

    let user = UserRepo::create_with_permissions(&pool, &new_user("amina"), &[view, manage])
        .await
        .unwrap();

    let held = PermissionRepo::list_for_user(&pool, user.id).await.unwrap();
    let names: Vec<&str> = held.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec![ASSET_VIEW, USER_MANAGE]);
}

#[sqlx::test(migrations = "./migrations")]
async fn syncing_same_set_twice_keeps_rows(pool: PgPool) {
    let view = permission_id(&pool, ASSET_VIEW).await;
    let approve = permission_id(&pool, ASSET_APPROVE).await;
    let user = UserRepo::create_with_permissions(&pool, &new_user("bashir"), &[view, approve])
        .await
        .unwrap();

    let before = association_rows(&pool, user.id).await;
    PermissionRepo::sync(&pool, user.id, &[approve, view]).await.unwrap();
    let after = association_rows(&pool, user.id).await;

    assert_eq!(before, after);
}

#[sqlx::test(migrations = "./migrations")]
async fn sync_replaces_membership(pool: PgPool) {
    let view = permission_id(&pool, ASSET_VIEW).await;
    let approve = permission_id(&pool, ASSET_APPROVE).await;
    let user = UserRepo::create_with_permissions(&pool, &new_user("cawo"), &[view])
        .await
        .unwrap();

    PermissionRepo::sync(&pool, user.id, &[approve]).await.unwrap();
    let held: Vec<i64> = association_rows(&pool, user.id).await.into_iter().map(|r| r.0).collect();
    assert_eq!(held, vec![approve]);

    PermissionRepo::sync(&pool, user.id, &[]).await.unwrap();
    assert!(association_rows(&pool, user.id).await.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn grant_and_revoke_report_changes(pool: PgPool) {
    let view = permission_id(&pool, ASSET_VIEW).await;
    let user = UserRepo::create(&pool, &new_user("deeqa")).await.unwrap();

    assert!(PermissionRepo::grant(&pool, user.id, view).await.unwrap());
    assert!(!PermissionRepo::grant(&pool, user.id, view).await.unwrap());
    assert!(PermissionRepo::revoke(&pool, user.id, view).await.unwrap());
    assert!(!PermissionRepo::revoke(&pool, user.id, view).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn missing_ids_reports_unknown_permissions(pool: PgPool) {
    let view = permission_id(&pool, ASSET_VIEW).await;
    let missing = PermissionRepo::missing_ids(&pool, &[view, 90_001, 90_002, 90_001])
        .await
        .unwrap();
    assert_eq!(missing, vec![90_001, 90_002]);
}

#[sqlx::test(migrations = "./migrations")]
async fn email_taken_excludes_self(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("faisal")).await.unwrap();
    assert!(UserRepo::email_taken(&pool, &user.email, None).await.unwrap());
    assert!(!UserRepo::email_taken(&pool, &user.email, Some(user.id)).await.unwrap());
    assert!(!UserRepo::email_taken(&pool, "nobody@example.org", None).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_email_violates_constraint(pool: PgPool) {
    UserRepo::create(&pool, &new_user("ghedi")).await.unwrap();
    let mut dup = new_user("ghedi2");
    dup.email = "ghedi@example.org".to_string();

    let err = UserRepo::create(&pool, &dup).await.unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_users_email"));
}

#[sqlx::test(migrations = "./migrations")]
async fn list_filters_by_search_and_status(pool: PgPool) {
    let hodan = UserRepo::create(&pool, &new_user("hodan")).await.unwrap();
    let mut idil = new_user("idil");
    idil.is_active = false;
    UserRepo::create(&pool, &idil).await.unwrap();

    let filter = UserFilter {
        search: Some("HODAN".to_string()),
        is_active: None,
    };
    let (rows, total) = UserRepo::list(&pool, &filter, PageRequest::default()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].id, hodan.id);
    assert_eq!(rows[0].email, hodan.email);
    assert_eq!(rows[0].name, hodan.name);

    let inactive = UserFilter {
        search: None,
        is_active: Some(false),
    };
    let (rows, total) = UserRepo::list(&pool, &inactive, PageRequest::default()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].username, "idil");
}

#[sqlx::test(migrations = "./migrations")]
async fn list_paginates(pool: PgPool) {
    for i in 0..7 {
        UserRepo::create(&pool, &new_user(&format!("user{i}"))).await.unwrap();
    }
    let (rows, total) = UserRepo::list(&pool, &UserFilter::default(), PageRequest::new(Some(2), Some(5)))
        .await
        .unwrap();
    assert_eq!(total, 7);
    assert_eq!(rows.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_keeps_password_when_not_supplied(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("jama")).await.unwrap();
    let input = UpdateUser {
        name: "Jama Renamed".to_string(),
        username: user.username.clone(),
        email: user.email.clone(),
        title: "Director".to_string(),
        is_active: None,
        password_hash: None,
    };

    let updated = UserRepo::update_with_permissions(&pool, user.id, &input, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Jama Renamed");
    assert_eq!(updated.title, "Director");
    assert_eq!(updated.password_hash, user.password_hash);
    assert!(updated.is_active);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_missing_user_returns_none(pool: PgPool) {
    let input = UpdateUser {
        name: "x".into(),
        username: "x".into(),
        email: "x@example.org".into(),
        title: "x".into(),
        is_active: None,
        password_hash: None,
    };
    let result = UserRepo::update_with_permissions(&pool, 424_242, &input, Some(&[]))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_removes_associations(pool: PgPool) {
    let view = permission_id(&pool, ASSET_VIEW).await;
    let user = UserRepo::create_with_permissions(&pool, &new_user("kaha"), &[view])
        .await
        .unwrap();

    assert!(UserRepo::delete(&pool, user.id).await.unwrap());
    assert!(association_rows(&pool, user.id).await.is_empty());
    assert!(!UserRepo::delete(&pool, user.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn bulk_set_active_is_all_or_nothing(pool: PgPool) {
    let a = UserRepo::create(&pool, &new_user("layla")).await.unwrap();
    let b = UserRepo::create(&pool, &new_user("mahad")).await.unwrap();

    let err = UserRepo::bulk_set_active(&pool, &[a.id, 999_999], false)
        .await
        .unwrap_err();
    assert_matches!(err, RepoError::Rejected(CoreError::NotFound { id: 999_999, .. }));
    assert!(UserRepo::find_by_id(&pool, a.id).await.unwrap().unwrap().is_active);

    let changed = UserRepo::bulk_set_active(&pool, &[a.id, b.id, a.id], false)
        .await
        .unwrap();
    assert_eq!(changed, 2);
    assert!(!UserRepo::find_by_id(&pool, b.id).await.unwrap().unwrap().is_active);
}

#[sqlx::test(migrations = "./migrations")]
async fn search_treats_wildcards_literally(pool: PgPool) {
    let mut underscored = new_user("under");
    underscored.name = "Sahra_Ali".to_string();
    UserRepo::create(&pool, &underscored).await.unwrap();
    UserRepo::create(&pool, &new_user("plain")).await.unwrap();

    let filter = |term: &str| UserFilter {
        search: Some(term.to_string()),
        is_active: None,
    };
    let (rows, total) = UserRepo::list(&pool, &filter("_"), PageRequest::default()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].username, "under");

    let (_, total) = UserRepo::list(&pool, &filter("%"), PageRequest::default()).await.unwrap();
    assert_eq!(total, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn profile_patch_sets_password_with_the_other_fields(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("ayaan")).await.unwrap();
    let patch = UpdateProfile {
        title: Some("Manager".to_string()),
        password_hash: Some("$argon2id$new".to_string()),
        ..UpdateProfile::default()
    };
    let updated = UserRepo::update_profile(&pool, user.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.title, "Manager");
    assert_eq!(updated.password_hash, "$argon2id$new");
    assert_eq!(updated.name, user.name);
}

#[sqlx::test(migrations = "./migrations")]
async fn failed_profile_patch_keeps_old_password(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("farah")).await.unwrap();
    let other = UserRepo::create(&pool, &new_user("warsame")).await.unwrap();
    let patch = UpdateProfile {
        email: Some(other.email.clone()),
        password_hash: Some("$argon2id$new".to_string()),
        ..UpdateProfile::default()
    };
    assert!(UserRepo::update_profile(&pool, user.id, &patch).await.is_err());

    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.password_hash, user.password_hash);
    assert_eq!(reloaded.email, user.email);
}
