//! Integration tests for asset CRUD and the approval workflow.

use assert_matches::assert_matches;
use assetdesk_core::asset_workflow::{AssetStatus, WorkflowAction};
use assetdesk_core::error::CoreError;
use assetdesk_core::pagination::PageRequest;
use assetdesk_db::error::RepoError;
use assetdesk_db::models::asset::{AssetFilter, CreateAsset, UpdateAsset};
use assetdesk_db::models::asset_item::{AssetItemFilter, CreateAssetItem};
use assetdesk_db::models::user::CreateUser;
use assetdesk_db::repositories::{AssetItemRepo, AssetRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn actor(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Approver".into(),
            username: "approver".into(),
            email: "approver@example.org".into(),
            password_hash: "hash".into(),
            title: "Lead".into(),
            is_active: true,
        },
    )
    .await
    .unwrap()
    .id
}

fn new_asset(reference_no: &str) -> CreateAsset {
    CreateAsset {
        reference_no: reference_no.to_string(),
        name: format!("Asset {reference_no}"),
        description: None,
        location_id: None,
        acquired_on: None,
    }
}

async fn status_of(pool: &PgPool, id: i64) -> String {
    AssetRepo::find_by_id(pool, id).await.unwrap().unwrap().status
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn new_assets_start_pending(pool: PgPool) {
    let asset = AssetRepo::create(&pool, &new_asset("A-001"), None).await.unwrap();
    assert_eq!(asset.workflow_status().unwrap(), AssetStatus::PendingApproval);
}

#[sqlx::test(migrations = "./migrations")]
async fn created_asset_appears_in_filtered_list(pool: PgPool) {
    let asset = AssetRepo::create(&pool, &new_asset("A-LIST"), None).await.unwrap();
    AssetRepo::create(&pool, &new_asset("B-OTHER"), None).await.unwrap();

    let filter = AssetFilter {
        search: Some("a-list".into()),
        ..AssetFilter::default()
    };
    let (rows, total) = AssetRepo::list(&pool, &filter, PageRequest::default()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0], asset);
}

#[sqlx::test(migrations = "./migrations")]
async fn list_filters_by_item_status(pool: PgPool) {
    let serviced = AssetRepo::create(&pool, &new_asset("A-SVC"), None).await.unwrap();
    let idle = AssetRepo::create(&pool, &new_asset("A-IDLE"), None).await.unwrap();
    for (asset_id, status) in [(serviced.id, "maintenance"), (serviced.id, "in_use"), (idle.id, "in_use")] {
        let item = CreateAssetItem {
            category_id: None,
            name: format!("Item {status}"),
            serial_number: None,
            tag_no: None,
            status: Some(status.to_string()),
        };
        AssetItemRepo::create(&pool, asset_id, &item).await.unwrap();
    }

    let filter = AssetFilter {
        item_status: Some("maintenance".into()),
        ..AssetFilter::default()
    };
    let (rows, total) = AssetRepo::list(&pool, &filter, PageRequest::default()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].id, serviced.id);

    let filter = AssetFilter {
        item_status: Some("in_use".into()),
        ..AssetFilter::default()
    };
    let (_, total) = AssetRepo::list(&pool, &filter, PageRequest::default()).await.unwrap();
    assert_eq!(total, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn search_escapes_like_wildcards(pool: PgPool) {
    AssetRepo::create(&pool, &new_asset("INV_01"), None).await.unwrap();
    AssetRepo::create(&pool, &new_asset("INVX01"), None).await.unwrap();

    let filter = AssetFilter {
        search: Some("inv_".into()),
        ..AssetFilter::default()
    };
    let (rows, total) = AssetRepo::list(&pool, &filter, PageRequest::default()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].reference_no, "INV_01");
}

#[sqlx::test(migrations = "./migrations")]
async fn update_leaves_status_alone(pool: PgPool) {
    let asset = AssetRepo::create(&pool, &new_asset("A-002"), None).await.unwrap();
    let updated = AssetRepo::update(
        &pool,
        asset.id,
        &UpdateAsset {
            name: Some("Generator".into()),
            ..UpdateAsset::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "Generator");
    assert_eq!(updated.reference_no, "A-002");
    assert_eq!(updated.status, "pending_approval");
}

#[sqlx::test(migrations = "./migrations")]
async fn approve_then_review_records_history(pool: PgPool) {
    let actor_id = actor(&pool).await;
    let asset = AssetRepo::create(&pool, &new_asset("A-003"), None).await.unwrap();

    let approved = AssetRepo::apply_transition(&pool, asset.id, WorkflowAction::Approve, actor_id, Some("ok"))
        .await
        .unwrap();
    assert_eq!(approved.status, "approved");
    assert_eq!(approved.approved_by, Some(actor_id));
    assert!(approved.approved_at.is_some());

    let reviewed = AssetRepo::apply_transition(&pool, asset.id, WorkflowAction::Review, actor_id, None)
        .await
        .unwrap();
    assert_eq!(reviewed.status, "reviewed");
    assert_eq!(reviewed.reviewed_by, Some(actor_id));

    let history = AssetRepo::list_transitions(&pool, asset.id).await.unwrap();
    let steps: Vec<(&str, &str)> = history
        .iter()
        .map(|t| (t.from_status.as_str(), t.to_status.as_str()))
        .collect();
    assert_eq!(steps, vec![("pending_approval", "approved"), ("approved", "reviewed")]);
    assert_eq!(history[0].comment.as_deref(), Some("ok"));
}

#[sqlx::test(migrations = "./migrations")]
async fn illegal_transition_is_conflict_and_writes_nothing(pool: PgPool) {
    let actor_id = actor(&pool).await;
    let asset = AssetRepo::create(&pool, &new_asset("A-004"), None).await.unwrap();

    let err = AssetRepo::apply_transition(&pool, asset.id, WorkflowAction::Review, actor_id, None)
        .await
        .unwrap_err();
    assert_matches!(err, RepoError::Rejected(CoreError::Conflict(_)));
    assert_eq!(status_of(&pool, asset.id).await, "pending_approval");
    assert!(AssetRepo::list_transitions(&pool, asset.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn transition_on_missing_asset_is_not_found(pool: PgPool) {
    let actor_id = actor(&pool).await;
    let err = AssetRepo::apply_transition(&pool, 777_777, WorkflowAction::Approve, actor_id, None)
        .await
        .unwrap_err();
    assert_matches!(err, RepoError::Rejected(CoreError::NotFound { entity: "Asset", id: 777_777 }));
}

#[sqlx::test(migrations = "./migrations")]
async fn rejected_asset_can_be_restored_and_approved(pool: PgPool) {
    let actor_id = actor(&pool).await;
    let asset = AssetRepo::create(&pool, &new_asset("A-005"), None).await.unwrap();

    AssetRepo::apply_transition(&pool, asset.id, WorkflowAction::Reject, actor_id, Some("missing receipt"))
        .await
        .unwrap();
    let restored = AssetRepo::apply_transition(&pool, asset.id, WorkflowAction::Restore, actor_id, None)
        .await
        .unwrap();
    assert_eq!(restored.status, "restored");

    let approved = AssetRepo::apply_transition(&pool, asset.id, WorkflowAction::Approve, actor_id, None)
        .await
        .unwrap();
    assert_eq!(approved.status, "approved");
}

#[sqlx::test(migrations = "./migrations")]
async fn bulk_approve_with_unknown_id_changes_nothing(pool: PgPool) {
    let actor_id = actor(&pool).await;
    let a = AssetRepo::create(&pool, &new_asset("B-001"), None).await.unwrap();
    let b = AssetRepo::create(&pool, &new_asset("B-002"), None).await.unwrap();

    let err = AssetRepo::bulk_approve(&pool, &[a.id, b.id, 555_555], actor_id, None)
        .await
        .unwrap_err();
    assert_matches!(err, RepoError::Rejected(CoreError::NotFound { id: 555_555, .. }));

    assert_eq!(status_of(&pool, a.id).await, "pending_approval");
    assert_eq!(status_of(&pool, b.id).await, "pending_approval");
    assert!(AssetRepo::list_transitions(&pool, a.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn bulk_approve_counts_only_transitioned_rows(pool: PgPool) {
    let actor_id = actor(&pool).await;
    let pending = AssetRepo::create(&pool, &new_asset("C-001"), None).await.unwrap();
    let already = AssetRepo::create(&pool, &new_asset("C-002"), None).await.unwrap();
    let rejected = AssetRepo::create(&pool, &new_asset("C-003"), None).await.unwrap();
    AssetRepo::apply_transition(&pool, already.id, WorkflowAction::Approve, actor_id, None)
        .await
        .unwrap();
    AssetRepo::apply_transition(&pool, rejected.id, WorkflowAction::Reject, actor_id, None)
        .await
        .unwrap();

    let count = AssetRepo::bulk_approve(
        &pool,
        &[pending.id, already.id, rejected.id, pending.id],
        actor_id,
        None,
    )
    .await
    .unwrap();

    assert_eq!(count, 1);
    assert_eq!(status_of(&pool, pending.id).await, "approved");
    assert_eq!(status_of(&pool, rejected.id).await, "rejected");
    assert_eq!(
        AssetRepo::count_by_status(&pool, AssetStatus::Approved).await.unwrap(),
        2
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn items_default_to_in_use_and_cascade(pool: PgPool) {
    let asset = AssetRepo::create(&pool, &new_asset("D-001"), None).await.unwrap();
    let item = AssetItemRepo::create(
        &pool,
        asset.id,
        &CreateAssetItem {
            category_id: None,
            name: "Laptop".into(),
            serial_number: Some("SN-1".into()),
            tag_no: None,
            status: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(item.status, "in_use");

    let filter = AssetItemFilter {
        asset_id: Some(asset.id),
        ..AssetItemFilter::default()
    };
    let (rows, total) = AssetItemRepo::list(&pool, &filter, PageRequest::default()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].category_name, None);

    assert!(AssetRepo::delete(&pool, asset.id).await.unwrap());
    assert!(AssetItemRepo::find_by_id(&pool, item.id).await.unwrap().is_none());
}
