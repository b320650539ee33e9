//! Repository for `assets` and their workflow history.
//!
//! Workflow transitions lock the asset row, check the move against
//! [`assetdesk_core::asset_workflow::transition`], update the row and append
//! an `asset_transitions` entry, all in one transaction.

use assetdesk_core::asset_workflow::{self, AssetStatus, WorkflowAction};
use assetdesk_core::error::CoreError;
use assetdesk_core::pagination::PageRequest;
use assetdesk_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::asset::{Asset, AssetFilter, AssetTransition, CreateAsset, UpdateAsset};
use crate::repositories::search_term;
use crate::repositories::user_repo::first_missing;

/// Column list for `assets` queries.
const COLUMNS: &str = "\
    id, reference_no, name, description, location_id, acquired_on, \
    status, status_comment, created_by, approved_by, approved_at, \
    reviewed_by, reviewed_at, created_at, updated_at";

/// Column list for `asset_transitions` queries.
const TRANSITION_COLUMNS: &str = "id, asset_id, from_status, to_status, actor_id, comment, created_at";

/// Filter clause shared by `list` and its count query.
const FILTER: &str = "\
    ($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR reference_no ILIKE '%' || $1 || '%') \
    AND ($2::text[] IS NULL OR status = ANY($2)) \
    AND ($3::bigint IS NULL OR location_id = $3) \
    AND ($4::text IS NULL OR EXISTS ( \
        SELECT 1 FROM asset_items ai WHERE ai.asset_id = assets.id AND ai.status = $4))";

/// Provides CRUD and workflow operations for assets.
pub struct AssetRepo;

impl AssetRepo {
    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Register a new asset in `pending_approval`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAsset,
        created_by: Option<DbId>,
    ) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (reference_no, name, description, location_id, acquired_on, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(&input.reference_no)
            .bind(&input.name)
            .bind(input.description.as_deref())
            .bind(input.location_id)
            .bind(input.acquired_on)
            .bind(AssetStatus::PendingApproval.as_str())
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1");
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List assets matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &AssetFilter,
        page: PageRequest,
    ) -> Result<(Vec<Asset>, i64), sqlx::Error> {
        let search = search_term(filter.search.as_deref());
        let item_status = filter
            .item_status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let query = format!(
            "SELECT {COLUMNS} FROM assets WHERE {FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, Asset>(&query)
            .bind(search.as_deref())
            .bind(filter.statuses.as_deref())
            .bind(filter.location_id)
            .bind(item_status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM assets WHERE {FILTER}");
        let total: (i64,) = sqlx::query_as(&count_query)
            .bind(search.as_deref())
            .bind(filter.statuses.as_deref())
            .bind(filter.location_id)
            .bind(item_status)
            .fetch_one(pool)
            .await?;

        Ok((rows, total.0))
    }

    /// Update descriptive columns. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAsset,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET \
                reference_no = COALESCE($2, reference_no), \
                name = COALESCE($3, name), \
                description = COALESCE($4, description), \
                location_id = COALESCE($5, location_id), \
                acquired_on = COALESCE($6, acquired_on) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(input.reference_no.as_deref())
            .bind(input.name.as_deref())
            .bind(input.description.as_deref())
            .bind(input.location_id)
            .bind(input.acquired_on)
            .fetch_optional(pool)
            .await
    }

    /// Delete an asset. Items, documents, maintenance and history cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_status(pool: &PgPool, status: AssetStatus) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM assets WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// The `limit` most recently created assets.
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets ORDER BY created_at DESC, id DESC LIMIT $1");
        sqlx::query_as::<_, Asset>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Workflow
    // -----------------------------------------------------------------------

    /// Apply `action` to one asset.
    ///
    /// Fails with `NotFound` if the asset does not exist and `Conflict` if
    /// the move is not legal from its current status. Either way nothing
    /// is written.
    pub async fn apply_transition(
        pool: &PgPool,
        id: DbId,
        action: WorkflowAction,
        actor_id: DbId,
        comment: Option<&str>,
    ) -> Result<Asset, RepoError> {
        let mut tx = pool.begin().await?;

        let current: Option<(String,)> =
            sqlx::query_as("SELECT status FROM assets WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((raw,)) = current else {
            return Err(CoreError::NotFound { entity: "Asset", id }.into());
        };
        let from: AssetStatus = raw.parse()?;
        let to = asset_workflow::transition(from, action)?;

        let asset = Self::write_transition(&mut tx, id, from, to, actor_id, comment).await?;
        tx.commit().await?;

        tracing::info!(asset_id = id, from = %from, to = %to, actor_id, "Asset transitioned");
        Ok(asset)
    }

    /// Approve every asset in `ids` that is awaiting a decision, in one
    /// transaction.
    ///
    /// If any id does not exist the whole batch is rolled back with
    /// `NotFound`. Ids in other statuses are skipped. Returns the number
    /// of assets approved.
    pub async fn bulk_approve(
        pool: &PgPool,
        ids: &[DbId],
        actor_id: DbId,
        comment: Option<&str>,
    ) -> Result<u64, RepoError> {
        let mut wanted = ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();

        let mut tx = pool.begin().await?;
        let rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT id, status FROM assets WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&wanted)
        .fetch_all(&mut *tx)
        .await?;

        if let Some(missing) = first_missing(&wanted, rows.iter().map(|r| r.0)) {
            tx.rollback().await?;
            return Err(CoreError::NotFound {
                entity: "Asset",
                id: missing,
            }
            .into());
        }

        let mut approved = 0u64;
        for (id, raw) in rows {
            let from: AssetStatus = raw.parse()?;
            let Ok(to) = asset_workflow::transition(from, WorkflowAction::Approve) else {
                tracing::debug!(asset_id = id, status = %from, "Skipping asset not awaiting approval");
                continue;
            };
            Self::write_transition(&mut tx, id, from, to, actor_id, comment).await?;
            approved += 1;
        }

        tx.commit().await?;
        tracing::info!(requested = wanted.len(), approved, actor_id, "Bulk approve finished");
        Ok(approved)
    }

    /// Update the status columns and append the history row.
    async fn write_transition(
        conn: &mut PgConnection,
        id: DbId,
        from: AssetStatus,
        to: AssetStatus,
        actor_id: DbId,
        comment: Option<&str>,
    ) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET \
                status = $2, \
                status_comment = $3, \
                approved_by = CASE WHEN $2 = 'approved' THEN $4 ELSE approved_by END, \
                approved_at = CASE WHEN $2 = 'approved' THEN NOW() ELSE approved_at END, \
                reviewed_by = CASE WHEN $2 = 'reviewed' THEN $4 ELSE reviewed_by END, \
                reviewed_at = CASE WHEN $2 = 'reviewed' THEN NOW() ELSE reviewed_at END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let asset = sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(to.as_str())
            .bind(comment)
            .bind(actor_id)
            .fetch_one(&mut *conn)
            .await?;

        sqlx::query(
            "INSERT INTO asset_transitions (asset_id, from_status, to_status, actor_id, comment) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(actor_id)
        .bind(comment)
        .execute(&mut *conn)
        .await?;

        Ok(asset)
    }

    /// Workflow history for one asset, oldest first.
    pub async fn list_transitions(
        pool: &PgPool,
        asset_id: DbId,
    ) -> Result<Vec<AssetTransition>, sqlx::Error> {
        let query = format!(
            "SELECT {TRANSITION_COLUMNS} FROM asset_transitions \
             WHERE asset_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, AssetTransition>(&query)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }
}
