//! Repository for the `asset_maintenance` table.

use assetdesk_core::maintenance::MaintenanceStatus;
use assetdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::maintenance::{CreateMaintenance, Maintenance, UpdateMaintenance};

const COLUMNS: &str = "id, asset_id, asset_item_id, maintenance_type, description, \
                        scheduled_for, completed_at, cost_cents, status, created_by, \
                        created_at, updated_at";

pub struct MaintenanceRepo;

impl MaintenanceRepo {
    /// Record new maintenance in `scheduled`.
    pub async fn create(
        pool: &PgPool,
        asset_id: DbId,
        input: &CreateMaintenance,
        created_by: Option<DbId>,
    ) -> Result<Maintenance, sqlx::Error> {
        let query = format!(
            "INSERT INTO asset_maintenance \
                (asset_id, asset_item_id, maintenance_type, description, scheduled_for, \
                 cost_cents, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Maintenance>(&query)
            .bind(asset_id)
            .bind(input.asset_item_id)
            .bind(&input.maintenance_type)
            .bind(input.description.as_deref())
            .bind(input.scheduled_for)
            .bind(input.cost_cents)
            .bind(MaintenanceStatus::Scheduled.as_str())
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Maintenance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_maintenance WHERE id = $1");
        sqlx::query_as::<_, Maintenance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Maintenance records of one asset, most recently scheduled first.
    pub async fn list_for_asset(
        pool: &PgPool,
        asset_id: DbId,
    ) -> Result<Vec<Maintenance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_maintenance WHERE asset_id = $1 \
             ORDER BY scheduled_for DESC NULLS LAST, id DESC"
        );
        sqlx::query_as::<_, Maintenance>(&query)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }

    /// Patch a record. A move into `completed` stamps `completed_at`.
    ///
    /// Status changes must be checked by the caller first.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMaintenance,
    ) -> Result<Option<Maintenance>, sqlx::Error> {
        let query = format!(
            "UPDATE asset_maintenance SET \
                asset_item_id = COALESCE($2, asset_item_id), \
                maintenance_type = COALESCE($3, maintenance_type), \
                description = COALESCE($4, description), \
                scheduled_for = COALESCE($5, scheduled_for), \
                cost_cents = COALESCE($6, cost_cents), \
                completed_at = CASE \
                    WHEN $7 = 'completed' AND status <> 'completed' THEN NOW() \
                    ELSE completed_at END, \
                status = COALESCE($7, status) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Maintenance>(&query)
            .bind(id)
            .bind(input.asset_item_id)
            .bind(input.maintenance_type.as_deref())
            .bind(input.description.as_deref())
            .bind(input.scheduled_for)
            .bind(input.cost_cents)
            .bind(input.status.map(MaintenanceStatus::as_str))
            .fetch_optional(pool)
            .await
    }

    /// Move an open record to `completed`.
    ///
    /// Returns `None` if the record does not exist or is already closed.
    pub async fn mark_completed(pool: &PgPool, id: DbId) -> Result<Option<Maintenance>, sqlx::Error> {
        let query = format!(
            "UPDATE asset_maintenance SET status = 'completed', completed_at = NOW() \
             WHERE id = $1 AND status IN ('scheduled', 'in_progress') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Maintenance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM asset_maintenance WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
