//! Repository for the `permissions` and `permission_user` tables.

use assetdesk_core::permissions::PermissionRef;
use assetdesk_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::permission::{Permission, UserPermissionRow};

const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Permission lookups and user membership changes.
pub struct PermissionRepo;

impl PermissionRepo {
    /// Every permission, ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Permission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM permissions ORDER BY name");
        sqlx::query_as::<_, Permission>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Permission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM permissions WHERE id = $1");
        sqlx::query_as::<_, Permission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<Permission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM permissions WHERE name = $1");
        sqlx::query_as::<_, Permission>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a name-or-id reference to its row.
    pub async fn resolve(
        pool: &PgPool,
        target: &PermissionRef,
    ) -> Result<Option<Permission>, sqlx::Error> {
        match target {
            PermissionRef::ById(id) => Self::find_by_id(pool, *id).await,
            PermissionRef::ByName(name) => Self::find_by_name(pool, name).await,
        }
    }

    /// Ids from `ids` that match no permission row, in input order.
    pub async fn missing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found: Vec<(DbId,)> = sqlx::query_as("SELECT id FROM permissions WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await?;
        let mut missing = Vec::new();
        for id in ids {
            if !found.iter().any(|(f,)| f == id) && !missing.contains(id) {
                missing.push(*id);
            }
        }
        Ok(missing)
    }

    /// Permissions directly held by one user, ordered by name.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Permission>, sqlx::Error> {
        sqlx::query_as::<_, Permission>(
            "SELECT p.id, p.name, p.description, p.created_at, p.updated_at
             FROM permissions p
             JOIN permission_user pu ON pu.permission_id = p.id
             WHERE pu.user_id = $1
             ORDER BY p.name",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Permissions held by any of `user_ids`, for batch loading list pages.
    pub async fn list_for_users(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<Vec<UserPermissionRow>, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, UserPermissionRow>(
            "SELECT pu.user_id, p.id, p.name
             FROM permission_user pu
             JOIN permissions p ON p.id = pu.permission_id
             WHERE pu.user_id = ANY($1)
             ORDER BY pu.user_id, p.name",
        )
        .bind(user_ids)
        .fetch_all(pool)
        .await
    }

    /// Add direct membership. Returns `true` if a row was inserted,
    /// `false` if the user already held it.
    pub async fn grant(pool: &PgPool, user_id: DbId, permission_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO permission_user (user_id, permission_id) VALUES ($1, $2)
             ON CONFLICT (user_id, permission_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(permission_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove direct membership. Returns `true` if a row was deleted.
    pub async fn revoke(pool: &PgPool, user_id: DbId, permission_id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM permission_user WHERE user_id = $1 AND permission_id = $2")
                .bind(user_id)
                .bind(permission_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace a user's permission set with `permission_ids` in one transaction.
    pub async fn sync(pool: &PgPool, user_id: DbId, permission_ids: &[DbId]) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::sync_in(&mut tx, user_id, permission_ids).await?;
        tx.commit().await
    }

    /// Replace a user's permission set inside the caller's transaction.
    ///
    /// Rows for permissions kept in the set are left untouched, so syncing
    /// the same set twice changes nothing.
    pub async fn sync_in(
        conn: &mut PgConnection,
        user_id: DbId,
        permission_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM permission_user WHERE user_id = $1 AND NOT (permission_id = ANY($2))")
            .bind(user_id)
            .bind(permission_ids)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            "INSERT INTO permission_user (user_id, permission_id)
             SELECT $1, unnest($2::bigint[])
             ON CONFLICT (user_id, permission_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(permission_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
