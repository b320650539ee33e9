//! Repository for the `users` table.

use assetdesk_core::error::CoreError;
use assetdesk_core::pagination::PageRequest;
use assetdesk_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::user::{CreateUser, UpdateProfile, UpdateUser, User, UserFilter};
use crate::repositories::{search_term, PermissionRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, username, email, password_hash, title, is_active, \
                        created_at, updated_at";

/// Filter clause shared by `list` and its count query.
const FILTER: &str = "($1::text IS NULL \
                        OR name ILIKE '%' || $1 || '%' \
                        OR email ILIKE '%' || $1 || '%') \
                      AND ($2::bool IS NULL OR is_active = $2)";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert(&mut conn, input).await
    }

    /// Insert a user and attach `permission_ids` in one transaction.
    pub async fn create_with_permissions(
        pool: &PgPool,
        input: &CreateUser,
        permission_ids: &[DbId],
    ) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let user = Self::insert(&mut tx, input).await?;
        PermissionRepo::sync_in(&mut tx, user.id, permission_ids).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn insert(conn: &mut PgConnection, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, username, email, password_hash, title, is_active)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.title)
            .bind(input.is_active)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1 ORDER BY id LIMIT 1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Whether another user already uses `email`. `except` excludes the
    /// record being updated.
    pub async fn email_taken(
        pool: &PgPool,
        email: &str,
        except: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM users WHERE email = $1 AND ($2::bigint IS NULL OR id <> $2)
             )",
        )
        .bind(email)
        .bind(except)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// List users matching `filter`, newest first, one page at a time.
    ///
    /// Returns the page rows and the total number of matching rows.
    pub async fn list(
        pool: &PgPool,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), sqlx::Error> {
        let search = search_term(filter.search.as_deref());

        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE {FILTER}
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, User>(&query)
            .bind(search.as_deref())
            .bind(filter.is_active)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM users WHERE {FILTER}");
        let total: (i64,) = sqlx::query_as(&count_query)
            .bind(search.as_deref())
            .bind(filter.is_active)
            .fetch_one(pool)
            .await?;

        Ok((rows, total.0))
    }

    /// Replace the editable columns and, when `permission_ids` is given,
    /// the permission set, in one transaction.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_with_permissions(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
        permission_ids: Option<&[DbId]>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE users SET
                name = $2,
                username = $3,
                email = $4,
                title = $5,
                is_active = COALESCE($6, is_active),
                password_hash = COALESCE($7, password_hash)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.title)
            .bind(input.is_active)
            .bind(input.password_hash.as_deref())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(user) = user else {
            return Ok(None);
        };
        if let Some(ids) = permission_ids {
            PermissionRepo::sync_in(&mut tx, user.id, ids).await?;
        }
        tx.commit().await?;
        Ok(Some(user))
    }

    /// Apply a self-service profile patch. Only non-`None` fields change.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                title = COALESCE($4, title),
                password_hash = COALESCE($5, password_hash)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.email.as_deref())
            .bind(input.title.as_deref())
            .bind(input.password_hash.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Set `is_active` on one user.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET is_active = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }

    /// Set `is_active` on every user in `ids` in one transaction.
    ///
    /// Every id must exist; otherwise nothing changes and the first
    /// missing id is reported. Returns the number of rows updated.
    pub async fn bulk_set_active(
        pool: &PgPool,
        ids: &[DbId],
        is_active: bool,
    ) -> Result<u64, RepoError> {
        let mut wanted = ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();

        let mut tx = pool.begin().await?;
        let found: Vec<(DbId,)> =
            sqlx::query_as("SELECT id FROM users WHERE id = ANY($1) ORDER BY id FOR UPDATE")
                .bind(&wanted)
                .fetch_all(&mut *tx)
                .await?;
        if let Some(missing) = first_missing(&wanted, found.iter().map(|r| r.0)) {
            tx.rollback().await?;
            return Err(CoreError::NotFound {
                entity: "User",
                id: missing,
            }
            .into());
        }

        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = ANY($1)")
            .bind(&wanted)
            .bind(is_active)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user. Permission associations go with it (`ON DELETE CASCADE`).
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Number of users created at or after `since`.
    pub async fn count_created_since(pool: &PgPool, since: Timestamp) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE created_at >= $1")
            .bind(since)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// The `limit` most recently created users.
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC, id DESC LIMIT $1");
        sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

/// First id of the sorted `wanted` list absent from the sorted `found` ids.
pub(crate) fn first_missing(wanted: &[DbId], found: impl Iterator<Item = DbId>) -> Option<DbId> {
    let found: Vec<DbId> = found.collect();
    wanted
        .iter()
        .copied()
        .find(|id| found.binary_search(id).is_err())
}

#[cfg(test)]
mod tests {
    use super::first_missing;

    #[test]
    fn first_missing_finds_gap() {
        assert_eq!(first_missing(&[1, 2, 3], [1, 3].into_iter()), Some(2));
        assert_eq!(first_missing(&[1, 2], [1, 2].into_iter()), None);
        assert_eq!(first_missing(&[], std::iter::empty()), None);
    }
}
