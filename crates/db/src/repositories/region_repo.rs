//! Repository for the `regions` table.

use assetdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::location::Region;

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct RegionRepo;

impl RegionRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<Region>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM regions ORDER BY name");
        sqlx::query_as::<_, Region>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Region>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM regions WHERE id = $1");
        sqlx::query_as::<_, Region>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a region, or return the existing row with the same name.
    pub async fn create_or_get(pool: &PgPool, name: &str) -> Result<Region, sqlx::Error> {
        let query = format!(
            "WITH inserted AS ( \
                INSERT INTO regions (name) VALUES ($1) \
                ON CONFLICT (name) DO NOTHING \
                RETURNING {COLUMNS} \
             ) \
             SELECT {COLUMNS} FROM inserted \
             UNION ALL \
             SELECT {COLUMNS} FROM regions WHERE name = $1 \
             LIMIT 1"
        );
        sqlx::query_as::<_, Region>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }
}
