//! Database operations for the `schools` table.

use chrono::{DateTime, Utc};
use granthub_core::SchoolConfig;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `schools` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SchoolRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub abbreviation: Option<String>,
    pub description: Option<String>,
    pub mission_keywords: Vec<String>,
    pub eligibility_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all schools, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_schools(pool: &PgPool) -> Result<Vec<SchoolRow>, DbError> {
    let rows = sqlx::query_as::<_, SchoolRow>(
        "SELECT id, public_id, name, abbreviation, description, mission_keywords, \
                eligibility_notes, created_at, updated_at \
         FROM schools \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single school by exact name, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_school_by_name(pool: &PgPool, name: &str) -> Result<Option<SchoolRow>, DbError> {
    let row = sqlx::query_as::<_, SchoolRow>(
        "SELECT id, public_id, name, abbreviation, description, mission_keywords, \
                eligibility_notes, created_at, updated_at \
         FROM schools \
         WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Upsert school profiles from config into the database.
///
/// Returns the number of schools processed (inserted or updated). All upserts
/// run inside a single transaction; if any fails the batch is rolled back.
/// Schools missing from config are left in place.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_schools(pool: &PgPool, schools: &[SchoolConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for school in schools {
        sqlx::query(
            "INSERT INTO schools (name, abbreviation, description, mission_keywords, eligibility_notes) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (name) DO UPDATE SET \
                 abbreviation      = EXCLUDED.abbreviation, \
                 description       = EXCLUDED.description, \
                 mission_keywords  = EXCLUDED.mission_keywords, \
                 eligibility_notes = EXCLUDED.eligibility_notes, \
                 updated_at        = NOW()",
        )
        .bind(&school.name)
        .bind(&school.abbreviation)
        .bind(&school.description)
        .bind(&school.priority_keywords)
        .bind(&school.eligibility_notes)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
