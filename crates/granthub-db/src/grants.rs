//! Database operations for the `grants` table.

use chrono::{DateTime, NaiveDate, Utc};
use granthub_core::NewGrant;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A grant joined with the name of the school it was found for.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GrantRow {
    pub id: i64,
    pub public_id: Uuid,
    pub school_id: i64,
    pub school_name: String,
    pub title: String,
    pub description: String,
    pub source_url: String,
    pub funder: String,
    /// `NULL` when no deadline could be extracted.
    pub deadline: Option<NaiveDate>,
    pub amount_text: Option<String>,
    pub amount_value: Option<Decimal>,
    pub eligibility: Option<String>,
    pub relevance_score: i32,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Whether an upsert created a new grant or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Stored,
    Updated,
}

/// Input filters for grant listing. Both filters are optional and combine
/// with AND.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantFilters<'a> {
    /// Exact school name.
    pub school_name: Option<&'a str>,
    /// Case-insensitive substring of the title.
    pub title_query: Option<&'a str>,
}

const GRANT_COLUMNS: &str = "g.id, g.public_id, g.school_id, s.name AS school_name, g.title, \
     g.description, g.source_url, g.funder, g.deadline, g.amount_text, g.amount_value, \
     g.eligibility, g.relevance_score, g.first_seen_at, g.last_seen_at";

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Insert a grant, or refresh the existing row for the same
/// `(school, source_url)`.
///
/// On conflict the title, description and score are replaced; deadline,
/// amount, eligibility and funder keep their stored values when the new
/// listing has none. `last_seen_at` is bumped either way.
///
/// # Errors
///
/// Returns [`DbError::UnknownSchool`] if `grant.school_name` has not been
/// seeded, or [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_grant(pool: &PgPool, grant: &NewGrant) -> Result<UpsertOutcome, DbError> {
    let is_new: Option<bool> = sqlx::query_scalar::<_, bool>(
        "INSERT INTO grants \
             (school_id, title, description, source_url, funder, deadline, \
              amount_text, amount_value, eligibility, relevance_score) \
         SELECT s.id, $2, $3, $4, $5, $6, $7, $8, $9, $10 \
         FROM schools s \
         WHERE s.name = $1 \
         ON CONFLICT (school_id, source_url) DO UPDATE SET \
             title           = EXCLUDED.title, \
             description     = EXCLUDED.description, \
             funder          = COALESCE(NULLIF(EXCLUDED.funder, 'Unknown'), grants.funder), \
             deadline        = COALESCE(EXCLUDED.deadline, grants.deadline), \
             amount_text     = COALESCE(EXCLUDED.amount_text, grants.amount_text), \
             amount_value    = COALESCE(EXCLUDED.amount_value, grants.amount_value), \
             eligibility     = COALESCE(EXCLUDED.eligibility, grants.eligibility), \
             relevance_score = EXCLUDED.relevance_score, \
             last_seen_at    = NOW(), \
             updated_at      = NOW() \
         RETURNING (xmax = 0) AS is_new",
    )
    .bind(&grant.school_name)
    .bind(&grant.title)
    .bind(&grant.description)
    .bind(&grant.source_url)
    .bind(&grant.funder)
    .bind(grant.deadline)
    .bind(&grant.amount_text)
    .bind(grant.amount_value)
    .bind(&grant.eligibility)
    .bind(grant.relevance_score)
    .fetch_optional(pool)
    .await?;

    match is_new {
        Some(true) => Ok(UpsertOutcome::Stored),
        Some(false) => Ok(UpsertOutcome::Updated),
        None => Err(DbError::UnknownSchool(grant.school_name.clone())),
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns grants matching `filters`, soonest deadline first (unknown
/// deadlines last), then by title.
///
/// Returns an empty vec when nothing matches, including for an unknown school.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_grants(
    pool: &PgPool,
    filters: GrantFilters<'_>,
) -> Result<Vec<GrantRow>, DbError> {
    let title_pattern = filters
        .title_query
        .map(|q| format!("%{}%", escape_like(q)));

    let sql = format!(
        "SELECT {GRANT_COLUMNS} \
         FROM grants g \
         JOIN schools s ON s.id = g.school_id \
         WHERE ($1::TEXT IS NULL OR s.name = $1) \
           AND ($2::TEXT IS NULL OR g.title ILIKE $2 ESCAPE '\\') \
         ORDER BY g.deadline ASC NULLS LAST, g.title, g.id"
    );

    let rows = sqlx::query_as::<_, GrantRow>(&sql)
        .bind(filters.school_name)
        .bind(title_pattern)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns the grants whose `public_id` is in `ids`, in deadline order.
/// Unknown ids are ignored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_grants_by_public_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<GrantRow>, DbError> {
    let sql = format!(
        "SELECT {GRANT_COLUMNS} \
         FROM grants g \
         JOIN schools s ON s.id = g.school_id \
         WHERE g.public_id = ANY($1) \
         ORDER BY g.deadline ASC NULLS LAST, g.title, g.id"
    );

    let rows = sqlx::query_as::<_, GrantRow>(&sql)
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_passes_plain_text() {
        assert_eq!(escape_like("STEM"), "STEM");
    }

    #[test]
    fn escape_like_escapes_metacharacters() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
    }
}
