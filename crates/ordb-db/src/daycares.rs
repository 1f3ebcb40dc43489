//! Database operations for the `daycares` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `daycares` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DaycareRow {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub region: String,
    pub source: Option<String>,
    pub last_contacted: Option<DateTime<Utc>>,
    pub email_opened: bool,
    pub email_replied: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const DAYCARE_COLUMNS: &str = "id, name, address, city, email, phone, website, region, source, \
     last_contacted, email_opened, email_replied, created_at, updated_at";

/// Input filters for daycare listing.
///
/// `city` matches case-insensitively; `limit` is `None` to return all rows.
#[derive(Debug, Clone, Default)]
pub struct DaycareFilter<'a> {
    pub city: Option<&'a str>,
    pub region: Option<&'a str>,
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns daycares matching the given filters, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_daycares(
    pool: &PgPool,
    filter: DaycareFilter<'_>,
) -> Result<Vec<DaycareRow>, DbError> {
    let sql = format!(
        "SELECT {DAYCARE_COLUMNS} \
         FROM daycares \
         WHERE ($1::TEXT IS NULL OR LOWER(city) = LOWER($1)) \
           AND ($2::TEXT IS NULL OR region = $2) \
         ORDER BY name \
         LIMIT COALESCE($3, 9223372036854775807)"
    );
    let rows = sqlx::query_as::<_, DaycareRow>(&sql)
        .bind(filter.city)
        .bind(filter.region)
        .bind(filter.limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns up to `count` daycares that have never been contacted, in random
/// order, optionally restricted to a region.
///
/// Rows with a non-null `last_contacted` are never returned, so repeated
/// outreach batches do not hit the same contacts twice.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_never_contacted_daycares(
    pool: &PgPool,
    region: Option<&str>,
    count: i64,
) -> Result<Vec<DaycareRow>, DbError> {
    let sql = format!(
        "SELECT {DAYCARE_COLUMNS} \
         FROM daycares \
         WHERE last_contacted IS NULL \
           AND ($1::TEXT IS NULL OR region = $1) \
         ORDER BY RANDOM() \
         LIMIT $2"
    );
    let rows = sqlx::query_as::<_, DaycareRow>(&sql)
        .bind(region)
        .bind(count)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Stamps `last_contacted` (and `updated_at`) for a daycare.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has the given id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn mark_daycare_contacted(pool: &PgPool, daycare_id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE daycares \
         SET last_contacted = NOW(), updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(daycare_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
