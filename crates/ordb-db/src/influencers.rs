//! Database operations for the `influencers` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `influencers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InfluencerRow {
    pub id: i64,
    pub name: String,
    pub platform: String,
    pub follower_count: Option<i64>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub contact_page: Option<String>,
    pub niche: Option<String>,
    pub engagement_rate: Option<f64>,
    pub last_contacted: Option<DateTime<Utc>>,
    pub email_opened: bool,
    pub email_replied: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const INFLUENCER_COLUMNS: &str = "id, name, platform, follower_count, country, email, bio, \
     contact_page, niche, engagement_rate, last_contacted, email_opened, email_replied, \
     created_at, updated_at";

/// Input filters for influencer listing.
#[derive(Debug, Clone, Default)]
pub struct InfluencerFilter<'a> {
    pub country: Option<&'a str>,
    /// Follower-count floor; rows with a null count are excluded when set.
    pub min_followers: Option<i64>,
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns influencers matching the given filters, ordered by follower count
/// (highest first).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_influencers(
    pool: &PgPool,
    filter: InfluencerFilter<'_>,
) -> Result<Vec<InfluencerRow>, DbError> {
    let sql = format!(
        "SELECT {INFLUENCER_COLUMNS} \
         FROM influencers \
         WHERE ($1::TEXT IS NULL OR LOWER(country) = LOWER($1)) \
           AND ($2::BIGINT IS NULL OR follower_count >= $2) \
         ORDER BY follower_count DESC NULLS LAST \
         LIMIT COALESCE($3, 9223372036854775807)"
    );
    let rows = sqlx::query_as::<_, InfluencerRow>(&sql)
        .bind(filter.country)
        .bind(filter.min_followers)
        .bind(filter.limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns up to `count` influencers that have never been contacted, in
/// random order, optionally restricted to a country.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_never_contacted_influencers(
    pool: &PgPool,
    country: Option<&str>,
    count: i64,
) -> Result<Vec<InfluencerRow>, DbError> {
    let sql = format!(
        "SELECT {INFLUENCER_COLUMNS} \
         FROM influencers \
         WHERE last_contacted IS NULL \
           AND ($1::TEXT IS NULL OR LOWER(country) = LOWER($1)) \
         ORDER BY RANDOM() \
         LIMIT $2"
    );
    let rows = sqlx::query_as::<_, InfluencerRow>(&sql)
        .bind(country)
        .bind(count)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Stamps `last_contacted` (and `updated_at`) for an influencer.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has the given id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn mark_influencer_contacted(pool: &PgPool, influencer_id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE influencers \
         SET last_contacted = NOW(), updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(influencer_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
