//! Database operations for the `outreach_history` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `outreach_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OutreachHistoryRow {
    pub id: i64,
    pub target_type: String,
    pub target_id: i64,
    pub email_subject: Option<String>,
    pub email_content: Option<String>,
    pub sent_at: DateTime<Utc>,
    pub opened_at: Option<DateTime<Utc>>,
    pub replied_at: Option<DateTime<Utc>>,
    pub bounced: bool,
    pub language: Option<String>,
}

/// Input for recording a sent outreach email.
#[derive(Debug, Clone)]
pub struct NewOutreachHistory<'a> {
    pub target_type: &'a str,
    pub target_id: i64,
    pub email_subject: &'a str,
    pub email_content: &'a str,
    pub language: &'a str,
}

/// Records a sent email and stamps the target's `last_contacted` in a single
/// transaction, so a history row never exists without the contact timestamp
/// and vice versa.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or update fails; the transaction
/// is rolled back in that case.
pub async fn insert_outreach_history(
    pool: &PgPool,
    entry: NewOutreachHistory<'_>,
) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;

    let history_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO outreach_history (target_type, target_id, email_subject, email_content, language) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(entry.target_type)
    .bind(entry.target_id)
    .bind(entry.email_subject)
    .bind(entry.email_content)
    .bind(entry.language)
    .fetch_one(&mut *tx)
    .await?;

    let table = match entry.target_type {
        "influencer" => "influencers",
        _ => "daycares",
    };
    let update_sql =
        format!("UPDATE {table} SET last_contacted = NOW(), updated_at = NOW() WHERE id = $1");
    sqlx::query(&update_sql)
        .bind(entry.target_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(history_id)
}
