//! Routes a resolved intent to exactly one action handler.
//!
//! Handlers normalize loosely-specified parameters (free-text target types,
//! region synonyms, counts as strings) before touching the database.

use serde_json::{json, Value};
use sqlx::PgPool;

use ordb_core::{Region, TargetType};
use ordb_db::{DaycareFilter, InfluencerFilter};
use ordb_mailer::{BatchOverrides, EmailSender, MailTransport, OutreachTarget, SendStatus};

use crate::error::AssistantError;
use crate::export;
use crate::intent::{Action, Intent};

/// Default batch size for outreach when the intent names no count.
const DEFAULT_OUTREACH_COUNT: i64 = 10;

/// Dispatches the intent to its handler.
///
/// # Errors
///
/// Propagates handler errors; see each handler for its failure modes.
pub async fn route<T: MailTransport>(
    pool: &PgPool,
    sender: &EmailSender<T>,
    intent: &Intent,
    command: &str,
) -> Result<Value, AssistantError> {
    match intent.action {
        Action::SearchDaycares => handle_search_daycares(pool, intent).await,
        Action::SearchInfluencers => handle_search_influencers(pool, intent).await,
        Action::SendOutreach => handle_send_outreach(pool, sender, intent, command).await,
        Action::ExportContacts => handle_export(pool, intent, command).await,
    }
}

/// Normalizes a region-ish parameter to its canonical tag, treating the
/// "everything" phrasings as no filter. Unrecognized regions are passed
/// through verbatim so they simply match nothing rather than erroring.
fn normalize_region(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let lower = raw.to_lowercase();
    if lower == "all regions" || lower == "all countries" || lower == "all" {
        return None;
    }
    Some(
        Region::parse_loose(raw)
            .map(|r| r.as_str().to_string())
            .unwrap_or_else(|| raw.to_string()),
    )
}

async fn handle_search_daycares(pool: &PgPool, intent: &Intent) -> Result<Value, AssistantError> {
    let region = normalize_region(intent.str_param("region"));
    let rows = ordb_db::list_daycares(
        pool,
        DaycareFilter {
            city: intent.str_param("city"),
            region: region.as_deref(),
            limit: intent.int_param("limit"),
        },
    )
    .await?;

    let daycares: Vec<Value> = rows
        .iter()
        .map(|d| {
            json!({
                "name": d.name,
                "city": d.city,
                "region": d.region,
                "email": d.email,
            })
        })
        .collect();
    Ok(json!({ "daycares": daycares }))
}

async fn handle_search_influencers(
    pool: &PgPool,
    intent: &Intent,
) -> Result<Value, AssistantError> {
    let rows = ordb_db::list_influencers(
        pool,
        InfluencerFilter {
            country: intent.str_param("country"),
            min_followers: intent.int_param("min_followers"),
            limit: intent.int_param("limit"),
        },
    )
    .await?;

    let influencers: Vec<Value> = rows
        .iter()
        .map(|i| {
            json!({
                "name": i.name,
                "platform": i.platform,
                "followers": i.follower_count,
                "country": i.country,
            })
        })
        .collect();
    Ok(json!({ "influencers": influencers }))
}

async fn handle_send_outreach<T: MailTransport>(
    pool: &PgPool,
    sender: &EmailSender<T>,
    intent: &Intent,
    command: &str,
) -> Result<Value, AssistantError> {
    let target_type = intent.resolve_target_type(command)?;
    let count = intent.int_param("count").unwrap_or(DEFAULT_OUTREACH_COUNT);
    if count < 1 {
        return Err(AssistantError::Value(format!(
            "outreach count must be at least 1, got {count}"
        )));
    }
    let region = normalize_region(intent.str_param("region"));

    let targets: Vec<OutreachTarget> = match target_type {
        TargetType::Daycare => {
            ordb_db::list_never_contacted_daycares(pool, region.as_deref(), count)
                .await?
                .iter()
                .map(OutreachTarget::from)
                .collect()
        }
        TargetType::Influencer => {
            ordb_db::list_never_contacted_influencers(pool, region.as_deref(), count)
                .await?
                .iter()
                .map(OutreachTarget::from)
                .collect()
        }
    };

    let overrides = BatchOverrides {
        subject: intent.str_param("subject").map(ToOwned::to_owned),
        body: intent.str_param("body").map(ToOwned::to_owned),
        sender_email: intent.str_param("sender_email").map(ToOwned::to_owned),
        sender_name: intent.str_param("sender_name").map(ToOwned::to_owned),
    };

    let outcomes = sender
        .send_batch(pool, &targets, target_type, &overrides)
        .await?;
    let messages_sent = outcomes
        .iter()
        .filter(|o| o.status == SendStatus::Success)
        .count();

    tracing::info!(
        target_type = target_type.as_str(),
        requested = count,
        selected = targets.len(),
        messages_sent,
        "outreach batch finished"
    );
    Ok(json!({
        "success": true,
        "messages_sent": messages_sent,
        "details": outcomes,
    }))
}

async fn handle_export(
    pool: &PgPool,
    intent: &Intent,
    command: &str,
) -> Result<Value, AssistantError> {
    // Reject unsupported formats before any data is read.
    let format = intent
        .str_param("format")
        .filter(|f| !f.is_empty())
        .unwrap_or("csv")
        .to_lowercase();
    if format != "csv" {
        return Err(AssistantError::Value(format!(
            "unsupported export format: {format}. Only CSV is currently supported."
        )));
    }

    let target_type = intent.resolve_target_type(command)?;
    let region = normalize_region(intent.str_param("region"));
    let out_dir = std::env::temp_dir();

    let summary = match target_type {
        TargetType::Daycare => {
            let rows = ordb_db::list_daycares(
                pool,
                DaycareFilter {
                    city: None,
                    region: region.as_deref(),
                    limit: None,
                },
            )
            .await?;
            if rows.is_empty() {
                return Err(AssistantError::Value(
                    "no daycares found matching your criteria".to_string(),
                ));
            }
            export::export_daycares_csv(&rows, &out_dir)?
        }
        TargetType::Influencer => {
            let rows = ordb_db::list_influencers(
                pool,
                InfluencerFilter {
                    country: region.as_deref(),
                    min_followers: None,
                    limit: None,
                },
            )
            .await?;
            if rows.is_empty() {
                return Err(AssistantError::Value(
                    "no influencers found matching your criteria".to_string(),
                ));
            }
            export::export_influencers_csv(&rows, &out_dir)?
        }
    };

    tracing::info!(
        target_type = target_type.as_str(),
        file = %summary.file_path,
        contact_count = summary.contact_count,
        "export finished"
    );
    Ok(json!({
        "success": true,
        "message": format!(
            "Successfully exported {} {}s to CSV",
            summary.contact_count,
            target_type.as_str()
        ),
        "file_path": summary.file_path,
        "file_name": summary.file_name,
        "contact_count": summary.contact_count,
    }))
}
