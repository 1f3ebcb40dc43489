//! CSV export of contact collections.

use std::path::Path;

use chrono::{DateTime, Utc};

use ordb_core::TargetType;
use ordb_db::{DaycareRow, InfluencerRow};

use crate::error::AssistantError;

/// Result of a completed export.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub file_path: String,
    pub file_name: String,
    pub contact_count: usize,
}

fn timestamp_cell(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn export_file_name(target_type: TargetType) -> String {
    format!(
        "{}s_export_{}.csv",
        target_type.as_str(),
        Utc::now().format("%Y%m%d_%H%M%S")
    )
}

fn csv_error(e: impl std::fmt::Display) -> AssistantError {
    AssistantError::Unexpected(format!("failed to write CSV file: {e}"))
}

/// Writes all daycare rows to a timestamped CSV file in `dir`.
///
/// # Errors
///
/// Returns [`AssistantError::Unexpected`] if the file cannot be created or
/// written.
pub fn export_daycares_csv(
    rows: &[DaycareRow],
    dir: &Path,
) -> Result<ExportSummary, AssistantError> {
    let file_name = export_file_name(TargetType::Daycare);
    let path = dir.join(&file_name);
    let mut writer = csv::Writer::from_path(&path).map_err(csv_error)?;

    writer
        .write_record([
            "id",
            "name",
            "address",
            "city",
            "email",
            "phone",
            "website",
            "region",
            "source",
            "last_contacted",
            "email_opened",
            "email_replied",
            "created_at",
            "updated_at",
        ])
        .map_err(csv_error)?;
    for row in rows {
        writer
            .write_record([
                row.id.to_string(),
                row.name.clone(),
                row.address.clone().unwrap_or_default(),
                row.city.clone().unwrap_or_default(),
                row.email.clone().unwrap_or_default(),
                row.phone.clone().unwrap_or_default(),
                row.website.clone().unwrap_or_default(),
                row.region.clone(),
                row.source.clone().unwrap_or_default(),
                timestamp_cell(row.last_contacted),
                row.email_opened.to_string(),
                row.email_replied.to_string(),
                timestamp_cell(Some(row.created_at)),
                timestamp_cell(Some(row.updated_at)),
            ])
            .map_err(csv_error)?;
    }
    writer.flush().map_err(csv_error)?;

    Ok(ExportSummary {
        file_path: path.to_string_lossy().into_owned(),
        file_name,
        contact_count: rows.len(),
    })
}

/// Writes all influencer rows to a timestamped CSV file in `dir`.
///
/// # Errors
///
/// Returns [`AssistantError::Unexpected`] if the file cannot be created or
/// written.
pub fn export_influencers_csv(
    rows: &[InfluencerRow],
    dir: &Path,
) -> Result<ExportSummary, AssistantError> {
    let file_name = export_file_name(TargetType::Influencer);
    let path = dir.join(&file_name);
    let mut writer = csv::Writer::from_path(&path).map_err(csv_error)?;

    writer
        .write_record([
            "id",
            "name",
            "platform",
            "follower_count",
            "country",
            "email",
            "bio",
            "contact_page",
            "niche",
            "engagement_rate",
            "last_contacted",
            "email_opened",
            "email_replied",
            "created_at",
            "updated_at",
        ])
        .map_err(csv_error)?;
    for row in rows {
        writer
            .write_record([
                row.id.to_string(),
                row.name.clone(),
                row.platform.clone(),
                row.follower_count.map(|f| f.to_string()).unwrap_or_default(),
                row.country.clone().unwrap_or_default(),
                row.email.clone().unwrap_or_default(),
                row.bio.clone().unwrap_or_default(),
                row.contact_page.clone().unwrap_or_default(),
                row.niche.clone().unwrap_or_default(),
                row.engagement_rate
                    .map(|r| r.to_string())
                    .unwrap_or_default(),
                timestamp_cell(row.last_contacted),
                row.email_opened.to_string(),
                row.email_replied.to_string(),
                timestamp_cell(Some(row.created_at)),
                timestamp_cell(Some(row.updated_at)),
            ])
            .map_err(csv_error)?;
    }
    writer.flush().map_err(csv_error)?;

    Ok(ExportSummary {
        file_path: path.to_string_lossy().into_owned(),
        file_name,
        contact_count: rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daycare(id: i64, name: &str) -> DaycareRow {
        DaycareRow {
            id,
            name: name.to_string(),
            address: None,
            city: Some("Boston".to_string()),
            email: Some(format!("{id}@example.com")),
            phone: None,
            website: None,
            region: "USA".to_string(),
            source: Some("yelp".to_string()),
            last_contacted: None,
            email_opened: false,
            email_replied: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn daycare_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let rows = vec![daycare(1, "Little Stars"), daycare(2, "Sunny Days")];

        let summary = export_daycares_csv(&rows, dir.path()).expect("export should succeed");
        assert_eq!(summary.contact_count, 2);
        assert!(summary.file_name.starts_with("daycares_export_"));
        assert!(summary.file_name.ends_with(".csv"));

        let content = std::fs::read_to_string(&summary.file_path).expect("file readable");
        let mut lines = content.lines();
        let header = lines.next().expect("header line");
        assert!(header.starts_with("id,name,address,city,email"));
        assert_eq!(lines.count(), 2);
        assert!(content.contains("Little Stars"));
    }

    #[test]
    fn empty_timestamp_serializes_as_blank_cell() {
        assert_eq!(timestamp_cell(None), "");
    }
}
