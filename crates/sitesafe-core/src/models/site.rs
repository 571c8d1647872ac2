use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use super::category::RiskLevel;
use super::record::{parse_date, parse_timestamp, RecordId};
use crate::error::AppError;
use crate::validation::required_text;

/// A site-level hazard observed in a building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteIssue {
    pub id: RecordId,
    pub created_at: NaiveDateTime,
    pub date_of_event: NaiveDate,
    pub company: String,
    pub building: String,
    pub floor: String,
    pub risk_level: RiskLevel,
    pub issue: String,
    /// Opaque object-storage pointer, never a URL.
    pub photo_pointer: Option<String>,
}

/// Raw `site_issues` row.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct SiteIssueRow {
    pub id: i64,
    pub created_at: Option<String>,
    pub date_of_event: Option<String>,
    pub company: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub risk_level: Option<String>,
    pub issue: Option<String>,
    pub photo_path: Option<String>,
}

impl TryFrom<SiteIssueRow> for SiteIssue {
    type Error = AppError;

    fn try_from(row: SiteIssueRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let missing =
            |name: &str| AppError::Persistence(format!("site_issues row {} has no {}", id, name));

        let created_at = parse_timestamp(&row.created_at.ok_or_else(|| missing("created_at"))?)?;
        let date_of_event =
            parse_date(&row.date_of_event.ok_or_else(|| missing("date_of_event"))?)?;
        let risk_level = row
            .risk_level
            .ok_or_else(|| missing("risk_level"))?
            .parse::<RiskLevel>()
            .map_err(|e| AppError::Persistence(format!("row {}: {}", id, e)))?;

        Ok(SiteIssue {
            id: RecordId(id),
            created_at,
            date_of_event,
            company: row.company.unwrap_or_default(),
            building: row.building.unwrap_or_default(),
            floor: row.floor.unwrap_or_default(),
            risk_level,
            issue: row.issue.unwrap_or_default(),
            photo_pointer: row.photo_path.filter(|p| !p.is_empty()),
        })
    }
}

/// Request DTO for recording a site issue
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewSiteIssue {
    /// Assigned by the store when absent.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    pub date_of_event: NaiveDate,
    #[validate(length(min = 1, message = "Company is required"))]
    pub company: String,
    #[validate(length(min = 1, message = "Building is required"))]
    pub building: String,
    #[validate(length(min = 1, message = "Floor is required"))]
    pub floor: String,
    pub risk_level: RiskLevel,
    #[validate(length(min = 1, message = "Issue description is required"))]
    pub issue: String,
    #[serde(default)]
    pub photo_pointer: Option<String>,
}

impl NewSiteIssue {
    pub fn normalized(self) -> Self {
        Self {
            created_at: self.created_at,
            date_of_event: self.date_of_event,
            company: required_text(&self.company),
            building: required_text(&self.building),
            floor: required_text(&self.floor),
            risk_level: self.risk_level,
            issue: required_text(&self.issue),
            photo_pointer: self.photo_pointer.filter(|p| !p.is_empty()),
        }
    }

    /// Normalize, then validate. Nothing may be persisted when this fails.
    pub fn into_validated(self) -> Result<Self, AppError> {
        let normalized = self.normalized();
        normalized.validate()?;
        Ok(normalized)
    }
}

/// Filters for listing site issues. Absent or blank values impose no constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteFilters {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    /// Substring searched in the issue text.
    #[serde(default)]
    pub keyword: Option<String>,
    /// Match the keyword exactly as typed. Folded matching on SQLite is ASCII-only for stored text.
    #[serde(default)]
    pub case_sensitive: bool,
}
