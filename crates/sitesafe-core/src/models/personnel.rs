use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use super::category::{Severity, ViolationType};
use super::record::{parse_date, parse_timestamp, RecordId};
use crate::error::AppError;
use crate::validation::{normalize_hard_hat, optional_text, required_text};

/// A hard-hat infraction by one person on site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelViolation {
    pub id: RecordId,
    pub created_at: NaiveDateTime,
    pub date_of_event: NaiveDate,
    pub hard_hat_number: String,
    pub company: Option<String>,
    pub trade: Option<String>,
    pub location: Option<String>,
    pub violation_type: ViolationType,
    pub severity: Severity,
    pub description: String,
    pub corrective_action: Option<String>,
    /// Opaque object-storage pointer, never a URL.
    pub evidence_pointer: Option<String>,
}

/// Raw `personnel_violations` row. Every text column is nullable in older tables,
/// so required fields are checked on conversion.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct PersonnelViolationRow {
    pub id: i64,
    pub created_at: Option<String>,
    pub date_of_event: Option<String>,
    pub hard_hat_number: Option<String>,
    pub company: Option<String>,
    pub trade: Option<String>,
    pub location: Option<String>,
    pub violation_type: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub corrective_action: Option<String>,
    pub evidence_path: Option<String>,
}

fn required_column(id: i64, name: &str, value: Option<String>) -> Result<String, AppError> {
    value.ok_or_else(|| {
        AppError::Persistence(format!(
            "personnel_violations row {} has no {}",
            id, name
        ))
    })
}

impl TryFrom<PersonnelViolationRow> for PersonnelViolation {
    type Error = AppError;

    fn try_from(row: PersonnelViolationRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let created_at = parse_timestamp(&required_column(id, "created_at", row.created_at)?)?;
        let date_of_event = parse_date(&required_column(id, "date_of_event", row.date_of_event)?)?;
        let violation_type = required_column(id, "violation_type", row.violation_type)?
            .parse::<ViolationType>()
            .map_err(|e| AppError::Persistence(format!("row {}: {}", id, e)))?;
        let severity = required_column(id, "severity", row.severity)?
            .parse::<Severity>()
            .map_err(|e| AppError::Persistence(format!("row {}: {}", id, e)))?;

        Ok(PersonnelViolation {
            id: RecordId(id),
            created_at,
            date_of_event,
            hard_hat_number: required_column(id, "hard_hat_number", row.hard_hat_number)?,
            company: optional_text(row.company),
            trade: optional_text(row.trade),
            location: optional_text(row.location),
            violation_type,
            severity,
            description: row.description.unwrap_or_default(),
            corrective_action: optional_text(row.corrective_action),
            evidence_pointer: row.evidence_path.filter(|p| !p.is_empty()),
        })
    }
}

/// Request DTO for recording a personnel violation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPersonnelViolation {
    /// Assigned by the store when absent.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    pub date_of_event: NaiveDate,
    #[validate(length(min = 1, message = "Hard hat number is required"))]
    pub hard_hat_number: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "Company must be at most 200 characters"))]
    pub company: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200, message = "Trade must be at most 200 characters"))]
    pub trade: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,
    pub violation_type: ViolationType,
    pub severity: Severity,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub corrective_action: Option<String>,
    #[serde(default)]
    pub evidence_pointer: Option<String>,
}

impl NewPersonnelViolation {
    /// Trim every text field, normalize the hard-hat token and drop blank optionals.
    pub fn normalized(self) -> Self {
        Self {
            created_at: self.created_at,
            date_of_event: self.date_of_event,
            hard_hat_number: normalize_hard_hat(&self.hard_hat_number),
            company: optional_text(self.company),
            trade: optional_text(self.trade),
            location: optional_text(self.location),
            violation_type: self.violation_type,
            severity: self.severity,
            description: required_text(&self.description),
            corrective_action: optional_text(self.corrective_action),
            evidence_pointer: self.evidence_pointer.filter(|p| !p.is_empty()),
        }
    }

    /// Normalize, then validate. Nothing may be persisted when this fails.
    pub fn into_validated(self) -> Result<Self, AppError> {
        let normalized = self.normalized();
        normalized.validate()?;
        Ok(normalized)
    }
}

/// Filters for listing personnel violations. Absent or blank values impose no constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonnelFilters {
    #[serde(default)]
    pub hard_hat_number: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub trade: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub violation_type: Option<ViolationType>,
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Substring searched in description, location, company and trade.
    #[serde(default)]
    pub keyword: Option<String>,
    /// Match the keyword exactly as typed. When false the keyword is folded to
    /// lowercase; on SQLite stored text only folds ASCII letters.
    #[serde(default)]
    pub case_sensitive: bool,
}
