//! Backend-independent query description
//!
//! A `RecordQuery` is a conjunction of predicates over the columns of one
//! record table. Blank filter values never produce a predicate, so an empty
//! query selects every record of its kind.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use sitesafe_core::models::{
    format_date, DateRange, PersonnelFilters, RecordKind, SiteFilters,
};
use sitesafe_core::validation::normalize_hard_hat;
use sitesafe_core::AppError;

/// Columns of the record tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    CreatedAt,
    DateOfEvent,
    HardHatNumber,
    Company,
    Trade,
    Location,
    ViolationType,
    Severity,
    Description,
    CorrectiveAction,
    EvidencePath,
    Building,
    Floor,
    RiskLevel,
    Issue,
    PhotoPath,
}

const PERSONNEL_COLUMNS: &[Field] = &[
    Field::Id,
    Field::CreatedAt,
    Field::DateOfEvent,
    Field::HardHatNumber,
    Field::Company,
    Field::Trade,
    Field::Location,
    Field::ViolationType,
    Field::Severity,
    Field::Description,
    Field::CorrectiveAction,
    Field::EvidencePath,
];

const SITE_COLUMNS: &[Field] = &[
    Field::Id,
    Field::CreatedAt,
    Field::DateOfEvent,
    Field::Company,
    Field::Building,
    Field::Floor,
    Field::RiskLevel,
    Field::Issue,
    Field::PhotoPath,
];

const PERSONNEL_KEYWORD_FIELDS: &[Field] = &[
    Field::Description,
    Field::Location,
    Field::Company,
    Field::Trade,
];

const SITE_KEYWORD_FIELDS: &[Field] = &[Field::Issue];

impl Field {
    pub fn column(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::CreatedAt => "created_at",
            Field::DateOfEvent => "date_of_event",
            Field::HardHatNumber => "hard_hat_number",
            Field::Company => "company",
            Field::Trade => "trade",
            Field::Location => "location",
            Field::ViolationType => "violation_type",
            Field::Severity => "severity",
            Field::Description => "description",
            Field::CorrectiveAction => "corrective_action",
            Field::EvidencePath => "evidence_path",
            Field::Building => "building",
            Field::Floor => "floor",
            Field::RiskLevel => "risk_level",
            Field::Issue => "issue",
            Field::PhotoPath => "photo_path",
        }
    }

    /// Table columns in storage order, `id` first.
    pub fn columns_of(kind: RecordKind) -> &'static [Field] {
        match kind {
            RecordKind::PersonnelViolation => PERSONNEL_COLUMNS,
            RecordKind::SiteIssue => SITE_COLUMNS,
        }
    }

    /// Columns searched by the free-text keyword filter.
    pub fn keyword_fields(kind: RecordKind) -> &'static [Field] {
        match kind {
            RecordKind::PersonnelViolation => PERSONNEL_KEYWORD_FIELDS,
            RecordKind::SiteIssue => SITE_KEYWORD_FIELDS,
        }
    }

    pub fn belongs_to(&self, kind: RecordKind) -> bool {
        Field::columns_of(kind).contains(self)
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.column())
    }
}

impl FromStr for Field {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        PERSONNEL_COLUMNS
            .iter()
            .chain(SITE_COLUMNS.iter())
            .find(|field| field.column() == wanted)
            .copied()
            .ok_or_else(|| AppError::Validation(format!("Unknown field: {}", s)))
    }
}

/// One condition on a record. All predicates of a query must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exact match on the stored text.
    Equals { field: Field, value: String },
    /// Inclusive range, compared on the stored ISO text.
    Between {
        field: Field,
        start: String,
        end: String,
    },
    /// Substring match in at least one of the fields. NULL counts as empty text.
    Contains {
        fields: Vec<Field>,
        needle: String,
        case_sensitive: bool,
    },
}

impl Predicate {
    fn fields(&self) -> Vec<Field> {
        match self {
            Predicate::Equals { field, .. } | Predicate::Between { field, .. } => vec![*field],
            Predicate::Contains { fields, .. } => fields.clone(),
        }
    }
}

/// A conjunction of predicates over one record kind, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    kind: RecordKind,
    predicates: Vec<Predicate>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl RecordQuery {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            predicates: Vec::new(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Require `field == value`. A blank value adds nothing.
    pub fn equals(mut self, field: Field, value: Option<&str>) -> Self {
        if let Some(value) = present(value) {
            self.predicates.push(Predicate::Equals {
                field,
                value: value.to_string(),
            });
        }
        self
    }

    pub fn between(mut self, field: Field, start: String, end: String) -> Self {
        self.predicates.push(Predicate::Between { field, start, end });
        self
    }

    /// Restrict `date_of_event` to the range, both ends included.
    pub fn within(self, range: &DateRange) -> Self {
        self.between(
            Field::DateOfEvent,
            format_date(range.start()),
            format_date(range.end()),
        )
    }

    /// Require `needle` in any of the kind's keyword fields. A blank needle adds nothing.
    /// Case-insensitive needles are lowercased here with full Unicode folding.
    pub fn keyword(mut self, needle: Option<&str>, case_sensitive: bool) -> Self {
        if let Some(needle) = present(needle) {
            let needle = if case_sensitive {
                needle.to_string()
            } else {
                needle.to_lowercase()
            };
            self.predicates.push(Predicate::Contains {
                fields: Field::keyword_fields(self.kind).to_vec(),
                needle,
                case_sensitive,
            });
        }
        self
    }

    /// Reject predicates on columns the kind's table does not have.
    pub fn check(&self) -> Result<(), AppError> {
        for field in self.predicates.iter().flat_map(Predicate::fields) {
            if !field.belongs_to(self.kind) {
                return Err(AppError::Validation(format!(
                    "Field {} does not exist on {} records",
                    field, self.kind
                )));
            }
        }
        Ok(())
    }
}

impl From<&PersonnelFilters> for RecordQuery {
    fn from(filters: &PersonnelFilters) -> Self {
        let hard_hat = filters
            .hard_hat_number
            .as_deref()
            .map(normalize_hard_hat);
        let violation_type = filters.violation_type.map(|v| v.as_str());
        let severity = filters.severity.map(|s| s.as_str());

        RecordQuery::new(RecordKind::PersonnelViolation)
            .equals(Field::HardHatNumber, hard_hat.as_deref())
            .equals(Field::Company, filters.company.as_deref())
            .equals(Field::Trade, filters.trade.as_deref())
            .equals(Field::Location, filters.location.as_deref())
            .equals(Field::ViolationType, violation_type)
            .equals(Field::Severity, severity)
            .keyword(filters.keyword.as_deref(), filters.case_sensitive)
    }
}

impl From<&SiteFilters> for RecordQuery {
    fn from(filters: &SiteFilters) -> Self {
        let risk_level = filters.risk_level.map(|r| r.as_str());

        RecordQuery::new(RecordKind::SiteIssue)
            .equals(Field::Company, filters.company.as_deref())
            .equals(Field::Building, filters.building.as_deref())
            .equals(Field::Floor, filters.floor.as_deref())
            .equals(Field::RiskLevel, risk_level)
            .keyword(filters.keyword.as_deref(), filters.case_sensitive)
    }
}
