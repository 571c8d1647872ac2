//! Logical report content, independent of the output format.

use chrono::NaiveDateTime;
use sitesafe_core::models::{format_date, DateRange, PersonnelViolation, SiteIssue};

pub const NO_PERSONNEL: &str = "No personnel violations recorded in this range.";
pub const NO_SITE_ISSUES: &str = "No site issues recorded in this range.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Subtitle(String),
    Heading(String),
    Paragraph(String),
    EntryHeader(String),
    Field { label: &'static str, value: String },
    Note(String),
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn push_field(blocks: &mut Vec<Block>, label: &'static str, value: Option<&str>) {
    if let Some(value) = present(value) {
        blocks.push(Block::Field {
            label,
            value: value.to_string(),
        });
    }
}

pub fn personnel_entry(record: &PersonnelViolation) -> Vec<Block> {
    let mut blocks = vec![Block::EntryHeader(format!(
        "{} | Hard hat {} | {} | {}",
        format_date(record.date_of_event),
        record.hard_hat_number,
        record.violation_type,
        record.severity
    ))];
    push_field(&mut blocks, "Company", record.company.as_deref());
    push_field(&mut blocks, "Trade", record.trade.as_deref());
    push_field(&mut blocks, "Location", record.location.as_deref());
    push_field(&mut blocks, "Description", Some(record.description.as_str()));
    push_field(&mut blocks, "Corrective action", record.corrective_action.as_deref());
    push_field(&mut blocks, "Evidence", record.evidence_pointer.as_deref());
    blocks
}

pub fn site_entry(issue: &SiteIssue) -> Vec<Block> {
    let mut blocks = vec![Block::EntryHeader(format!(
        "{} | {} | {} | Floor {} | {} risk",
        format_date(issue.date_of_event),
        issue.company,
        issue.building,
        issue.floor,
        issue.risk_level
    ))];
    push_field(&mut blocks, "Issue", Some(issue.issue.as_str()));
    push_field(&mut blocks, "Photo", issue.photo_pointer.as_deref());
    blocks
}

/// Summary, then one section per record kind in the order the store returned them.
pub fn build(
    title: &str,
    range: &DateRange,
    generated_at: NaiveDateTime,
    personnel: &[PersonnelViolation],
    site: &[SiteIssue],
) -> Vec<Block> {
    let mut blocks = vec![
        Block::Title(title.to_string()),
        Block::Subtitle(format!(
            "Safety report for {} to {}",
            format_date(range.start()),
            format_date(range.end())
        )),
        Block::Subtitle(format!(
            "Generated {}",
            generated_at.format("%Y-%m-%d %H:%M")
        )),
        Block::Heading("Summary".to_string()),
        Block::Paragraph(format!("Personnel violations: {}", personnel.len())),
        Block::Paragraph(format!("Site issues: {}", site.len())),
        Block::Heading("Personnel Violations".to_string()),
    ];

    if personnel.is_empty() {
        blocks.push(Block::Note(NO_PERSONNEL.to_string()));
    }
    for record in personnel {
        blocks.extend(personnel_entry(record));
    }

    blocks.push(Block::Heading("Site Issues".to_string()));
    if site.is_empty() {
        blocks.push(Block::Note(NO_SITE_ISSUES.to_string()));
    }
    for issue in site {
        blocks.extend(site_entry(issue));
    }
    blocks
}
