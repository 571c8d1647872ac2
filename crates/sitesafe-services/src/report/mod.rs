//! Report compiler
//!
//! Pulls both record kinds for an inclusive date range and renders a paginated
//! PDF: a summary block followed by one itemized section per kind.

pub mod content;
pub mod layout;
pub mod pdf;
pub mod text;

use bytes::Bytes;
use chrono::NaiveDate;
use sitesafe_core::models::{format_date, DateRange};
use sitesafe_core::{AppError, AuthorizedSession};
use sitesafe_db::RecordStore;

const REPORT_NAME: &str = "safety_report";
const EXTENSION: &str = "pdf";

/// A finished report. The bytes are immutable once built.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    bytes: Bytes,
    filename: String,
    mime_type: &'static str,
}

impl ReportDocument {
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }
}

/// `<report>_<start>_to_<end>.<ext>`
pub fn report_filename(range: &DateRange) -> String {
    format!(
        "{}_{}_to_{}.{}",
        REPORT_NAME,
        format_date(range.start()),
        format_date(range.end()),
        EXTENSION
    )
}

#[derive(Clone)]
pub struct ReportCompiler {
    store: RecordStore,
    title: String,
}

impl ReportCompiler {
    pub fn new(store: RecordStore, title: impl Into<String>) -> Self {
        Self {
            store,
            title: title.into(),
        }
    }

    pub async fn compile(
        &self,
        session: &AuthorizedSession,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ReportDocument, AppError> {
        let range = DateRange::new(start, end)?;

        let (personnel, site) = tokio::try_join!(
            self.store.query_range_personnel(session, &range),
            self.store.query_range_site(session, &range)
        )?;

        let generated_at = self.store.clock().now();
        let blocks = content::build(&self.title, &range, generated_at, &personnel, &site);
        let pages = layout::paginate(&blocks);
        let bytes = pdf::render(&self.title, &pages)?;

        tracing::info!(
            subject = %session.subject(),
            start = %range.start(),
            end = %range.end(),
            personnel = personnel.len(),
            site = site.len(),
            pages = pages.len(),
            size_bytes = bytes.len(),
            "Report compiled"
        );

        Ok(ReportDocument {
            bytes: Bytes::from(bytes),
            filename: report_filename(&range),
            mime_type: pdf::MIME_TYPE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_derived_from_range() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();
        assert_eq!(
            report_filename(&range),
            "safety_report_2024-03-01_to_2024-03-31.pdf"
        );
    }
}
