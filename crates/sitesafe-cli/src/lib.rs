//! Sitesafe command-line client support: service wiring, evidence file loading
//! and output formatting shared by the `sitesafe` binary.

pub mod app;

use std::path::Path;

use anyhow::Context;
use bytes::Bytes;
use serde::Serialize;
use sitesafe_core::models::{format_date, PersonnelViolation, SiteIssue};
use sitesafe_core::{AppError, ErrorMetadata, LogLevel};
use sitesafe_services::EvidenceUpload;

pub use app::{initialize_services, AppState};

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Print a failed command to stderr. Library errors show their client message;
/// the raw diagnostic goes to the log.
pub fn report_error(err: &anyhow::Error) {
    let Some(app_err) = err.downcast_ref::<AppError>() else {
        eprintln!("error: {:#}", err);
        return;
    };

    let code = app_err.error_code();
    let diagnostic = app_err.diagnostic();
    match app_err.log_level() {
        LogLevel::Error => tracing::error!(code, diagnostic = %diagnostic, "Command failed"),
        LogLevel::Warn => tracing::warn!(code, diagnostic = %diagnostic, "Command failed"),
        LogLevel::Debug => tracing::debug!(code, diagnostic = %diagnostic, "Command failed"),
    }

    eprintln!("error: {}", app_err.client_message());
    if let Some(action) = app_err.suggested_action() {
        eprintln!("hint: {}", action);
    }
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Content type from the file extension; unknown types are sent as raw bytes.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("pdf") => "application/pdf",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

pub async fn read_evidence(path: &Path) -> anyhow::Result<EvidenceUpload> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read evidence file {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(EvidenceUpload::new(
        filename,
        content_type_for(path),
        Bytes::from(data),
    ))
}

pub fn print_personnel_table(records: &[PersonnelViolation]) {
    println!(
        "{:<6} {:<10} {:<10} {:<22} {:<9} {}",
        "ID", "DATE", "HARD HAT", "TYPE", "SEVERITY", "DESCRIPTION"
    );
    for r in records {
        println!(
            "{:<6} {:<10} {:<10} {:<22} {:<9} {}",
            r.id.to_string(),
            format_date(r.date_of_event),
            truncate_string(&r.hard_hat_number, 10),
            truncate_string(r.violation_type.as_str(), 22),
            r.severity.as_str(),
            truncate_string(&r.description, 48)
        );
    }
    println!("{} record(s)", records.len());
}

pub fn print_site_table(issues: &[SiteIssue]) {
    println!(
        "{:<6} {:<10} {:<18} {:<14} {:<6} {:<9} {}",
        "ID", "DATE", "COMPANY", "BUILDING", "FLOOR", "RISK", "ISSUE"
    );
    for i in issues {
        println!(
            "{:<6} {:<10} {:<18} {:<14} {:<6} {:<9} {}",
            i.id.to_string(),
            format_date(i.date_of_event),
            truncate_string(&i.company, 18),
            truncate_string(&i.building, 14),
            truncate_string(&i.floor, 6),
            i.risk_level.as_str(),
            truncate_string(&i.issue, 40)
        );
    }
    println!("{} record(s)", issues.len());
}
