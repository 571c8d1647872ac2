//! Report compilation end to end.

mod helpers;

use chrono::Duration;
use helpers::{day, setup_test_app, site_issue, violation};
use lopdf::Document;
use sitesafe_core::AppError;

fn page_text(doc: &Document) -> String {
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    doc.extract_text(&pages).unwrap_or_default()
}

#[tokio::test]
async fn report_covers_range_and_names_file() {
    let today = day(2024, 3, 31);
    let app = setup_test_app(today).await;
    app.store
        .insert_personnel(&app.session, violation("117", day(2024, 3, 5)))
        .await
        .unwrap();
    app.store
        .insert_personnel(&app.session, violation("118", day(2024, 4, 2)))
        .await
        .unwrap();
    app.store
        .insert_site(&app.session, site_issue("Tower A", day(2024, 3, 31)))
        .await
        .unwrap();

    let report = app
        .reports()
        .compile(&app.session, day(2024, 3, 1), today)
        .await
        .unwrap();

    assert_eq!(report.filename(), "safety_report_2024-03-01_to_2024-03-31.pdf");
    assert_eq!(report.mime_type(), "application/pdf");
    assert!(report.bytes().starts_with(b"%PDF"));

    let doc = Document::load_mem(report.bytes()).unwrap();
    assert!(!doc.get_pages().is_empty());
    let text = page_text(&doc);
    assert!(text.contains("Personnel violations: 1"));
    assert!(text.contains("Site issues: 1"));
}

#[tokio::test]
async fn empty_section_says_none_recorded() {
    let today = day(2024, 3, 31);
    let app = setup_test_app(today).await;
    app.store
        .insert_site(&app.session, site_issue("Tower A", today))
        .await
        .unwrap();

    let report = app
        .reports()
        .compile(&app.session, today - Duration::days(6), today)
        .await
        .unwrap();

    let doc = Document::load_mem(report.bytes()).unwrap();
    let text = page_text(&doc);
    assert!(text.contains("No personnel violations recorded in this range."));
    assert!(!text.contains("No site issues recorded in this range."));
}

#[tokio::test]
async fn many_entries_paginate() {
    let today = day(2024, 3, 31);
    let app = setup_test_app(today).await;
    for i in 0..80 {
        app.store
            .insert_personnel(&app.session, violation(&format!("{}", 100 + i), today))
            .await
            .unwrap();
    }

    let report = app.reports().compile(&app.session, today, today).await.unwrap();
    let doc = Document::load_mem(report.bytes()).unwrap();
    assert!(doc.get_pages().len() > 1);
}

#[tokio::test]
async fn reversed_range_is_rejected() {
    let app = setup_test_app(day(2024, 3, 31)).await;
    let err = app
        .reports()
        .compile(&app.session, day(2024, 3, 31), day(2024, 3, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidRange { .. }));
}
