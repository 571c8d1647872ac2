//! Evidence pointers and signed links over local storage.

mod helpers;

use std::time::Duration;

use bytes::Bytes;
use helpers::{day, setup_test_app};
use sitesafe_services::{EvidenceUpload, ObjectStorage};

#[tokio::test]
async fn stored_evidence_resolves_to_a_link() {
    let app = setup_test_app(day(2024, 5, 10)).await;
    let evidence = app.evidence();
    assert_eq!(evidence.ttl(), Duration::from_secs(3600));

    let upload = EvidenceUpload::new("harness.png", "image/png", Bytes::from_static(b"png"));
    let pointer = evidence.store(&upload, "people/117").await.unwrap();
    assert!(pointer.starts_with("people/117/20240510T093000_"));
    assert!(pointer.ends_with(".png"));
    assert_eq!(app.storage.download(&pointer).await.unwrap(), b"png");

    let link = evidence.resolve(Some(&pointer)).await.unwrap();
    assert!(link.starts_with("http://localhost:8080/evidence/"));
    assert!(link.contains("expires="));
}

#[tokio::test]
async fn same_file_twice_gets_distinct_pointers() {
    let app = setup_test_app(day(2024, 5, 10)).await;
    let evidence = app.evidence();
    let upload = EvidenceUpload::new("photo.jpg", "image/jpeg", Bytes::from_static(b"jpg"));

    let first = evidence.store(&upload, "people/117").await.unwrap();
    let second = evidence.store(&upload, "people/117").await.unwrap();
    assert_ne!(first, second);
    assert_eq!(app.stored_keys().len(), 2);
}

#[tokio::test]
async fn missing_extension_defaults_to_bin() {
    let app = setup_test_app(day(2024, 5, 10)).await;
    let upload = EvidenceUpload::new("scan", "", Bytes::from_static(b"raw"));
    let pointer = app.evidence().store(&upload, "site/Tower_A/floor_3").await.unwrap();
    assert!(pointer.ends_with(".bin"));
}

#[tokio::test]
async fn absent_or_unknown_pointers_resolve_to_nothing() {
    let app = setup_test_app(day(2024, 5, 10)).await;
    let evidence = app.evidence();
    assert!(evidence.resolve(None).await.is_none());
    assert!(evidence.resolve(Some("  ")).await.is_none());
    assert!(evidence
        .resolve(Some("people/117/20240101T000000_gone.jpg"))
        .await
        .is_none());
}
