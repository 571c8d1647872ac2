//! Repeat-offender counts against a real store.

mod helpers;

use chrono::Duration;
use helpers::{day, setup_test_app, violation};
use sitesafe_core::{AppError, EscalationThresholds};
use sitesafe_services::RepeatOffenderAggregator;

#[tokio::test]
async fn escalates_after_third_violation() {
    let d = day(2024, 5, 10);
    let app = setup_test_app(d).await;
    let aggregator = app.aggregator();

    app.store
        .insert_personnel(&app.session, violation("117", d))
        .await
        .unwrap();
    let status = aggregator.evaluate(&app.session, "117").await.unwrap();
    assert_eq!((status.total, status.recent, status.escalate), (1, 1, false));

    app.store
        .insert_personnel(&app.session, violation("117", d))
        .await
        .unwrap();
    app.store
        .insert_personnel(&app.session, violation("117", d + Duration::days(5)))
        .await
        .unwrap();
    app.clock.set_day(d + Duration::days(5));

    let status = aggregator.evaluate(&app.session, "117").await.unwrap();
    assert_eq!(status.hard_hat_number, "117");
    assert_eq!((status.total, status.recent, status.escalate), (3, 3, true));
}

#[tokio::test]
async fn two_recent_violations_escalate() {
    let today = day(2024, 5, 10);
    let app = setup_test_app(today).await;
    for on in [today - Duration::days(30), today] {
        app.store
            .insert_personnel(&app.session, violation("A-42", on))
            .await
            .unwrap();
    }

    let status = app.aggregator().evaluate(&app.session, " A-42 ").await.unwrap();
    assert_eq!((status.total, status.recent, status.escalate), (2, 2, true));
}

#[tokio::test]
async fn old_violations_only_count_toward_total() {
    let today = day(2024, 5, 10);
    let app = setup_test_app(today).await;
    for on in [today - Duration::days(31), today - Duration::days(90)] {
        app.store
            .insert_personnel(&app.session, violation("88", on))
            .await
            .unwrap();
    }
    app.store
        .insert_personnel(&app.session, violation("89", today))
        .await
        .unwrap();

    let status = app.aggregator().evaluate(&app.session, "88").await.unwrap();
    assert_eq!((status.total, status.recent, status.escalate), (2, 0, false));
}

#[tokio::test]
async fn unknown_token_has_zero_counts() {
    let app = setup_test_app(day(2024, 5, 10)).await;
    let status = app.aggregator().evaluate(&app.session, "999").await.unwrap();
    assert_eq!((status.total, status.recent, status.escalate), (0, 0, false));
}

#[tokio::test]
async fn blank_token_is_rejected() {
    let app = setup_test_app(day(2024, 5, 10)).await;
    let err = app.aggregator().evaluate(&app.session, "  !! ").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn thresholds_are_configurable() {
    let today = day(2024, 5, 10);
    let app = setup_test_app(today).await;
    app.store
        .insert_personnel(&app.session, violation("5", today))
        .await
        .unwrap();

    let strict = RepeatOffenderAggregator::new(
        app.store.clone(),
        EscalationThresholds {
            total: 1,
            recent: 5,
            window_days: 7,
        },
    );
    let status = strict.evaluate(&app.session, "5").await.unwrap();
    assert!(status.escalate);
}
