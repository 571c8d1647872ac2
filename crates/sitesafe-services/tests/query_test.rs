//! Filtered listing through the services stack.

mod helpers;

use helpers::{day, setup_test_app, site_issue};
use sitesafe_core::models::SiteFilters;

#[tokio::test]
async fn building_filter_returns_only_that_building() {
    let today = day(2024, 5, 10);
    let app = setup_test_app(today).await;
    for building in ["Tower A", "Tower B", "Tower A"] {
        app.store
            .insert_site(&app.session, site_issue(building, today))
            .await
            .unwrap();
    }

    let filters = SiteFilters {
        building: Some("Tower A".to_string()),
        ..SiteFilters::default()
    };
    let issues = app.store.query_site(&app.session, &filters).await.unwrap();
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i.building == "Tower A"));
    assert!(issues[0].id > issues[1].id);
}
