//! Tool repository tests against a live Postgres: tier provisioning and the
//! soft-delete archive path.

mod helpers;

use helpers::{create_organization, create_profile, create_tool, setup_test_db};
use toolgate_core::models::AccessLevel;
use toolgate_db::ToolRepository;

#[tokio::test]
async fn test_create_provisions_all_three_tiers() {
    let db = setup_test_db().await;
    let owner = create_profile(db.pool(), "owner@acme.com").await;
    let org = create_organization(db.pool(), "acme", owner).await;

    let (tool, levels) = create_tool(db.pool(), org.id, "Grafana").await;
    assert_eq!(levels.len(), 3);
    let tiers: Vec<AccessLevel> = levels.iter().map(|l| l.level).collect();
    for expected in AccessLevel::ALL {
        assert!(tiers.contains(&expected), "missing tier {expected:?}");
    }
    assert!(levels.iter().all(|l| l.tool_id == tool.id));

    // The stored rows match what create returned.
    let stored = ToolRepository::new(db.pool().clone())
        .get_levels(tool.id)
        .await
        .expect("get levels");
    assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn test_archive_hides_tool_from_default_listing() {
    let db = setup_test_db().await;
    let owner = create_profile(db.pool(), "owner@acme.com").await;
    let org = create_organization(db.pool(), "acme", owner).await;
    let (tool, _) = create_tool(db.pool(), org.id, "Grafana").await;

    let repository = ToolRepository::new(db.pool().clone());
    assert!(repository.archive(org.id, tool.id).await.expect("archive"));

    let active = repository.list(org.id, false).await.expect("list active");
    assert!(active.is_empty());

    let all = repository.list(org.id, true).await.expect("list all");
    assert_eq!(all.len(), 1);
    assert!(all[0].deleted_at.is_some());

    // Archiving twice is a no-op reported as not found.
    assert!(!repository.archive(org.id, tool.id).await.expect("re-archive"));
}
