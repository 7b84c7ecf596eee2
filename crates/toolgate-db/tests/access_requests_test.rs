//! Access request repository tests against a live Postgres: the
//! one-pending-per-(tool, user) index and the conditional review update.

mod helpers;

use helpers::{create_organization, create_profile, create_tool, setup_test_db};
use toolgate_core::models::{AccessLevel, RequestStatus};
use toolgate_core::AppError;
use toolgate_db::AccessRequestRepository;
use uuid::Uuid;

#[tokio::test]
async fn test_duplicate_pending_request_conflicts() {
    let db = setup_test_db().await;
    let owner = create_profile(db.pool(), "owner@acme.com").await;
    let org = create_organization(db.pool(), "acme", owner).await;
    let (tool, _) = create_tool(db.pool(), org.id, "Grafana").await;

    let repository = AccessRequestRepository::new(db.pool().clone());
    repository
        .create(org.id, tool.id, owner, AccessLevel::Read, None)
        .await
        .expect("first request");

    let err = repository
        .create(org.id, tool.id, owner, AccessLevel::Write, Some("again"))
        .await
        .expect_err("second pending request must be rejected");
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn test_review_approves_then_revokes() {
    let db = setup_test_db().await;
    let owner = create_profile(db.pool(), "owner@acme.com").await;
    let requester = create_profile(db.pool(), "dev@acme.com").await;
    let org = create_organization(db.pool(), "acme", owner).await;
    let (tool, _) = create_tool(db.pool(), org.id, "Grafana").await;

    let repository = AccessRequestRepository::new(db.pool().clone());
    let request = repository
        .create(org.id, tool.id, requester, AccessLevel::Write, None)
        .await
        .expect("create request");

    let approved = repository
        .review(org.id, request.id, RequestStatus::Approved, owner)
        .await
        .expect("approve");
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.reviewed_by, Some(owner));
    assert!(approved.reviewed_at.is_some());

    let revoked = repository
        .review(org.id, request.id, RequestStatus::Revoked, owner)
        .await
        .expect("revoke");
    assert_eq!(revoked.status, RequestStatus::Revoked);
}

#[tokio::test]
async fn test_review_conflicts_once_request_left_required_state() {
    let db = setup_test_db().await;
    let owner = create_profile(db.pool(), "owner@acme.com").await;
    let org = create_organization(db.pool(), "acme", owner).await;
    let (tool, _) = create_tool(db.pool(), org.id, "Grafana").await;

    let repository = AccessRequestRepository::new(db.pool().clone());
    let request = repository
        .create(org.id, tool.id, owner, AccessLevel::Admin, None)
        .await
        .expect("create request");

    repository
        .review(org.id, request.id, RequestStatus::Rejected, owner)
        .await
        .expect("reject");

    // A second reviewer racing the first must lose with a conflict.
    let err = repository
        .review(org.id, request.id, RequestStatus::Approved, owner)
        .await
        .expect_err("request already left PENDING");
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");

    // Revoking a rejected request is also a conflict, not a silent update.
    let err = repository
        .review(org.id, request.id, RequestStatus::Revoked, owner)
        .await
        .expect_err("rejected request cannot be revoked");
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn test_review_unknown_request_is_not_found() {
    let db = setup_test_db().await;
    let owner = create_profile(db.pool(), "owner@acme.com").await;
    let org = create_organization(db.pool(), "acme", owner).await;

    let repository = AccessRequestRepository::new(db.pool().clone());
    let err = repository
        .review(org.id, Uuid::new_v4(), RequestStatus::Approved, owner)
        .await
        .expect_err("unknown request id");
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}
