//! Invitation repository tests against a live Postgres: the transactional
//! accept and the one-open-invitation index.

mod helpers;

use chrono::{Duration, Utc};
use helpers::{create_organization, create_profile, setup_test_db};
use toolgate_core::models::Role;
use toolgate_core::AppError;
use toolgate_db::{InvitationRepository, MembershipRepository};

#[tokio::test]
async fn test_accept_creates_membership_and_consumes_invitation() {
    let db = setup_test_db().await;
    let owner = create_profile(db.pool(), "owner@acme.com").await;
    let invitee = create_profile(db.pool(), "dev@acme.com").await;
    let org = create_organization(db.pool(), "acme", owner).await;

    let repository = InvitationRepository::new(db.pool().clone());
    let invitation = repository
        .create(
            org.id,
            "dev@acme.com",
            Role::Member,
            owner,
            "token-accept",
            Utc::now() + Duration::days(7),
        )
        .await
        .expect("create invitation");

    repository
        .accept(invitation.id, org.id, invitee, invitation.role)
        .await
        .expect("accept");

    let role = MembershipRepository::new(db.pool().clone())
        .get_role(org.id, invitee)
        .await
        .expect("get role");
    assert_eq!(role, Some(Role::Member));

    // Accepted invitations no longer resolve by token.
    let resolved = repository
        .get_by_token("token-accept")
        .await
        .expect("lookup");
    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_accept_twice_conflicts() {
    let db = setup_test_db().await;
    let owner = create_profile(db.pool(), "owner@acme.com").await;
    let invitee = create_profile(db.pool(), "dev@acme.com").await;
    let org = create_organization(db.pool(), "acme", owner).await;

    let repository = InvitationRepository::new(db.pool().clone());
    let invitation = repository
        .create(
            org.id,
            "dev@acme.com",
            Role::Member,
            owner,
            "token-twice",
            Utc::now() + Duration::days(7),
        )
        .await
        .expect("create invitation");

    repository
        .accept(invitation.id, org.id, invitee, invitation.role)
        .await
        .expect("first accept");

    let err = repository
        .accept(invitation.id, org.id, invitee, invitation.role)
        .await
        .expect_err("second accept must fail");
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn test_duplicate_open_invitation_conflicts() {
    let db = setup_test_db().await;
    let owner = create_profile(db.pool(), "owner@acme.com").await;
    let org = create_organization(db.pool(), "acme", owner).await;

    let repository = InvitationRepository::new(db.pool().clone());
    repository
        .create(
            org.id,
            "dev@acme.com",
            Role::Member,
            owner,
            "token-one",
            Utc::now() + Duration::days(7),
        )
        .await
        .expect("first invitation");

    let err = repository
        .create(
            org.id,
            "dev@acme.com",
            Role::Admin,
            owner,
            "token-two",
            Utc::now() + Duration::days(7),
        )
        .await
        .expect_err("open invitation already exists");
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
}
