//! Toolgate Database Library
//!
//! sqlx/Postgres repositories for the access-governance data model. Every
//! query is scoped by organization id; uniqueness invariants are enforced by
//! partial unique indexes and surfaced as `Conflict` errors.

pub mod db;

pub use db::{
    AccessRequestRepository, AuditLogRepository, InvitationRepository, MembershipRepository,
    OrganizationRepository, ResolvedSession, SessionRepository, SubscriptionRepository,
    ToolRepository,
};
pub use db::tool::ToolPatch;
