use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use toolgate_core::{
    models::{
        Invitation, InvitationDetails, OrganizationSummary, ProfileSummary, Role, UserInvitation,
    },
    AppError,
};
use uuid::Uuid;

use super::translate_db_error;

/// Repository for managing invitations
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct InvitationDetailsRow {
    #[sqlx(flatten)]
    invitation: Invitation,
    inviter_email: Option<String>,
    inviter_full_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct UserInvitationRow {
    #[sqlx(flatten)]
    invitation: Invitation,
    org_name: String,
    org_slug: String,
    inviter_email: Option<String>,
    inviter_full_name: Option<String>,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an invitation. The caller passes an already-normalized
    /// (lowercased) email. Expired unaccepted invitations for the same
    /// (organization, email) are purged in the same transaction so the
    /// open-invitation unique index never blocks a legitimate re-invite;
    /// a live duplicate still surfaces as Conflict.
    #[tracing::instrument(skip(self, token), fields(db.table = "invitations", db.operation = "insert"))]
    pub async fn create(
        &self,
        organization_id: Uuid,
        email: &str,
        role: Role,
        invited_by: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Invitation, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM invitations
            WHERE organization_id = $1
              AND lower(email) = lower($2)
              AND accepted_at IS NULL
              AND expires_at < NOW()
            "#,
        )
        .bind(organization_id)
        .bind(email)
        .execute(&mut *tx)
        .await?;

        let invitation = sqlx::query_as::<Postgres, Invitation>(
            r#"
            INSERT INTO invitations (organization_id, email, role, invited_by, token, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, organization_id, email, role, invited_by, token,
                      expires_at, accepted_at, created_at
            "#,
        )
        .bind(organization_id)
        .bind(email)
        .bind(role)
        .bind(invited_by)
        .bind(token)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(translate_db_error)?;

        tx.commit().await?;

        Ok(invitation)
    }

    /// Lookup by token among unaccepted invitations. Expired rows are
    /// returned so the caller can distinguish Expired from NotFound.
    #[tracing::instrument(skip(self, token), fields(db.table = "invitations", db.operation = "select"))]
    pub async fn get_by_token(&self, token: &str) -> Result<Option<Invitation>, AppError> {
        let invitation = sqlx::query_as::<Postgres, Invitation>(
            r#"
            SELECT id, organization_id, email, role, invited_by, token,
                   expires_at, accepted_at, created_at
            FROM invitations
            WHERE token = $1 AND accepted_at IS NULL
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invitation)
    }

    /// Consume an invitation: insert the membership and stamp accepted_at in
    /// one transaction. A concurrent accept or an existing membership
    /// surfaces as Conflict through the membership unique index.
    #[tracing::instrument(skip(self), fields(db.table = "invitations", db.operation = "update", db.record_id = %invitation_id))]
    pub async fn accept(
        &self,
        invitation_id: Uuid,
        organization_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO memberships (organization_id, user_id, role) VALUES ($1, $2, $3)",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(role)
        .execute(&mut *tx)
        .await
        .map_err(translate_db_error)?;

        let rows_affected = sqlx::query(
            "UPDATE invitations SET accepted_at = NOW() WHERE id = $1 AND accepted_at IS NULL",
        )
        .bind(invitation_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            tx.rollback().await?;
            return Err(AppError::Conflict(
                "Invitation was already accepted".to_string(),
            ));
        }

        tx.commit().await?;

        Ok(())
    }

    /// The organization's unaccepted invitations, newest first, with the
    /// inviter's profile.
    #[tracing::instrument(skip(self), fields(db.table = "invitations", db.operation = "select"))]
    pub async fn list_for_org(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<InvitationDetails>, AppError> {
        let rows = sqlx::query_as::<Postgres, InvitationDetailsRow>(
            r#"
            SELECT i.id, i.organization_id, i.email, i.role, i.invited_by, i.token,
                   i.expires_at, i.accepted_at, i.created_at,
                   p.email AS inviter_email, p.full_name AS inviter_full_name
            FROM invitations i
            LEFT JOIN profiles p ON p.id = i.invited_by
            WHERE i.organization_id = $1 AND i.accepted_at IS NULL
            ORDER BY i.created_at DESC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let inviter_id = row.invitation.invited_by;
                InvitationDetails {
                    inviter: row.inviter_email.map(|email| ProfileSummary {
                        id: inviter_id,
                        email,
                        full_name: row.inviter_full_name,
                    }),
                    invitation: row.invitation,
                }
            })
            .collect())
    }

    /// Unaccepted, unexpired invitations addressed to the email across all
    /// organizations, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "invitations", db.operation = "select"))]
    pub async fn list_for_email(&self, email: &str) -> Result<Vec<UserInvitation>, AppError> {
        let rows = sqlx::query_as::<Postgres, UserInvitationRow>(
            r#"
            SELECT i.id, i.organization_id, i.email, i.role, i.invited_by, i.token,
                   i.expires_at, i.accepted_at, i.created_at,
                   o.name AS org_name, o.slug AS org_slug,
                   p.email AS inviter_email, p.full_name AS inviter_full_name
            FROM invitations i
            INNER JOIN organizations o ON o.id = i.organization_id AND o.deleted_at IS NULL
            LEFT JOIN profiles p ON p.id = i.invited_by
            WHERE lower(i.email) = lower($1)
              AND i.accepted_at IS NULL
              AND i.expires_at > NOW()
            ORDER BY i.created_at DESC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let inviter_id = row.invitation.invited_by;
                UserInvitation {
                    token: row.invitation.token.clone(),
                    organization: OrganizationSummary {
                        id: row.invitation.organization_id,
                        name: row.org_name,
                        slug: row.org_slug,
                    },
                    inviter: row.inviter_email.map(|email| ProfileSummary {
                        id: inviter_id,
                        email,
                        full_name: row.inviter_full_name,
                    }),
                    invitation: row.invitation,
                }
            })
            .collect())
    }

    /// Delete an unaccepted invitation, but only when it is addressed to the
    /// given email (case-insensitive). Returns the deleted invitation, or
    /// None when nothing matched.
    #[tracing::instrument(skip(self), fields(db.table = "invitations", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_addressed_to(
        &self,
        id: Uuid,
        email: &str,
    ) -> Result<Option<Invitation>, AppError> {
        let invitation = sqlx::query_as::<Postgres, Invitation>(
            r#"
            DELETE FROM invitations
            WHERE id = $1 AND lower(email) = lower($2) AND accepted_at IS NULL
            RETURNING id, organization_id, email, role, invited_by, token,
                      expires_at, accepted_at, created_at
            "#,
        )
        .bind(id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invitation)
    }

    /// Delete an invitation unconditionally (stale-invitation cleanup during
    /// accept when the invitee is already a member).
    #[tracing::instrument(skip(self), fields(db.table = "invitations", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
