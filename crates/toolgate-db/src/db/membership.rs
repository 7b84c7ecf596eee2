use sqlx::{PgPool, Postgres};
use toolgate_core::{
    models::{MemberDetails, Membership, ProfileSummary, Role},
    AppError,
};
use uuid::Uuid;

/// Repository for managing organization memberships
#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct MemberDetailsRow {
    #[sqlx(flatten)]
    membership: Membership,
    member_email: Option<String>,
    member_full_name: Option<String>,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Role of the user's unique non-deleted membership, if any. This is the
    /// single source for all authorization lookups.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn get_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_scalar::<Postgres, Role>(
            r#"
            SELECT role FROM memberships
            WHERE organization_id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    /// Count non-deleted memberships in the organization.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn count_active(&self, organization_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM memberships WHERE organization_id = $1 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// True when a non-deleted membership exists for the email's profile.
    /// Email comparison is case-insensitive.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn email_is_member(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM memberships m
                INNER JOIN profiles p ON p.id = m.user_id
                WHERE m.organization_id = $1
                  AND lower(p.email) = lower($2)
                  AND m.deleted_at IS NULL
            )
            "#,
        )
        .bind(organization_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Non-deleted memberships with their profiles, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn list_with_profiles(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MemberDetails>, AppError> {
        let rows = sqlx::query_as::<Postgres, MemberDetailsRow>(
            r#"
            SELECT m.id, m.organization_id, m.user_id, m.role,
                   m.created_at, m.updated_at, m.deleted_at,
                   p.email AS member_email, p.full_name AS member_full_name
            FROM memberships m
            LEFT JOIN profiles p ON p.id = m.user_id
            WHERE m.organization_id = $1 AND m.deleted_at IS NULL
            ORDER BY m.created_at DESC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let user_id = row.membership.user_id;
                MemberDetails {
                    profile: row.member_email.map(|email| ProfileSummary {
                        id: user_id,
                        email,
                        full_name: row.member_full_name,
                    }),
                    membership: row.membership,
                }
            })
            .collect())
    }
}
