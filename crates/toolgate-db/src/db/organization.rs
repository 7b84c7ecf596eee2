use sqlx::{PgPool, Postgres};
use toolgate_core::{
    models::{Organization, Role, SubscriptionPlan},
    AppError,
};
use uuid::Uuid;

use super::translate_db_error;

// Caps provisioned with a new FREE-plan subscription.
const FREE_USER_LIMIT: i64 = 5;
const FREE_TOOL_LIMIT: i64 = 10;

/// Repository for managing organizations
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an organization together with its OWNER membership and
    /// FREE-plan subscription, atomically.
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "insert"))]
    pub async fn create(
        &self,
        name: &str,
        slug: &str,
        owner_id: Uuid,
    ) -> Result<Organization, AppError> {
        let mut tx = self.pool.begin().await?;

        let organization = sqlx::query_as::<Postgres, Organization>(
            r#"
            INSERT INTO organizations (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug, created_at, updated_at, deleted_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&mut *tx)
        .await
        .map_err(translate_db_error)?;

        sqlx::query(
            "INSERT INTO memberships (organization_id, user_id, role) VALUES ($1, $2, $3)",
        )
        .bind(organization.id)
        .bind(owner_id)
        .bind(Role::Owner)
        .execute(&mut *tx)
        .await
        .map_err(translate_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO subscriptions (organization_id, plan, user_limit, tool_limit)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(organization.id)
        .bind(SubscriptionPlan::Free)
        .bind(FREE_USER_LIMIT)
        .bind(FREE_TOOL_LIMIT)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(organization)
    }

    /// Organizations in which the user holds a non-deleted membership,
    /// newest first.
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select"))]
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Organization>, AppError> {
        let organizations = sqlx::query_as::<Postgres, Organization>(
            r#"
            SELECT o.id, o.name, o.slug, o.created_at, o.updated_at, o.deleted_at
            FROM organizations o
            INNER JOIN memberships m ON m.organization_id = o.id
            WHERE m.user_id = $1
              AND m.deleted_at IS NULL
              AND o.deleted_at IS NULL
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(organizations)
    }

    /// Get a non-deleted organization by id.
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let organization = sqlx::query_as::<Postgres, Organization>(
            r#"
            SELECT id, name, slug, created_at, updated_at, deleted_at
            FROM organizations
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organization)
    }
}
