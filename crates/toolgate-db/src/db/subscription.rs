use sqlx::{PgPool, Postgres};
use toolgate_core::{models::Subscription, AppError};
use uuid::Uuid;

/// Repository for reading per-organization subscriptions. Provisioned with
/// the organization and read-only afterwards.
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "subscriptions", db.operation = "select"))]
    pub async fn get_for_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<Subscription>, AppError> {
        let subscription = sqlx::query_as::<Postgres, Subscription>(
            r#"
            SELECT id, organization_id, plan, user_limit, tool_limit, created_at, updated_at
            FROM subscriptions
            WHERE organization_id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }
}
