use sqlx::{PgPool, Postgres};
use toolgate_core::AppError;
use uuid::Uuid;

/// The principal resolved from a session token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResolvedSession {
    pub user_id: Uuid,
    pub email: String,
}

/// Repository for resolving session tokens into principals. Sessions are
/// created and invalidated by the auth collaborator; this service only reads
/// them.
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve an unexpired session token to its user id and email.
    /// Expired or unknown tokens resolve to None.
    #[tracing::instrument(skip(self, token), fields(db.table = "sessions", db.operation = "select"))]
    pub async fn resolve(&self, token: &str) -> Result<Option<ResolvedSession>, AppError> {
        let resolved = sqlx::query_as::<Postgres, ResolvedSession>(
            r#"
            SELECT s.user_id, p.email
            FROM sessions s
            INNER JOIN profiles p ON p.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(resolved)
    }
}
