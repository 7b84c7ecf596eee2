use sqlx::{PgPool, Postgres};
use toolgate_core::{
    models::{AuditLog, AuditLogDetails, NewAuditLog, ProfileSummary},
    AppError,
};
use uuid::Uuid;

/// Repository for the append-only audit trail
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct AuditLogDetailsRow {
    #[sqlx(flatten)]
    entry: AuditLog,
    actor_email: Option<String>,
    actor_full_name: Option<String>,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one entry. Callers that must not fail on audit errors go
    /// through the recorder, which logs and swallows this error.
    #[tracing::instrument(skip(self, entry), fields(db.table = "audit_logs", db.operation = "insert"))]
    pub async fn insert(&self, entry: &NewAuditLog) -> Result<AuditLog, AppError> {
        let log = sqlx::query_as::<Postgres, AuditLog>(
            r#"
            INSERT INTO audit_logs (organization_id, actor_id, action, resource_type, resource_id, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, organization_id, actor_id, action, resource_type, resource_id,
                      metadata, created_at
            "#,
        )
        .bind(entry.organization_id)
        .bind(entry.actor_id)
        .bind(&entry.action)
        .bind(&entry.resource_type)
        .bind(entry.resource_id)
        .bind(&entry.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    /// The organization's audit trail, newest first, actor profile joined.
    #[tracing::instrument(skip(self), fields(db.table = "audit_logs", db.operation = "select"))]
    pub async fn list_for_org(
        &self,
        organization_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogDetails>, AppError> {
        let rows = sqlx::query_as::<Postgres, AuditLogDetailsRow>(
            r#"
            SELECT a.id, a.organization_id, a.actor_id, a.action, a.resource_type,
                   a.resource_id, a.metadata, a.created_at,
                   p.email AS actor_email, p.full_name AS actor_full_name
            FROM audit_logs a
            LEFT JOIN profiles p ON p.id = a.actor_id
            WHERE a.organization_id = $1
            ORDER BY a.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(organization_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let actor_id = row.entry.actor_id;
                AuditLogDetails {
                    actor: actor_id.and_then(|id| {
                        row.actor_email.map(|email| ProfileSummary {
                            id,
                            email,
                            full_name: row.actor_full_name,
                        })
                    }),
                    entry: row.entry,
                }
            })
            .collect())
    }
}
