use sqlx::{PgPool, Postgres};
use toolgate_core::{
    models::{AccessLevel, AccessRequest, AccessRequestDetails, ProfileSummary, RequestStatus},
    AppError,
};
use uuid::Uuid;

use super::translate_db_error;

/// Repository for managing access requests
#[derive(Clone)]
pub struct AccessRequestRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct AccessRequestDetailsRow {
    #[sqlx(flatten)]
    request: AccessRequest,
    tool_name: String,
    requester_email: Option<String>,
    requester_full_name: Option<String>,
    reviewer_email: Option<String>,
    reviewer_full_name: Option<String>,
}

impl AccessRequestDetailsRow {
    fn into_details(self) -> AccessRequestDetails {
        let requester_id = self.request.user_id;
        let reviewer_id = self.request.reviewed_by;
        AccessRequestDetails {
            requester: self.requester_email.map(|email| ProfileSummary {
                id: requester_id,
                email,
                full_name: self.requester_full_name,
            }),
            reviewer: reviewer_id.and_then(|id| {
                self.reviewer_email.map(|email| ProfileSummary {
                    id,
                    email,
                    full_name: self.reviewer_full_name,
                })
            }),
            tool_name: self.tool_name,
            request: self.request,
        }
    }
}

const DETAILS_SELECT: &str = r#"
    SELECT ar.id, ar.organization_id, ar.tool_id, ar.user_id, ar.access_level,
           ar.reason, ar.status, ar.reviewed_by, ar.reviewed_at,
           ar.created_at, ar.updated_at,
           t.name AS tool_name,
           rp.email AS requester_email, rp.full_name AS requester_full_name,
           vp.email AS reviewer_email, vp.full_name AS reviewer_full_name
    FROM access_requests ar
    INNER JOIN tools t ON t.id = ar.tool_id
    LEFT JOIN profiles rp ON rp.id = ar.user_id
    LEFT JOIN profiles vp ON vp.id = ar.reviewed_by
"#;

impl AccessRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// File a PENDING request. The one-pending-per-(tool, user) invariant is
    /// enforced by a partial unique index, surfaced as Conflict.
    #[tracing::instrument(skip(self), fields(db.table = "access_requests", db.operation = "insert"))]
    pub async fn create(
        &self,
        organization_id: Uuid,
        tool_id: Uuid,
        user_id: Uuid,
        access_level: AccessLevel,
        reason: Option<&str>,
    ) -> Result<AccessRequest, AppError> {
        let request = sqlx::query_as::<Postgres, AccessRequest>(
            r#"
            INSERT INTO access_requests (organization_id, tool_id, user_id, access_level, reason, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, organization_id, tool_id, user_id, access_level, reason, status,
                      reviewed_by, reviewed_at, created_at, updated_at
            "#,
        )
        .bind(organization_id)
        .bind(tool_id)
        .bind(user_id)
        .bind(access_level)
        .bind(reason)
        .bind(RequestStatus::Pending)
        .fetch_one(&self.pool)
        .await
        .map_err(translate_db_error)?;

        Ok(request)
    }

    /// All of the organization's requests, newest first (reviewer view).
    #[tracing::instrument(skip(self), fields(db.table = "access_requests", db.operation = "select"))]
    pub async fn list_for_org(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<AccessRequestDetails>, AppError> {
        let query = format!(
            "{DETAILS_SELECT} WHERE ar.organization_id = $1 ORDER BY ar.created_at DESC"
        );
        let rows = sqlx::query_as::<Postgres, AccessRequestDetailsRow>(&query)
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_details()).collect())
    }

    /// One member's own requests, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "access_requests", db.operation = "select"))]
    pub async fn list_for_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<AccessRequestDetails>, AppError> {
        let query = format!(
            "{DETAILS_SELECT} WHERE ar.organization_id = $1 AND ar.user_id = $2 ORDER BY ar.created_at DESC"
        );
        let rows = sqlx::query_as::<Postgres, AccessRequestDetailsRow>(&query)
            .bind(organization_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_details()).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "access_requests", db.operation = "select", db.record_id = %id))]
    pub async fn get(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<AccessRequest>, AppError> {
        let request = sqlx::query_as::<Postgres, AccessRequest>(
            r#"
            SELECT id, organization_id, tool_id, user_id, access_level, reason, status,
                   reviewed_by, reviewed_at, created_at, updated_at
            FROM access_requests
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Apply a review transition as a conditional update, so two concurrent
    /// reviewers cannot both win. APPROVED/REJECTED require the row to still
    /// be PENDING; REVOKED requires APPROVED. Zero rows updated means either
    /// the request is gone (NotFound) or it already left the required state
    /// (Conflict).
    #[tracing::instrument(skip(self), fields(db.table = "access_requests", db.operation = "update", db.record_id = %id))]
    pub async fn review(
        &self,
        organization_id: Uuid,
        id: Uuid,
        new_status: RequestStatus,
        reviewer_id: Uuid,
    ) -> Result<AccessRequest, AppError> {
        let required_status = new_status.required_predecessor().ok_or_else(|| {
            AppError::InvalidInput(format!("Invalid review status: {}", new_status))
        })?;

        let updated = sqlx::query_as::<Postgres, AccessRequest>(
            r#"
            UPDATE access_requests
            SET status = $3, reviewed_by = $4, reviewed_at = NOW(), updated_at = NOW()
            WHERE organization_id = $1 AND id = $2 AND status = $5
            RETURNING id, organization_id, tool_id, user_id, access_level, reason, status,
                      reviewed_by, reviewed_at, created_at, updated_at
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .bind(new_status)
        .bind(reviewer_id)
        .bind(required_status)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(request) => Ok(request),
            None => match self.get(organization_id, id).await? {
                Some(existing) => Err(AppError::Conflict(format!(
                    "Request is {} and cannot become {}",
                    existing.status, new_status
                ))),
                None => Err(AppError::NotFound("Access request not found".to_string())),
            },
        }
    }
}
