use sqlx::{PgPool, Postgres};
use toolgate_core::{
    models::{AccessLevel, Tool, ToolAccessLevel, ToolStatus},
    AppError,
};
use uuid::Uuid;

/// Partial update for a tool. Only supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct ToolPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<ToolStatus>,
}

impl ToolPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.url.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.status.is_none()
    }

    /// Names of the fields this patch changes, for audit metadata.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.url.is_some() {
            fields.push("url");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.category.is_some() {
            fields.push("category");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        fields
    }
}

/// Repository for managing tools and their access tiers
#[derive(Clone)]
pub struct ToolRepository {
    pool: PgPool,
}

impl ToolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a tool together with its three access tiers, atomically.
    #[tracing::instrument(skip(self), fields(db.table = "tools", db.operation = "insert"))]
    pub async fn create(
        &self,
        organization_id: Uuid,
        name: &str,
        url: Option<&str>,
        description: Option<&str>,
        category: Option<&str>,
    ) -> Result<(Tool, Vec<ToolAccessLevel>), AppError> {
        let mut tx = self.pool.begin().await?;

        let tool = sqlx::query_as::<Postgres, Tool>(
            r#"
            INSERT INTO tools (organization_id, name, url, description, category, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, organization_id, name, url, description, category, status,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(organization_id)
        .bind(name)
        .bind(url)
        .bind(description)
        .bind(category)
        .bind(ToolStatus::Active)
        .fetch_one(&mut *tx)
        .await?;

        let mut levels = Vec::with_capacity(AccessLevel::ALL.len());
        for level in AccessLevel::ALL {
            let row = sqlx::query_as::<Postgres, ToolAccessLevel>(
                r#"
                INSERT INTO tool_access_levels (tool_id, level, description)
                VALUES ($1, $2, $3)
                RETURNING id, tool_id, level, description, created_at
                "#,
            )
            .bind(tool.id)
            .bind(level)
            .bind(level.default_description())
            .fetch_one(&mut *tx)
            .await?;
            levels.push(row);
        }

        tx.commit().await?;

        Ok((tool, levels))
    }

    /// Get a tool by id (organization-scoped, archived included so historical
    /// requests keep resolving).
    #[tracing::instrument(skip(self), fields(db.table = "tools", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Tool>, AppError> {
        let tool = sqlx::query_as::<Postgres, Tool>(
            r#"
            SELECT id, organization_id, name, url, description, category, status,
                   created_at, updated_at, deleted_at
            FROM tools
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tool)
    }

    /// Access tiers of a tool, in creation order.
    #[tracing::instrument(skip(self), fields(db.table = "tool_access_levels", db.operation = "select"))]
    pub async fn get_levels(&self, tool_id: Uuid) -> Result<Vec<ToolAccessLevel>, AppError> {
        let levels = sqlx::query_as::<Postgres, ToolAccessLevel>(
            r#"
            SELECT id, tool_id, level, description, created_at
            FROM tool_access_levels
            WHERE tool_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(tool_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// List the organization's tools, newest first. Archived tools are
    /// excluded unless requested.
    #[tracing::instrument(skip(self), fields(db.table = "tools", db.operation = "select"))]
    pub async fn list(
        &self,
        organization_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<Tool>, AppError> {
        let tools = if include_archived {
            sqlx::query_as::<Postgres, Tool>(
                r#"
                SELECT id, organization_id, name, url, description, category, status,
                       created_at, updated_at, deleted_at
                FROM tools
                WHERE organization_id = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<Postgres, Tool>(
                r#"
                SELECT id, organization_id, name, url, description, category, status,
                       created_at, updated_at, deleted_at
                FROM tools
                WHERE organization_id = $1 AND deleted_at IS NULL
                ORDER BY created_at DESC
                "#,
            )
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(tools)
    }

    /// Count non-archived tools, for capacity checks.
    #[tracing::instrument(skip(self), fields(db.table = "tools", db.operation = "select"))]
    pub async fn count_active(&self, organization_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tools WHERE organization_id = $1 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Apply a partial update; only fields present in the patch change.
    /// Returns None when no non-archived tool matches.
    #[tracing::instrument(skip(self, patch), fields(db.table = "tools", db.operation = "update", db.record_id = %id))]
    pub async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        patch: &ToolPatch,
    ) -> Result<Option<Tool>, AppError> {
        if patch.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one field must be provided".to_string(),
            ));
        }

        // Build update query
        let mut query = String::from("UPDATE tools SET updated_at = NOW()");
        let mut bind_index = 1;

        if patch.name.is_some() {
            query.push_str(&format!(", name = ${}", bind_index));
            bind_index += 1;
        }
        if patch.url.is_some() {
            query.push_str(&format!(", url = ${}", bind_index));
            bind_index += 1;
        }
        if patch.description.is_some() {
            query.push_str(&format!(", description = ${}", bind_index));
            bind_index += 1;
        }
        if patch.category.is_some() {
            query.push_str(&format!(", category = ${}", bind_index));
            bind_index += 1;
        }
        if patch.status.is_some() {
            query.push_str(&format!(", status = ${}", bind_index));
            bind_index += 1;
        }

        query.push_str(&format!(
            " WHERE organization_id = ${} AND id = ${} AND deleted_at IS NULL \
             RETURNING id, organization_id, name, url, description, category, status, \
             created_at, updated_at, deleted_at",
            bind_index,
            bind_index + 1
        ));

        let mut query_builder = sqlx::query_as::<Postgres, Tool>(&query);
        if let Some(ref name) = patch.name {
            query_builder = query_builder.bind(name);
        }
        if let Some(ref url) = patch.url {
            query_builder = query_builder.bind(url);
        }
        if let Some(ref description) = patch.description {
            query_builder = query_builder.bind(description);
        }
        if let Some(ref category) = patch.category {
            query_builder = query_builder.bind(category);
        }
        if let Some(status) = patch.status {
            query_builder = query_builder.bind(status);
        }
        query_builder = query_builder.bind(organization_id).bind(id);

        let tool = query_builder.fetch_optional(&self.pool).await?;

        Ok(tool)
    }

    /// Archive (soft delete). Archived tools remain valid foreign-key targets
    /// for historical access requests. Returns false when nothing matched.
    #[tracing::instrument(skip(self), fields(db.table = "tools", db.operation = "update", db.record_id = %id))]
    pub async fn archive(&self, organization_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE tools
            SET deleted_at = NOW(), status = $3, updated_at = NOW()
            WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .bind(ToolStatus::Inactive)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch_detection() {
        assert!(ToolPatch::default().is_empty());
        let patch = ToolPatch {
            name: Some("Grafana".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_changed_fields() {
        let patch = ToolPatch {
            name: Some("Grafana".to_string()),
            status: Some(ToolStatus::Inactive),
            ..Default::default()
        };
        assert_eq!(patch.changed_fields(), vec!["name", "status"]);
    }
}
