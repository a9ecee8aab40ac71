/// SQLite persistence layer for project documents
///
/// Membership lookups go through `json_each` over the stored members array
/// so the document stays the single source of truth.

use crate::error::AppResult;
use crate::project::types::Project;
use sqlx::{sqlite::SqlitePool, Row};

/// SQLite-based project storage
#[derive(Debug, Clone)]
pub struct ProjectStorage {
    pool: SqlitePool,
}

impl ProjectStorage {
    /// Create new storage instance with database connection
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new project document
    pub async fn insert(&self, project: &Project) -> AppResult<()> {
        let document = serde_json::to_string(project)?;

        sqlx::query("INSERT INTO projects (id, projectid, document) VALUES (?, ?, ?)")
            .bind(&project.id)
            .bind(&project.projectid)
            .bind(&document)
            .execute(&self.pool)
            .await?;

        tracing::debug!("📁 Inserted project {} ({})", project.projectid, project.id);
        Ok(())
    }

    /// Append `email` to the project's member list unless already present
    ///
    /// Edits the stored document in place. Returns whether the list changed.
    pub async fn add_member(&self, id: &str, email: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET document = json_insert(document, '$.members[#]', ?),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
              AND NOT EXISTS (
                  SELECT 1 FROM json_each(projects.document, '$.members') m
                  WHERE m.value = ?
              )
            "#,
        )
        .bind(email)
        .bind(id)
        .bind(email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Retrieve a project by internal id
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Project>> {
        let row = sqlx::query("SELECT document FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        decode(row)
    }

    /// Retrieve a project by its public projectid
    pub async fn find_by_projectid(&self, projectid: &str) -> AppResult<Option<Project>> {
        let row = sqlx::query("SELECT document FROM projects WHERE projectid = ?")
            .bind(projectid)
            .fetch_optional(&self.pool)
            .await?;
        decode(row)
    }

    /// Retrieve the project `projectid` only if `email` is one of its members
    pub async fn find_with_member(&self, projectid: &str, email: &str) -> AppResult<Option<Project>> {
        let row = sqlx::query(
            r#"
            SELECT p.document FROM projects p
            WHERE p.projectid = ?
              AND EXISTS (
                  SELECT 1 FROM json_each(p.document, '$.members') m
                  WHERE m.value = ?
              )
            "#,
        )
        .bind(projectid)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        decode(row)
    }
}

fn decode(row: Option<sqlx::sqlite::SqliteRow>) -> AppResult<Option<Project>> {
    match row {
        Some(row) => {
            let document: String = row.get("document");
            Ok(Some(serde_json::from_str(&document)?))
        }
        None => Ok(None),
    }
}
