/// SQLite persistence layer for user documents
///
/// Documents live in the `document` JSON column; `userid` and `email` are
/// mirrored into indexed columns for lookups.

use crate::error::{AppError, AppResult};
use crate::user::types::{userid_base, User};
use sqlx::{sqlite::SqlitePool, QueryBuilder, Row, Sqlite};

/// SQLite-based user storage
#[derive(Debug, Clone)]
pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    /// Create new storage instance with database connection
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user document
    pub async fn insert(&self, user: &User) -> AppResult<()> {
        let document = serde_json::to_string(user)?;

        sqlx::query("INSERT INTO users (id, userid, email, document) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.local.userid)
            .bind(&user.local.email)
            .bind(&document)
            .execute(&self.pool)
            .await?;

        tracing::debug!("👤 Inserted user {} ({})", user.local.userid, user.id);
        Ok(())
    }

    /// Append `projectid` to the user's project list unless already present
    ///
    /// Edits the stored document in place so concurrent updates to other
    /// fields are not overwritten. Returns whether the list changed.
    pub async fn add_project(&self, id: &str, projectid: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET document = json_insert(document, '$.local.projects[#]', ?),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
              AND NOT EXISTS (
                  SELECT 1 FROM json_each(users.document, '$.local.projects') p
                  WHERE p.value = ?
              )
            "#,
        )
        .bind(projectid)
        .bind(id)
        .bind(projectid)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the editable profile fields, leaving the rest untouched
    pub async fn update_profile(
        &self,
        id: &str,
        firstname: &str,
        lastname: &str,
        user_color: &str,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET document = json_set(
                    document,
                    '$.local.firstname', ?,
                    '$.local.lastname', ?,
                    '$.local.userColor', ?
                ),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(firstname)
        .bind(lastname)
        .bind(user_color)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retrieve a user by internal id
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        self.find_one("SELECT document FROM users WHERE id = ?", id).await
    }

    /// Retrieve a user by public userid
    pub async fn find_by_userid(&self, userid: &str) -> AppResult<Option<User>> {
        self.find_one("SELECT document FROM users WHERE userid = ?", userid)
            .await
    }

    /// Retrieve a user by login email
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find_one("SELECT document FROM users WHERE email = ?", email)
            .await
    }

    /// Retrieve every user whose email is in `emails`
    ///
    /// Results come back in signup order, not in the order of `emails`.
    pub async fn find_by_emails(&self, emails: &[String]) -> AppResult<Vec<User>> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT document FROM users WHERE email IN (");
        let mut separated = query.separated(", ");
        for email in emails {
            separated.push_bind(email);
        }
        separated.push_unseparated(") ORDER BY created_at, rowid");

        let rows = query.build().fetch_all(&self.pool).await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            let document: String = row.get("document");
            users.push(serde_json::from_str(&document)?);
        }
        Ok(users)
    }

    /// Pick an unused userid derived from `email`
    ///
    /// "jdoe", then "jdoe2", "jdoe3", ... until one is free.
    pub async fn next_free_userid(&self, email: &str) -> AppResult<String> {
        let base = userid_base(email);
        let mut candidate = base.clone();
        let mut suffix = 1u32;
        while self.find_by_userid(&candidate).await?.is_some() {
            suffix += 1;
            candidate = format!("{}{}", base, suffix);
        }
        Ok(candidate)
    }

    async fn find_one(&self, sql: &str, key: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let document: String = row.get("document");
                Ok(Some(serde_json::from_str(&document)?))
            }
            None => Ok(None),
        }
    }
}

/// Unique column of `users` an insert collided with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Userid,
}

/// Which unique constraint `err` violated, if it is such an error
pub fn unique_violation(err: &AppError) -> Option<UniqueField> {
    let AppError::Database(e) = err else {
        return None;
    };
    let db = e.as_database_error().filter(|d| d.is_unique_violation())?;
    let message = db.message();
    if message.contains("users.email") {
        Some(UniqueField::Email)
    } else if message.contains("users.userid") {
        Some(UniqueField::Userid)
    } else {
        None
    }
}
