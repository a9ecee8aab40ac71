/// Database connection and schema management
///
/// Users and projects are stored as JSON documents with indexed lookup
/// columns beside them:
/// - users(id, userid, email, document)
/// - projects(id, projectid, document)
///
/// Uniqueness of userid, email and projectid is left to the unique indexes.

use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Open the connection pool described by the configuration
///
/// Creates the database file (and its directory) when missing. In-memory
/// databases keep their connections alive forever since every fresh
/// connection would otherwise start from an empty database.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    let in_memory = config.url.contains(":memory:");

    if !in_memory {
        if let Some(parent) = config
            .url
            .strip_prefix("sqlite://")
            .and_then(|path| Path::new(path).parent())
            .filter(|dir| !dir.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("Failed to create database directory '{}': {}", parent.display(), e)
            })?;
        }
    }

    tracing::info!("🗄️ Opening database pool: {}", config.url);

    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
    let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections.max(1));
    if in_memory {
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }
    let pool = pool_options.connect_with(options).await?;

    Ok(pool)
}

/// Initialize the document schema
///
/// Safe to call multiple times (uses IF NOT EXISTS).
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            userid TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            document JSON NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            projectid TEXT NOT NULL UNIQUE,
            document JSON NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Open a pool and make sure the schema exists
pub async fn open(config: &DatabaseConfig) -> Result<SqlitePool> {
    let pool = connect(config).await?;
    init_schema(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize database schema: {}", e))?;
    tracing::info!("✅ Database schema ready");
    Ok(pool)
}
