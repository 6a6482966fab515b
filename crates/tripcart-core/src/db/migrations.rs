//! Database migrations

use crate::error::Result;
use libsql::Connection;

/// Schema steps in order; each entry moves the database to `version`.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "key/value local storage",
    statements: &[
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        // One opaque text value per key, like browser local storage
        "CREATE TABLE IF NOT EXISTS local_storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )",
    ],
}];

/// Current schema version
const CURRENT_VERSION: i32 = 1;

struct Migration {
    version: i32,
    description: &'static str,
    statements: &'static [&'static str],
}

/// Run all pending migrations
pub async fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn).await?;
    if version >= CURRENT_VERSION {
        return Ok(());
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > version) {
        apply(conn, migration).await?;
    }

    Ok(())
}

async fn single_i32(conn: &Connection, sql: &str) -> Result<i32> {
    let mut rows = conn.query(sql, ()).await?;
    match rows.next().await? {
        Some(row) => Ok(row.get::<i32>(0)?),
        None => Ok(0),
    }
}

/// Get the current schema version
async fn get_version(conn: &Connection) -> Result<i32> {
    let has_table = single_i32(
        conn,
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
    )
    .await?;

    if has_table == 0 {
        return Ok(0);
    }
    single_i32(conn, "SELECT COALESCE(MAX(version), 0) FROM schema_version").await
}

/// Apply one migration inside a transaction
async fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;

    let result = async {
        for stmt in migration.statements {
            conn.execute(stmt, ()).await?;
        }
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?)",
            [migration.version],
        )
        .await?;
        conn.execute("COMMIT", ()).await
    }
    .await;

    if let Err(e) = result {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::info!(
        "Migrated local storage to version {} ({})",
        migration.version,
        migration.description
    );
    Ok(())
}
