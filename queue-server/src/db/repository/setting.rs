//! Settings Repository
//!
//! Flat key→value store; values are JSON-encoded strings. The overlay
//! onto defaults lives in `shared::models::settings`.

use super::RepoResult;
use shared::models::{AppSettings, SettingRow};
use sqlx::SqlitePool;

pub async fn get(pool: &SqlitePool, key: &str) -> RepoResult<Option<String>> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}

/// Upsert one key
pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<SettingRow>> {
    let rows = sqlx::query_as::<_, SettingRow>("SELECT key, value FROM settings")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Write the default value for every key that does not exist yet (idempotent)
pub async fn initialize_defaults(pool: &SqlitePool) -> RepoResult<()> {
    for (key, value) in AppSettings::default_map() {
        let encoded = value.to_string();
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)")
            .bind(&key)
            .bind(&encoded)
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Read an integer setting, falling back when missing or unparseable
pub async fn get_i64(pool: &SqlitePool, key: &str, default: i64) -> RepoResult<i64> {
    Ok(get(pool, key)
        .await?
        .and_then(|v| serde_json::from_str::<i64>(&v).ok())
        .unwrap_or(default))
}

/// Read a boolean setting, falling back when missing or unparseable
pub async fn get_bool(pool: &SqlitePool, key: &str, default: bool) -> RepoResult<bool> {
    Ok(get(pool, key)
        .await?
        .and_then(|v| serde_json::from_str::<bool>(&v).ok())
        .unwrap_or(default))
}

/// Read a string setting, falling back when missing
pub async fn get_string(pool: &SqlitePool, key: &str, default: &str) -> RepoResult<String> {
    Ok(get(pool, key)
        .await?
        .map(|v| match serde_json::from_str::<String>(&v) {
            Ok(s) => s,
            // Raw strings written before JSON-encoding was enforced
            Err(_) => v,
        })
        .unwrap_or_else(|| default.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn set_upserts() {
        let pool = test_pool().await;
        set(&pool, "language", "\"id\"").await.unwrap();
        set(&pool, "language", "\"en\"").await.unwrap();
        assert_eq!(get(&pool, "language").await.unwrap().as_deref(), Some("\"en\""));
    }

    #[tokio::test]
    async fn initialize_defaults_is_idempotent_and_preserves_overrides() {
        let pool = test_pool().await;
        initialize_defaults(&pool).await.unwrap();
        set(&pool, "display_next_count", "3").await.unwrap();

        // A second initialization must not clobber the stored value
        initialize_defaults(&pool).await.unwrap();
        assert_eq!(get_i64(&pool, "display_next_count", 5).await.unwrap(), 3);
        assert_eq!(get_bool(&pool, "auto_reset_daily", false).await.unwrap(), true);
    }

    #[tokio::test]
    async fn typed_getters_fall_back_on_garbage() {
        let pool = test_pool().await;
        set(&pool, "display_next_count", "\"lots\"").await.unwrap();
        assert_eq!(get_i64(&pool, "display_next_count", 5).await.unwrap(), 5);
        assert_eq!(get_string(&pool, "reset_time", "00:00").await.unwrap(), "00:00");

        // Raw (non-JSON) strings are returned as-is
        set(&pool, "reset_time", "08:30").await.unwrap();
        assert_eq!(get_string(&pool, "reset_time", "00:00").await.unwrap(), "08:30");
    }
}
