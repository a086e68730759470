//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{User, UserRole};
use shared::util::now_millis;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, username, hash_pass, display_name, role, is_active, created_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE username = ? LIMIT 1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users ORDER BY created_at ASC, id ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Active admin accounts — guards against deleting or demoting the last one
pub async fn count_active_admins(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE role = 'admin' AND is_active = 1",
    )
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Create a user; `hash_pass` must already be an argon2 hash
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    hash_pass: &str,
    display_name: &str,
    role: UserRole,
) -> RepoResult<User> {
    if find_by_username(pool, username).await?.is_some() {
        return Err(RepoError::Conflict(format!(
            "User '{username}' already exists"
        )));
    }

    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO users (username, hash_pass, display_name, role, is_active, created_at) \
         VALUES (?1, ?2, ?3, ?4, 1, ?5)",
    )
    .bind(username)
    .bind(hash_pass)
    .bind(display_name)
    .bind(role)
    .bind(now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Update a user (partial, merge semantics); `hash_pass` is the new
/// argon2 hash when the password changes
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    display_name: Option<&str>,
    hash_pass: Option<&str>,
    role: Option<UserRole>,
    is_active: Option<bool>,
) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE users SET \
         display_name = COALESCE(?1, display_name), \
         hash_pass = COALESCE(?2, hash_pass), \
         role = COALESCE(?3, role), \
         is_active = COALESCE(?4, is_active) \
         WHERE id = ?5",
    )
    .bind(display_name)
    .bind(hash_pass)
    .bind(role)
    .bind(is_active)
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
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
        sqlx::query(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                hash_pass TEXT NOT NULL,
                display_name TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'staff',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    #[tokio::test]
    async fn create_rejects_duplicate_usernames() {
        let pool = test_pool().await;
        create(&pool, "counter1", "hash", "Counter One", UserRole::Staff)
            .await
            .unwrap();
        let err = create(&pool, "counter1", "hash", "Imposter", UserRole::Staff)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_merges_and_counts_admins() {
        let pool = test_pool().await;
        let admin = create(&pool, "boss", "hash", "Boss", UserRole::Admin).await.unwrap();
        create(&pool, "counter1", "hash", "Counter One", UserRole::Staff)
            .await
            .unwrap();

        assert_eq!(count_active_admins(&pool).await.unwrap(), 1);

        let updated = update(&pool, admin.id, Some("The Boss"), None, None, None)
            .await
            .unwrap();
        assert_eq!(updated.display_name, "The Boss");
        assert_eq!(updated.role, UserRole::Admin);

        update(&pool, admin.id, None, None, None, Some(false)).await.unwrap();
        assert_eq!(count_active_admins(&pool).await.unwrap(), 0);
    }
}
