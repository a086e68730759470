//! Category Repository

use super::{RepoError, RepoResult};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::util::now_millis;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, prefix, description, is_active, sort_order, created_at";

/// Find all active categories ordered by sort_order, ties broken by name
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories WHERE is_active = 1 ORDER BY sort_order, name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

/// Find all categories including inactive ones
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories ORDER BY sort_order, name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

/// Fetch a category or fail with NotFound
pub async fn require(pool: &SqlitePool, id: i64) -> RepoResult<Category> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories WHERE name = ? LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

/// Create a new category
pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    // Check duplicate name
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Conflict(format!(
            "Category '{}' already exists",
            data.name
        )));
    }

    let now = now_millis();
    let id = sqlx::query(
        "INSERT INTO categories (name, prefix, description, is_active, sort_order, created_at) \
         VALUES (?1, ?2, ?3, 1, ?4, ?5)",
    )
    .bind(&data.name)
    .bind(&data.prefix)
    .bind(&data.description)
    .bind(data.sort_order.unwrap_or(0))
    .bind(now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    require(pool, id).await
}

/// Update a category (partial, merge semantics)
pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    let existing = require(pool, id).await?;

    // Check duplicate name if changing
    if let Some(ref new_name) = data.name
        && new_name != &existing.name
        && find_by_name(pool, new_name).await?.is_some()
    {
        return Err(RepoError::Conflict(format!(
            "Category '{}' already exists",
            new_name
        )));
    }

    sqlx::query(
        "UPDATE categories SET \
         name = COALESCE(?1, name), \
         prefix = COALESCE(?2, prefix), \
         description = COALESCE(?3, description), \
         is_active = COALESCE(?4, is_active), \
         sort_order = COALESCE(?5, sort_order) \
         WHERE id = ?6",
    )
    .bind(&data.name)
    .bind(&data.prefix)
    .bind(&data.description)
    .bind(data.is_active)
    .bind(data.sort_order)
    .bind(id)
    .execute(pool)
    .await?;

    require(pool, id).await
}

/// Remove the category row. Callers are responsible for the inactive
/// guard and the ticket cascade (see the category handlers).
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM categories WHERE id = ?")
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
            "CREATE TABLE categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                prefix TEXT NOT NULL,
                description TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    fn payload(name: &str, prefix: &str, sort_order: Option<i32>) -> CategoryCreate {
        CategoryCreate {
            name: name.into(),
            prefix: prefix.into(),
            description: None,
            sort_order,
        }
    }

    #[tokio::test]
    async fn active_listing_orders_by_sort_order_then_name() {
        let pool = test_pool().await;
        create(&pool, payload("Zebra", "Z", Some(0))).await.unwrap();
        create(&pool, payload("Alpha", "A", Some(0))).await.unwrap();
        create(&pool, payload("First", "F", Some(-1))).await.unwrap();
        let hidden = create(&pool, payload("Hidden", "H", Some(5))).await.unwrap();
        update(
            &pool,
            hidden.id,
            CategoryUpdate { is_active: Some(false), ..Default::default() },
        )
        .await
        .unwrap();

        let active = find_active(&pool).await.unwrap();
        let names: Vec<_> = active.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Alpha", "Zebra"]);

        let all = find_all(&pool).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let pool = test_pool().await;
        create(&pool, payload("General", "A", None)).await.unwrap();

        let err = create(&pool, payload("General", "B", None)).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_merges_only_provided_fields() {
        let pool = test_pool().await;
        let cat = create(&pool, payload("General", "A", Some(2))).await.unwrap();

        let updated = update(
            &pool,
            cat.id,
            CategoryUpdate { prefix: Some("G".into()), ..Default::default() },
        )
        .await
        .unwrap();

        assert_eq!(updated.prefix, "G");
        assert_eq!(updated.name, "General");
        assert_eq!(updated.sort_order, 2);
        assert!(updated.is_active);
    }

    #[tokio::test]
    async fn missing_categories_report_not_found() {
        let pool = test_pool().await;
        let err = update(&pool, 42, CategoryUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
        assert!(!delete(&pool, 42).await.unwrap());
    }
}
