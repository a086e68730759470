//! Ticket Repository
//!
//! Per-category daily numbering and the ticket status machine.
//!
//! Numbering is derived from surviving rows (`MAX(number) + 1` within the
//! {category, day} bucket), not from a stored counter, so deleting tickets
//! resets the sequence. The unique index on `(category_id, day_key, number)`
//! closes the read-then-insert race: concurrent creators that compute the
//! same number lose the insert and retry.
//!
//! Status transitions are single conditional UPDATEs guarded by the current
//! status, so concurrent writers cannot produce lost updates.

use super::{RepoError, RepoResult};
use shared::models::{Category, Ticket, TicketRow, TicketStatus};
use shared::util::now_millis;
use sqlx::SqlitePool;

/// Attempts before giving up on a contended {category, day} bucket
const MAX_CREATE_RETRIES: usize = 8;

/// Joined select list shared by every ticket read
const SELECT_TICKET: &str = "SELECT t.id, t.number, t.display_number, t.category_id, t.status, \
     t.called_at, t.completed_at, t.counter_number, t.created_at, \
     c.name AS category_name, c.prefix AS category_prefix, \
     c.description AS category_description, c.is_active AS category_is_active, \
     c.sort_order AS category_sort_order, c.created_at AS category_created_at \
     FROM tickets t JOIN categories c ON c.id = t.category_id";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Ticket>> {
    let row = sqlx::query_as::<_, TicketRow>(&format!("{SELECT_TICKET} WHERE t.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Ticket::from))
}

/// Fetch a ticket or fail with NotFound
async fn require(pool: &SqlitePool, id: i64) -> RepoResult<Ticket> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Ticket {id} not found")))
}

/// Create a ticket in the waiting state, allocating the next sequence
/// number for the category's current day bucket.
///
/// Retries on unique-index conflicts (another creator took the number);
/// exhausted retries surface as [`RepoError::Conflict`] so the caller may
/// try again.
pub async fn create(pool: &SqlitePool, category: &Category, day_key: &str) -> RepoResult<Ticket> {
    for _ in 0..MAX_CREATE_RETRIES {
        let next: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(number), 0) + 1 FROM tickets WHERE category_id = ? AND day_key = ?",
        )
        .bind(category.id)
        .bind(day_key)
        .fetch_one(pool)
        .await?;

        let display_number = format!("{}-{:03}", category.prefix, next);
        let now = now_millis();

        let result = sqlx::query(
            "INSERT INTO tickets (number, display_number, category_id, day_key, status, created_at) \
             VALUES (?1, ?2, ?3, ?4, 'waiting', ?5)",
        )
        .bind(next)
        .bind(&display_number)
        .bind(category.id)
        .bind(day_key)
        .bind(now)
        .execute(pool)
        .await;

        match result {
            Ok(done) => return require(pool, done.last_insert_rowid()).await,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::debug!(
                    category_id = category.id,
                    number = next,
                    "Ticket number taken concurrently, retrying"
                );
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(RepoError::Conflict(format!(
        "Could not allocate a ticket number for category {} after {} attempts",
        category.id, MAX_CREATE_RETRIES
    )))
}

/// List tickets filtered by optional status and/or category, creation order
pub async fn find_all(
    pool: &SqlitePool,
    status: Option<TicketStatus>,
    category_id: Option<i64>,
) -> RepoResult<Vec<Ticket>> {
    let rows = sqlx::query_as::<_, TicketRow>(&format!(
        "{SELECT_TICKET} WHERE (?1 IS NULL OR t.status = ?1) AND (?2 IS NULL OR t.category_id = ?2) \
         ORDER BY t.created_at ASC, t.id ASC"
    ))
    .bind(status)
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Ticket::from).collect())
}

/// List every ticket created in the [start, end) millis window
pub async fn find_in_window(
    pool: &SqlitePool,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<Vec<Ticket>> {
    let rows = sqlx::query_as::<_, TicketRow>(&format!(
        "{SELECT_TICKET} WHERE t.created_at >= ?1 AND t.created_at < ?2 \
         ORDER BY t.created_at ASC, t.id ASC"
    ))
    .bind(start_millis)
    .bind(end_millis)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Ticket::from).collect())
}

/// The most recently called ticket among {calling, serving}, if any
pub async fn find_current(pool: &SqlitePool) -> RepoResult<Option<Ticket>> {
    let row = sqlx::query_as::<_, TicketRow>(&format!(
        "{SELECT_TICKET} WHERE t.status IN ('calling', 'serving') \
         ORDER BY t.called_at DESC, t.id DESC LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Ticket::from))
}

/// Up to `limit` waiting tickets in creation order
pub async fn find_next_waiting(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<Ticket>> {
    let rows = sqlx::query_as::<_, TicketRow>(&format!(
        "{SELECT_TICKET} WHERE t.status = 'waiting' \
         ORDER BY t.created_at ASC, t.id ASC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Ticket::from).collect())
}

/// waiting → calling, stamping called_at and optionally the counter
pub async fn call(pool: &SqlitePool, id: i64, counter_number: Option<i64>) -> RepoResult<Ticket> {
    let rows = sqlx::query(
        "UPDATE tickets SET status = 'calling', called_at = ?1, \
         counter_number = COALESCE(?2, counter_number) \
         WHERE id = ?3 AND status = 'waiting'",
    )
    .bind(now_millis())
    .bind(counter_number)
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(transition_error(pool, id, "call", "a waiting ticket").await);
    }
    require(pool, id).await
}

/// calling → serving
pub async fn serve(pool: &SqlitePool, id: i64) -> RepoResult<Ticket> {
    let rows = sqlx::query("UPDATE tickets SET status = 'serving' WHERE id = ?1 AND status = 'calling'")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if rows == 0 {
        return Err(transition_error(pool, id, "serve", "a calling ticket").await);
    }
    require(pool, id).await
}

/// calling/serving → completed, stamping completed_at
pub async fn complete(pool: &SqlitePool, id: i64) -> RepoResult<Ticket> {
    let rows = sqlx::query(
        "UPDATE tickets SET status = 'completed', completed_at = ?1 \
         WHERE id = ?2 AND status IN ('calling', 'serving')",
    )
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(transition_error(pool, id, "complete", "a calling or serving ticket").await);
    }
    require(pool, id).await
}

/// waiting → skipped
pub async fn skip(pool: &SqlitePool, id: i64) -> RepoResult<Ticket> {
    let rows = sqlx::query("UPDATE tickets SET status = 'skipped' WHERE id = ?1 AND status = 'waiting'")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if rows == 0 {
        return Err(transition_error(pool, id, "skip", "a waiting ticket").await);
    }
    require(pool, id).await
}

/// skipped/completed → calling with a fresh called_at; the counter
/// assignment is left untouched
pub async fn recall(pool: &SqlitePool, id: i64) -> RepoResult<Ticket> {
    let rows = sqlx::query(
        "UPDATE tickets SET status = 'calling', called_at = ?1 \
         WHERE id = ?2 AND status IN ('skipped', 'completed')",
    )
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(transition_error(pool, id, "recall", "a skipped or completed ticket").await);
    }
    require(pool, id).await
}

/// No state change; returns the ticket for re-announcement if it is
/// currently calling or serving
pub async fn reannounce(pool: &SqlitePool, id: i64) -> RepoResult<Ticket> {
    let ticket = require(pool, id).await?;
    match ticket.status {
        TicketStatus::Calling | TicketStatus::Serving => Ok(ticket),
        other => Err(RepoError::InvalidTransition(format!(
            "Cannot reannounce ticket {id}: requires a calling or serving ticket, status is '{other}'"
        ))),
    }
}

/// Delete every ticket; numbering restarts at 1 afterwards
pub async fn reset_all(pool: &SqlitePool) -> RepoResult<u64> {
    let removed = sqlx::query("DELETE FROM tickets")
        .execute(pool)
        .await?
        .rows_affected();
    Ok(removed)
}

/// Delete all tickets of one category, returning the count removed
pub async fn delete_by_category(pool: &SqlitePool, category_id: i64) -> RepoResult<u64> {
    let removed = sqlx::query("DELETE FROM tickets WHERE category_id = ?")
        .bind(category_id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(removed)
}

/// Distinguish NotFound from a status that forbids the operation
async fn transition_error(pool: &SqlitePool, id: i64, op: &str, required: &str) -> RepoError {
    match find_by_id(pool, id).await {
        Ok(Some(ticket)) => RepoError::InvalidTransition(format!(
            "Cannot {op} ticket {id}: requires {required}, status is '{}'",
            ticket.status
        )),
        Ok(None) => RepoError::NotFound(format!("Ticket {id} not found")),
        Err(e) => e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::category;
    use shared::models::CategoryCreate;
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory pool with the full schema. A single connection keeps all
    /// statements on the same in-memory database.
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

        sqlx::query(
            "CREATE TABLE tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                number INTEGER NOT NULL,
                display_number TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                day_key TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'waiting',
                called_at INTEGER,
                completed_at INTEGER,
                counter_number INTEGER,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE UNIQUE INDEX idx_tickets_category_day_number
                ON tickets (category_id, day_key, number)",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    async fn seed_category(pool: &SqlitePool, name: &str, prefix: &str) -> Category {
        category::create(
            pool,
            CategoryCreate {
                name: name.into(),
                prefix: prefix.into(),
                description: None,
                sort_order: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn numbering_starts_at_one_and_increments_per_category() {
        let pool = test_pool().await;
        let a = seed_category(&pool, "General", "A").await;
        let b = seed_category(&pool, "Priority", "B").await;

        let t1 = create(&pool, &a, "2025-08-06").await.unwrap();
        assert_eq!(t1.number, 1);
        assert_eq!(t1.display_number, "A-001");
        assert_eq!(t1.status, TicketStatus::Waiting);
        assert!(t1.called_at.is_none());
        assert!(t1.counter_number.is_none());

        // Another category in between does not disturb the sequence
        let other = create(&pool, &b, "2025-08-06").await.unwrap();
        assert_eq!(other.display_number, "B-001");

        let t2 = create(&pool, &a, "2025-08-06").await.unwrap();
        assert_eq!(t2.number, 2);
        assert_eq!(t2.display_number, "A-002");
    }

    #[tokio::test]
    async fn numbering_restarts_on_a_new_day() {
        let pool = test_pool().await;
        let cat = seed_category(&pool, "General", "A").await;

        create(&pool, &cat, "2025-08-05").await.unwrap();
        create(&pool, &cat, "2025-08-05").await.unwrap();

        let next_day = create(&pool, &cat, "2025-08-06").await.unwrap();
        assert_eq!(next_day.number, 1);
        assert_eq!(next_day.display_number, "A-001");
    }

    #[tokio::test]
    async fn full_lifecycle_walk() {
        let pool = test_pool().await;
        let cat = seed_category(&pool, "General", "A").await;
        let ticket = create(&pool, &cat, "2025-08-06").await.unwrap();

        let called = call(&pool, ticket.id, Some(3)).await.unwrap();
        assert_eq!(called.status, TicketStatus::Calling);
        assert_eq!(called.counter_number, Some(3));
        assert!(called.called_at.is_some());

        let serving = serve(&pool, ticket.id).await.unwrap();
        assert_eq!(serving.status, TicketStatus::Serving);

        let completed = complete(&pool, ticket.id).await.unwrap();
        assert_eq!(completed.status, TicketStatus::Completed);
        assert!(completed.completed_at.is_some());

        // Recalling a completed ticket re-enters the active queue
        let recalled = recall(&pool, ticket.id).await.unwrap();
        assert_eq!(recalled.status, TicketStatus::Calling);
        // Counter assignment survives the recall
        assert_eq!(recalled.counter_number, Some(3));
    }

    #[tokio::test]
    async fn complete_requires_calling_or_serving() {
        let pool = test_pool().await;
        let cat = seed_category(&pool, "General", "A").await;
        let ticket = create(&pool, &cat, "2025-08-06").await.unwrap();

        let err = complete(&pool, ticket.id).await.unwrap_err();
        assert!(matches!(err, RepoError::InvalidTransition(_)));

        // The failed attempt left the row unchanged
        let unchanged = find_by_id(&pool, ticket.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, TicketStatus::Waiting);
        assert!(unchanged.completed_at.is_none());
    }

    #[tokio::test]
    async fn skip_only_applies_to_waiting_tickets() {
        let pool = test_pool().await;
        let cat = seed_category(&pool, "General", "A").await;
        let ticket = create(&pool, &cat, "2025-08-06").await.unwrap();

        call(&pool, ticket.id, None).await.unwrap();
        let err = skip(&pool, ticket.id).await.unwrap_err();
        assert!(matches!(err, RepoError::InvalidTransition(_)));

        let second = create(&pool, &cat, "2025-08-06").await.unwrap();
        let skipped = skip(&pool, second.id).await.unwrap();
        assert_eq!(skipped.status, TicketStatus::Skipped);

        // Skipped is terminal unless recalled
        let recalled = recall(&pool, second.id).await.unwrap();
        assert_eq!(recalled.status, TicketStatus::Calling);
    }

    #[tokio::test]
    async fn reannounce_requires_an_active_ticket_and_changes_nothing() {
        let pool = test_pool().await;
        let cat = seed_category(&pool, "General", "A").await;
        let ticket = create(&pool, &cat, "2025-08-06").await.unwrap();

        let err = reannounce(&pool, ticket.id).await.unwrap_err();
        assert!(matches!(err, RepoError::InvalidTransition(_)));

        call(&pool, ticket.id, Some(1)).await.unwrap();
        let announced = reannounce(&pool, ticket.id).await.unwrap();
        assert_eq!(announced.status, TicketStatus::Calling);
    }

    #[tokio::test]
    async fn transitions_on_unknown_tickets_report_not_found() {
        let pool = test_pool().await;
        seed_category(&pool, "General", "A").await;

        let err = call(&pool, 999, None).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn current_is_the_most_recently_called_active_ticket() {
        let pool = test_pool().await;
        let cat = seed_category(&pool, "General", "A").await;

        assert!(find_current(&pool).await.unwrap().is_none());

        let first = create(&pool, &cat, "2025-08-06").await.unwrap();
        let second = create(&pool, &cat, "2025-08-06").await.unwrap();
        let third = create(&pool, &cat, "2025-08-06").await.unwrap();

        call(&pool, first.id, None).await.unwrap();
        serve(&pool, first.id).await.unwrap();
        call(&pool, second.id, None).await.unwrap();

        let current = find_current(&pool).await.unwrap().unwrap();
        assert_eq!(current.id, second.id);

        let next = find_next_waiting(&pool, 5).await.unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id, third.id);
    }

    #[tokio::test]
    async fn find_all_filters_by_status_and_category() {
        let pool = test_pool().await;
        let a = seed_category(&pool, "General", "A").await;
        let b = seed_category(&pool, "Priority", "B").await;

        let t1 = create(&pool, &a, "2025-08-06").await.unwrap();
        create(&pool, &a, "2025-08-06").await.unwrap();
        create(&pool, &b, "2025-08-06").await.unwrap();
        call(&pool, t1.id, None).await.unwrap();

        let all = find_all(&pool, None, None).await.unwrap();
        assert_eq!(all.len(), 3);

        let waiting = find_all(&pool, Some(TicketStatus::Waiting), None).await.unwrap();
        assert_eq!(waiting.len(), 2);

        let in_a = find_all(&pool, None, Some(a.id)).await.unwrap();
        assert_eq!(in_a.len(), 2);

        let waiting_in_a = find_all(&pool, Some(TicketStatus::Waiting), Some(a.id))
            .await
            .unwrap();
        assert_eq!(waiting_in_a.len(), 1);
    }

    #[tokio::test]
    async fn reset_clears_tickets_and_restarts_numbering() {
        let pool = test_pool().await;
        let cat = seed_category(&pool, "General", "A").await;

        create(&pool, &cat, "2025-08-06").await.unwrap();
        create(&pool, &cat, "2025-08-06").await.unwrap();

        let removed = reset_all(&pool).await.unwrap();
        assert_eq!(removed, 2);

        let fresh = create(&pool, &cat, "2025-08-06").await.unwrap();
        assert_eq!(fresh.number, 1);
        assert_eq!(fresh.display_number, "A-001");
    }

    #[tokio::test]
    async fn delete_by_category_reports_the_count() {
        let pool = test_pool().await;
        let a = seed_category(&pool, "General", "A").await;
        let b = seed_category(&pool, "Priority", "B").await;

        create(&pool, &a, "2025-08-06").await.unwrap();
        create(&pool, &a, "2025-08-06").await.unwrap();
        create(&pool, &b, "2025-08-06").await.unwrap();

        assert_eq!(delete_by_category(&pool, a.id).await.unwrap(), 2);
        assert_eq!(find_all(&pool, None, None).await.unwrap().len(), 1);
    }
}
