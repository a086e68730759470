//! Concurrent ticket-numbering tests against a real on-disk database.
//!
//! The in-memory unit tests use a single connection; these use the same
//! WAL pool as production so creators genuinely race on the
//! read-max-then-insert window and exercise the unique-index retry.

use queue_server::db::DbService;
use queue_server::db::repository::{category, ticket};
use shared::models::CategoryCreate;

const DAY: &str = "2025-08-06";

async fn test_db(dir: &tempfile::TempDir) -> DbService {
    let path = dir.path().join("queue.db");
    DbService::new(&path.to_string_lossy()).await.unwrap()
}

#[tokio::test]
async fn concurrent_creates_allocate_distinct_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;

    let cat = category::create(
        &db.pool,
        CategoryCreate {
            name: "General".into(),
            prefix: "A".into(),
            description: None,
            sort_order: None,
        },
    )
    .await
    .unwrap();

    const CREATORS: usize = 6;
    let mut handles = Vec::new();
    for _ in 0..CREATORS {
        let pool = db.pool.clone();
        let cat = cat.clone();
        handles.push(tokio::spawn(async move {
            ticket::create(&pool, &cat, DAY).await
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        let ticket = handle.await.unwrap().unwrap();
        numbers.push(ticket.number);
    }

    numbers.sort_unstable();
    // Every creator got a number, pairwise distinct and gap-free from 1
    let expected: Vec<i64> = (1..=CREATORS as i64).collect();
    assert_eq!(numbers, expected);
}

#[tokio::test]
async fn sequences_are_independent_per_category_and_day() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;

    let a = category::create(
        &db.pool,
        CategoryCreate {
            name: "General".into(),
            prefix: "A".into(),
            description: None,
            sort_order: None,
        },
    )
    .await
    .unwrap();
    let b = category::create(
        &db.pool,
        CategoryCreate {
            name: "Priority".into(),
            prefix: "B".into(),
            description: None,
            sort_order: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(ticket::create(&db.pool, &a, DAY).await.unwrap().display_number, "A-001");
    assert_eq!(ticket::create(&db.pool, &b, DAY).await.unwrap().display_number, "B-001");
    assert_eq!(ticket::create(&db.pool, &a, DAY).await.unwrap().display_number, "A-002");
    assert_eq!(
        ticket::create(&db.pool, &a, "2025-08-07").await.unwrap().display_number,
        "A-001"
    );
}
