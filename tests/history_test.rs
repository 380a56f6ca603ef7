//! Integration tests for the query history store.
//!
//! Each test uses its own history file in a temp directory; the store
//! creates its schema lazily on first use.

use dbscope::history::{QueryHistory, NOT_RECORDED};
use dbscope::models::QueryRecord;
use tempfile::TempDir;

/// Helper to create a store backed by a fresh temp file.
fn setup() -> (QueryHistory, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let history = QueryHistory::new(dir.path().join("history.db"));
    (history, dir)
}

// =========================================================================
// Recording
// =========================================================================

#[tokio::test]
async fn test_add_and_round_trip() {
    let (history, _dir) = setup();

    let record = QueryRecord::new("/data/app.db", "SELECT * FROM users")
        .with_execution_time(0.125)
        .with_row_count(42);
    let id = history.add_query(&record).await;
    assert!(id > 0);

    let fetched = history.get_history(10, None).await.unwrap();
    assert_eq!(fetched.len(), 1);
    let stored = &fetched[0];
    assert_eq!(stored.id, Some(id));
    assert_eq!(stored.database_path, record.database_path);
    assert_eq!(stored.query_text, record.query_text);
    assert_eq!(stored.execution_time, record.execution_time);
    assert_eq!(stored.row_count, record.row_count);
    assert!(stored.success);
    assert_eq!(stored.error_message, "");
    // Assigned at insertion since the caller left it empty
    assert!(!stored.timestamp.is_empty());
}

#[tokio::test]
async fn test_add_failed_statement() {
    let (history, _dir) = setup();

    let record = QueryRecord::new("/data/app.db", "SELECT * FROM missing")
        .with_error("no such table: missing");
    history.add_query(&record).await;

    let fetched = history.get_history(10, None).await.unwrap();
    assert!(!fetched[0].success);
    assert_eq!(fetched[0].error_message, "no such table: missing");
}

#[tokio::test]
async fn test_explicit_timestamp_is_kept() {
    let (history, _dir) = setup();

    let record = QueryRecord::new("/data/app.db", "SELECT 1")
        .with_timestamp("2020-01-01T00:00:00+00:00");
    history.add_query(&record).await;

    let fetched = history.get_history(10, None).await.unwrap();
    assert_eq!(fetched[0].timestamp, "2020-01-01T00:00:00+00:00");
}

#[tokio::test]
async fn test_add_degrades_to_sentinel_on_unwritable_store() {
    let history = QueryHistory::new("/proc/not/a/real/place/history.db");
    let record = QueryRecord::new("/data/app.db", "SELECT 1");
    assert_eq!(history.add_query(&record).await, NOT_RECORDED);
}

// =========================================================================
// Retrieval and search
// =========================================================================

#[tokio::test]
async fn test_history_most_recent_first() {
    let (history, _dir) = setup();

    for (i, ts) in ["2024-01-01T10:00:00+00:00", "2024-01-02T10:00:00+00:00"]
        .iter()
        .enumerate()
    {
        let record = QueryRecord::new("/data/app.db", format!("SELECT {}", i))
            .with_timestamp(*ts);
        history.add_query(&record).await;
    }

    let fetched = history.get_history(10, None).await.unwrap();
    assert_eq!(fetched[0].query_text, "SELECT 1");
    assert_eq!(fetched[1].query_text, "SELECT 0");
}

#[tokio::test]
async fn test_history_filter_by_database_path() {
    let (history, _dir) = setup();

    history
        .add_query(&QueryRecord::new("/data/a.db", "SELECT 1"))
        .await;
    history
        .add_query(&QueryRecord::new("/data/b.db", "SELECT 2"))
        .await;

    let fetched = history.get_history(10, Some("/data/a.db")).await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].database_path, "/data/a.db");
}

#[tokio::test]
async fn test_history_limit() {
    let (history, _dir) = setup();

    for i in 0..5 {
        history
            .add_query(&QueryRecord::new("/data/app.db", format!("SELECT {}", i)))
            .await;
    }

    let fetched = history.get_history(3, None).await.unwrap();
    assert_eq!(fetched.len(), 3);
}

#[tokio::test]
async fn test_search_is_case_insensitive_substring() {
    let (history, _dir) = setup();

    history
        .add_query(&QueryRecord::new("/data/app.db", "SELECT * FROM users"))
        .await;
    history
        .add_query(&QueryRecord::new("/data/app.db", "delete from users"))
        .await;
    history
        .add_query(&QueryRecord::new("/data/app.db", "PRAGMA table_info(users)"))
        .await;

    let found = history.search_history("select", 10).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].query_text, "SELECT * FROM users");

    let found = history.search_history("users", 10).await.unwrap();
    assert_eq!(found.len(), 3);
}

#[tokio::test]
async fn test_search_escapes_like_metacharacters() {
    let (history, _dir) = setup();

    history
        .add_query(&QueryRecord::new("/data/app.db", "SELECT '100%'"))
        .await;
    history
        .add_query(&QueryRecord::new("/data/app.db", "SELECT '100x'"))
        .await;

    let found = history.search_history("100%", 10).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].query_text, "SELECT '100%'");
}

// =========================================================================
// Concurrent access
// =========================================================================

#[tokio::test]
async fn test_concurrent_add_and_get() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let history = std::sync::Arc::new(QueryHistory::new(dir.path().join("history.db")));

    let writer = {
        let history = history.clone();
        tokio::spawn(async move {
            for i in 0..20 {
                let id = history
                    .add_query(&QueryRecord::new("/data/app.db", format!("SELECT {}", i)))
                    .await;
                assert!(id > 0);
            }
        })
    };
    let reader = {
        let history = history.clone();
        tokio::spawn(async move {
            for _ in 0..20 {
                let records = history
                    .get_history(10, None)
                    .await
                    .expect("get_history failed during concurrent writes");
                assert!(records.len() <= 10);
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();

    let stats = history.get_statistics().await.unwrap();
    assert_eq!(stats.total, 20);
}

// =========================================================================
// Deletion and statistics
// =========================================================================

#[tokio::test]
async fn test_delete_record_reports_existence() {
    let (history, _dir) = setup();

    let id = history
        .add_query(&QueryRecord::new("/data/app.db", "SELECT 1"))
        .await;

    assert!(history.delete_record(id).await.unwrap());
    assert!(!history.delete_record(id).await.unwrap());
    assert!(history.get_history(10, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_history_reports_count() {
    let (history, _dir) = setup();

    for i in 0..3 {
        history
            .add_query(&QueryRecord::new("/data/app.db", format!("SELECT {}", i)))
            .await;
    }

    assert_eq!(history.clear_history().await.unwrap(), 3);
    assert_eq!(history.clear_history().await.unwrap(), 0);
}

#[tokio::test]
async fn test_statistics() {
    let (history, _dir) = setup();

    history
        .add_query(
            &QueryRecord::new("/data/a.db", "SELECT 1").with_execution_time(0.2),
        )
        .await;
    history
        .add_query(
            &QueryRecord::new("/data/b.db", "SELECT 2").with_execution_time(0.4),
        )
        .await;
    history
        .add_query(
            &QueryRecord::new("/data/a.db", "SELECT oops")
                .with_execution_time(9.0)
                .with_error("syntax error"),
        )
        .await;

    let stats = history.get_statistics().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.success, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.unique_databases, 2);
    // Mean over successful records only
    assert!((stats.avg_execution_time - 0.3).abs() < 1e-9);
}

#[tokio::test]
async fn test_statistics_empty_store() {
    let (history, _dir) = setup();
    let stats = history.get_statistics().await.unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.avg_execution_time, 0.0);
    assert_eq!(stats.unique_databases, 0);
}
