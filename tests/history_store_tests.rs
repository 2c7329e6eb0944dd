// HistoryStore tests: insert, get, list_recent ordering, retention eviction, concurrency

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use equipment_server::error::Error;
use equipment_server::history_store::HistoryStore;
use std::sync::Arc;

fn t(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + Duration::seconds(n)
}

#[tokio::test]
async fn history_store_connect_and_init() {
    let (_dir, store) = common::temp_store().await;
    // Second init is no-op (IF NOT EXISTS)
    store.init().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
    assert!(store.list_recent(5).await.unwrap().is_empty());
}

#[tokio::test]
async fn history_store_insert_then_get_returns_same_record() {
    let (_dir, store) = common::temp_store().await;
    let inserted = store
        .insert_at(common::summary_fields("a.csv"), t(0))
        .await
        .unwrap();
    assert_eq!(inserted.file_name, "a.csv");
    assert_eq!(inserted.uploaded_at, t(0));

    let fetched = store.get(inserted.id).await.unwrap();
    assert_eq!(fetched, inserted);
    assert_eq!(fetched.type_distribution["Pump"], 2);
}

#[tokio::test]
async fn history_store_ids_increase_with_insertion_order() {
    let (_dir, store) = common::temp_store().await;
    let mut last = 0;
    for i in 0..8 {
        let r = store
            .insert(common::summary_fields(&format!("{i}.csv")))
            .await
            .unwrap();
        assert!(r.id > last);
        last = r.id;
    }
}

#[tokio::test]
async fn history_store_get_unknown_id_is_not_found() {
    let (_dir, store) = common::temp_store().await;
    let err = store.get(42).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(42)));
}

#[tokio::test]
async fn history_store_list_recent_is_newest_first() {
    let (_dir, store) = common::temp_store().await;
    for i in 0..3 {
        store
            .insert_at(common::summary_fields(&format!("{i}.csv")), t(i))
            .await
            .unwrap();
    }
    let recent = store.list_recent(5).await.unwrap();
    let names: Vec<&str> = recent.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, vec!["2.csv", "1.csv", "0.csv"]);

    let limited = store.list_recent(2).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].file_name, "2.csv");
}

#[tokio::test]
async fn history_store_sixth_insert_evicts_oldest() {
    let (_dir, store) = common::temp_store().await;
    let mut records = Vec::new();
    for i in 1..=6 {
        let r = store
            .insert_at(common::summary_fields(&format!("t{i}.csv")), t(i))
            .await
            .unwrap();
        records.push(r);
    }

    assert_eq!(store.count().await.unwrap(), 5);
    let recent = store.list_recent(5).await.unwrap();
    let times: Vec<DateTime<Utc>> = recent.iter().map(|r| r.uploaded_at).collect();
    assert_eq!(times, vec![t(6), t(5), t(4), t(3), t(2)]);

    let err = store.get(records[0].id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    for r in &records[1..] {
        assert_eq!(store.get(r.id).await.unwrap().file_name, r.file_name);
    }
}

#[tokio::test]
async fn history_store_many_inserts_keep_latest_five() {
    let (_dir, store) = common::temp_store().await;
    let mut ids = Vec::new();
    for i in 0..12 {
        let r = store
            .insert_at(common::summary_fields(&format!("{i}.csv")), t(i))
            .await
            .unwrap();
        ids.push(r.id);
    }
    let recent = store.list_recent(5).await.unwrap();
    let recent_ids: Vec<i64> = recent.iter().map(|r| r.id).collect();
    let expected: Vec<i64> = ids.iter().rev().take(5).copied().collect();
    assert_eq!(recent_ids, expected);
    for id in &ids[..7] {
        assert!(matches!(store.get(*id).await, Err(Error::NotFound(_))));
    }
}

#[tokio::test]
async fn history_store_list_recent_limit_is_capped_at_ceiling() {
    let (_dir, store) = common::temp_store().await;
    for i in 0..7 {
        store
            .insert_at(common::summary_fields("x.csv"), t(i))
            .await
            .unwrap();
    }
    assert_eq!(store.list_recent(100).await.unwrap().len(), 5);
    assert!(store.list_recent(0).await.unwrap().is_empty());
}

#[tokio::test]
async fn history_store_clock_going_backwards_keeps_insertion_order() {
    let (_dir, store) = common::temp_store().await;
    let first = store
        .insert_at(common::summary_fields("first.csv"), t(100))
        .await
        .unwrap();
    let second = store
        .insert_at(common::summary_fields("second.csv"), t(50))
        .await
        .unwrap();
    assert!(second.uploaded_at >= first.uploaded_at);

    let recent = store.list_recent(5).await.unwrap();
    assert_eq!(recent[0].id, second.id);
    assert_eq!(recent[1].id, first.id);
}

#[tokio::test]
async fn history_store_custom_retention_limit() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("history.db");
    let store = HistoryStore::connect(path.to_str().unwrap(), 2, 2)
        .await
        .unwrap();
    store.init().await.unwrap();
    for i in 0..4 {
        store
            .insert_at(common::summary_fields(&format!("{i}.csv")), t(i))
            .await
            .unwrap();
    }
    let recent = store.list_recent(5).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].file_name, "3.csv");
    assert_eq!(recent[1].file_name, "2.csv");
}

#[tokio::test]
async fn history_store_connect_rejects_limit_above_ceiling() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("history.db");
    let result = HistoryStore::connect(path.to_str().unwrap(), 2, 6).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn history_store_reopen_keeps_records() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("history.db");
    let path_str = path.to_str().unwrap();
    let id = {
        let store = HistoryStore::connect(path_str, 2, 5).await.unwrap();
        store.init().await.unwrap();
        store
            .insert_at(common::summary_fields("kept.csv"), t(0))
            .await
            .unwrap()
            .id
    };
    let store = HistoryStore::connect(path_str, 2, 5).await.unwrap();
    store.init().await.unwrap();
    assert_eq!(store.get(id).await.unwrap().file_name, "kept.csv");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn history_store_concurrent_inserts_never_exceed_ceiling() {
    let (_dir, store) = common::temp_store().await;
    let store = Arc::new(store);

    let mut writers = Vec::new();
    for w in 0..4 {
        let store = store.clone();
        writers.push(tokio::spawn(async move {
            for i in 0..10 {
                store
                    .insert(common::summary_fields(&format!("w{w}-{i}.csv")))
                    .await
                    .unwrap();
            }
        }));
    }

    let reader = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                assert!(store.count().await.unwrap() <= 5);
                assert!(store.list_recent(100).await.unwrap().len() <= 5);
                tokio::task::yield_now().await;
            }
        })
    };

    for w in writers {
        w.await.unwrap();
    }
    reader.await.unwrap();

    assert_eq!(store.count().await.unwrap(), 5);
    let recent = store.list_recent(5).await.unwrap();
    assert_eq!(recent.len(), 5);
    for pair in recent.windows(2) {
        assert!(pair[0].uploaded_at >= pair[1].uploaded_at);
        assert!(pair[0].id > pair[1].id);
    }
}
