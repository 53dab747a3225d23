use std::collections::HashSet;

use chrono::Duration;

use crate::chunk::{LATEST_LIMIT, NewChunk};
use crate::error::StoreError;
use crate::store::ChunkStore;

/// Run the full chunk store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
/// The suite only inserts; it never assumes specific identifier values, so
/// it can run against a shared database table.
///
/// # Errors
///
/// Returns an error if a store operation fails unexpectedly.
pub async fn run_store_conformance_tests(store: &dyn ChunkStore) -> Result<(), StoreError> {
    test_insert_then_get(store).await?;
    test_get_missing(store).await?;
    test_zero_day_chunk_is_invisible(store).await?;
    test_missing_and_expired_are_indistinguishable(store).await?;
    test_ids_are_distinct_and_increasing(store).await?;
    test_latest_ordering_and_cap(store).await?;
    test_invalid_insert_rejected(store).await?;
    Ok(())
}

async fn test_insert_then_get(store: &dyn ChunkStore) -> Result<(), StoreError> {
    let content = "first line\nsecond line";
    let id = store
        .insert(NewChunk::new("insert-then-get", content, 7))
        .await?;
    assert!(id >= 1, "ids must be positive, got {id}");

    let chunk = store.get(id).await?;
    assert_eq!(chunk.id, id);
    assert_eq!(chunk.title, "insert-then-get");
    assert_eq!(chunk.content, content);
    assert_eq!(
        chunk.expires - chunk.created,
        Duration::days(7),
        "expires should be created + 7 days"
    );
    Ok(())
}

async fn test_get_missing(store: &dyn ChunkStore) -> Result<(), StoreError> {
    for id in [i64::MAX, 0, -5] {
        let err = store.get(id).await.expect_err("no chunk should match");
        assert!(err.is_not_found(), "get({id}) should be NotFound, got {err}");
    }
    Ok(())
}

async fn test_zero_day_chunk_is_invisible(store: &dyn ChunkStore) -> Result<(), StoreError> {
    let id = store
        .insert(NewChunk::new("already-expired", "gone", 0))
        .await?;

    let err = store.get(id).await.expect_err("expired chunk must not be returned");
    assert!(err.is_not_found(), "expired chunk should be NotFound, got {err}");

    let latest = store.latest().await?;
    assert!(
        latest.iter().all(|c| c.id != id),
        "latest must not include expired chunks"
    );
    Ok(())
}

async fn test_missing_and_expired_are_indistinguishable(
    store: &dyn ChunkStore,
) -> Result<(), StoreError> {
    let expired_id = store
        .insert(NewChunk::new("expired", "secret", 0))
        .await?;

    let expired = store.get(expired_id).await.expect_err("expired");
    let missing = store.get(i64::MAX).await.expect_err("missing");
    assert_eq!(
        std::mem::discriminant(&expired),
        std::mem::discriminant(&missing)
    );
    assert_eq!(expired.to_string(), missing.to_string());
    Ok(())
}

async fn test_ids_are_distinct_and_increasing(store: &dyn ChunkStore) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    let mut previous = 0;
    for i in 0..20 {
        let id = store
            .insert(NewChunk::new(format!("seq-{i}"), "body", 1))
            .await?;
        assert!(seen.insert(id), "id {id} was assigned twice");
        assert!(id > previous, "id {id} is not greater than {previous}");
        previous = id;
    }
    Ok(())
}

async fn test_latest_ordering_and_cap(store: &dyn ChunkStore) -> Result<(), StoreError> {
    let mut inserted = Vec::new();
    for i in 0..15 {
        let id = store
            .insert(NewChunk::new(format!("latest-{i}"), "body", 3))
            .await?;
        inserted.push(id);
    }

    let latest = store.latest().await?;
    assert_eq!(latest.len(), LATEST_LIMIT);

    let expected: Vec<i64> = inserted.iter().rev().take(LATEST_LIMIT).copied().collect();
    let actual: Vec<i64> = latest.iter().map(|c| c.id).collect();
    assert_eq!(actual, expected, "latest should be the newest chunks, newest first");

    assert!(
        latest.windows(2).all(|w| w[0].created >= w[1].created),
        "latest must be ordered by created descending"
    );
    Ok(())
}

async fn test_invalid_insert_rejected(store: &dyn ChunkStore) -> Result<(), StoreError> {
    let before = store.latest().await?;

    for bad in [
        NewChunk::new("title", "content", -1),
        NewChunk::new("", "content", 1),
        NewChunk::new("title", "", 1),
    ] {
        let err = store.insert(bad).await.expect_err("invalid input");
        assert!(
            matches!(err, StoreError::InvalidArgument(_)),
            "expected InvalidArgument, got {err}"
        );
    }

    let after = store.latest().await?;
    assert_eq!(before, after, "rejected inserts must not write anything");
    Ok(())
}
