//! Tests for the in-memory reservation store and its atomic create.

use std::sync::Arc;

use booking_engine::{
    Actor, ConflictError, InMemoryReservationStore, Interval, NewReservation, OwnerId,
    ReservationStore, ResourceId, StoreError,
};
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Barrier;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, hour, min, 0).unwrap()
}

fn candidate(room: &str, owner: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> NewReservation {
    NewReservation {
        resource_id: ResourceId::new(room),
        start,
        end,
        owner_id: OwnerId::new(owner),
        title: "Retro".to_string(),
        notes: None,
    }
}

fn whole_day() -> Interval {
    Interval::new(at(0, 0), Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap()).unwrap()
}

// ── create / list ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_assigns_id_and_lists_by_room() {
    let store = InMemoryReservationStore::new();

    let created = store
        .create_reservation(candidate("room-1", "gina", at(10, 0), at(11, 0)))
        .await
        .unwrap();
    store
        .create_reservation(candidate("room-2", "gina", at(10, 0), at(11, 0)))
        .await
        .unwrap();

    let listed = store
        .list_reservations(&ResourceId::new("room-1"), &whole_day())
        .await
        .unwrap();

    assert_eq!(listed, vec![created.clone()]);
    assert_eq!(store.get(created.id).await.unwrap(), created);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn list_is_sorted_and_filtered_by_range() {
    let store = InMemoryReservationStore::new();
    for (sh, eh) in [(14, 15), (9, 10), (11, 12)] {
        store
            .create_reservation(candidate("room-1", "hank", at(sh, 0), at(eh, 0)))
            .await
            .unwrap();
    }

    let morning = Interval::new(at(8, 0), at(12, 0)).unwrap();
    let listed = store
        .list_reservations(&ResourceId::new("room-1"), &morning)
        .await
        .unwrap();

    let starts: Vec<_> = listed.iter().map(|r| r.start).collect();
    assert_eq!(starts, vec![at(9, 0), at(11, 0)]);
}

#[tokio::test]
async fn overlapping_create_is_a_conflict() {
    let store = InMemoryReservationStore::new();
    let first = store
        .create_reservation(candidate("room-1", "ivy", at(10, 0), at(11, 0)))
        .await
        .unwrap();

    let err = store
        .create_reservation(candidate("room-1", "jack", at(10, 30), at(11, 30)))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::Conflict(ConflictError {
            resource_id: ResourceId::new("room-1"),
            existing: first.id,
        })
    );
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn adjacent_create_and_other_room_are_accepted() {
    let store = InMemoryReservationStore::new();
    store
        .create_reservation(candidate("room-1", "ivy", at(10, 0), at(11, 0)))
        .await
        .unwrap();

    assert!(store
        .create_reservation(candidate("room-1", "jack", at(11, 0), at(12, 0)))
        .await
        .is_ok());
    assert!(store
        .create_reservation(candidate("room-2", "jack", at(10, 0), at(11, 0)))
        .await
        .is_ok());
}

#[tokio::test]
async fn empty_interval_is_rejected() {
    let store = InMemoryReservationStore::new();
    let err = store
        .create_reservation(candidate("room-1", "kim", at(10, 0), at(10, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidInterval(_)));
    assert!(store.is_empty());
}

// ── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_submissions_commit_exactly_once() {
    let store = Arc::new(InMemoryReservationStore::new());
    let barrier = Arc::new(Barrier::new(2));

    let mut handles = Vec::new();
    for owner in ["lena", "mike"] {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            // Both callers saw an empty room before submitting.
            let seen = store
                .list_reservations(&ResourceId::new("room-1"), &whole_day())
                .await
                .unwrap();
            assert!(seen.is_empty());
            barrier.wait().await;
            store
                .create_reservation(candidate("room-1", owner, at(10, 0), at(11, 0)))
                .await
        }));
    }

    let mut accepted = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(StoreError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_racing_overlaps_never_double_book() {
    let store = Arc::new(InMemoryReservationStore::new());

    let handles: Vec<_> = (0..32u32)
        .map(|i| {
            let store = Arc::clone(&store);
            // Staggered 60-minute requests starting every 15 minutes from 09:00.
            let start = at(9, 0) + chrono::Duration::minutes(i64::from(i % 8) * 15);
            let end = start + chrono::Duration::minutes(60);
            tokio::spawn(async move {
                store
                    .create_reservation(candidate("room-1", "crowd", start, end))
                    .await
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.await.unwrap();
    }

    let committed = store.snapshot();
    for (i, a) in committed.iter().enumerate() {
        for b in committed.iter().skip(i + 1) {
            assert!(
                !a.interval().overlaps(&b.interval()),
                "{} overlaps {}",
                a.interval(),
                b.interval()
            );
        }
    }
    assert!(!committed.is_empty());
}

// ── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn early_finish_shortens_and_frees_the_tail() {
    let store = InMemoryReservationStore::new();
    let booked = store
        .create_reservation(candidate("room-1", "nina", at(10, 0), at(12, 0)))
        .await
        .unwrap();

    let adjusted = store.adjust_end(booked.id, at(11, 0)).await.unwrap();
    assert_eq!(adjusted.end, at(11, 0));

    assert!(store
        .create_reservation(candidate("room-1", "omar", at(11, 0), at(12, 0)))
        .await
        .is_ok());
}

#[tokio::test]
async fn adjust_end_rejects_empty_interval_and_collisions() {
    let store = InMemoryReservationStore::new();
    let first = store
        .create_reservation(candidate("room-1", "nina", at(10, 0), at(11, 0)))
        .await
        .unwrap();
    store
        .create_reservation(candidate("room-1", "omar", at(11, 0), at(12, 0)))
        .await
        .unwrap();

    assert!(matches!(
        store.adjust_end(first.id, at(10, 0)).await,
        Err(StoreError::InvalidInterval(_))
    ));
    assert!(matches!(
        store.adjust_end(first.id, at(11, 30)).await,
        Err(StoreError::Conflict(_))
    ));
    // Failed adjustments leave the reservation untouched.
    assert_eq!(store.get(first.id).await.unwrap().end, at(11, 0));
}

#[tokio::test]
async fn owner_and_admin_may_cancel_future_reservations() {
    let store = InMemoryReservationStore::new();
    let mine = store
        .create_reservation(candidate("room-1", "pia", at(10, 0), at(11, 0)))
        .await
        .unwrap();
    let theirs = store
        .create_reservation(candidate("room-1", "quinn", at(12, 0), at(13, 0)))
        .await
        .unwrap();

    let me = Actor::User(OwnerId::new("pia"));
    assert_eq!(
        store.cancel(theirs.id, &me, at(8, 0)).await,
        Err(StoreError::Forbidden(theirs.id))
    );

    assert_eq!(store.cancel(mine.id, &me, at(8, 0)).await.unwrap(), mine);
    assert_eq!(
        store.cancel(theirs.id, &Actor::Administrator, at(8, 0)).await.unwrap(),
        theirs
    );
    assert!(store.is_empty());
}

#[tokio::test]
async fn started_reservation_cannot_be_cancelled() {
    let store = InMemoryReservationStore::new();
    let booked = store
        .create_reservation(candidate("room-1", "pia", at(10, 0), at(11, 0)))
        .await
        .unwrap();

    assert_eq!(
        store
            .cancel(booked.id, &Actor::Administrator, at(10, 0))
            .await,
        Err(StoreError::AlreadyStarted(booked.id))
    );
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn unknown_reservation_is_not_found() {
    let store = InMemoryReservationStore::new();
    let booked = store
        .create_reservation(candidate("room-1", "pia", at(10, 0), at(11, 0)))
        .await
        .unwrap();
    store
        .cancel(booked.id, &Actor::Administrator, at(8, 0))
        .await
        .unwrap();

    assert_eq!(store.get(booked.id).await, Err(StoreError::NotFound(booked.id)));
    assert_eq!(
        store.adjust_end(booked.id, at(12, 0)).await,
        Err(StoreError::NotFound(booked.id))
    );
}
