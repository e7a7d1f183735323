//! Free windows of a single room.
//!
//! Sorts the room's reservations by start time, merges overlapping busy
//! periods, then computes the gaps between merged periods within a window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Interval, Reservation, ResourceId};

/// A gap between reservations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

/// Merge the overlapping or adjacent reservations of `resource_id`, clipped to `window`.
///
/// Returns a sorted, non-overlapping list of intervals.
pub fn merge_busy_periods(
    resource_id: &ResourceId,
    reservations: &[Reservation],
    window: &Interval,
) -> Vec<Interval> {
    let mut intervals: Vec<Interval> = reservations
        .iter()
        .filter(|r| r.resource_id == *resource_id)
        .map(Reservation::interval)
        .filter(|i| i.overlaps(window))
        .map(|i| Interval {
            start: i.start.max(window.start),
            end: i.end.min(window.end),
        })
        .collect();

    intervals.sort();

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}

/// Free windows of `resource_id` inside `window`, sorted by start time.
pub fn free_windows(
    resource_id: &ResourceId,
    reservations: &[Reservation],
    window: &Interval,
) -> Vec<FreeWindow> {
    let mut free = Vec::new();
    let mut cursor = window.start;

    for busy in merge_busy_periods(resource_id, reservations, window) {
        if cursor < busy.start {
            free.push(free_window(cursor, busy.start));
        }
        cursor = cursor.max(busy.end);
    }

    if cursor < window.end {
        free.push(free_window(cursor, window.end));
    }

    free
}

/// The first free window of at least `min_minutes`.
pub fn first_free_window(
    resource_id: &ResourceId,
    reservations: &[Reservation],
    window: &Interval,
    min_minutes: i64,
) -> Option<FreeWindow> {
    free_windows(resource_id, reservations, window)
        .into_iter()
        .find(|w| w.duration_minutes >= min_minutes)
}

fn free_window(start: DateTime<Utc>, end: DateTime<Utc>) -> FreeWindow {
    FreeWindow {
        start,
        end,
        duration_minutes: (end - start).num_minutes(),
    }
}
