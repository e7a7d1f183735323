//! Detect reservations that collide with a candidate interval on the same resource.
//!
//! Conflicts are resource-scoped: a reservation on room A never blocks room B,
//! even for the identical wall-clock interval. Adjacent intervals (one ends
//! exactly when the other starts) are NOT conflicts.

use crate::model::{Interval, Reservation, ResourceId};

/// An existing reservation that overlaps the candidate interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub reservation: Reservation,
    pub overlap_minutes: i64,
}

/// True iff any reservation on `resource_id` overlaps `candidate`.
///
/// Two intervals overlap when `a.start < b.end && a.end > b.start`.
pub fn has_conflict(
    candidate: &Interval,
    resource_id: &ResourceId,
    existing: &[Reservation],
) -> bool {
    existing
        .iter()
        .any(|r| r.resource_id == *resource_id && candidate.overlaps(&r.interval()))
}

/// Every reservation on `resource_id` that overlaps `candidate`, in input order.
///
/// The overlap duration is `min(a.end, b.end) - max(a.start, b.start)`.
pub fn find_conflicts(
    candidate: &Interval,
    resource_id: &ResourceId,
    existing: &[Reservation],
) -> Vec<Conflict> {
    existing
        .iter()
        .filter(|r| r.resource_id == *resource_id)
        .filter_map(|r| {
            let interval = r.interval();
            candidate.overlaps(&interval).then(|| Conflict {
                reservation: r.clone(),
                overlap_minutes: candidate.overlap_minutes(&interval),
            })
        })
        .collect()
}
