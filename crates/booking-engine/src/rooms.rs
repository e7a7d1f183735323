//! Availability across many rooms for one interval.
//!
//! Answers "which rooms are free 10:00–11:00?" and "how busy is each room
//! today?" from a single reservation snapshot spanning several rooms.

use serde::{Deserialize, Serialize};

use crate::conflict::has_conflict;
use crate::freebusy;
use crate::model::{Interval, Reservation, Resource};

/// How much of an interval a room is occupied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomOccupancy {
    pub resource: Resource,
    /// Merged busy periods clipped to the interval (sorted, non-overlapping).
    pub busy: Vec<Interval>,
    pub busy_minutes: i64,
    /// Reservations of this room that touch the interval.
    pub reservation_count: usize,
}

impl RoomOccupancy {
    pub fn is_free(&self) -> bool {
        self.busy.is_empty()
    }
}

/// Rooms with no reservation overlapping `interval`, in input order.
pub fn available_resources(
    resources: &[Resource],
    interval: &Interval,
    reservations: &[Reservation],
) -> Vec<Resource> {
    resources
        .iter()
        .filter(|room| !has_conflict(interval, &room.id, reservations))
        .cloned()
        .collect()
}

/// Occupancy of every room within `interval`, in input order.
pub fn occupancy(
    resources: &[Resource],
    interval: &Interval,
    reservations: &[Reservation],
) -> Vec<RoomOccupancy> {
    resources
        .iter()
        .map(|room| {
            let busy = freebusy::merge_busy_periods(&room.id, reservations, interval);
            let busy_minutes = busy.iter().map(Interval::duration_minutes).sum();
            let reservation_count = reservations
                .iter()
                .filter(|r| r.resource_id == room.id && r.interval().overlaps(interval))
                .count();
            RoomOccupancy {
                resource: room.clone(),
                busy,
                busy_minutes,
                reservation_count,
            }
        })
        .collect()
}
