//! Reservations, resources, and the half-open [`Interval`] they live on.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A half-open range of instants `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Build an interval, returning `None` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Two intervals overlap iff `a.start < b.end && a.end > b.start`.
    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Minutes shared with `other`, or 0 when they do not overlap.
    pub fn overlap_minutes(&self, other: &Interval) -> i64 {
        if !self.overlaps(other) {
            return 0;
        }
        (self.end.min(other.end) - self.start.max(other.start)).num_minutes()
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Opaque identifier of a bookable resource (a meeting room).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of the user who owns a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-assigned reservation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub Uuid);

impl ReservationId {
    /// Mint a fresh random id. Stores call this when committing.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
}

/// A committed booking of one resource for one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub resource_id: ResourceId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub owner_id: OwnerId,
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Reservation {
    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}

/// Caller-supplied metadata attached to a slot selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationDraft {
    pub resource_id: ResourceId,
    pub owner_id: OwnerId,
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A validated candidate waiting for the store to assign an id and commit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    pub resource_id: ResourceId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub owner_id: OwnerId,
    pub title: String,
    pub notes: Option<String>,
}

impl NewReservation {
    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }

    /// Attach a store-assigned id.
    pub fn into_reservation(self, id: ReservationId) -> Reservation {
        Reservation {
            id,
            resource_id: self.resource_id,
            start: self.start,
            end: self.end,
            owner_id: self.owner_id,
            title: self.title,
            notes: self.notes,
        }
    }
}

/// The calendar date and (optional) room a grid is classified for.
///
/// Without a room there is no conflict information, so no slot can be `Booked`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySelection {
    pub date: NaiveDate,
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
}

impl DaySelection {
    pub fn new(date: NaiveDate, resource_id: Option<ResourceId>) -> Self {
        Self { date, resource_id }
    }
}

/// Who is asking to change a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    User(OwnerId),
    Administrator,
}

impl Actor {
    pub fn may_modify(&self, reservation: &Reservation) -> bool {
        match self {
            Actor::Administrator => true,
            Actor::User(owner) => *owner == reservation.owner_id,
        }
    }
}
