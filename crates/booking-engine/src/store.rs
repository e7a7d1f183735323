//! The persistence collaborator and an in-memory reference implementation.
//!
//! The engine's own conflict check is an optimistic pre-check. The store is the
//! source of truth: `create_reservation` must re-check overlap and insert as one
//! atomic step, so at most one committed reservation occupies any
//! `(resource, instant)` pair no matter how many callers race.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::{ConflictError, StoreError};
use crate::model::{Actor, Interval, NewReservation, Reservation, ReservationId, ResourceId};

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// All reservations of `resource_id` overlapping `range`, sorted by start.
    async fn list_reservations(
        &self,
        resource_id: &ResourceId,
        range: &Interval,
    ) -> Result<Vec<Reservation>, StoreError>;

    /// Atomically verify that no reservation overlaps the candidate on its
    /// resource, then persist it.
    async fn create_reservation(&self, candidate: NewReservation)
        -> Result<Reservation, StoreError>;

    async fn get(&self, id: ReservationId) -> Result<Reservation, StoreError>;

    /// Move the end of a reservation, e.g. when a meeting finishes early.
    async fn adjust_end(
        &self,
        id: ReservationId,
        new_end: DateTime<Utc>,
    ) -> Result<Reservation, StoreError>;

    /// Delete a reservation that has not started yet. Only its owner or an
    /// administrator may do so.
    async fn cancel(
        &self,
        id: ReservationId,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Reservation, StoreError>;
}

/// Process-local store. A single mutex serializes every check-then-write.
#[derive(Debug, Default)]
pub struct InMemoryReservationStore {
    reservations: Mutex<BTreeMap<ReservationId, Reservation>>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with already-committed reservations, bypassing the
    /// overlap check.
    pub fn with_reservations(reservations: impl IntoIterator<Item = Reservation>) -> Self {
        let map = reservations.into_iter().map(|r| (r.id, r)).collect();
        Self {
            reservations: Mutex::new(map),
        }
    }

    /// Every stored reservation, sorted by resource then start.
    pub fn snapshot(&self) -> Vec<Reservation> {
        let mut all: Vec<Reservation> = self.reservations.lock().values().cloned().collect();
        all.sort_by(|a, b| (&a.resource_id, a.start).cmp(&(&b.resource_id, b.start)));
        all
    }

    pub fn len(&self) -> usize {
        self.reservations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.lock().is_empty()
    }
}

fn first_overlap<'a>(
    reservations: impl Iterator<Item = &'a Reservation>,
    resource_id: &ResourceId,
    interval: &Interval,
    ignore: Option<ReservationId>,
) -> Option<ReservationId> {
    reservations
        .filter(|r| Some(r.id) != ignore)
        .find(|r| r.resource_id == *resource_id && r.interval().overlaps(interval))
        .map(|r| r.id)
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn list_reservations(
        &self,
        resource_id: &ResourceId,
        range: &Interval,
    ) -> Result<Vec<Reservation>, StoreError> {
        let guard = self.reservations.lock();
        let mut found: Vec<Reservation> = guard
            .values()
            .filter(|r| r.resource_id == *resource_id && r.interval().overlaps(range))
            .cloned()
            .collect();
        found.sort_by_key(|r| (r.start, r.end));
        tracing::debug!(resource = %resource_id, count = found.len(), "listed reservations");
        Ok(found)
    }

    async fn create_reservation(
        &self,
        candidate: NewReservation,
    ) -> Result<Reservation, StoreError> {
        let interval = Interval::new(candidate.start, candidate.end).ok_or_else(|| {
            StoreError::InvalidInterval(format!(
                "start {} is not before end {}",
                candidate.start, candidate.end
            ))
        })?;

        let mut guard = self.reservations.lock();
        if let Some(existing) =
            first_overlap(guard.values(), &candidate.resource_id, &interval, None)
        {
            tracing::warn!(
                resource = %candidate.resource_id,
                interval = %interval,
                existing = %existing,
                "rejected overlapping reservation"
            );
            return Err(ConflictError {
                resource_id: candidate.resource_id,
                existing,
            }
            .into());
        }

        let reservation = candidate.into_reservation(ReservationId::generate());
        guard.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn get(&self, id: ReservationId) -> Result<Reservation, StoreError> {
        self.reservations
            .lock()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn adjust_end(
        &self,
        id: ReservationId,
        new_end: DateTime<Utc>,
    ) -> Result<Reservation, StoreError> {
        let mut guard = self.reservations.lock();
        let current = guard.get(&id).ok_or(StoreError::NotFound(id))?;

        let interval = Interval::new(current.start, new_end).ok_or_else(|| {
            StoreError::InvalidInterval(format!(
                "new end {} is not after start {}",
                new_end, current.start
            ))
        })?;

        let resource_id = current.resource_id.clone();
        if let Some(existing) = first_overlap(guard.values(), &resource_id, &interval, Some(id)) {
            return Err(ConflictError {
                resource_id,
                existing,
            }
            .into());
        }

        let reservation = guard.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        reservation.end = new_end;
        Ok(reservation.clone())
    }

    async fn cancel(
        &self,
        id: ReservationId,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Reservation, StoreError> {
        let mut guard = self.reservations.lock();
        let current = guard.get(&id).ok_or(StoreError::NotFound(id))?;

        if !actor.may_modify(current) {
            return Err(StoreError::Forbidden(id));
        }
        if current.start <= now {
            return Err(StoreError::AlreadyStarted(id));
        }

        guard.remove(&id).ok_or(StoreError::NotFound(id))
    }
}
