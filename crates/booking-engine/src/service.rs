//! Booking flow over a [`ReservationStore`].
//!
//! grid → fetch snapshot → classify → (caller selects) → build → re-check →
//! commit. The service keeps no mutable state of its own; selection state lives
//! in the caller's [`BookingAttempt`].

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::attempt::{AttemptState, BookingAttempt, RejectionReason};
use crate::builder::build_reservation;
use crate::classify::{classify_slots, DayAvailability};
use crate::config::EngineConfig;
use crate::error::{ConfigError, StoreError};
use crate::freebusy::{self, FreeWindow};
use crate::grid;
use crate::model::{DaySelection, Interval, Reservation, ReservationDraft, ResourceId};
use crate::slot::TimeSlot;
use crate::store::ReservationStore;

pub struct BookingService<S> {
    config: EngineConfig,
    slots: Vec<TimeSlot>,
    store: Arc<S>,
}

impl<S: ReservationStore> BookingService<S> {
    /// Validate `config` and precompute its slot grid.
    pub fn new(config: EngineConfig, store: Arc<S>) -> Result<Self, ConfigError> {
        let slots = grid::generate_slots(&config)?;
        Ok(Self {
            config,
            slots,
            store,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Reservations of `resource_id` on the facility-local calendar day `date`.
    pub async fn reservations_on(
        &self,
        resource_id: &ResourceId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError> {
        let range = grid::calendar_day(&self.config, date)
            .ok_or_else(|| StoreError::InvalidInterval(format!("no calendar day after {}", date)))?;
        self.store.list_reservations(resource_id, &range).await
    }

    /// Fetch the day's snapshot and classify the grid.
    ///
    /// Without a resource no reservations are fetched and no slot is `Booked`.
    pub async fn day_availability(
        &self,
        day: &DaySelection,
        now: DateTime<Utc>,
    ) -> Result<DayAvailability, StoreError> {
        let reservations = match &day.resource_id {
            Some(room) => self.reservations_on(room, day.date).await?,
            None => Vec::new(),
        };
        Ok(classify_slots(
            &self.slots,
            now,
            day,
            self.config.timezone,
            &reservations,
        ))
    }

    /// Free windows of a room inside the working window of `date`.
    pub async fn free_windows(
        &self,
        resource_id: &ResourceId,
        date: NaiveDate,
    ) -> Result<Vec<FreeWindow>, StoreError> {
        let window = self.working_window(date)?;
        let reservations = self.store.list_reservations(resource_id, &window).await?;
        Ok(freebusy::free_windows(resource_id, &reservations, &window))
    }

    /// Drive `attempt` from `Selecting` to `Accepted` or `Rejected`.
    ///
    /// Re-fetches the latest snapshot, re-validates the selection, and commits
    /// through the store. A store conflict becomes `PersistenceConflict`. Any
    /// other store failure returns `Err` and puts the attempt back into
    /// `Selecting`.
    pub async fn submit(
        &self,
        attempt: &mut BookingAttempt,
        draft: &ReservationDraft,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<AttemptState, StoreError> {
        if !attempt.begin_validation() {
            return Ok(attempt.state().clone());
        }

        let latest = match self.reservations_on(&draft.resource_id, date).await {
            Ok(latest) => latest,
            Err(err) => {
                attempt.abort_validation();
                return Err(err);
            }
        };

        let candidate = match build_reservation(
            &attempt.selection(),
            draft,
            date,
            now,
            &self.config,
            &latest,
        ) {
            Ok(candidate) => candidate,
            Err(err) => {
                tracing::warn!(resource = %draft.resource_id, error = %err, "selection rejected");
                attempt.reject(err.into());
                return Ok(attempt.state().clone());
            }
        };

        match self.store.create_reservation(candidate).await {
            Ok(reservation) => {
                tracing::info!(
                    resource = %reservation.resource_id,
                    reservation = %reservation.id,
                    interval = %reservation.interval(),
                    "reservation accepted"
                );
                attempt.accept(reservation);
            }
            Err(StoreError::Conflict(conflict)) => {
                tracing::warn!(error = %conflict, "commit lost a race");
                attempt.reject(RejectionReason::PersistenceConflict(conflict));
            }
            Err(err) => {
                attempt.abort_validation();
                return Err(err);
            }
        }

        Ok(attempt.state().clone())
    }

    fn working_window(&self, date: NaiveDate) -> Result<Interval, StoreError> {
        grid::day_window(&self.config, date).ok_or_else(|| {
            StoreError::InvalidInterval(format!("empty working window on {}", date))
        })
    }
}
