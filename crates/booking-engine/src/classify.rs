//! Slot state classification against "now" and a reservation snapshot.
//!
//! Each slot is anchored to the target date in the facility timezone and
//! receives exactly one state:
//!
//! 1. `Past` when its anchored end is at or before `now`, or when a DST gap
//!    swallows the whole slot
//! 2. `Booked` when it overlaps a reservation on the selected resource
//! 3. `Available` otherwise
//!
//! When no resource is selected there is nothing to conflict with, so slots
//! are only ever `Past` or `Available`. Classification is a pure function of
//! its inputs.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::conflict::has_conflict;
use crate::model::{DaySelection, Interval, Reservation, ResourceId};
use crate::slot::{SlotState, TimeSlot};
use crate::tz;

/// A slot with its state and its anchored UTC interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedSlot {
    pub slot: TimeSlot,
    pub state: SlotState,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Per-state slot counts for a classified day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSummary {
    pub past: usize,
    pub booked: usize,
    pub available: usize,
}

/// The classified grid of one date (and optionally one room).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub resource_id: Option<ResourceId>,
    /// Classified slots in grid order.
    pub slots: Vec<ClassifiedSlot>,
}

impl DayAvailability {
    /// State of `slot`, or `None` if it was not part of the classified grid.
    pub fn state_of(&self, slot: &TimeSlot) -> Option<SlotState> {
        self.slots
            .iter()
            .find(|c| c.slot == *slot)
            .map(|c| c.state)
    }

    /// Slots that may be offered for selection.
    pub fn offerable(&self) -> Vec<TimeSlot> {
        self.slots
            .iter()
            .filter(|c| c.state.is_available())
            .map(|c| c.slot)
            .collect()
    }

    pub fn as_map(&self) -> BTreeMap<TimeSlot, SlotState> {
        self.slots.iter().map(|c| (c.slot, c.state)).collect()
    }

    pub fn summary(&self) -> SlotSummary {
        self.slots
            .iter()
            .fold(SlotSummary::default(), |mut acc, c| {
                match c.state {
                    SlotState::Past => acc.past += 1,
                    SlotState::Booked => acc.booked += 1,
                    SlotState::Available => acc.available += 1,
                }
                acc
            })
    }
}

/// Classify every slot of `day` into `Past`, `Booked`, or `Available`.
///
/// Reservations for resources other than `day.resource_id` are ignored.
pub fn classify_slots(
    slots: &[TimeSlot],
    now: DateTime<Utc>,
    day: &DaySelection,
    tz: Tz,
    reservations: &[Reservation],
) -> DayAvailability {
    let classified = slots
        .iter()
        .map(|slot| classify_slot(slot, now, day, tz, reservations))
        .collect();

    DayAvailability {
        date: day.date,
        resource_id: day.resource_id.clone(),
        slots: classified,
    }
}

/// Classify a single slot. Shared by the reservation builder's re-validation.
pub fn classify_slot(
    slot: &TimeSlot,
    now: DateTime<Utc>,
    day: &DaySelection,
    tz: Tz,
    reservations: &[Reservation],
) -> ClassifiedSlot {
    let interval = anchor_slot(slot, day.date, tz);

    // An empty interval is wall-clock time skipped by a DST transition.
    let state = if interval.end <= now || interval.start >= interval.end {
        SlotState::Past
    } else if day
        .resource_id
        .as_ref()
        .is_some_and(|room| has_conflict(&interval, room, reservations))
    {
        SlotState::Booked
    } else {
        SlotState::Available
    };

    ClassifiedSlot {
        slot: *slot,
        state,
        start: interval.start,
        end: interval.end,
    }
}

/// The UTC interval of `slot` on `date` in `tz`.
///
/// Never runs backwards. It is empty when the slot lies wholly inside a DST
/// gap, and such a slot is classified `Past`.
pub fn anchor_slot(slot: &TimeSlot, date: NaiveDate, tz: Tz) -> Interval {
    Interval {
        start: tz::anchor_edge(date, slot.start, tz),
        end: tz::anchor_edge(date, slot.end, tz),
    }
}
