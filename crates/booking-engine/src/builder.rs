//! Merge a contiguous slot selection into a single reservation candidate.
//!
//! The builder re-validates every slot against the latest reservation snapshot
//! at build time, not only at classification time, so a slot booked by someone
//! else between classification and submission is caught here. The store still
//! performs the authoritative check on commit.

use chrono::{DateTime, NaiveDate, Utc};

use crate::classify::classify_slot;
use crate::config::EngineConfig;
use crate::conflict::has_conflict;
use crate::error::InvalidSelectionError;
use crate::grid;
use crate::model::{DaySelection, Interval, NewReservation, Reservation, ReservationDraft};
use crate::slot::{SlotState, TimeSlot};

/// Build a candidate reservation spanning `selection` on `date`.
///
/// Checks, in order:
/// 1. the selection is not empty
/// 2. every slot is on the configured grid
/// 3. each slot starts where the previous one ends
/// 4. every slot is still `Available` for `draft.resource_id`
/// 5. the merged interval has no conflict on that resource
///
/// # Errors
/// Returns the first [`InvalidSelectionError`] encountered.
pub fn build_reservation(
    selection: &[TimeSlot],
    draft: &ReservationDraft,
    date: NaiveDate,
    now: DateTime<Utc>,
    config: &EngineConfig,
    reservations: &[Reservation],
) -> Result<NewReservation, InvalidSelectionError> {
    let (Some(first), Some(last)) = (selection.first(), selection.last()) else {
        return Err(InvalidSelectionError::EmptySelection);
    };

    if let Some(slot) = selection.iter().find(|s| !grid::is_on_grid(config, s)) {
        return Err(InvalidSelectionError::SlotNotOnGrid(*slot));
    }

    for pair in selection.windows(2) {
        if !pair[0].is_followed_by(&pair[1]) {
            return Err(InvalidSelectionError::NonContiguousSelection {
                previous: pair[0],
                next: pair[1],
            });
        }
    }

    let day = DaySelection::new(date, Some(draft.resource_id.clone()));
    let mut anchored = Vec::with_capacity(selection.len());
    for slot in selection {
        let classified = classify_slot(slot, now, &day, config.timezone, reservations);
        if !classified.state.is_available() {
            tracing::debug!(
                resource = %draft.resource_id,
                slot = %slot,
                state = %classified.state,
                "selected slot is stale"
            );
            return Err(InvalidSelectionError::StaleSlotNoLongerAvailable {
                slot: *slot,
                state: classified.state,
            });
        }
        anchored.push(classified);
    }

    let (start, end) = match (anchored.first(), anchored.last()) {
        (Some(a), Some(b)) => (a.start, b.end),
        _ => return Err(InvalidSelectionError::EmptySelection),
    };
    let span = TimeSlot {
        start: first.start,
        end: last.end,
    };
    let Some(candidate) = Interval::new(start, end) else {
        return Err(InvalidSelectionError::StaleSlotNoLongerAvailable {
            slot: span,
            state: SlotState::Past,
        });
    };

    if has_conflict(&candidate, &draft.resource_id, reservations) {
        return Err(InvalidSelectionError::StaleSlotNoLongerAvailable {
            slot: span,
            state: SlotState::Booked,
        });
    }

    Ok(NewReservation {
        resource_id: draft.resource_id.clone(),
        start: candidate.start,
        end: candidate.end,
        owner_id: draft.owner_id.clone(),
        title: draft.title.clone(),
        notes: draft.notes.clone(),
    })
}
