//! State machine for a single reservation attempt.
//!
//! ```text
//! Selecting ──submit──▶ Validating ──▶ Accepted
//!     ▲                      │
//!     └──────retry────── Rejected(reason)
//! ```

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{ConflictError, InvalidSelectionError};
use crate::model::Reservation;
use crate::slot::{SlotState, TimeSlot};

/// Why an attempt ended in `Rejected`. Every reason is distinct so a UI can
/// tell "that slot was just booked" apart from "please select a slot".
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    EmptySelection,
    SlotNotOnGrid(TimeSlot),
    NonContiguousSelection { previous: TimeSlot, next: TimeSlot },
    StaleSlotNoLongerAvailable { slot: TimeSlot, state: SlotState },
    /// The store's authoritative check refused the commit.
    PersistenceConflict(ConflictError),
}

impl From<InvalidSelectionError> for RejectionReason {
    fn from(err: InvalidSelectionError) -> Self {
        match err {
            InvalidSelectionError::EmptySelection => RejectionReason::EmptySelection,
            InvalidSelectionError::SlotNotOnGrid(slot) => RejectionReason::SlotNotOnGrid(slot),
            InvalidSelectionError::NonContiguousSelection { previous, next } => {
                RejectionReason::NonContiguousSelection { previous, next }
            }
            InvalidSelectionError::StaleSlotNoLongerAvailable { slot, state } => {
                RejectionReason::StaleSlotNoLongerAvailable { slot, state }
            }
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::EmptySelection => f.write_str("please select at least one slot"),
            RejectionReason::SlotNotOnGrid(slot) => {
                write!(f, "slot {} is not on the booking grid", slot)
            }
            RejectionReason::NonContiguousSelection { previous, next } => {
                write!(f, "slots {} and {} are not contiguous", previous, next)
            }
            RejectionReason::StaleSlotNoLongerAvailable { slot, state } => {
                write!(f, "slot {} is no longer available ({})", slot, state)
            }
            RejectionReason::PersistenceConflict(_) => {
                f.write_str("that time was just booked by someone else")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptState {
    Selecting,
    Validating,
    Accepted(Reservation),
    Rejected(RejectionReason),
}

/// Selection state held by the interactive shell between classification and submit.
#[derive(Debug, Clone)]
pub struct BookingAttempt {
    selection: BTreeSet<TimeSlot>,
    state: AttemptState,
}

impl Default for BookingAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingAttempt {
    pub fn new() -> Self {
        Self {
            selection: BTreeSet::new(),
            state: AttemptState::Selecting,
        }
    }

    pub fn state(&self) -> &AttemptState {
        &self.state
    }

    /// Chosen slots in time order.
    pub fn selection(&self) -> Vec<TimeSlot> {
        self.selection.iter().copied().collect()
    }

    /// Add a slot. Returns `false` outside `Selecting` or if already chosen.
    pub fn select(&mut self, slot: TimeSlot) -> bool {
        self.is_selecting() && self.selection.insert(slot)
    }

    /// Remove a slot. Returns `false` outside `Selecting` or if not chosen.
    pub fn deselect(&mut self, slot: &TimeSlot) -> bool {
        self.is_selecting() && self.selection.remove(slot)
    }

    pub fn clear(&mut self) {
        if self.is_selecting() {
            self.selection.clear();
        }
    }

    /// `Selecting → Validating`. Returns `false` from any other state.
    pub fn begin_validation(&mut self) -> bool {
        if !self.is_selecting() {
            return false;
        }
        self.state = AttemptState::Validating;
        true
    }

    /// `Validating → Accepted`.
    pub fn accept(&mut self, reservation: Reservation) {
        if self.state == AttemptState::Validating {
            self.state = AttemptState::Accepted(reservation);
        }
    }

    /// `Validating → Rejected`.
    pub fn reject(&mut self, reason: RejectionReason) {
        if self.state == AttemptState::Validating {
            self.state = AttemptState::Rejected(reason);
        }
    }

    /// `Validating → Selecting` when the submission never reached a verdict
    /// (the store was unreachable).
    pub fn abort_validation(&mut self) {
        if self.state == AttemptState::Validating {
            self.state = AttemptState::Selecting;
        }
    }

    /// `Rejected → Selecting`, keeping the selection so the user can adjust it.
    pub fn retry(&mut self) -> bool {
        if matches!(self.state, AttemptState::Rejected(_)) {
            self.state = AttemptState::Selecting;
            true
        } else {
            false
        }
    }

    fn is_selecting(&self) -> bool {
        self.state == AttemptState::Selecting
    }
}
