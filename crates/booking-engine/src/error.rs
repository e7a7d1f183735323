//! Error types for booking-engine operations.

use thiserror::Error;

use crate::model::{ReservationId, ResourceId};
use crate::slot::{SlotState, TimeSlot};

/// The engine configuration cannot produce a slot grid.
///
/// Fatal to the generating call: the caller must fix the configuration, values
/// are never clamped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Working window is empty: end {end} is not after start {start}")]
    EmptyWindow { start: String, end: String },

    #[error("Slot width must be positive, got {0} minutes")]
    NonPositiveSlotWidth(u32),

    #[error("Slot width of {width} minutes does not fit a {window}-minute working window")]
    SlotWiderThanWindow { width: u32, window: i64 },

    #[error("Required daily hours must be within (0, 24], got {0}")]
    InvalidRequiredHours(f64),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid configuration: {0}")]
    Parse(String),
}

/// A slot selection was rejected before reaching the store.
///
/// Recoverable: the user re-selects.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidSelectionError {
    #[error("Please select at least one slot")]
    EmptySelection,

    #[error("Slot {0} is not on the configured time grid")]
    SlotNotOnGrid(TimeSlot),

    #[error("Selected slots are not contiguous: {previous} is not followed by {next}")]
    NonContiguousSelection { previous: TimeSlot, next: TimeSlot },

    #[error("Slot {slot} is no longer available ({state})")]
    StaleSlotNoLongerAvailable { slot: TimeSlot, state: SlotState },
}

/// The authoritative store refused a write because the interval is taken.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Resource {resource_id} is already reserved by {existing} for an overlapping interval")]
pub struct ConflictError {
    pub resource_id: ResourceId,
    pub existing: ReservationId,
}

/// Errors surfaced by a [`ReservationStore`](crate::store::ReservationStore).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("Reservation {0} not found")]
    NotFound(ReservationId),

    #[error("Reservation {0} can only be changed by its owner or an administrator")]
    Forbidden(ReservationId),

    #[error("Reservation {0} has already started")]
    AlreadyStarted(ReservationId),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Umbrella error for callers that drive the whole engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidSelection(#[from] InvalidSelectionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, BookingError>;
