//! # booking-engine
//!
//! Deterministic time-slot availability and conflict resolution for
//! meeting-room booking.
//!
//! The engine turns a working-day configuration into a grid of fixed-width
//! slots, classifies each slot as past, booked, or available for a room, and
//! merges a contiguous selection into one reservation that is re-validated
//! before it is handed to the store. Double-booking a room is impossible
//! through the store's atomic create.
//!
//! ## Modules
//!
//! - [`config`] — Working window, slot width, required hours, facility timezone
//! - [`grid`] — Config → ordered, contiguous [`TimeSlot`]s
//! - [`classify`] — Slots + now + reservations → `Past` / `Booked` / `Available`
//! - [`conflict`] — Resource-scoped half-open overlap detection
//! - [`builder`] — Contiguous selection → validated [`NewReservation`]
//! - [`attempt`] — `Selecting → Validating → Accepted | Rejected` state machine
//! - [`freebusy`] — Free windows of one room
//! - [`rooms`] — Free rooms and occupancy across many rooms
//! - [`store`] — Persistence trait and the in-memory reference store
//! - [`service`] — The full fetch → classify → build → commit flow
//! - [`tz`] — Facility-local wall clock ↔ UTC anchoring
//! - [`error`] — Error types

pub mod attempt;
pub mod builder;
pub mod classify;
pub mod config;
pub mod conflict;
pub mod error;
pub mod freebusy;
pub mod grid;
pub mod model;
pub mod rooms;
pub mod service;
pub mod slot;
pub mod store;
pub mod tz;

pub use attempt::{AttemptState, BookingAttempt, RejectionReason};
pub use builder::build_reservation;
pub use classify::{classify_slots, ClassifiedSlot, DayAvailability};
pub use config::EngineConfig;
pub use conflict::{find_conflicts, has_conflict, Conflict};
pub use error::{BookingError, ConfigError, ConflictError, InvalidSelectionError, StoreError};
pub use freebusy::{first_free_window, free_windows, FreeWindow};
pub use grid::generate_slots;
pub use model::{
    Actor, DaySelection, Interval, NewReservation, OwnerId, Reservation, ReservationDraft,
    ReservationId, Resource, ResourceId,
};
pub use rooms::{available_resources, occupancy, RoomOccupancy};
pub use service::BookingService;
pub use slot::{SlotState, TimeSlot};
pub use store::{InMemoryReservationStore, ReservationStore};
