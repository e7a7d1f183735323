//! WASM bindings for booking-engine.
//!
//! Exposes slot-grid generation, slot classification, reservation building,
//! and conflict detection to JavaScript via `wasm-bindgen`. All complex types
//! are passed as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p booking-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/booking_engine_wasm.wasm
//! ```

use booking_engine::{
    tz, BookingError, DaySelection, EngineConfig, Interval, OwnerId, Reservation,
    ReservationDraft, ReservationId, ResourceId, TimeSlot,
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Reservation format accepted from JavaScript. Only the room and the
/// interval are needed for availability; the rest is optional. Reservations
/// without an `id` are numbered by position (`00000000-...-000000000001`
/// for the first), so repeated calls echo the same ids.
#[derive(Deserialize)]
struct ReservationInput {
    #[serde(default)]
    id: Option<ReservationId>,
    resource_id: String,
    start: String,
    end: String,
    #[serde(default)]
    owner_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Serialize)]
struct ConflictDto {
    reservation: Reservation,
    overlap_minutes: i64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_error(err: impl Into<BookingError>) -> JsValue {
    JsValue::from_str(&err.into().to_string())
}

fn serialize<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Parse an RFC 3339 instant, or a facility-local `YYYY-MM-DDTHH:MM[:SS]`
/// anchored in `timezone`. Same rules as the `roombook` CLI.
fn parse_local_datetime(s: &str, timezone: Tz) -> Result<DateTime<Utc>, JsValue> {
    tz::parse_instant(s, timezone).ok_or_else(|| {
        JsValue::from_str(&format!(
            "Invalid datetime '{}': expected RFC 3339 or YYYY-MM-DDTHH:MM[:SS]",
            s
        ))
    })
}

/// Parse an RFC 3339 instant. Used where no facility timezone is known.
fn parse_utc_datetime(s: &str) -> Result<DateTime<Utc>, JsValue> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            JsValue::from_str(&format!(
                "Invalid datetime '{}': {} (an offset such as Z or +01:00 is required)",
                s, e
            ))
        })
}

fn parse_date(s: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", s, e)))
}

fn parse_config(json: &str) -> Result<EngineConfig, JsValue> {
    EngineConfig::from_json(json).map_err(js_error)
}

/// Convert a JSON array of reservation objects into `Vec<Reservation>`.
///
/// With a facility timezone, naive datetimes are anchored in it; without one,
/// every datetime must carry an offset.
fn parse_reservations_json(
    json: &str,
    timezone: Option<Tz>,
) -> Result<Vec<Reservation>, JsValue> {
    let inputs: Vec<ReservationInput> = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid reservations JSON: {}", e)))?;

    let parse = |raw: &str| match timezone {
        Some(timezone) => parse_local_datetime(raw, timezone),
        None => parse_utc_datetime(raw),
    };

    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            Ok(Reservation {
                id: input
                    .id
                    .unwrap_or(ReservationId(Uuid::from_u128(index as u128 + 1))),
                resource_id: ResourceId::new(input.resource_id),
                start: parse(&input.start)?,
                end: parse(&input.end)?,
                owner_id: OwnerId::new(input.owner_id.unwrap_or_default()),
                title: input.title.unwrap_or_default(),
                notes: input.notes,
            })
        })
        .collect()
}

/// Parse a JSON array of `"HH:MM-HH:MM"` strings.
fn parse_selection_json(json: &str) -> Result<Vec<TimeSlot>, JsValue> {
    let raw: Vec<String> = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid selection JSON: {}", e)))?;
    raw.iter()
        .map(|s| s.parse::<TimeSlot>().map_err(|e| JsValue::from_str(&e)))
        .collect()
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Generate the slot grid for a configuration.
///
/// `config_json` is an `EngineConfig` object (`workStart`, `workEnd`,
/// `slotWidthMinutes`, `requiredDailyHours`, `timezone`). Returns a JSON array
/// of `{start, end}` objects with `"HH:MM"` times.
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(config_json: &str) -> Result<String, JsValue> {
    let config = parse_config(config_json)?;
    let slots = booking_engine::generate_slots(&config).map_err(js_error)?;
    serialize(&slots)
}

/// Classify the grid of `date` for an optional room.
///
/// # Arguments
/// - `config_json` -- engine configuration
/// - `date` -- facility-local date (`YYYY-MM-DD`)
/// - `now` -- reference instant: RFC 3339, or facility-local without an offset
/// - `resource_id` -- room to classify for; without one no slot is booked
/// - `reservations_json` -- array of `{resource_id, start, end, ...}` objects;
///   naive datetimes are facility-local
///
/// Returns the classified day: `{date, resource_id, slots: [{slot, state, start, end}]}`.
#[wasm_bindgen(js_name = "classifySlots")]
pub fn classify_slots(
    config_json: &str,
    date: &str,
    now: &str,
    resource_id: Option<String>,
    reservations_json: &str,
) -> Result<String, JsValue> {
    let config = parse_config(config_json)?;
    let slots = booking_engine::generate_slots(&config).map_err(js_error)?;
    let day = DaySelection::new(parse_date(date)?, resource_id.map(ResourceId::new));
    let now = parse_local_datetime(now, config.timezone)?;
    let reservations = parse_reservations_json(reservations_json, Some(config.timezone))?;

    let availability =
        booking_engine::classify_slots(&slots, now, &day, config.timezone, &reservations);
    serialize(&availability)
}

/// Merge a contiguous selection into one candidate reservation.
///
/// `selection_json` is an array of `"HH:MM-HH:MM"` strings; `draft_json` is
/// `{resource_id, owner_id, title, notes?}`. Naive `now` and reservation
/// datetimes are facility-local. Returns the candidate
/// `{resource_id, start, end, owner_id, title, notes}` or throws the rejection
/// message.
#[wasm_bindgen(js_name = "buildReservation")]
pub fn build_reservation(
    config_json: &str,
    date: &str,
    now: &str,
    selection_json: &str,
    draft_json: &str,
    reservations_json: &str,
) -> Result<String, JsValue> {
    let config = parse_config(config_json)?;
    let selection = parse_selection_json(selection_json)?;
    let draft: ReservationDraft = serde_json::from_str(draft_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid draft JSON: {}", e)))?;
    let reservations = parse_reservations_json(reservations_json, Some(config.timezone))?;

    let candidate = booking_engine::build_reservation(
        &selection,
        &draft,
        parse_date(date)?,
        parse_local_datetime(now, config.timezone)?,
        &config,
        &reservations,
    )
    .map_err(js_error)?;
    serialize(&candidate)
}

/// True when `[start, end)` overlaps any reservation of `resource_id`.
///
/// There is no facility timezone here, so `start`, `end`, and the reservation
/// datetimes must all be RFC 3339 with an offset.
#[wasm_bindgen(js_name = "hasConflict")]
pub fn has_conflict(
    start: &str,
    end: &str,
    resource_id: &str,
    reservations_json: &str,
) -> Result<bool, JsValue> {
    let interval = parse_interval(start, end)?;
    let reservations = parse_reservations_json(reservations_json, None)?;
    Ok(booking_engine::has_conflict(
        &interval,
        &ResourceId::new(resource_id),
        &reservations,
    ))
}

/// Every reservation of `resource_id` overlapping `[start, end)`, with the
/// overlap in minutes. Returns a JSON array of `{reservation, overlap_minutes}`.
/// Datetimes must be RFC 3339, as for [`has_conflict`].
#[wasm_bindgen(js_name = "findConflicts")]
pub fn find_conflicts(
    start: &str,
    end: &str,
    resource_id: &str,
    reservations_json: &str,
) -> Result<String, JsValue> {
    let interval = parse_interval(start, end)?;
    let reservations = parse_reservations_json(reservations_json, None)?;

    let dtos: Vec<ConflictDto> =
        booking_engine::find_conflicts(&interval, &ResourceId::new(resource_id), &reservations)
            .into_iter()
            .map(|c| ConflictDto {
                reservation: c.reservation,
                overlap_minutes: c.overlap_minutes,
            })
            .collect();
    serialize(&dtos)
}

fn parse_interval(start: &str, end: &str) -> Result<Interval, JsValue> {
    let start = parse_utc_datetime(start)?;
    let end = parse_utc_datetime(end)?;
    Interval::new(start, end).ok_or_else(|| {
        JsValue::from_str(&format!(
            "Interval must start before it ends: {} .. {}",
            start.to_rfc3339(),
            end.to_rfc3339()
        ))
    })
}
