//! Anchoring facility-local wall-clock times to UTC instants.
//!
//! Reservation instants are always UTC. Day boundaries and slot edges are
//! computed in the facility timezone:
//!
//! - a local time inside a DST gap is shifted forward by the gap length
//!   (02:30 on a 02:00→03:00 spring-forward day becomes 03:30 local)
//! - an ambiguous local time (fall-back overlap) resolves to the earlier instant
//!
//! Slot edges use [`anchor_edge`] instead: a gap time clamps to the first
//! instant after the gap, so edges stay ordered and a slot lying wholly inside
//! the gap collapses to an empty interval.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;

/// Anchor `time` on `date` in `tz` and convert to UTC.
pub fn anchor(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    anchor_naive(date.and_time(time), tz)
}

/// Anchor a local datetime in `tz` and convert to UTC.
pub fn anchor_naive(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            // Gap: apply the offset in force before the transition, which lands
            // the same distance past the gap's end.
            let before = local - Duration::hours(3);
            let offset = match tz.from_local_datetime(&before) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                    dt.offset().fix().local_minus_utc()
                }
                LocalResult::None => 0,
            };
            (local - Duration::seconds(i64::from(offset))).and_utc()
        }
    }
}

/// Longest DST gap searched by [`anchor_edge`].
const MAX_GAP_MINUTES: u32 = 24 * 60;

/// Anchor a slot or window edge. Inside a DST gap the edge clamps to the
/// instant the gap ends, so `a <= b` in local time implies
/// `anchor_edge(a) <= anchor_edge(b)` on the same date.
pub fn anchor_edge(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let local = date.and_time(time);
    if !matches!(tz.from_local_datetime(&local), LocalResult::None) {
        return anchor_naive(local, tz);
    }

    // Gaps start and end on whole minutes.
    let mut cursor = local.with_second(0).unwrap_or(local).with_nanosecond(0).unwrap_or(local);
    for _ in 0..MAX_GAP_MINUTES {
        cursor += Duration::minutes(1);
        match tz.from_local_datetime(&cursor) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                return dt.with_timezone(&Utc)
            }
            LocalResult::None => {}
        }
    }
    anchor_naive(local, tz)
}

/// Parse an RFC 3339 instant, or a facility-local `YYYY-MM-DDTHH:MM[:SS]`
/// anchored in `tz` with [`anchor_naive`].
pub fn parse_instant(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
        .map(|local| anchor_naive(local, tz))
}

/// The facility-local calendar date of an instant.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}
