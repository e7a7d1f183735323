//! Time grid generation: the canonical bookable slots of a working day.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::model::Interval;
use crate::slot::TimeSlot;
use crate::tz;

/// Partition `[work_start, work_end)` into contiguous `slot_width_minutes` slots.
///
/// A trailing remainder shorter than the width is discarded, so a 09:00–17:05
/// window at 30 minutes ends with 16:30–17:00.
///
/// # Errors
/// Returns the [`ConfigError`] from [`EngineConfig::validate`].
pub fn generate_slots(config: &EngineConfig) -> Result<Vec<TimeSlot>, ConfigError> {
    config.validate()?;

    let width = Duration::minutes(i64::from(config.slot_width_minutes));
    let count = config.window_minutes() / i64::from(config.slot_width_minutes);

    // work_end <= 23:59 after validation, so no slot edge wraps past midnight.
    let mut slots = Vec::with_capacity(count as usize);
    let mut cursor = config.work_start;
    for _ in 0..count {
        let end = cursor + width;
        slots.push(TimeSlot { start: cursor, end });
        cursor = end;
    }

    Ok(slots)
}

/// The working window of `date`, anchored in the facility timezone.
pub fn day_window(config: &EngineConfig, date: NaiveDate) -> Option<Interval> {
    Interval::new(
        tz::anchor_edge(date, config.work_start, config.timezone),
        tz::anchor_edge(date, config.work_end, config.timezone),
    )
}

/// The whole facility-local calendar day `[00:00, next 00:00)`.
pub fn calendar_day(config: &EngineConfig, date: NaiveDate) -> Option<Interval> {
    let next = date.succ_opt()?;
    Interval::new(
        tz::anchor_edge(date, NaiveTime::MIN, config.timezone),
        tz::anchor_edge(next, NaiveTime::MIN, config.timezone),
    )
}

/// True when `slot` is one of the slots [`generate_slots`] produces for `config`.
pub fn is_on_grid(config: &EngineConfig, slot: &TimeSlot) -> bool {
    let width = i64::from(config.slot_width_minutes);
    if width == 0 || slot.end - slot.start != Duration::minutes(width) {
        return false;
    }
    if slot.start < config.work_start || slot.end > config.work_end {
        return false;
    }
    let offset = (slot.start - config.work_start).num_seconds();
    let full_slots = config.window_minutes() / width;
    offset % (width * 60) == 0 && offset / (width * 60) < full_slots
}
