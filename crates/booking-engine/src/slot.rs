//! Wall-clock time slots and their availability states.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A fixed-width candidate interval within a working day, in facility-local time.
///
/// Ordered by `(start, end)`. Serialized with `"HH:MM"` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Build a slot, returning `None` unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// True when `next` starts exactly where this slot ends.
    pub fn is_followed_by(&self, next: &TimeSlot) -> bool {
        self.end == next.start
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format(hhmm::FORMAT),
            self.end.format(hhmm::FORMAT)
        )
    }
}

impl FromStr for TimeSlot {
    type Err = String;

    /// Parse `"10:00-10:30"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("expected HH:MM-HH:MM, got '{}'", s))?;
        let start = hhmm::parse(start.trim())?;
        let end = hhmm::parse(end.trim())?;
        TimeSlot::new(start, end).ok_or_else(|| format!("slot '{}' must start before it ends", s))
    }
}

/// Availability of one slot relative to "now" and the existing reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    /// The slot ends at or before "now".
    Past,
    /// The slot overlaps a reservation on the selected resource.
    Booked,
    /// Offerable for selection.
    Available,
}

impl SlotState {
    pub fn is_available(self) -> bool {
        self == SlotState::Available
    }
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SlotState::Past => "past",
            SlotState::Booked => "booked",
            SlotState::Available => "available",
        };
        f.write_str(s)
    }
}

/// Serde adapter for `NaiveTime` as `"HH:MM"` (seconds accepted on input).
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn parse(s: &str) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(s, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map_err(|e| format!("invalid time '{}': {}", s, e))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

