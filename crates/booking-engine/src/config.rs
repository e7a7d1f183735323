//! Engine configuration supplied by the configuring collaborator.
//!
//! Every field is required. The engine applies no defaults of its own: the
//! working window, slot width, required daily hours, and facility timezone
//! must all be passed explicitly.

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::slot::hhmm;

/// Working-window and grid configuration.
///
/// JSON form:
///
/// ```json
/// {
///   "workStart": "09:00",
///   "workEnd": "17:00",
///   "slotWidthMinutes": 30,
///   "requiredDailyHours": 8.0,
///   "timezone": "Europe/Berlin"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(with = "hhmm")]
    pub work_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub work_end: NaiveTime,
    pub slot_width_minutes: u32,
    pub required_daily_hours: f64,
    /// Facility timezone that anchors every "day" and every slot.
    pub timezone: Tz,
}

impl EngineConfig {
    /// Build and validate a configuration.
    pub fn new(
        work_start: NaiveTime,
        work_end: NaiveTime,
        slot_width_minutes: u32,
        required_daily_hours: f64,
        timezone: Tz,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            work_start,
            work_end,
            slot_width_minutes,
            required_daily_hours,
            timezone,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the window, width, and required hours.
    ///
    /// # Errors
    /// - `EmptyWindow` when `work_end <= work_start`
    /// - `NonPositiveSlotWidth` when the width is zero
    /// - `SlotWiderThanWindow` when not even one full slot fits
    /// - `InvalidRequiredHours` when the hours are not within `(0, 24]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.work_end <= self.work_start {
            return Err(ConfigError::EmptyWindow {
                start: self.work_start.format(hhmm::FORMAT).to_string(),
                end: self.work_end.format(hhmm::FORMAT).to_string(),
            });
        }

        if self.slot_width_minutes == 0 {
            return Err(ConfigError::NonPositiveSlotWidth(self.slot_width_minutes));
        }

        let window = self.window_minutes();
        if i64::from(self.slot_width_minutes) > window {
            return Err(ConfigError::SlotWiderThanWindow {
                width: self.slot_width_minutes,
                window,
            });
        }

        let hours = self.required_daily_hours;
        if !hours.is_finite() || hours <= 0.0 || hours > 24.0 {
            return Err(ConfigError::InvalidRequiredHours(hours));
        }

        Ok(())
    }

    /// Length of the working window in minutes.
    pub fn window_minutes(&self) -> i64 {
        (self.work_end - self.work_start).num_minutes()
    }

    /// Required daily presence, rounded down to whole minutes.
    pub fn required_daily_minutes(&self) -> i64 {
        (self.required_daily_hours * 60.0) as i64
    }
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.parse()
        .map_err(|_| ConfigError::InvalidTimezone(name.to_string()))
}
