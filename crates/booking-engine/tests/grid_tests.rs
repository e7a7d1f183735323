//! Tests for time grid generation and configuration validation.

use booking_engine::config::{parse_timezone, EngineConfig};
use booking_engine::grid::{day_window, generate_slots, is_on_grid};
use booking_engine::{ConfigError, TimeSlot};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

fn t(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap()
}

fn config(start: NaiveTime, end: NaiveTime, width: u32) -> EngineConfig {
    EngineConfig {
        work_start: start,
        work_end: end,
        slot_width_minutes: width,
        required_daily_hours: 8.0,
        timezone: chrono_tz::UTC,
    }
}

#[test]
fn nine_to_five_thirty_minute_grid_has_sixteen_slots() {
    let slots = generate_slots(&config(t(9, 0), t(17, 0), 30)).unwrap();

    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0], TimeSlot::new(t(9, 0), t(9, 30)).unwrap());
    assert_eq!(slots[15], TimeSlot::new(t(16, 30), t(17, 0)).unwrap());
}

#[test]
fn slots_are_contiguous_and_fixed_width() {
    let slots = generate_slots(&config(t(8, 15), t(18, 0), 45)).unwrap();

    for pair in slots.windows(2) {
        assert_eq!(pair[0].end, pair[1].start, "no gap or overlap between slots");
    }
    assert!(slots.iter().all(|s| s.duration_minutes() == 45));
}

#[test]
fn trailing_remainder_is_discarded() {
    // 09:00–17:05 at 30 minutes: the 17:00–17:05 stub is dropped.
    let slots = generate_slots(&config(t(9, 0), t(17, 5), 30)).unwrap();

    assert_eq!(slots.len(), 16);
    assert_eq!(slots.last().unwrap().end, t(17, 0));
}

#[test]
fn same_inputs_same_grid() {
    let cfg = config(t(9, 0), t(18, 0), 30);
    assert_eq!(generate_slots(&cfg).unwrap(), generate_slots(&cfg).unwrap());
}

#[test]
fn empty_window_is_rejected() {
    let err = generate_slots(&config(t(17, 0), t(9, 0), 30)).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyWindow { .. }));

    let err = generate_slots(&config(t(9, 0), t(9, 0), 30)).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyWindow { .. }));
}

#[test]
fn zero_slot_width_is_rejected() {
    let err = generate_slots(&config(t(9, 0), t(17, 0), 0)).unwrap_err();
    assert_eq!(err, ConfigError::NonPositiveSlotWidth(0));
}

#[test]
fn slot_wider_than_window_is_rejected() {
    let err = generate_slots(&config(t(9, 0), t(9, 20), 30)).unwrap_err();
    assert_eq!(
        err,
        ConfigError::SlotWiderThanWindow {
            width: 30,
            window: 20
        }
    );
}

#[test]
fn required_hours_out_of_range_are_rejected() {
    for hours in [0.0, -1.0, 24.5, f64::NAN] {
        let mut cfg = config(t(9, 0), t(17, 0), 30);
        cfg.required_daily_hours = hours;
        assert!(
            matches!(cfg.validate(), Err(ConfigError::InvalidRequiredHours(_))),
            "{} hours should be rejected",
            hours
        );
    }
}

#[test]
fn config_parses_from_camel_case_json() {
    let json = r#"{
        "workStart": "09:00",
        "workEnd": "18:00",
        "slotWidthMinutes": 30,
        "requiredDailyHours": 7.5,
        "timezone": "Europe/Berlin"
    }"#;

    let cfg = EngineConfig::from_json(json).unwrap();

    assert_eq!(cfg.work_start, t(9, 0));
    assert_eq!(cfg.work_end, t(18, 0));
    assert_eq!(cfg.required_daily_minutes(), 450);
    assert_eq!(cfg.timezone, chrono_tz::Europe::Berlin);
}

#[test]
fn config_json_missing_field_is_a_parse_error() {
    let json = r#"{"workStart": "09:00", "workEnd": "17:00", "timezone": "UTC"}"#;
    assert!(matches!(
        EngineConfig::from_json(json),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn config_json_is_validated() {
    let json = r#"{
        "workStart": "17:00",
        "workEnd": "09:00",
        "slotWidthMinutes": 30,
        "requiredDailyHours": 8,
        "timezone": "UTC"
    }"#;
    assert!(matches!(
        EngineConfig::from_json(json),
        Err(ConfigError::EmptyWindow { .. })
    ));
}

#[test]
fn unknown_timezone_is_rejected() {
    assert_eq!(
        parse_timezone("Mars/Olympus_Mons"),
        Err(ConfigError::InvalidTimezone("Mars/Olympus_Mons".to_string()))
    );
}

#[test]
fn grid_membership() {
    let cfg = config(t(9, 0), t(17, 5), 30);

    assert!(is_on_grid(&cfg, &TimeSlot::new(t(9, 0), t(9, 30)).unwrap()));
    assert!(is_on_grid(&cfg, &TimeSlot::new(t(16, 30), t(17, 0)).unwrap()));
    // Misaligned start.
    assert!(!is_on_grid(&cfg, &TimeSlot::new(t(9, 15), t(9, 45)).unwrap()));
    // Wrong width.
    assert!(!is_on_grid(&cfg, &TimeSlot::new(t(9, 0), t(10, 0)).unwrap()));
    // The discarded remainder.
    assert!(!is_on_grid(&cfg, &TimeSlot::new(t(17, 0), t(17, 30)).unwrap()));
    // Before the window.
    assert!(!is_on_grid(&cfg, &TimeSlot::new(t(8, 30), t(9, 0)).unwrap()));
}

#[test]
fn day_window_is_anchored_in_facility_timezone() {
    let mut cfg = config(t(9, 0), t(17, 0), 30);
    cfg.timezone = chrono_tz::Asia::Tokyo;

    let window = day_window(&cfg, NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()).unwrap();

    // Tokyo is UTC+9 year-round.
    assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap());
    assert_eq!(window.end, Utc.with_ymd_and_hms(2026, 3, 16, 8, 0, 0).unwrap());
}
