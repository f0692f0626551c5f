//! Tests for clocks and timezone-aware dates

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::{Clock, FixedClock, SystemClock, Timezone};

#[test]
fn test_start_of_day_in_utc() {
    let tz = Timezone::default();
    let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    assert_eq!(tz.start_of_day(date), Some(Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap()));
}

#[test]
fn test_start_of_day_in_paris_is_previous_utc_evening() {
    let tz = Timezone::new(chrono_tz::Europe::Paris);
    let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    assert_eq!(tz.start_of_day(date), Some(Utc.with_ymd_and_hms(2024, 8, 31, 22, 0, 0).unwrap()));
}

#[test]
fn test_fixed_clock_uses_its_timezone() {
    let instant = Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();
    let clock = FixedClock::new(instant).with_timezone(Timezone::new(chrono_tz::Europe::Paris));

    assert_eq!(clock.now(), instant);
    assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
}

#[test]
fn test_system_clock_is_close_to_now() {
    let clock = SystemClock::default();
    let drift = Utc::now() - clock.now();
    assert!(drift.num_seconds().abs() < 5);
}

#[test]
fn test_timezone_from_str() {
    assert!("Europe/Paris".parse::<Timezone>().is_ok());
    assert!("Mars/Olympus".parse::<Timezone>().is_err());
}
