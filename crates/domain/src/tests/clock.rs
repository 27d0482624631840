// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::date;
use crate::{BusinessClock, DEFAULT_TIMEZONE, DomainError};
use chrono::{TimeZone, Utc};
use time::Month;

#[test]
fn test_default_clock_is_istanbul() {
    assert_eq!(BusinessClock::default().timezone_name(), DEFAULT_TIMEZONE);
    assert_eq!(
        BusinessClock::new("Europe/Istanbul").unwrap(),
        BusinessClock::default()
    );
}

#[test]
fn test_unknown_timezone_is_rejected() {
    assert_eq!(
        BusinessClock::new("Mars/Olympus"),
        Err(DomainError::InvalidTimezone(String::from("Mars/Olympus")))
    );
}

#[test]
fn test_early_morning_belongs_to_local_day() {
    let clock: BusinessClock = BusinessClock::default();
    // 22:30 UTC is 01:30 the next day in Istanbul (UTC+3)
    let instant = Utc.with_ymd_and_hms(2026, 3, 13, 22, 30, 0).unwrap();
    assert_eq!(clock.day_at(instant).unwrap(), date(2026, Month::March, 14));

    let utc: BusinessClock = BusinessClock::new("UTC").unwrap();
    assert_eq!(utc.day_at(instant).unwrap(), date(2026, Month::March, 13));
}
