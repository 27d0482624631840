// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Business-day resolution.
//!
//! Report dates are calendar days in the business time zone, not UTC. A report
//! submitted at 01:30 Istanbul time belongs to that Istanbul day.

use crate::error::DomainError;
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;

/// Default business time zone.
pub const DEFAULT_TIMEZONE: &str = "Europe/Istanbul";

/// A validated business time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessClock {
    tz: Tz,
}

impl BusinessClock {
    /// Creates a clock for an IANA time zone name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimezone` if the name is unknown.
    pub fn new(timezone: &str) -> Result<Self, DomainError> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))?;
        Ok(Self { tz })
    }

    #[must_use]
    pub fn timezone_name(&self) -> &'static str {
        self.tz.name()
    }

    /// The current business day.
    ///
    /// # Errors
    ///
    /// Returns an error if the local date cannot be represented.
    pub fn today(&self) -> Result<time::Date, DomainError> {
        self.day_at(Utc::now())
    }

    /// The business day containing the given instant.
    ///
    /// # Errors
    ///
    /// Returns an error if the local date cannot be represented.
    pub fn day_at(&self, instant: DateTime<Utc>) -> Result<time::Date, DomainError> {
        let local: chrono::NaiveDate = instant.with_timezone(&self.tz).date_naive();

        let month: time::Month = u8::try_from(local.month())
            .ok()
            .and_then(|m| time::Month::try_from(m).ok())
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: String::from("converting the local month"),
            })?;
        let day: u8 = u8::try_from(local.day()).map_err(|e| DomainError::DateArithmeticOverflow {
            operation: format!("converting the local day: {e}"),
        })?;

        time::Date::from_calendar_date(local.year(), month, day).map_err(|e| {
            DomainError::DateArithmeticOverflow {
                operation: format!("converting the local date: {e}"),
            }
        })
    }
}

impl Default for BusinessClock {
    fn default() -> Self {
        Self {
            tz: chrono_tz::Europe::Istanbul,
        }
    }
}
