// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Exact monetary amounts.
//!
//! Amounts are stored as whole kuruş (1/100 lira) in an `i64`. Decimal input
//! such as `"1250,50"` or `"1250.50"` is parsed without going through floating
//! point, so sums of parsed amounts are exact.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Minor units per lira.
const KURUS_PER_LIRA: i64 = 100;

/// A monetary amount in kuruş.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from kuruş.
    #[must_use]
    pub const fn from_kurus(kurus: i64) -> Self {
        Self(kurus)
    }

    /// Creates an amount from whole lira.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not fit.
    pub const fn from_lira(lira: i64) -> Result<Self, DomainError> {
        match lira.checked_mul(KURUS_PER_LIRA) {
            Some(kurus) => Ok(Self(kurus)),
            None => Err(DomainError::AmountOverflow),
        }
    }

    /// Returns the amount in kuruş.
    #[must_use]
    pub const fn kurus(&self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if the sum does not fit.
    pub const fn checked_add(self, other: Self) -> Result<Self, DomainError> {
        match self.0.checked_add(other.0) {
            Some(sum) => Ok(Self(sum)),
            None => Err(DomainError::AmountOverflow),
        }
    }

    /// Sums a sequence of amounts.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if the running sum does not fit.
    pub fn sum<I: IntoIterator<Item = Self>>(amounts: I) -> Result<Self, DomainError> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc: Self, amount: Self| acc.checked_add(amount))
    }

    /// Parses a decimal amount.
    ///
    /// Both `.` and `,` are accepted as the decimal separator. When both
    /// appear, the last one is the decimal separator and the other is treated
    /// as a thousands separator. At most two fraction digits are allowed.
    ///
    /// # Arguments
    ///
    /// * `field` - The field name used in error reports
    /// * `input` - The text to parse
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` if the text is not a number with at most two
    /// fraction digits, or `AmountOverflow` if it does not fit.
    pub fn parse_decimal(field: &str, input: &str) -> Result<Self, DomainError> {
        let invalid = |message: &str| DomainError::InvalidAmount {
            field: field.to_string(),
            message: message.to_string(),
        };

        let trimmed: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        let (negative, digits): (bool, &str) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.as_str()),
        };
        if digits.is_empty() {
            return Err(invalid("Geçerli bir tutar giriniz."));
        }

        let decimal_pos: Option<usize> = digits.rfind(['.', ',']);
        let (whole, fraction): (String, &str) = match decimal_pos {
            Some(pos) => {
                let separator: char = digits[pos..].chars().next().unwrap_or('.');
                let other: char = if separator == '.' { ',' } else { '.' };
                let whole_part: String = digits[..pos].chars().filter(|c| *c != other).collect();
                (whole_part, &digits[pos + 1..])
            }
            None => (digits.to_string(), ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("Geçerli bir tutar giriniz."));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("Geçerli bir tutar giriniz."));
        }
        if fraction.len() > 2 {
            return Err(invalid("En fazla iki ondalık basamak girilebilir."));
        }

        let lira: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().map_err(|_| DomainError::AmountOverflow)?
        };
        let kurus_fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| DomainError::AmountOverflow)? * 10,
            _ => fraction.parse::<i64>().map_err(|_| DomainError::AmountOverflow)?,
        };

        let magnitude: i64 = lira
            .checked_mul(KURUS_PER_LIRA)
            .and_then(|k| k.checked_add(kurus_fraction))
            .ok_or(DomainError::AmountOverflow)?;

        Ok(Self(if negative { -magnitude } else { magnitude }))
    }

    /// Formats the amount the way Turkish spreadsheets show currency,
    /// e.g. `1.234,56 ₺`.
    #[must_use]
    pub fn format_lira(&self) -> String {
        let abs: u64 = self.0.unsigned_abs();
        let lira: u64 = abs / 100;
        let kurus: u64 = abs % 100;

        let digits: String = lira.to_string();
        let mut grouped: String = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }

        let sign: &str = if self.0 < 0 { "-" } else { "" };
        format!("{sign}{grouped},{kurus:02} ₺")
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign: &str = if self.0 < 0 { "-" } else { "" };
        let abs: u64 = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// The per-channel sales of one Z-report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalesBreakdown {
    pub cash: Money,
    pub credit_card: Money,
    pub debit_card: Money,
}

impl SalesBreakdown {
    #[must_use]
    pub const fn new(cash: Money, credit_card: Money, debit_card: Money) -> Self {
        Self {
            cash,
            credit_card,
            debit_card,
        }
    }

    /// Total sales: cash + credit card + debit card.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if the sum does not fit.
    pub fn total(&self) -> Result<Money, DomainError> {
        Money::sum([self.cash, self.credit_card, self.debit_card])
    }
}
