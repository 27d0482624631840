// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Z-report submission rules.

use crate::error::DomainError;
use crate::money::{Money, SalesBreakdown};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;
use time::macros::format_description;

/// Summary message returned alongside field errors.
pub const FORM_ERROR_MESSAGE: &str = "Lütfen formu kontrol ediniz.";

/// Largest accepted photo, in bytes.
pub const MAX_PHOTO_BYTES: usize = 5_000_000;

/// An amount as submitted: either kuruş or decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Kurus(i64),
    Text(String),
}

/// Unvalidated report input, as it arrives from a form or JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDraft {
    pub branch_id: Option<i64>,
    pub report_date: Option<String>,
    pub cash_sales: Option<AmountInput>,
    pub credit_card_sales: Option<AmountInput>,
    pub debit_card_sales: Option<AmountInput>,
    pub notes: Option<String>,
}

/// Report input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReport {
    pub branch_id: i64,
    pub report_date: Date,
    pub sales: SalesBreakdown,
    /// Always `sales.total()`.
    pub total_sales: Money,
    pub notes: Option<String>,
}

/// Field-level validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportValidationErrors {
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ReportValidationErrors {
    fn push(&mut self, field: &str, message: &str) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }
}

/// Formats a date as `YYYY-MM-DD`, the stored form of report dates.
#[must_use]
pub fn format_report_date(date: Date) -> String {
    let year: i32 = date.year();
    let month: u8 = u8::from(date.month());
    let day: u8 = date.day();
    format!("{year:04}-{month:02}-{day:02}")
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `DateParseError` if the text is not a calendar date.
pub fn parse_report_date(input: &str) -> Result<Date, DomainError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: input.to_string(),
            error: e.to_string(),
        }
    })
}

fn amount_field(
    errors: &mut ReportValidationErrors,
    field: &str,
    negative_message: &str,
    input: Option<&AmountInput>,
) -> Money {
    let parsed: Result<Money, DomainError> = match input {
        None => Ok(Money::ZERO),
        Some(AmountInput::Kurus(kurus)) => Ok(Money::from_kurus(*kurus)),
        Some(AmountInput::Text(text)) if text.trim().is_empty() => Ok(Money::ZERO),
        Some(AmountInput::Text(text)) => Money::parse_decimal(field, text),
    };

    match parsed {
        Ok(amount) if amount.is_negative() => {
            errors.push(field, negative_message);
            Money::ZERO
        }
        Ok(amount) => amount,
        Err(DomainError::InvalidAmount { message, .. }) => {
            errors.push(field, &message);
            Money::ZERO
        }
        Err(e) => {
            errors.push(field, &e.to_string());
            Money::ZERO
        }
    }
}

/// Validates a report draft.
///
/// Branch and date are required; amounts default to zero and must not be
/// negative; the date must not lie after `today`. On success the total is the
/// sum of cash, credit card and debit card sales.
///
/// # Errors
///
/// Returns every field problem found, keyed by field name.
pub fn validate_report_draft(
    draft: &ReportDraft,
    today: Date,
) -> Result<ValidatedReport, ReportValidationErrors> {
    let mut errors: ReportValidationErrors = ReportValidationErrors::default();

    let branch_id: Option<i64> = draft.branch_id.filter(|id| *id > 0);
    if branch_id.is_none() {
        errors.push("branch_id", "Şube seçimi zorunludur.");
    }

    let report_date: Option<Date> = match draft.report_date.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push("report_date", "Tarih gereklidir.");
            None
        }
        Some(text) => match parse_report_date(text) {
            Ok(date) if date > today => {
                errors.push("report_date", "Gelecek tarihli rapor girilemez.");
                None
            }
            Ok(date) => Some(date),
            Err(_) => {
                errors.push("report_date", "Tarih gereklidir.");
                None
            }
        },
    };

    let cash: Money = amount_field(
        &mut errors,
        "cash_sales",
        "Nakit satış 0 dan küçük olamaz.",
        draft.cash_sales.as_ref(),
    );
    let credit_card: Money = amount_field(
        &mut errors,
        "credit_card_sales",
        "Kredi kartı satış 0 dan küçük olamaz.",
        draft.credit_card_sales.as_ref(),
    );
    let debit_card: Money = amount_field(
        &mut errors,
        "debit_card_sales",
        "Banka kartı satış 0 dan küçük olamaz.",
        draft.debit_card_sales.as_ref(),
    );

    let sales: SalesBreakdown = SalesBreakdown::new(cash, credit_card, debit_card);
    let total_sales: Option<Money> = match sales.total() {
        Ok(total) => Some(total),
        Err(e) => {
            errors.push("total_sales", &e.to_string());
            None
        }
    };

    match (branch_id, report_date, total_sales) {
        (Some(branch_id), Some(report_date), Some(total_sales)) if errors.is_empty() => {
            Ok(ValidatedReport {
                branch_id,
                report_date,
                sales,
                total_sales,
                notes: draft
                    .notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string),
            })
        }
        _ => Err(errors),
    }
}

/// Accepted photo formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoFormat {
    Jpeg,
    Png,
    Webp,
}

impl PhotoFormat {
    /// File extension used in storage keys.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Maps a storage-key extension back to its format.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Checks an uploaded photo's size and MIME type.
///
/// # Errors
///
/// Returns `InvalidPhoto` with the user-facing message when the photo is
/// larger than 5 MB or not a JPEG, PNG or WebP image.
pub fn validate_photo(size_bytes: usize, mime_type: &str) -> Result<PhotoFormat, DomainError> {
    if size_bytes > MAX_PHOTO_BYTES {
        return Err(DomainError::InvalidPhoto(String::from(
            "Dosya boyutu 5MB dan küçük olmalı.",
        )));
    }

    match mime_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Ok(PhotoFormat::Jpeg),
        "image/png" => Ok(PhotoFormat::Png),
        "image/webp" => Ok(PhotoFormat::Webp),
        _ => Err(DomainError::InvalidPhoto(String::from(
            "Sadece .jpg, .jpeg, .png ve .webp formatları kabul edilir.",
        ))),
    }
}
