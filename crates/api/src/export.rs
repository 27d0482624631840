// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV rendering of report listings.
//!
//! Headers are Turkish, dates are `DD.MM.YYYY` and amounts use the
//! `1.234,56 ₺` form, matching what the back office prints elsewhere.

use mutlukent_domain::{Money, parse_report_date};
use time::Date;

use crate::error::ApiError;
use crate::request_response::ReportInfo;

/// Column headers, in order.
pub const EXPORT_HEADERS: [&str; 9] = [
    "Tarih",
    "Şube",
    "Oluşturan",
    "Nakit Satış",
    "Kredi Kartı",
    "Banka Kartı",
    "Toplam Satış",
    "Notlar",
    "Doğrulanmış",
];

/// Label of the optional sums row.
pub const TOTALS_LABEL: &str = "TOPLAM";

/// Formats a stored `YYYY-MM-DD` date as `DD.MM.YYYY`.
///
/// Text that is not a date is passed through unchanged.
#[must_use]
pub fn format_display_date(stored: &str) -> String {
    parse_report_date(stored).map_or_else(
        |_| stored.to_string(),
        |date| {
            format!(
                "{:02}.{:02}.{:04}",
                date.day(),
                u8::from(date.month()),
                date.year()
            )
        },
    )
}

/// Suggested file name of an export made on `today`.
#[must_use]
pub fn export_filename(today: Date) -> String {
    format!(
        "z-raporlari-{:04}-{:02}-{:02}.csv",
        today.year(),
        u8::from(today.month()),
        today.day()
    )
}

/// Renders reports as CSV.
///
/// # Arguments
///
/// * `reports` - Rows in display order
/// * `include_totals` - Append a `TOPLAM` row with the amount sums
///
/// # Errors
///
/// Returns `Internal` if the writer fails or a column sum overflows.
pub fn render_reports_csv(reports: &[ReportInfo], include_totals: bool) -> Result<String, ApiError> {
    let mut writer: csv::Writer<Vec<u8>> = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS).map_err(csv_error)?;

    let mut cash: Money = Money::ZERO;
    let mut credit_card: Money = Money::ZERO;
    let mut debit_card: Money = Money::ZERO;
    let mut total: Money = Money::ZERO;

    for report in reports {
        let row_cash: Money = Money::from_kurus(report.cash_sales);
        let row_credit: Money = Money::from_kurus(report.credit_card_sales);
        let row_debit: Money = Money::from_kurus(report.debit_card_sales);
        let row_total: Money = Money::from_kurus(report.total_sales);

        writer
            .write_record([
                format_display_date(&report.report_date),
                report.branch_name.clone(),
                report.creator_name.clone(),
                row_cash.format_lira(),
                row_credit.format_lira(),
                row_debit.format_lira(),
                row_total.format_lira(),
                report.notes.clone().unwrap_or_default(),
                String::from(if report.is_verified { "Evet" } else { "Hayır" }),
            ])
            .map_err(csv_error)?;

        cash = cash.checked_add(row_cash).map_err(sum_error)?;
        credit_card = credit_card.checked_add(row_credit).map_err(sum_error)?;
        debit_card = debit_card.checked_add(row_debit).map_err(sum_error)?;
        total = total.checked_add(row_total).map_err(sum_error)?;
    }

    if include_totals {
        writer
            .write_record([
                String::from(TOTALS_LABEL),
                String::new(),
                String::new(),
                cash.format_lira(),
                credit_card.format_lira(),
                debit_card.format_lira(),
                total.format_lira(),
                String::new(),
                String::new(),
            ])
            .map_err(csv_error)?;
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(|e| ApiError::Internal {
        message: format!("Failed to flush CSV: {e}"),
    })?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal {
        message: format!("CSV is not UTF-8: {e}"),
    })
}

fn csv_error(err: csv::Error) -> ApiError {
    ApiError::Internal {
        message: format!("Failed to write CSV: {err}"),
    }
}

fn sum_error(err: mutlukent_domain::DomainError) -> ApiError {
    ApiError::Internal {
        message: format!("Failed to sum export column: {err}"),
    }
}
