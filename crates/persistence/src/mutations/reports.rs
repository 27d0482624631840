// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::ReportFields;
use crate::diesel_schema::daily_reports;
use crate::error::PersistenceError;

/// Inserts a daily report.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `created_by` - The submitting user
/// * `fields` - Validated report fields; `total_sales` must be the channel sum
/// * `photo_key` - Photo store key, if a photo was uploaded
///
/// # Errors
///
/// Returns `CheckViolation` if an amount is negative or the total does not
/// match, or `ForeignKeyViolation` if the branch or user is missing.
pub fn insert_report(
    conn: &mut SqliteConnection,
    created_by: i64,
    fields: &ReportFields,
    photo_key: Option<&str>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(daily_reports::table)
        .values((
            daily_reports::branch_id.eq(fields.branch_id),
            daily_reports::created_by.eq(created_by),
            daily_reports::report_date.eq(&fields.report_date),
            daily_reports::cash_sales.eq(fields.cash_sales),
            daily_reports::credit_card_sales.eq(fields.credit_card_sales),
            daily_reports::debit_card_sales.eq(fields.debit_card_sales),
            daily_reports::total_sales.eq(fields.total_sales),
            daily_reports::notes.eq(fields.notes.as_deref()),
            daily_reports::photo_key.eq(photo_key),
        ))
        .execute(conn)?;

    let report_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        report_id,
        branch_id = fields.branch_id,
        created_by,
        report_date = %fields.report_date,
        "Created daily report"
    );
    Ok(report_id)
}

/// Overwrites a report's fields and refreshes `updated_at`.
///
/// # Errors
///
/// Returns `NotFound` if the report does not exist, or `CheckViolation` if
/// the amounts are inconsistent.
pub fn update_report(
    conn: &mut SqliteConnection,
    report_id: i64,
    fields: &ReportFields,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(daily_reports::table)
        .filter(daily_reports::report_id.eq(report_id))
        .set((
            daily_reports::branch_id.eq(fields.branch_id),
            daily_reports::report_date.eq(&fields.report_date),
            daily_reports::cash_sales.eq(fields.cash_sales),
            daily_reports::credit_card_sales.eq(fields.credit_card_sales),
            daily_reports::debit_card_sales.eq(fields.debit_card_sales),
            daily_reports::total_sales.eq(fields.total_sales),
            daily_reports::notes.eq(fields.notes.as_deref()),
            daily_reports::updated_at.eq(diesel::dsl::sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Report with ID {report_id} not found"
        )));
    }

    info!(report_id, "Updated daily report");
    Ok(())
}

/// Deletes a report.
///
/// # Returns
///
/// The number of rows removed (0 or 1).
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_report(conn: &mut SqliteConnection, report_id: i64) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(daily_reports::table)
        .filter(daily_reports::report_id.eq(report_id))
        .execute(conn)?;

    info!(report_id, rows_affected, "Deleted daily report");
    Ok(rows_affected)
}

/// Sets or clears a report's verification.
///
/// `Some(user_id)` marks the report verified by that user now; `None` clears
/// the flag, the verifier and the timestamp.
///
/// # Errors
///
/// Returns `NotFound` if the report does not exist.
pub fn set_report_verification(
    conn: &mut SqliteConnection,
    report_id: i64,
    verified_by: Option<i64>,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = match verified_by {
        Some(verifier) => diesel::update(daily_reports::table)
            .filter(daily_reports::report_id.eq(report_id))
            .set((
                daily_reports::is_verified.eq(1),
                daily_reports::verified_by.eq(verifier),
                daily_reports::verified_at.eq(diesel::dsl::sql::<Nullable<Text>>(
                    "CURRENT_TIMESTAMP",
                )),
            ))
            .execute(conn)?,
        None => diesel::update(daily_reports::table)
            .filter(daily_reports::report_id.eq(report_id))
            .set((
                daily_reports::is_verified.eq(0),
                daily_reports::verified_by.eq(None::<i64>),
                daily_reports::verified_at.eq(None::<String>),
            ))
            .execute(conn)?,
    };

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Report with ID {report_id} not found"
        )));
    }

    info!(report_id, ?verified_by, "Changed report verification");
    Ok(())
}
