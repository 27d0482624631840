// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Daily report queries.
//!
//! Listing, counting, export and dashboard totals all go through
//! `filter_reports!`, so a filter means the same rows everywhere.
//!
//! Report dates are stored as `YYYY-MM-DD` text, which orders and compares
//! lexically in calendar order.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{ReportData, ReportFilter, ReportTotalData};
use crate::diesel_schema::{branches, daily_reports, users};
use crate::error::PersistenceError;

/// Narrows a boxed report query by a `ReportFilter`.
macro_rules! filter_reports {
    ($query:expr, $filter:expr) => {{
        let filter: &ReportFilter = $filter;
        let mut query = $query;
        if let Some(date_from) = &filter.date_from {
            query = query.filter(daily_reports::report_date.ge(date_from.clone()));
        }
        if let Some(date_to) = &filter.date_to {
            query = query.filter(daily_reports::report_date.le(date_to.clone()));
        }
        if let Some(branch_ids) = &filter.branch_ids {
            query = query.filter(daily_reports::branch_id.eq_any(branch_ids.clone()));
        }
        if let Some(created_by) = filter.created_by {
            query = query.filter(daily_reports::created_by.eq(created_by));
        }
        query
    }};
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = daily_reports)]
struct ReportRow {
    report_id: i64,
    branch_id: i64,
    created_by: Option<i64>,
    report_date: String,
    cash_sales: i64,
    credit_card_sales: i64,
    debit_card_sales: i64,
    total_sales: i64,
    notes: Option<String>,
    is_verified: i32,
    verified_by: Option<i64>,
    verified_at: Option<String>,
    photo_key: Option<String>,
    created_at: String,
    updated_at: String,
}

fn into_report_data((row, branch_name, creator_name): (ReportRow, String, Option<String>)) -> ReportData {
    ReportData {
        report_id: row.report_id,
        branch_id: row.branch_id,
        branch_name,
        created_by: row.created_by,
        creator_name,
        report_date: row.report_date,
        cash_sales: row.cash_sales,
        credit_card_sales: row.credit_card_sales,
        debit_card_sales: row.debit_card_sales,
        total_sales: row.total_sales,
        notes: row.notes,
        is_verified: row.is_verified != 0,
        verified_by: row.verified_by,
        verified_at: row.verified_at,
        photo_key: row.photo_key,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Loads one page of reports, newest first.
///
/// Ordering is `report_date` descending, then `created_at` descending, then
/// id descending.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `filter` - Row filter
/// * `offset` - Rows to skip
/// * `limit` - Page size; `None` loads every matching row
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_reports(
    conn: &mut SqliteConnection,
    filter: &ReportFilter,
    offset: i64,
    limit: Option<i64>,
) -> Result<Vec<ReportData>, PersistenceError> {
    debug!(?filter, offset, ?limit, "Listing reports");

    let query = daily_reports::table
        .inner_join(branches::table)
        .left_join(users::table.on(daily_reports::created_by.eq(users::user_id.nullable())))
        .select((
            ReportRow::as_select(),
            branches::name,
            users::full_name.nullable(),
        ))
        .into_boxed();

    let mut query = filter_reports!(query, filter).order_by((
        daily_reports::report_date.desc(),
        daily_reports::created_at.desc(),
        daily_reports::report_id.desc(),
    ));
    if let Some(limit) = limit {
        query = query.offset(offset).limit(limit);
    }

    let rows: Vec<(ReportRow, String, Option<String>)> = query.load(conn)?;
    Ok(rows.into_iter().map(into_report_data).collect())
}

/// Counts the reports matching a filter.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_reports(
    conn: &mut SqliteConnection,
    filter: &ReportFilter,
) -> Result<i64, PersistenceError> {
    let total: i64 = filter_reports!(daily_reports::table.into_boxed(), filter)
        .count()
        .get_result(conn)?;
    debug!(total, "Counted reports");
    Ok(total)
}

/// Retrieves one report with its branch and creator names.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the report does not exist.
pub fn get_report(
    conn: &mut SqliteConnection,
    report_id: i64,
) -> Result<Option<ReportData>, PersistenceError> {
    debug!(report_id, "Looking up report");

    let result: Result<(ReportRow, String, Option<String>), diesel::result::Error> =
        daily_reports::table
            .inner_join(branches::table)
            .left_join(users::table.on(daily_reports::created_by.eq(users::user_id.nullable())))
            .filter(daily_reports::report_id.eq(report_id))
            .select((
                ReportRow::as_select(),
                branches::name,
                users::full_name.nullable(),
            ))
            .first(conn);

    match result {
        Ok(row) => Ok(Some(into_report_data(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Loads the per-report totals the dashboard sums over.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_report_totals(
    conn: &mut SqliteConnection,
    filter: &ReportFilter,
) -> Result<Vec<ReportTotalData>, PersistenceError> {
    debug!(?filter, "Loading report totals");

    let query = daily_reports::table
        .inner_join(branches::table)
        .select((
            daily_reports::branch_id,
            branches::name,
            daily_reports::report_date,
            daily_reports::total_sales,
        ))
        .into_boxed();

    let rows: Vec<(i64, String, String, i64)> = filter_reports!(query, filter).load(conn)?;

    Ok(rows
        .into_iter()
        .map(
            |(branch_id, branch_name, report_date, total_sales)| ReportTotalData {
                branch_id,
                branch_name,
                report_date,
                total_sales,
            },
        )
        .collect())
}
