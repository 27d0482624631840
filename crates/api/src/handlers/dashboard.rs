// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use mutlukent_domain::{
    BranchSales, BusinessClock, DashboardPeriod, DashboardStats, Money, SalesPoint,
    TOP_BRANCH_LIMIT, TrendPoint, compute_stats, format_report_date, parse_report_date,
    top_branches, weekly_trend,
};
use mutlukent_persistence::{Persistence, ReportData, ReportFilter, ReportTotalData};
use time::Date;
use tracing::debug;

use super::{business_today, visible_filter};
use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, translate_persistence_error};
use crate::request_response::{
    BranchSalesInfo, DashboardResponse, DashboardStatsInfo, RecentReportInfo, ReportStatus,
    TrendPointInfo,
};

/// Number of rows in the recent-reports list.
pub const RECENT_REPORT_LIMIT: i64 = 5;

fn to_sales_point(row: ReportTotalData) -> Result<SalesPoint, ApiError> {
    let report_date: Date = parse_report_date(&row.report_date).map_err(|e| ApiError::Internal {
        message: format!("Stored report date is invalid: {e}"),
    })?;
    Ok(SalesPoint {
        branch_id: row.branch_id,
        branch_name: row.branch_name,
        report_date,
        total_sales: Money::from_kurus(row.total_sales),
    })
}

fn to_recent(report: ReportData) -> RecentReportInfo {
    RecentReportInfo {
        report_id: report.report_id,
        branch_name: report.branch_name,
        report_date: report.report_date,
        total_sales: report.total_sales,
        status: if report.is_verified {
            ReportStatus::Completed
        } else {
            ReportStatus::Pending
        },
    }
}

/// Computes the dashboard relative to today's business date.
///
/// Every figure is limited to the reports the caller may see. Totals come
/// from a single range fetch starting at the earliest date any figure needs.
///
/// # Errors
///
/// Returns `Internal` if a query fails or a stored row is malformed.
pub fn dashboard(
    persistence: &mut Persistence,
    clock: &BusinessClock,
    user: &AuthenticatedUser,
) -> Result<DashboardResponse, ApiError> {
    let today: Date = business_today(clock)?;
    let period: DashboardPeriod =
        DashboardPeriod::for_day(today).map_err(|e| ApiError::Internal {
            message: e.to_string(),
        })?;

    let base: Option<ReportFilter> = visible_filter(&user.scope, None, None, None)?;

    let (points, total_reports, recent): (Vec<SalesPoint>, i64, Vec<ReportData>) = match base {
        Some(base) => {
            let range: ReportFilter = ReportFilter {
                date_from: Some(format_report_date(period.fetch_from())),
                date_to: Some(format_report_date(today)),
                ..base.clone()
            };
            let points: Vec<SalesPoint> = persistence
                .list_report_totals(&range)
                .map_err(translate_persistence_error)?
                .into_iter()
                .map(to_sales_point)
                .collect::<Result<Vec<SalesPoint>, ApiError>>()?;
            let total_reports: i64 = persistence
                .count_reports(&base)
                .map_err(translate_persistence_error)?;
            let recent: Vec<ReportData> = persistence
                .list_reports(&base, 0, Some(RECENT_REPORT_LIMIT))
                .map_err(translate_persistence_error)?;
            (points, total_reports, recent)
        }
        None => (Vec::new(), 0, Vec::new()),
    };

    let internal = |e: mutlukent_domain::DomainError| ApiError::Internal {
        message: e.to_string(),
    };
    let stats: DashboardStats = compute_stats(&points, &period, total_reports).map_err(internal)?;
    let trend: Vec<TrendPoint> = weekly_trend(&points, &period).map_err(internal)?;
    let top: Vec<BranchSales> = top_branches(&points, &period, TOP_BRANCH_LIMIT).map_err(internal)?;

    debug!(
        user_id = user.user_id(),
        rows = points.len(),
        total_reports,
        "Computed dashboard"
    );

    Ok(DashboardResponse {
        today: format_report_date(today),
        stats: DashboardStatsInfo {
            daily_sales: stats.daily_sales.kurus(),
            weekly_sales: stats.weekly_sales.kurus(),
            monthly_sales: stats.monthly_sales.kurus(),
            total_reports: stats.total_reports,
        },
        weekly_trend: trend
            .into_iter()
            .map(|point| TrendPointInfo {
                date: format_report_date(point.date),
                amount: point.amount.kurus(),
            })
            .collect(),
        top_branches: top
            .into_iter()
            .map(|branch| BranchSalesInfo {
                branch_id: branch.branch_id,
                branch_name: branch.branch_name,
                amount: branch.amount.kurus(),
            })
            .collect(),
        recent_reports: recent.into_iter().map(to_recent).collect(),
    })
}
