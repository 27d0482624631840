// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Dashboard aggregation.
//!
//! All figures are computed in memory from the report rows returned by a
//! single range fetch starting at `DashboardPeriod::fetch_from`.
//!
//! ## Invariants
//!
//! - Weeks start on Monday
//! - The trend series has exactly 7 points, ending today, zero-filled
//! - The top-branch ranking is descending by amount; ties are unordered

use crate::error::DomainError;
use crate::money::Money;
use std::collections::BTreeMap;
use time::{Date, Duration};

/// Number of points in the trend series.
pub const TREND_DAYS: i64 = 7;

/// Number of branches in the top-branch ranking.
pub const TOP_BRANCH_LIMIT: usize = 5;

/// One report's contribution to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesPoint {
    pub branch_id: i64,
    pub branch_name: String,
    pub report_date: Date,
    pub total_sales: Money,
}

/// The calendar boundaries of the dashboard, relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardPeriod {
    pub today: Date,
    pub week_start: Date,
    pub month_start: Date,
    pub trend_start: Date,
}

impl DashboardPeriod {
    /// Computes the boundaries for a given day.
    ///
    /// # Errors
    ///
    /// Returns `DateArithmeticOverflow` near the edges of the calendar range.
    pub fn for_day(today: Date) -> Result<Self, DomainError> {
        let days_since_monday: i64 = i64::from(today.weekday().number_days_from_monday());
        let week_start: Date = today
            .checked_sub(Duration::days(days_since_monday))
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: String::from("computing the start of the week"),
            })?;
        let month_start: Date = today.replace_day(1).map_err(|e| {
            DomainError::DateArithmeticOverflow {
                operation: format!("computing the start of the month: {e}"),
            }
        })?;
        let trend_start: Date = today
            .checked_sub(Duration::days(TREND_DAYS - 1))
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: String::from("computing the start of the trend window"),
            })?;

        Ok(Self {
            today,
            week_start,
            month_start,
            trend_start,
        })
    }

    /// The earliest date any dashboard figure needs.
    #[must_use]
    pub fn fetch_from(&self) -> Date {
        self.week_start.min(self.month_start).min(self.trend_start)
    }
}

/// Headline totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub daily_sales: Money,
    pub weekly_sales: Money,
    pub monthly_sales: Money,
    pub total_reports: i64,
}

/// One day of the trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: Date,
    pub amount: Money,
}

/// A branch's month-to-date sales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSales {
    pub branch_id: i64,
    pub branch_name: String,
    pub amount: Money,
}

/// Computes daily, week-to-date and month-to-date totals.
///
/// # Arguments
///
/// * `points` - Rows fetched from `period.fetch_from()` onwards
/// * `period` - The dashboard period
/// * `total_reports` - The lifetime report count, counted separately
///
/// # Errors
///
/// Returns `AmountOverflow` if a total does not fit.
pub fn compute_stats(
    points: &[SalesPoint],
    period: &DashboardPeriod,
    total_reports: i64,
) -> Result<DashboardStats, DomainError> {
    let mut daily_sales: Money = Money::ZERO;
    let mut weekly_sales: Money = Money::ZERO;
    let mut monthly_sales: Money = Money::ZERO;

    for point in points.iter().filter(|p| p.report_date <= period.today) {
        if point.report_date == period.today {
            daily_sales = daily_sales.checked_add(point.total_sales)?;
        }
        if point.report_date >= period.week_start {
            weekly_sales = weekly_sales.checked_add(point.total_sales)?;
        }
        if point.report_date >= period.month_start {
            monthly_sales = monthly_sales.checked_add(point.total_sales)?;
        }
    }

    Ok(DashboardStats {
        daily_sales,
        weekly_sales,
        monthly_sales,
        total_reports,
    })
}

/// Builds the zero-filled 7-day trend ending today.
///
/// # Errors
///
/// Returns an error on date or amount overflow.
pub fn weekly_trend(
    points: &[SalesPoint],
    period: &DashboardPeriod,
) -> Result<Vec<TrendPoint>, DomainError> {
    let mut by_day: BTreeMap<Date, Money> = BTreeMap::new();
    for offset in 0..TREND_DAYS {
        let day: Date = period
            .trend_start
            .checked_add(Duration::days(offset))
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: String::from("building the trend series"),
            })?;
        by_day.insert(day, Money::ZERO);
    }

    for point in points {
        if let Some(amount) = by_day.get_mut(&point.report_date) {
            *amount = amount.checked_add(point.total_sales)?;
        }
    }

    Ok(by_day
        .into_iter()
        .map(|(date, amount)| TrendPoint { date, amount })
        .collect())
}

/// Ranks branches by month-to-date sales.
///
/// # Errors
///
/// Returns `AmountOverflow` if a branch total does not fit.
pub fn top_branches(
    points: &[SalesPoint],
    period: &DashboardPeriod,
    limit: usize,
) -> Result<Vec<BranchSales>, DomainError> {
    let mut by_branch: BTreeMap<i64, BranchSales> = BTreeMap::new();

    for point in points
        .iter()
        .filter(|p| p.report_date >= period.month_start && p.report_date <= period.today)
    {
        let entry: &mut BranchSales = by_branch.entry(point.branch_id).or_insert_with(|| BranchSales {
            branch_id: point.branch_id,
            branch_name: point.branch_name.clone(),
            amount: Money::ZERO,
        });
        entry.amount = entry.amount.checked_add(point.total_sales)?;
    }

    let mut ranked: Vec<BranchSales> = by_branch.into_values().collect();
    ranked.sort_by(|a, b| b.amount.cmp(&a.amount));
    ranked.truncate(limit);
    Ok(ranked)
}
