// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod access;
mod clock;
mod dashboard;
mod error;
mod money;
mod pagination;
mod report;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use access::{
    AccessScope, AccessSubject, NO_BRANCH_ASSIGNED_MESSAGE, ReportFormContext, ReportOwnership,
    ReportVisibility, resolve_access_scope,
};
pub use clock::{BusinessClock, DEFAULT_TIMEZONE};
pub use dashboard::{
    BranchSales, DashboardPeriod, DashboardStats, SalesPoint, TOP_BRANCH_LIMIT, TREND_DAYS,
    TrendPoint, compute_stats, top_branches, weekly_trend,
};
pub use error::DomainError;
pub use money::{Money, SalesBreakdown};
pub use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest};
pub use report::{
    AmountInput, FORM_ERROR_MESSAGE, MAX_PHOTO_BYTES, PhotoFormat, ReportDraft,
    ReportValidationErrors, ValidatedReport, format_report_date, parse_report_date,
    validate_photo, validate_report_draft,
};
pub use types::{Branch, BranchRule, Permission, RoleName, Season};
pub use validation::{normalize_email, validate_branch_fields, validate_full_name};
