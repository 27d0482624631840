// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions.
//!
//! Every handler takes the persistence layer and the authenticated caller,
//! checks permissions against the caller's scope, and returns a DTO or an
//! `ApiError`. Handlers never hold state between calls.

pub mod branches;
pub mod dashboard;
pub mod reports;
pub mod session;
pub mod users;

use std::str::FromStr;

use mutlukent_domain::{
    AccessScope, Branch, BusinessClock, DomainError, ReportVisibility, Season, format_report_date,
    parse_report_date,
};
use mutlukent_persistence::{BranchData, ReportData, ReportFilter};
use time::Date;

use crate::error::ApiError;
use crate::request_response::{BranchInfo, ReportInfo};

/// Shown in place of a deleted creator's name.
pub const UNKNOWN_CREATOR: &str = "Bilinmiyor";

/// Message for a report that is missing or not visible.
pub const REPORT_NOT_FOUND_MESSAGE: &str = "Rapor bulunamadı";

pub(crate) fn report_not_found(report_id: i64) -> ApiError {
    tracing::debug!(report_id, "Report missing or not visible");
    ApiError::ResourceNotFound {
        resource_type: String::from("Rapor"),
        message: String::from(REPORT_NOT_FOUND_MESSAGE),
    }
}

pub(crate) fn to_report_info(report: ReportData) -> ReportInfo {
    ReportInfo {
        report_id: report.report_id,
        branch_id: report.branch_id,
        branch_name: report.branch_name,
        created_by: report.created_by,
        creator_name: report
            .creator_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| String::from(UNKNOWN_CREATOR)),
        report_date: report.report_date,
        cash_sales: report.cash_sales,
        credit_card_sales: report.credit_card_sales,
        debit_card_sales: report.debit_card_sales,
        total_sales: report.total_sales,
        notes: report.notes,
        is_verified: report.is_verified,
        verified_by: report.verified_by,
        verified_at: report.verified_at,
        has_photo: report.photo_key.is_some(),
        created_at: report.created_at,
        updated_at: report.updated_at,
    }
}

pub(crate) fn to_branch_info(branch: BranchData) -> BranchInfo {
    BranchInfo {
        branch_id: branch.branch_id,
        name: branch.name,
        code: branch.code,
        season: branch.season,
        is_active: branch.is_active,
        created_at: branch.created_at,
    }
}

pub(crate) fn to_domain_branch(branch: BranchData) -> Result<Branch, ApiError> {
    let season: Season = Season::from_str(&branch.season).map_err(|e| ApiError::Internal {
        message: format!("Branch {} has a bad season: {e}", branch.branch_id),
    })?;
    Ok(Branch {
        branch_id: branch.branch_id,
        name: branch.name,
        code: branch.code,
        season,
        is_active: branch.is_active,
    })
}

pub(crate) fn business_today(clock: &BusinessClock) -> Result<Date, ApiError> {
    clock.today().map_err(|e: DomainError| ApiError::Internal {
        message: format!("Failed to resolve the business day: {e}"),
    })
}

/// Parses a branch filter given as `1` or `1,2,3`.
///
/// Empty text means no filter.
///
/// # Errors
///
/// Returns `InvalidInput` if any element is not an integer.
pub fn parse_branch_filter(raw: Option<&str>) -> Result<Option<Vec<i64>>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|_| ApiError::InvalidInput {
                field: String::from("branch_id"),
                message: format!("Geçersiz şube numarası: {part}"),
            })
        })
        .collect::<Result<Vec<i64>, ApiError>>()
        .map(Some)
}

fn normalize_date_param(field: &str, raw: Option<&str>) -> Result<Option<String>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    let date: Date = parse_report_date(raw).map_err(|_| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("Geçersiz tarih: {raw}"),
    })?;
    Ok(Some(format_report_date(date)))
}

/// Builds the report filter for a caller's request.
///
/// The caller's visibility is folded in: a requested branch filter is
/// intersected with the caller's branches, and own-report visibility adds
/// a creator restriction.
///
/// # Returns
///
/// `None` when the caller may see no reports at all.
///
/// # Errors
///
/// Returns `InvalidInput` for malformed dates or branch ids.
pub fn visible_filter(
    scope: &AccessScope,
    date_from: Option<&str>,
    date_to: Option<&str>,
    branch_param: Option<&str>,
) -> Result<Option<ReportFilter>, ApiError> {
    let date_from: Option<String> = normalize_date_param("date_from", date_from)?;
    let date_to: Option<String> = normalize_date_param("date_to", date_to)?;
    let requested: Option<Vec<i64>> = parse_branch_filter(branch_param)?;

    let created_by: Option<i64> = match scope.report_visibility() {
        ReportVisibility::Nothing => return Ok(None),
        ReportVisibility::CreatedBy(user_id) => Some(user_id),
        ReportVisibility::All | ReportVisibility::Branches(_) => None,
    };

    Ok(Some(ReportFilter {
        date_from,
        date_to,
        branch_ids: scope.effective_branch_filter(requested.as_deref()),
        created_by,
    }))
}
