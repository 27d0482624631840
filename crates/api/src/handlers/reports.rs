// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Report listing, form context, mutations, photos and export.

use std::collections::BTreeMap;

use mutlukent_domain::{
    Branch, BusinessClock, FORM_ERROR_MESSAGE, PageRequest, Permission, PhotoFormat,
    ReportFormContext, ReportOwnership, ValidatedReport, format_report_date, validate_photo,
    validate_report_draft,
};
use mutlukent_persistence::{
    BranchData, Persistence, PersistenceError, PhotoStore, ReportData, ReportFields, ReportFilter,
};
use time::Date;
use tracing::{debug, info, warn};

use super::{business_today, report_not_found, to_domain_branch, to_report_info, visible_filter};
use crate::auth::AuthenticatedUser;
use crate::capabilities::{ReportCapabilities, compute_report_capabilities};
use crate::error::{ApiError, translate_persistence_error};
use crate::export::{export_filename, render_reports_csv};
use crate::permissions::require;
use crate::request_response::{
    DeleteReportResponse, ExportReportsRequest, ExportReportsResponse, GetReportResponse,
    ListReportsRequest, ListReportsResponse, PhotoUpload, ReportFormResponse, ReportInfo,
    ReportPhoto, SaveReportResponse, SubmitReportRequest, VerifyReportRequest,
    VerifyReportResponse,
};

pub const CREATE_DENIED_MESSAGE: &str = "Rapor oluşturma yetkiniz yok.";
pub const EDIT_DENIED_MESSAGE: &str = "Bu raporu düzenleme yetkiniz yok.";
pub const DELETE_DENIED_MESSAGE: &str = "Silme yetkiniz yok.";
pub const VERIFY_DENIED_MESSAGE: &str = "Rapor doğrulama yetkiniz yok.";
pub const BRANCH_OUT_OF_SCOPE_MESSAGE: &str = "Bu şube için rapor girme yetkiniz yok.";

const RECORD_SAVED_MESSAGE: &str = "Z-raporu başarıyla kaydedildi!";
const RECORD_UPDATED_MESSAGE: &str = "Rapor başarıyla güncellendi";
const RECORD_DELETED_MESSAGE: &str = "Rapor başarıyla silindi";

/// Loads a report the caller is allowed to see.
fn load_visible_report(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    report_id: i64,
) -> Result<ReportData, ApiError> {
    let report: ReportData = persistence
        .get_report(report_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| report_not_found(report_id))?;

    if !user.scope.can_view_report(&ownership(&report)) {
        return Err(report_not_found(report_id));
    }
    Ok(report)
}

const fn ownership(report: &ReportData) -> ReportOwnership {
    ReportOwnership {
        branch_id: report.branch_id,
        created_by: report.created_by,
    }
}

fn to_fields(report: &ValidatedReport) -> ReportFields {
    ReportFields {
        branch_id: report.branch_id,
        report_date: format_report_date(report.report_date),
        cash_sales: report.sales.cash.kurus(),
        credit_card_sales: report.sales.credit_card.kurus(),
        debit_card_sales: report.sales.debit_card.kurus(),
        total_sales: report.total_sales.kurus(),
        notes: report.notes.clone(),
    }
}

/// Validates a submission and its optional photo together, so the caller
/// sees every field error at once.
fn validate_submission(
    request: &SubmitReportRequest,
    photo: Option<&PhotoUpload>,
    today: Date,
) -> Result<(ValidatedReport, Option<PhotoFormat>), ApiError> {
    let mut field_errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

    let validated: Option<ValidatedReport> = match validate_report_draft(&request.to_draft(), today)
    {
        Ok(report) => Some(report),
        Err(errors) => {
            field_errors.extend(errors.field_errors);
            None
        }
    };

    let photo_format: Option<PhotoFormat> = match photo {
        None => None,
        Some(upload) => match validate_photo(upload.bytes.len(), &upload.content_type) {
            Ok(format) => Some(format),
            Err(e) => {
                let message: String = match e {
                    mutlukent_domain::DomainError::InvalidPhoto(message) => message,
                    other => other.to_string(),
                };
                field_errors.entry(String::from("photo")).or_default().push(message);
                None
            }
        },
    };

    match validated {
        Some(report) if field_errors.is_empty() => Ok((report, photo_format)),
        _ => Err(ApiError::ValidationFailed {
            message: String::from(FORM_ERROR_MESSAGE),
            field_errors,
        }),
    }
}

/// Lists one page of the reports visible to the caller.
///
/// Filters combine with AND, together with the caller's visibility. Callers
/// who may see nothing get an empty page.
///
/// # Errors
///
/// Returns `InvalidInput` for malformed filters, or `Internal` if a query fails.
pub fn list_reports(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    request: &ListReportsRequest,
) -> Result<ListReportsResponse, ApiError> {
    let page: PageRequest = PageRequest::new(request.page, request.per_page);
    let filter: Option<ReportFilter> = visible_filter(
        &user.scope,
        request.date_from.as_deref(),
        request.date_to.as_deref(),
        request.branch_id.as_deref(),
    )?;

    let Some(filter) = filter else {
        debug!(user_id = user.user_id(), "No report visibility; empty page");
        return Ok(ListReportsResponse {
            reports: Vec::new(),
            total: 0,
            page: page.page,
            per_page: page.per_page,
            total_pages: 0,
        });
    };

    let total: i64 = persistence
        .count_reports(&filter)
        .map_err(translate_persistence_error)?;
    let rows: Vec<ReportData> = persistence
        .list_reports(&filter, page.offset(), Some(page.limit()))
        .map_err(translate_persistence_error)?;

    Ok(ListReportsResponse {
        reports: rows.into_iter().map(to_report_info).collect(),
        total,
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages(total),
    })
}

/// Fetches one report with the caller's capabilities on it.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the report is missing or not visible.
pub fn get_report(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    report_id: i64,
) -> Result<GetReportResponse, ApiError> {
    let report: ReportData = load_visible_report(persistence, user, report_id)?;
    let capabilities: ReportCapabilities =
        compute_report_capabilities(&user.scope, &ownership(&report));
    Ok(GetReportResponse {
        report: to_report_info(report),
        capabilities,
    })
}

/// Builds the new-report form: the branches the caller may submit for.
///
/// # Errors
///
/// Returns `Internal` if a query fails.
pub fn report_form(
    persistence: &mut Persistence,
    clock: &BusinessClock,
    user: &AuthenticatedUser,
) -> Result<ReportFormResponse, ApiError> {
    let active: Vec<BranchData> = persistence
        .list_branches(false)
        .map_err(translate_persistence_error)?;
    let branches: Vec<Branch> = active
        .into_iter()
        .map(to_domain_branch)
        .collect::<Result<Vec<Branch>, ApiError>>()?;

    let context: ReportFormContext = user.scope.report_form(&branches);
    if context.blocking_error.is_some() {
        warn!(user_id = user.user_id(), "Report form blocked: no branch");
    }

    Ok(ReportFormResponse {
        branches: context.branches,
        blocking_error: context.blocking_error,
        today: format_report_date(business_today(clock)?),
    })
}

/// Creates a report, storing the photo first when one is given.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `photos` - The photo store
/// * `clock` - The business clock, to reject future dates
/// * `user` - The authenticated caller
/// * `request` - The submitted fields
/// * `photo` - An optional Z-report photo
///
/// # Errors
///
/// Returns an error if:
/// - The caller lacks `create_report`
/// - Any field fails validation, or the branch is inactive or outside the
///   caller's scope
/// - The photo or the row cannot be stored
pub fn create_report(
    persistence: &mut Persistence,
    photos: &PhotoStore,
    clock: &BusinessClock,
    user: &AuthenticatedUser,
    request: &SubmitReportRequest,
    photo: Option<&PhotoUpload>,
) -> Result<SaveReportResponse, ApiError> {
    require(
        &user.scope,
        Permission::CreateReport,
        "create_report",
        CREATE_DENIED_MESSAGE,
    )?;

    let today: Date = business_today(clock)?;
    let (report, photo_format): (ValidatedReport, Option<PhotoFormat>) =
        validate_submission(request, photo, today)?;

    let branch: Option<Branch> = persistence
        .get_branch(report.branch_id)
        .map_err(translate_persistence_error)?
        .map(to_domain_branch)
        .transpose()?;
    let allowed: bool = branch
        .as_ref()
        .is_some_and(|b| user.scope.can_create_report_for(b));
    if !allowed {
        warn!(
            user_id = user.user_id(),
            branch_id = report.branch_id,
            "Report submitted for a branch outside scope"
        );
        return Err(ApiError::field("branch_id", BRANCH_OUT_OF_SCOPE_MESSAGE));
    }

    let photo_key: Option<String> = match (photo, photo_format) {
        (Some(upload), Some(format)) => Some(
            photos
                .save(user.user_id(), format, &upload.bytes)
                .map_err(translate_persistence_error)?,
        ),
        _ => None,
    };

    let fields: ReportFields = to_fields(&report);
    let report_id: i64 = match persistence.insert_report(user.user_id(), &fields, photo_key.as_deref())
    {
        Ok(id) => id,
        Err(e) => {
            if let Some(key) = photo_key.as_deref()
                && let Err(cleanup) = photos.remove(key)
            {
                warn!(key, error = %cleanup, "Failed to remove orphaned photo");
            }
            return Err(translate_persistence_error(e));
        }
    };

    info!(
        report_id,
        user_id = user.user_id(),
        branch_id = fields.branch_id,
        total_sales = fields.total_sales,
        "Created report"
    );

    Ok(SaveReportResponse {
        report_id,
        total_sales: fields.total_sales,
        message: String::from(RECORD_SAVED_MESSAGE),
    })
}

/// Updates a report's fields.
///
/// # Errors
///
/// Returns an error if:
/// - The report does not exist or is not visible to the caller
/// - The caller may not edit it, or may not move it to the new branch
/// - Any field fails validation
pub fn update_report(
    persistence: &mut Persistence,
    clock: &BusinessClock,
    user: &AuthenticatedUser,
    report_id: i64,
    request: &SubmitReportRequest,
) -> Result<SaveReportResponse, ApiError> {
    let existing: ReportData = load_visible_report(persistence, user, report_id)?;

    let denied = || ApiError::Unauthorized {
        action: String::from("update_report"),
        required_permission: String::from(Permission::EditReportAll.as_str()),
        message: String::from(EDIT_DENIED_MESSAGE),
    };

    if !user.scope.can_edit_report(&ownership(&existing)) {
        warn!(user_id = user.user_id(), report_id, "Edit denied");
        return Err(denied());
    }

    let today: Date = business_today(clock)?;
    let (report, _): (ValidatedReport, Option<PhotoFormat>) =
        validate_submission(request, None, today)?;

    // Moving a report must keep it editable
    let moved: ReportOwnership = ReportOwnership {
        branch_id: report.branch_id,
        created_by: existing.created_by,
    };
    if report.branch_id != existing.branch_id && !user.scope.can_edit_report(&moved) {
        warn!(
            user_id = user.user_id(),
            report_id,
            branch_id = report.branch_id,
            "Move to branch outside scope denied"
        );
        return Err(denied());
    }

    let fields: ReportFields = to_fields(&report);
    persistence
        .update_report(report_id, &fields)
        .map_err(translate_persistence_error)?;

    info!(report_id, user_id = user.user_id(), "Updated report");
    Ok(SaveReportResponse {
        report_id,
        total_sales: fields.total_sales,
        message: String::from(RECORD_UPDATED_MESSAGE),
    })
}

/// Permanently deletes a report and, best-effort, its photo.
///
/// # Errors
///
/// Returns `Unauthorized` without `delete_report:all`, or
/// `ResourceNotFound` if the report does not exist.
pub fn delete_report(
    persistence: &mut Persistence,
    photos: &PhotoStore,
    user: &AuthenticatedUser,
    report_id: i64,
) -> Result<DeleteReportResponse, ApiError> {
    require(
        &user.scope,
        Permission::DeleteReportAll,
        "delete_report",
        DELETE_DENIED_MESSAGE,
    )?;

    let report: ReportData = persistence
        .get_report(report_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| report_not_found(report_id))?;

    let deleted: usize = persistence
        .delete_report(report_id)
        .map_err(translate_persistence_error)?;
    if deleted == 0 {
        return Err(report_not_found(report_id));
    }

    if let Some(key) = report.photo_key.as_deref()
        && let Err(e) = photos.remove(key)
    {
        warn!(report_id, key, error = %e, "Failed to remove report photo");
    }

    info!(report_id, user_id = user.user_id(), "Deleted report");
    Ok(DeleteReportResponse {
        report_id,
        message: String::from(RECORD_DELETED_MESSAGE),
    })
}

/// Sets or clears a report's verification.
///
/// # Errors
///
/// Returns `Unauthorized` without `edit_report:all`, or
/// `ResourceNotFound` if the report does not exist.
pub fn verify_report(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    report_id: i64,
    request: VerifyReportRequest,
) -> Result<VerifyReportResponse, ApiError> {
    require(
        &user.scope,
        Permission::EditReportAll,
        "verify_report",
        VERIFY_DENIED_MESSAGE,
    )?;

    let verifier: Option<i64> = request.verified.then_some(user.user_id());
    persistence
        .set_report_verification(report_id, verifier)
        .map_err(|e| match e {
            PersistenceError::NotFound(_) => report_not_found(report_id),
            other => translate_persistence_error(other),
        })?;

    let report: ReportData = persistence
        .get_report(report_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| report_not_found(report_id))?;

    info!(
        report_id,
        user_id = user.user_id(),
        verified = report.is_verified,
        "Changed report verification"
    );
    Ok(VerifyReportResponse {
        report_id,
        is_verified: report.is_verified,
        verified_by: report.verified_by,
        verified_at: report.verified_at,
    })
}

/// Returns the photo attached to a visible report.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the report is not visible or has no photo.
pub fn get_report_photo(
    persistence: &mut Persistence,
    photos: &PhotoStore,
    user: &AuthenticatedUser,
    report_id: i64,
) -> Result<ReportPhoto, ApiError> {
    let report: ReportData = load_visible_report(persistence, user, report_id)?;
    let missing = || ApiError::ResourceNotFound {
        resource_type: String::from("Fotoğraf"),
        message: String::from("Rapor fotoğrafı bulunamadı"),
    };

    let key: &str = report.photo_key.as_deref().ok_or_else(missing)?;
    let (bytes, format): (Vec<u8>, PhotoFormat) = photos.load(key).map_err(|e| match e {
        PersistenceError::NotFound(_) => {
            warn!(report_id, key, "Photo file missing");
            missing()
        }
        other => translate_persistence_error(other),
    })?;

    Ok(ReportPhoto {
        content_type: format.content_type(),
        bytes,
    })
}

/// Exports every visible report matching the filters as CSV.
///
/// # Errors
///
/// Returns `InvalidInput` for malformed filters, or `Internal` if a query
/// or the CSV writer fails.
pub fn export_reports(
    persistence: &mut Persistence,
    clock: &BusinessClock,
    user: &AuthenticatedUser,
    request: &ExportReportsRequest,
) -> Result<ExportReportsResponse, ApiError> {
    let filter: Option<ReportFilter> = visible_filter(
        &user.scope,
        request.date_from.as_deref(),
        request.date_to.as_deref(),
        request.branch_id.as_deref(),
    )?;

    let reports: Vec<ReportInfo> = match filter {
        Some(filter) => persistence
            .list_reports(&filter, 0, None)
            .map_err(translate_persistence_error)?
            .into_iter()
            .map(to_report_info)
            .collect(),
        None => Vec::new(),
    };

    let content: String = render_reports_csv(&reports, request.totals)?;
    let today: Date = business_today(clock)?;

    info!(
        user_id = user.user_id(),
        rows = reports.len(),
        "Exported reports"
    );
    Ok(ExportReportsResponse {
        filename: export_filename(today),
        content,
        row_count: reports.len(),
    })
}
