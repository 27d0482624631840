// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Amounts are kuruş integers; dates are `YYYY-MM-DD` strings; timestamps
//! are passed through as stored.

use mutlukent_domain::{AmountInput, Branch, ReportDraft};

use crate::capabilities::{GlobalCapabilities, ReportCapabilities};

// ========================================================================
// Session
// ========================================================================

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub session_token: String,
    /// ISO 8601 expiry of the session.
    pub expires_at: String,
    pub user: WhoAmIResponse,
}

/// The caller's identity, role, branches and capabilities.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WhoAmIResponse {
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    /// Role name, or `None` when the role could not be resolved.
    pub role: Option<String>,
    pub role_display_name: String,
    /// Home branch.
    pub branch_id: Option<i64>,
    /// Every branch the caller may act on.
    pub branch_ids: Vec<i64>,
    pub permissions: Vec<String>,
    pub capabilities: GlobalCapabilities,
}

// ========================================================================
// Reports
// ========================================================================

/// Report listing and export filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct ListReportsRequest {
    /// 1-based page number.
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub date_to: Option<String>,
    /// One id or a comma-separated list, such as `1,2`.
    pub branch_id: Option<String>,
}

/// A report as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReportInfo {
    pub report_id: i64,
    pub branch_id: i64,
    pub branch_name: String,
    pub created_by: Option<i64>,
    /// "Bilinmiyor" when the creator no longer exists.
    pub creator_name: String,
    pub report_date: String,
    pub cash_sales: i64,
    pub credit_card_sales: i64,
    pub debit_card_sales: i64,
    pub total_sales: i64,
    pub notes: Option<String>,
    pub is_verified: bool,
    pub verified_by: Option<i64>,
    pub verified_at: Option<String>,
    pub has_photo: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A page of reports.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListReportsResponse {
    pub reports: Vec<ReportInfo>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: i64,
}

/// One report with the caller's capabilities on it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GetReportResponse {
    pub report: ReportInfo,
    pub capabilities: ReportCapabilities,
}

/// The new-report form context.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReportFormResponse {
    /// Branches the caller may submit for.
    pub branches: Vec<Branch>,
    /// Set when the caller cannot submit at all.
    pub blocking_error: Option<String>,
    /// Today's business date, the form default.
    pub today: String,
}

/// API request to create or update a report.
///
/// Amounts are kuruş integers or decimal strings such as `"1250,50"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct SubmitReportRequest {
    pub branch_id: Option<i64>,
    pub report_date: Option<String>,
    pub cash_sales: Option<AmountInput>,
    pub credit_card_sales: Option<AmountInput>,
    pub debit_card_sales: Option<AmountInput>,
    pub notes: Option<String>,
}

impl SubmitReportRequest {
    /// Converts the request to an unvalidated draft.
    #[must_use]
    pub fn to_draft(&self) -> ReportDraft {
        ReportDraft {
            branch_id: self.branch_id,
            report_date: self.report_date.clone(),
            cash_sales: self.cash_sales.clone(),
            credit_card_sales: self.credit_card_sales.clone(),
            debit_card_sales: self.debit_card_sales.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// An uploaded photo, as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// The declared MIME type.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// API response for a saved report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SaveReportResponse {
    pub report_id: i64,
    pub total_sales: i64,
    /// A success message.
    pub message: String,
}

/// API response for a deleted report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeleteReportResponse {
    pub report_id: i64,
    /// A success message.
    pub message: String,
}

/// API request to set or clear a report's verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub struct VerifyReportRequest {
    pub verified: bool,
}

/// API response for a verification change.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VerifyReportResponse {
    pub report_id: i64,
    pub is_verified: bool,
    pub verified_by: Option<i64>,
    pub verified_at: Option<String>,
}

/// A stored report photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPhoto {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// API request to export reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct ExportReportsRequest {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub branch_id: Option<String>,
    /// Append a TOPLAM row with column sums.
    #[serde(default)]
    pub totals: bool,
}

/// A rendered CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReportsResponse {
    /// Suggested download name.
    pub filename: String,
    pub content: String,
    /// Number of report rows, excluding any totals row.
    pub row_count: usize,
}

// ========================================================================
// Dashboard
// ========================================================================

/// Headline dashboard totals, in kuruş.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DashboardStatsInfo {
    pub daily_sales: i64,
    pub weekly_sales: i64,
    pub monthly_sales: i64,
    pub total_reports: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TrendPointInfo {
    pub date: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BranchSalesInfo {
    pub branch_id: i64,
    pub branch_name: String,
    pub amount: i64,
}

/// Review status of a recent report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Completed,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecentReportInfo {
    pub report_id: i64,
    pub branch_name: String,
    pub report_date: String,
    pub total_sales: i64,
    pub status: ReportStatus,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DashboardResponse {
    /// The business date the figures are relative to.
    pub today: String,
    pub stats: DashboardStatsInfo,
    /// Seven points ending today.
    pub weekly_trend: Vec<TrendPointInfo>,
    pub top_branches: Vec<BranchSalesInfo>,
    pub recent_reports: Vec<RecentReportInfo>,
}

// ========================================================================
// Users & Roles
// ========================================================================

/// A user as listed for administrators.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Option<String>,
    /// "Kullanıcı" when the role is missing.
    pub role_display_name: String,
    pub branch_id: Option<i64>,
    /// "-" when there is no home branch.
    pub branch_name: String,
    /// Coordinator branch assignments.
    pub assigned_branch_ids: Vec<i64>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserInfo>,
}

/// API request to create a user.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// Role name, such as `branch_manager`.
    pub role: String,
    pub branch_id: Option<i64>,
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Only kept for coordinators.
    #[serde(default)]
    pub assigned_branch_ids: Vec<i64>,
}

/// API request to update a user.
///
/// The password changes only when a non-empty one is given.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    pub password: Option<String>,
    pub full_name: String,
    pub role: String,
    pub branch_id: Option<i64>,
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub assigned_branch_ids: Vec<i64>,
}

const fn default_active() -> bool {
    true
}

/// API response for a user write.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SaveUserResponse {
    pub user_id: i64,
    pub email: String,
    /// A success message.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeleteUserResponse {
    pub user_id: i64,
    /// A success message.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoleInfo {
    pub role_id: i64,
    pub name: String,
    pub display_name: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListRolesResponse {
    pub roles: Vec<RoleInfo>,
}

// ========================================================================
// Branches
// ========================================================================

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BranchInfo {
    pub branch_id: i64,
    pub name: String,
    pub code: String,
    pub season: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
pub struct ListBranchesRequest {
    /// Honoured only for callers who manage branches.
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListBranchesResponse {
    pub branches: Vec<BranchInfo>,
}

/// API request to create a branch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct CreateBranchRequest {
    pub name: String,
    pub code: String,
    /// `summer`, `winter` or `all_year`; defaults to `all_year`.
    pub season: Option<String>,
}

/// API request to update a branch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct UpdateBranchRequest {
    pub name: String,
    pub code: String,
    pub season: String,
    pub is_active: bool,
}

/// API response for a branch write.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SaveBranchResponse {
    pub branch: BranchInfo,
    /// A success message.
    pub message: String,
}
