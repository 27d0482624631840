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
#![allow(clippy::multiple_crate_versions)]

//! Application services of the Mutlukent back office.
//!
//! This crate sits between the HTTP server and storage. Every operation
//! resolves the caller's access scope, enforces it, and speaks in DTOs and
//! `ApiError`s so the server never sees persistence or domain internals.

mod auth;
mod capabilities;
mod error;
mod export;
mod handlers;
mod password_policy;
mod permissions;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{
    AuthenticatedUser, AuthenticationService, INACTIVE_ACCOUNT_MESSAGE,
    INVALID_CREDENTIALS_MESSAGE,
};
pub use capabilities::{
    Capability, GlobalCapabilities, ReportCapabilities, compute_global_capabilities,
    compute_report_capabilities,
};
pub use error::{
    ApiError, AuthError, INTERNAL_ERROR_MESSAGE, SESSION_REQUIRED_MESSAGE,
    translate_domain_error, translate_persistence_error,
};
pub use export::{
    EXPORT_HEADERS, TOTALS_LABEL, export_filename, format_display_date, render_reports_csv,
};
pub use handlers::branches::{create_branch, list_branches, update_branch};
pub use handlers::dashboard::{RECENT_REPORT_LIMIT, dashboard};
pub use handlers::reports::{
    create_report, delete_report, export_reports, get_report, get_report_photo, list_reports,
    report_form, update_report, verify_report,
};
pub use handlers::session::{login, logout, whoami};
pub use handlers::users::{create_user, delete_user, list_roles, list_users, update_user};
pub use handlers::{UNKNOWN_CREATOR, parse_branch_filter, visible_filter};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use permissions::{require, resolve_scope};
pub use request_response::{
    BranchInfo, BranchSalesInfo, CreateBranchRequest, CreateUserRequest, DashboardResponse,
    DashboardStatsInfo, DeleteReportResponse, DeleteUserResponse, ExportReportsRequest,
    ExportReportsResponse, GetReportResponse, ListBranchesRequest, ListBranchesResponse,
    ListReportsRequest, ListReportsResponse, ListRolesResponse, ListUsersResponse, LoginRequest,
    LoginResponse, PhotoUpload, RecentReportInfo, ReportFormResponse, ReportInfo, ReportPhoto,
    ReportStatus, RoleInfo, SaveBranchResponse, SaveReportResponse, SaveUserResponse,
    SubmitReportRequest, TrendPointInfo, UpdateBranchRequest, UpdateUserRequest, UserInfo,
    VerifyReportRequest, VerifyReportResponse, WhoAmIResponse,
};
