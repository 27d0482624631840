// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// A seeded role with its decoded permission tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleData {
    pub role_id: i64,
    pub name: String,
    pub display_name: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchData {
    pub branch_id: i64,
    pub name: String,
    pub code: String,
    pub season: String,
    pub is_active: bool,
    pub created_at: String,
}

/// Authentication identity: the login half of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityData {
    pub identity_id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

/// A user profile joined with its identity, role and home branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub role_id: i64,
    pub role_name: Option<String>,
    pub role_display_name: Option<String>,
    pub branch_id: Option<i64>,
    pub branch_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_login_at: Option<String>,
}

/// The inputs of the access-scope resolver for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccessData {
    pub user_id: i64,
    pub role_name: String,
    pub permissions: Vec<String>,
    pub home_branch_id: Option<i64>,
    pub is_active: bool,
}

/// Profile fields written on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfileData {
    pub full_name: String,
    pub role_id: i64,
    pub branch_id: Option<i64>,
    pub phone: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// A report row joined with its branch name and creator name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportData {
    pub report_id: i64,
    pub branch_id: i64,
    pub branch_name: String,
    pub created_by: Option<i64>,
    pub creator_name: Option<String>,
    pub report_date: String,
    pub cash_sales: i64,
    pub credit_card_sales: i64,
    pub debit_card_sales: i64,
    pub total_sales: i64,
    pub notes: Option<String>,
    pub is_verified: bool,
    pub verified_by: Option<i64>,
    pub verified_at: Option<String>,
    pub photo_key: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Report fields written on create and update. Amounts are kuruş.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFields {
    pub branch_id: i64,
    pub report_date: String,
    pub cash_sales: i64,
    pub credit_card_sales: i64,
    pub debit_card_sales: i64,
    pub total_sales: i64,
    pub notes: Option<String>,
}

/// Row filter shared by report listing, counting, export and the dashboard.
///
/// Every populated field narrows the result; they combine with AND. A
/// `branch_ids` of `Some(vec![])` matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub date_to: Option<String>,
    pub branch_ids: Option<Vec<i64>>,
    pub created_by: Option<i64>,
}

/// One report's contribution to dashboard totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTotalData {
    pub branch_id: i64,
    pub branch_name: String,
    pub report_date: String,
    pub total_sales: i64,
}
