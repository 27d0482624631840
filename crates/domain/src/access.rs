// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role-based access scope.
//!
//! An `AccessScope` is the single answer to "what may this user do, and on
//! which branches". It is computed from the user's role, the role's permission
//! tags and the user's branch assignment, and every report, dashboard and
//! user-management decision is taken against it.
//!
//! ## Invariants
//!
//! - A scope without a role carries no permissions and no branches
//! - Branch ids are sorted and unique
//! - Report deletion is gated to `delete_report:all` only

use crate::types::{Branch, BranchRule, Permission, RoleName};
use serde::Serialize;
use std::collections::BTreeSet;

/// What the resolver knows about a user before branch expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSubject {
    pub user_id: i64,
    pub role: RoleName,
    pub permissions: Vec<Permission>,
    pub home_branch_id: Option<i64>,
    pub is_active: bool,
}

/// The consolidated capability set of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessScope {
    /// The user this scope was resolved for.
    pub user_id: i64,
    /// The resolved role, or `None` for a deny-all scope.
    pub role: Option<RoleName>,
    /// Permission tags granted by the role.
    pub permissions: BTreeSet<Permission>,
    /// Branch ids the user may act on.
    pub branch_ids: Vec<i64>,
}

/// Row-level restriction applied to report queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportVisibility {
    /// Every report.
    All,
    /// Reports of the listed branches.
    Branches(Vec<i64>),
    /// Reports created by the given user.
    CreatedBy(i64),
    /// Nothing at all.
    Nothing,
}

/// The ownership facts of a report that gate edits and deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOwnership {
    pub branch_id: i64,
    pub created_by: Option<i64>,
}

/// Branches offered by the new-report form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportFormContext {
    pub branches: Vec<Branch>,
    /// Set when the user cannot submit a report at all.
    pub blocking_error: Option<String>,
}

/// Message shown when a user has no branch to report for.
pub const NO_BRANCH_ASSIGNED_MESSAGE: &str = "Kullanıcı hesabınıza tanımlanmış bir şube bulunamadı. Rapor girişi yapmak için lütfen sistem yöneticisi ile iletişime geçiniz.";

/// Resolves the access scope of a user.
///
/// # Arguments
///
/// * `subject` - The user's role data, or `None` if the user or role is missing
/// * `active_branch_ids` - Ids of all active branches
/// * `assigned_branch_ids` - Ids from the user-branch join table
///
/// # Returns
///
/// The user's scope. Missing or inactive users resolve to a deny-all scope.
#[must_use]
pub fn resolve_access_scope(
    user_id: i64,
    subject: Option<&AccessSubject>,
    active_branch_ids: &[i64],
    assigned_branch_ids: &[i64],
) -> AccessScope {
    let Some(subject) = subject.filter(|s| s.is_active) else {
        return AccessScope::deny_all(user_id);
    };

    let branch_ids: Vec<i64> = match subject.role.branch_rule() {
        BranchRule::AllActive => active_branch_ids.to_vec(),
        BranchRule::Assigned => assigned_branch_ids.to_vec(),
        BranchRule::HomeBranch => subject.home_branch_id.into_iter().collect(),
    };
    let branch_ids: Vec<i64> = branch_ids
        .into_iter()
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .collect();

    AccessScope {
        user_id: subject.user_id,
        role: Some(subject.role),
        permissions: subject.permissions.iter().copied().collect(),
        branch_ids,
    }
}

impl AccessScope {
    /// A scope that permits nothing.
    #[must_use]
    pub const fn deny_all(user_id: i64) -> Self {
        Self {
            user_id,
            role: None,
            permissions: BTreeSet::new(),
            branch_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    #[must_use]
    pub fn is_deny_all(&self) -> bool {
        self.role.is_none() && self.permissions.is_empty()
    }

    #[must_use]
    pub fn includes_branch(&self, branch_id: i64) -> bool {
        self.branch_ids.binary_search(&branch_id).is_ok()
    }

    /// Which reports this user may see.
    #[must_use]
    pub fn report_visibility(&self) -> ReportVisibility {
        if self.has(Permission::ViewReportsAll) {
            ReportVisibility::All
        } else if self.has(Permission::ViewReportsBranch) {
            ReportVisibility::Branches(self.branch_ids.clone())
        } else if self.has(Permission::ViewReportsOwn) {
            ReportVisibility::CreatedBy(self.user_id)
        } else {
            ReportVisibility::Nothing
        }
    }

    /// Whether a single report is visible to this user.
    #[must_use]
    pub fn can_view_report(&self, report: &ReportOwnership) -> bool {
        match self.report_visibility() {
            ReportVisibility::All => true,
            ReportVisibility::Branches(ids) => ids.contains(&report.branch_id),
            ReportVisibility::CreatedBy(user_id) => report.created_by == Some(user_id),
            ReportVisibility::Nothing => false,
        }
    }

    /// Whether the user may submit a report for the branch.
    ///
    /// Matches the branches `report_form` offers: the branch must be active
    /// and inside the scope.
    #[must_use]
    pub fn can_create_report_for(&self, branch: &Branch) -> bool {
        branch.is_active
            && self.has(Permission::CreateReport)
            && self.includes_branch(branch.branch_id)
    }

    /// Whether the user may edit the report.
    ///
    /// Any of `edit_report:all`, `edit_report:own` (creator) or
    /// `edit_report:branch` (report branch in scope) is sufficient.
    #[must_use]
    pub fn can_edit_report(&self, report: &ReportOwnership) -> bool {
        if self.has(Permission::EditReportAll) {
            return true;
        }
        if self.has(Permission::EditReportOwn) && report.created_by == Some(self.user_id) {
            return true;
        }
        self.has(Permission::EditReportBranch) && self.includes_branch(report.branch_id)
    }

    /// Whether the user may delete reports.
    #[must_use]
    pub fn can_delete_report(&self) -> bool {
        self.has(Permission::DeleteReportAll)
    }

    /// Whether the user may change a report's verification flag.
    #[must_use]
    pub fn can_verify_report(&self) -> bool {
        self.has(Permission::EditReportAll)
    }

    /// Builds the new-report form context.
    ///
    /// Only active branches within the scope are offered. A user with no
    /// such branch receives an empty list and a blocking error.
    #[must_use]
    pub fn report_form(&self, active_branches: &[Branch]) -> ReportFormContext {
        let branches: Vec<Branch> = if self.has(Permission::CreateReport) {
            active_branches
                .iter()
                .filter(|b| b.is_active && self.includes_branch(b.branch_id))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        let blocking_error: Option<String> = if branches.is_empty() {
            Some(NO_BRANCH_ASSIGNED_MESSAGE.to_string())
        } else {
            None
        };

        ReportFormContext {
            branches,
            blocking_error,
        }
    }

    /// Narrows a requested branch filter to what this user may see.
    ///
    /// Returns `None` when no branch restriction applies.
    #[must_use]
    pub fn effective_branch_filter(&self, requested: Option<&[i64]>) -> Option<Vec<i64>> {
        match (self.report_visibility(), requested) {
            (ReportVisibility::Branches(allowed), Some(requested)) => Some(
                requested
                    .iter()
                    .copied()
                    .filter(|id| allowed.contains(id))
                    .collect(),
            ),
            (ReportVisibility::Branches(allowed), None) => Some(allowed),
            (_, Some(requested)) => Some(requested.to_vec()),
            (_, None) => None,
        }
    }
}
