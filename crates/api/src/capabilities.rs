// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities expose what actions a user is permitted to perform
//! without leaking domain internals. They are advisory only and do not
//! replace backend authorization checks.

use mutlukent_domain::{AccessScope, Permission, ReportOwnership, ReportVisibility};
use serde::{Deserialize, Serialize};

/// Represents whether a specific action is permitted.
///
/// Serializes to JSON as true/false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Allowed,
    Denied,
}

impl Capability {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(self.is_allowed())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value: bool = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(value))
    }
}

/// What the caller may do anywhere in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCapabilities {
    pub can_view_reports: Capability,
    pub can_create_report: Capability,
    pub can_edit_reports: Capability,
    pub can_delete_reports: Capability,
    pub can_verify_reports: Capability,
    pub can_export_reports: Capability,
    pub can_view_branches: Capability,
    pub can_manage_branches: Capability,
    pub can_manage_users: Capability,
}

/// What the caller may do with one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCapabilities {
    pub can_edit: Capability,
    pub can_delete: Capability,
    pub can_verify: Capability,
}

/// Computes global capabilities for a resolved scope.
///
/// A deny-all scope yields all `Denied`. Creating reports additionally
/// needs at least one branch in scope.
#[must_use]
pub fn compute_global_capabilities(scope: &AccessScope) -> GlobalCapabilities {
    let can_view: bool = scope.report_visibility() != ReportVisibility::Nothing;
    let can_edit: bool = scope.has(Permission::EditReportAll)
        || scope.has(Permission::EditReportBranch)
        || scope.has(Permission::EditReportOwn);

    GlobalCapabilities {
        can_view_reports: Capability::from_bool(can_view),
        can_create_report: Capability::from_bool(
            scope.has(Permission::CreateReport) && !scope.branch_ids.is_empty(),
        ),
        can_edit_reports: Capability::from_bool(can_edit),
        can_delete_reports: Capability::from_bool(scope.can_delete_report()),
        can_verify_reports: Capability::from_bool(scope.can_verify_report()),
        can_export_reports: Capability::from_bool(can_view),
        can_view_branches: Capability::from_bool(scope.has(Permission::ViewBranches)),
        can_manage_branches: Capability::from_bool(scope.has(Permission::ManageBranches)),
        can_manage_users: Capability::from_bool(scope.has(Permission::ManageUsers)),
    }
}

/// Computes the per-report capabilities of a scope.
#[must_use]
pub fn compute_report_capabilities(
    scope: &AccessScope,
    report: &ReportOwnership,
) -> ReportCapabilities {
    ReportCapabilities {
        can_edit: Capability::from_bool(scope.can_edit_report(report)),
        can_delete: Capability::from_bool(scope.can_delete_report()),
        can_verify: Capability::from_bool(scope.can_verify_report()),
    }
}
